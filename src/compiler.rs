use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use log::{debug, info, warn};

use crate::error::{ConvertError, Result};

/// Program converting `.physics.yml` text into `.bphysics`.
pub const DEFAULT_COMPILER: &str = "aamp";

/// Environment variable overriding [`DEFAULT_COMPILER`].
pub const COMPILER_ENV: &str = "BPHYSICS_COMPILER";

/// External text-to-binary compiler, run as `<program> [args..] <input> <output>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    program: OsString,
    args: Vec<OsString>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}

impl Compiler {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds an argument placed before the input and output paths.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Uses `BPHYSICS_COMPILER` when set, `aamp` otherwise.
    pub fn from_env() -> Self {
        env::var_os(COMPILER_ENV)
            .filter(|value| !value.is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Compiles `input` into `output` and removes `input` afterwards.
    ///
    /// On failure `input` is left in place and `output` does not exist.
    pub fn compile(&self, input: &Path, output: &Path) -> Result<()> {
        debug!(
            "running {} {} {}",
            self.program.to_string_lossy(),
            input.display(),
            output.display()
        );
        let result = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .arg(output)
            .output();

        let failure = match result {
            Ok(out) if out.status.success() => None,
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                let stdout = String::from_utf8_lossy(&out.stdout);
                let detail = if stderr.trim().is_empty() {
                    stdout.trim().to_string()
                } else {
                    stderr.trim().to_string()
                };
                Some(format!(
                    "{} exited with {}: {detail}",
                    self.program.to_string_lossy(),
                    out.status
                ))
            }
            Err(err) => Some(format!(
                "unable to launch {}: {err}",
                self.program.to_string_lossy()
            )),
        };

        if let Some(message) = failure {
            discard_partial_output(output);
            return Err(ConvertError::CompilerInvocation { message });
        }

        info!("compiled {}", output.display());
        remove_best_effort(input);
        Ok(())
    }
}

fn discard_partial_output(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => debug!("removed partial output {}", output.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("failed to remove partial output {}: {err}", output.display()),
    }
}

/// Deletes an intermediate file; failures are only logged.
pub fn remove_best_effort(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!("failed to remove intermediate file {}: {err}", path.display());
    } else {
        debug!("removed intermediate file {}", path.display());
    }
}
