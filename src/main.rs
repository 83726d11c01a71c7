use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use bphysics_tools::dedup;
use bphysics_tools::{
    export, import_physics, Compiler, ExportMode, ExportOptions, ExportReport, ExportSource,
    Scene,
};

const USAGE: &str = "\
Usage:
  bphysics-tools import <file.physics.yml>
  bphysics-tools export <scene.xml> <out.physics.yml|out.bphysics> [export options]
  bphysics-tools export-obj <mesh.obj> <out.physics.yml|out.bphysics> [export options]
  bphysics-tools profiles <dir> [--output <file>]
  bphysics-tools material-pairs <dir> [--output <file>]

Export options:
  --grouped             one rigid body per object, shapes from its collision proxies
  --marker <text>       proxy name marker (default _hull)
  --template <file>     document template with {count} and {body} slots
  --compiler <program>  binary compiler (default $BPHYSICS_COMPILER or aamp)";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    match Command::parse(env::args().skip(1))? {
        Command::Import { input } => {
            let report = import_physics(&input)
                .with_context(|| format!("failed to import {}", input.display()))?;
            println!(
                "Imported {} shape(s) into {}",
                report.shapes.len(),
                report.obj_path.display()
            );
        }
        Command::Export {
            input,
            output,
            options,
        } => {
            let xml = fs::read_to_string(&input)
                .with_context(|| format!("unable to read {}", input.display()))?;
            let scene = Scene::from_xml(&xml).context("failed to parse scene description")?;
            println!("Loaded scene with {} objects", scene.objects.len());
            let report = export(ExportSource::Scene(&scene.objects), &output, &options)
                .with_context(|| format!("failed to export {}", output.display()))?;
            print_export(&report);
        }
        Command::ExportObj {
            input,
            output,
            options,
        } => {
            let report = export(ExportSource::MeshFile(&input), &output, &options)
                .with_context(|| format!("failed to export {}", output.display()))?;
            print_export(&report);
        }
        Command::Profiles { dir, output } => {
            let report = dedup::dump_profiles(&dir, output.as_deref())
                .context("failed to collect profiles")?;
            println!(
                "Wrote {} profile(s) to {}",
                report.count,
                report.output.display()
            );
        }
        Command::MaterialPairs { dir, output } => {
            let report = dedup::dump_material_pairs(&dir, output.as_deref())
                .context("failed to collect material pairs")?;
            println!(
                "Confirmed material pair number: {} ({})",
                report.count,
                report.output.display()
            );
        }
    }
    Ok(())
}

fn print_export(report: &ExportReport) {
    println!(
        "Exported {} shape(s) in {} rigid body(ies)",
        report.shape_count, report.body_count
    );
    if let Some(path) = &report.text_path {
        println!(" - {}", path.display());
    }
    if let Some(path) = &report.binary_path {
        println!(" - {}", path.display());
    }
}

enum Command {
    Import {
        input: PathBuf,
    },
    Export {
        input: PathBuf,
        output: PathBuf,
        options: ExportOptions,
    },
    ExportObj {
        input: PathBuf,
        output: PathBuf,
        options: ExportOptions,
    },
    Profiles {
        dir: PathBuf,
        output: Option<PathBuf>,
    },
    MaterialPairs {
        dir: PathBuf,
        output: Option<PathBuf>,
    },
}

impl Command {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut args = args;
        let Some(command) = args.next() else {
            return Err(anyhow!("{USAGE}"));
        };
        match command.as_str() {
            "import" => {
                let input = positional(&mut args, "input file")?;
                reject_extra(args)?;
                Ok(Command::Import { input })
            }
            "export" | "export-obj" => {
                let input = positional(&mut args, "input file")?;
                let output = positional(&mut args, "output file")?;
                let options = parse_export_options(args)?;
                Ok(if command == "export" {
                    Command::Export {
                        input,
                        output,
                        options,
                    }
                } else {
                    Command::ExportObj {
                        input,
                        output,
                        options,
                    }
                })
            }
            "profiles" | "material-pairs" => {
                let dir = positional(&mut args, "directory")?;
                let output = parse_output_option(args)?;
                Ok(if command == "profiles" {
                    Command::Profiles { dir, output }
                } else {
                    Command::MaterialPairs { dir, output }
                })
            }
            "-h" | "--help" | "help" => Err(anyhow!("{USAGE}")),
            other => Err(anyhow!("Unknown command: {other}\n\n{USAGE}")),
        }
    }
}

fn positional(args: &mut impl Iterator<Item = String>, what: &str) -> Result<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing {what}\n\n{USAGE}"))
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn reject_extra(mut args: impl Iterator<Item = String>) -> Result<()> {
    match args.next() {
        Some(other) => Err(anyhow!("Unknown argument: {other}")),
        None => Ok(()),
    }
}

fn parse_export_options(mut args: impl Iterator<Item = String>) -> Result<ExportOptions> {
    let mut options = ExportOptions {
        compiler: Compiler::from_env(),
        ..ExportOptions::default()
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--grouped" => options.mode = ExportMode::Grouped,
            "--marker" => options.marker = value(&mut args, "--marker")?,
            "--template" => options.template = Some(PathBuf::from(value(&mut args, "--template")?)),
            "--compiler" => options.compiler = Compiler::new(value(&mut args, "--compiler")?),
            other => {
                return Err(anyhow!(
                    "Unknown argument: {other}. Expected --grouped, --marker, --template or --compiler"
                ));
            }
        }
    }
    Ok(options)
}

fn parse_output_option(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    let mut output = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" => output = Some(PathBuf::from(value(&mut args, "--output")?)),
            other => return Err(anyhow!("Unknown argument: {other}. Expected --output")),
        }
    }
    Ok(output)
}
