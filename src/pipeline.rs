//! Import and export pipelines tying the converters together.
//!
//! Export runs through `Idle -> Transformed -> Rendered -> Compiled ->
//! Cleaned`; text-only exports skip `Compiled`. Any failing stage ends the
//! run in `Failed`, and a failed run never leaves a binary behind.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::aggregate::{self, DEFAULT_PROXY_MARKER};
use crate::compiler::{self, Compiler};
use crate::error::{ConvertError, Result};
use crate::obj;
use crate::physics_text;
use crate::scene::SceneObject;
use crate::shape::Shape;
use crate::template::{PhysicsDocument, Renderer, Template};

pub const BINARY_EXTENSION: &str = ".bphysics";
pub const TEXT_EXTENSION: &str = ".physics.yml";

/// Result of converting a physics text file into OBJ.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub obj_path: PathBuf,
    pub shapes: Vec<Shape>,
}

/// Writes the vertex blocks of a `.physics.yml` file to `<path>.obj`.
pub fn import_physics(path: &Path) -> Result<ImportReport> {
    let text = fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))?;
    let shapes = physics_text::parse_shapes(&text)?;
    let obj_path = append_suffix(path, ".obj");
    fs::write(&obj_path, obj::write_obj(&shapes))
        .map_err(|err| ConvertError::io(&obj_path, err))?;
    info!(
        "wrote {} shape(s) from {} to {}",
        shapes.len(),
        path.display(),
        obj_path.display()
    );
    Ok(ImportReport { obj_path, shapes })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// Every mesh becomes a shape of a single rigid body.
    #[default]
    Simple,
    /// One rigid body per parent object, shapes taken from its proxies.
    Grouped,
}

/// Where exported geometry comes from.
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    /// Objects supplied by the authoring tool; vertices are transformed to world space.
    Scene(&'a [SceneObject]),
    /// OBJ point list written by an external exporter, already in target space.
    /// The file is removed once the export succeeds.
    MeshFile(&'a Path),
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub mode: ExportMode,
    pub marker: String,
    /// Replaces the built-in document skeleton.
    pub template: Option<PathBuf>,
    pub compiler: Compiler,
    pub renderer: Renderer,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::Simple,
            marker: DEFAULT_PROXY_MARKER.to_string(),
            template: None,
            compiler: Compiler::default(),
            renderer: Renderer::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportStage {
    #[default]
    Idle,
    Transformed,
    Rendered,
    Compiled,
    Cleaned,
    Failed(String),
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportStage::Idle => f.write_str("idle"),
            ExportStage::Transformed => f.write_str("transformed"),
            ExportStage::Rendered => f.write_str("rendered"),
            ExportStage::Compiled => f.write_str("compiled"),
            ExportStage::Cleaned => f.write_str("cleaned"),
            ExportStage::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Text file left on disk, if any.
    pub text_path: Option<PathBuf>,
    pub binary_path: Option<PathBuf>,
    pub body_count: usize,
    pub shape_count: usize,
}

/// True when `path` names a binary `.bphysics` target.
pub fn is_binary_target(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(BINARY_EXTENSION))
}

/// `foo.bphysics` -> `foo.physics.yml`.
pub fn intermediate_text_path(binary: &Path) -> PathBuf {
    let name = binary
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(BINARY_EXTENSION).unwrap_or(&name);
    binary.with_file_name(format!("{stem}{TEXT_EXTENSION}"))
}

/// Exports `source` to `output`, compiling it when `output` ends in `.bphysics`.
pub fn export(
    source: ExportSource<'_>,
    output: &Path,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let mut run = ExportRun::default();
    match run.execute(source, output, options) {
        Ok(report) => Ok(report),
        Err(err) => {
            run.advance(ExportStage::Failed(err.to_string()));
            Err(err)
        }
    }
}

#[derive(Debug, Default)]
struct ExportRun {
    stage: ExportStage,
}

impl ExportRun {
    fn advance(&mut self, next: ExportStage) {
        let previous = std::mem::replace(&mut self.stage, next);
        match &self.stage {
            ExportStage::Failed(reason) => warn!("export failed after stage {previous}: {reason}"),
            next => debug!("export stage {previous} -> {next}"),
        }
    }

    fn execute(
        &mut self,
        source: ExportSource<'_>,
        output: &Path,
        options: &ExportOptions,
    ) -> Result<ExportReport> {
        let document = build_document(source, options)?;
        self.advance(ExportStage::Transformed);

        let template = match &options.template {
            Some(path) => Template::from_file(path)?,
            None => Template::for_document(&document),
        };
        let text = options.renderer.render(&document, &template);

        let binary = is_binary_target(output);
        let text_path = if binary {
            intermediate_text_path(output)
        } else {
            output.to_path_buf()
        };
        fs::write(&text_path, text).map_err(|err| ConvertError::io(&text_path, err))?;
        info!("wrote {}", text_path.display());
        self.advance(ExportStage::Rendered);

        let mut report = ExportReport {
            text_path: Some(text_path.clone()),
            binary_path: None,
            body_count: match &document {
                PhysicsDocument::Simple(_) => 1,
                PhysicsDocument::Grouped(bodies) => bodies.len(),
            },
            shape_count: document.shape_count(),
        };

        if binary {
            options.compiler.compile(&text_path, output)?;
            report.text_path = None;
            report.binary_path = Some(output.to_path_buf());
            self.advance(ExportStage::Compiled);
        }

        if let ExportSource::MeshFile(mesh) = source {
            compiler::remove_best_effort(mesh);
        }
        self.advance(ExportStage::Cleaned);
        Ok(report)
    }
}

fn build_document(source: ExportSource<'_>, options: &ExportOptions) -> Result<PhysicsDocument> {
    let shapes = match source {
        ExportSource::Scene(objects) => aggregate::simple_shapes(objects),
        ExportSource::MeshFile(path) => {
            let text = fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))?;
            obj::read_obj(&text)?
        }
    };
    Ok(match options.mode {
        ExportMode::Simple => PhysicsDocument::Simple(shapes),
        ExportMode::Grouped => {
            PhysicsDocument::Grouped(aggregate::group_shapes(shapes, &options.marker)?)
        }
    })
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
