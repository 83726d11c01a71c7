//! Batch scans producing sorted, de-duplicated value lists from game text dumps.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{ConvertError, Result};

/// Actor info dump scanned by [`dump_profiles`].
pub const PROFILE_SOURCE: &str = "ActorInfo.product.yml";
pub const PROFILE_OUTPUT: &str = "actorinfo_profiles.yml";
pub const MATERIAL_PAIRS_OUTPUT: &str = "confirmed_material_pairs.yml";

const PROFILE_KEY: &str = "profile: ";

/// Outcome of a batch scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupReport {
    pub output: PathBuf,
    pub count: usize,
}

/// Every distinct `profile: <value>` entry of `text`, sorted.
///
/// Values end at the first `,`, space or `}` so that flow mappings such as
/// `{name: Foo, profile: Enemy, ...}` yield just `Enemy`.
pub fn collect_profiles(text: &str) -> BTreeSet<String> {
    let mut profiles = BTreeSet::new();
    for line in text.lines() {
        let mut rest = line;
        while let Some(index) = rest.find(PROFILE_KEY) {
            rest = &rest[index + PROFILE_KEY.len()..];
            let end = rest
                .find(|c: char| c == ',' || c == ' ' || c == '}')
                .unwrap_or(rest.len());
            let value = rest[..end].trim();
            if !value.is_empty() {
                profiles.insert(format!("{PROFILE_KEY}{value}"));
            }
            rest = &rest[end..];
        }
    }
    profiles
}

pub fn render_profiles(profiles: &BTreeSet<String>) -> String {
    let mut output = profiles.iter().cloned().collect::<Vec<_>>().join("\n");
    output.push('\n');
    output
}

/// Reads `ActorInfo.product.yml` from `dir` and writes the distinct profiles
/// to `output`, or `../actorinfo_profiles.yml` relative to `dir`.
pub fn dump_profiles(dir: &Path, output: Option<&Path>) -> Result<DedupReport> {
    let source = dir.join(PROFILE_SOURCE);
    let text = fs::read_to_string(&source).map_err(|err| ConvertError::io(&source, err))?;
    let profiles = collect_profiles(&text);

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join("..").join(PROFILE_OUTPUT));
    fs::write(&output, render_profiles(&profiles)).map_err(|err| ConvertError::io(&output, err))?;
    info!("wrote {} profile(s) to {}", profiles.len(), output.display());
    Ok(DedupReport {
        output,
        count: profiles.len(),
    })
}

/// Material lines followed by the `sub_material` line that closes the pair.
pub type MaterialPair = Vec<String>;

/// Appends the pairs found in `text` to `pairs`.
///
/// Trimmed lines starting with `material:` accumulate; a `sub_material:`
/// line completes the pair. Lines are kept verbatim apart from trimming.
pub fn collect_material_pairs(text: &str, pairs: &mut BTreeSet<MaterialPair>) {
    let mut pair = MaterialPair::new();
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("material:") {
            pair.push(line.to_string());
        }
        if line.starts_with("sub_material:") {
            pair.push(line.to_string());
            pairs.insert(std::mem::take(&mut pair));
        }
    }
}

pub fn render_material_pairs(pairs: &BTreeSet<MaterialPair>) -> String {
    let mut output = format!("Confirmed material pair number: {}\n", pairs.len());
    for pair in pairs {
        output.push_str("\n\n");
        output.push_str(&pair.join("\n"));
    }
    output.push('\n');
    output
}

/// Scans every file in `dir` and writes the distinct material pairs to
/// `output`, or `../confirmed_material_pairs.yml` relative to `dir`.
pub fn dump_material_pairs(dir: &Path, output: Option<&Path>) -> Result<DedupReport> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir).map_err(|err| ConvertError::io(dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ConvertError::io(dir, err))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut pairs = BTreeSet::new();
    for path in &files {
        debug!("scanning {}", path.display());
        let text = fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))?;
        collect_material_pairs(&text, &mut pairs);
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join("..").join(MATERIAL_PAIRS_OUTPUT));
    fs::write(&output, render_material_pairs(&pairs))
        .map_err(|err| ConvertError::io(&output, err))?;
    info!(
        "wrote {} material pair(s) from {} file(s) to {}",
        pairs.len(),
        files.len(),
        output.display()
    );
    Ok(DedupReport {
        output,
        count: pairs.len(),
    })
}
