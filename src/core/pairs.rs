//! Whitespace-delimited pair files (`cwl_dirs.txt`, `yml_dirs.txt`).
//!
//! Each non-blank, non-comment line holds exactly two entries, typically a
//! namespace and a directory.

use super::error::EmitError;
use super::paths;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Bundled pair files installed into `<home>/wic/` on first use.
pub const BUNDLED_DIRS_FILES: [(&str, &str); 2] = [
    ("cwl_dirs.txt", include_str!("cwl_dirs.txt")),
    ("yml_dirs.txt", include_str!("yml_dirs.txt")),
];

/// Read a pair file from disk.
pub fn read_lines_pairs(path: &Path) -> Result<Vec<(String, String)>, EmitError> {
    let content = std::fs::read_to_string(path).map_err(EmitError::io(path))?;
    parse_lines_pairs(&content, path)
}

/// Parse pair-file content. `origin` is only used in error messages.
pub fn parse_lines_pairs(content: &str, origin: &Path) -> Result<Vec<(String, String)>, EmitError> {
    let mut pairs = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [first, second] => pairs.push((first.to_string(), second.to_string())),
            _ => {
                error!(path = %origin.display(), line, "line must contain exactly two entries");
                return Err(EmitError::MalformedPairLine {
                    path: origin.to_path_buf(),
                    line_no: idx + 1,
                    line: line.to_string(),
                });
            }
        }
    }
    Ok(pairs)
}

/// Rewrite a pair file so the second entry of every line is absolute.
pub fn write_absolute_dirs_file(path: &Path) -> Result<(), EmitError> {
    let pairs = read_lines_pairs(path)?;
    let mut lines = Vec::with_capacity(pairs.len());
    for (ns, dir) in pairs {
        lines.push(format!("{ns} {}", paths::absolute_string(&dir)?));
    }
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content).map_err(EmitError::io(path))
}

/// Install the bundled pair files into `<homedir>/wic/`.
///
/// Existing files are kept; only their paths are made absolute. Returns the
/// files that were newly created.
pub fn install_default_files(homedir: &Path) -> Result<Vec<PathBuf>, EmitError> {
    let wic_dir = homedir.join("wic");
    std::fs::create_dir_all(&wic_dir).map_err(EmitError::io(&wic_dir))?;

    let mut created = Vec::new();
    for (name, content) in BUNDLED_DIRS_FILES {
        let target = wic_dir.join(name);
        if target.exists() {
            continue;
        }
        std::fs::write(&target, content).map_err(EmitError::io(&target))?;
        info!(path = %target.display(), "wrote default file; check that the paths in it are correct");
        created.push(target);
    }

    for (name, _) in BUNDLED_DIRS_FILES {
        write_absolute_dirs_file(&wic_dir.join(name))?;
    }
    Ok(created)
}
