//! Search-path resolution.
//!
//! Paths are made absolute against the current working directory. Nothing
//! else is normalized: symlinks are not followed, `..` is kept, and the
//! path does not have to exist.

use super::error::EmitError;
use super::types::SearchPaths;
use std::path::{Path, PathBuf};

/// Make a single path absolute. The empty path means the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf, EmitError> {
    if path.as_os_str().is_empty() {
        return std::env::current_dir().map_err(EmitError::io(path));
    }
    std::path::absolute(path).map_err(EmitError::io(path))
}

/// Make a single path string absolute.
pub fn absolute_string(path: &str) -> Result<String, EmitError> {
    Ok(absolute(Path::new(path))?.to_string_lossy().into_owned())
}

/// Return a copy of `search_paths` with every path absolute.
pub fn absolute_paths(search_paths: &SearchPaths) -> Result<SearchPaths, EmitError> {
    let mut resolved = search_paths.clone();
    for paths in resolved.values_mut() {
        for path in paths.iter_mut() {
            *path = absolute_string(path)?;
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn search_paths(entries: &[(&str, &[&str])]) -> SearchPaths {
        entries
            .iter()
            .map(|(ns, paths)| {
                (
                    ns.to_string(),
                    paths.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_paths_relative_made_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let input = search_paths(&[("global", &["adapters", "/opt/tools"])]);
        let out = absolute_paths(&input).unwrap();
        assert_eq!(
            out["global"],
            vec![
                cwd.join("adapters").to_string_lossy().into_owned(),
                "/opt/tools".to_string()
            ]
        );
    }

    #[test]
    fn test_paths_input_not_mutated() {
        let input = search_paths(&[("global", &["rel"])]);
        let before = input.clone();
        let _ = absolute_paths(&input).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_paths_preserves_namespace_order() {
        let input = search_paths(&[("zeta", &["z"]), ("alpha", &["a"]), ("mid", &[])]);
        let out = absolute_paths(&input).unwrap();
        let keys: Vec<_> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert!(out["mid"].is_empty());
    }

    #[test]
    fn test_paths_dotdot_kept() {
        let out = absolute_string("../sibling").unwrap();
        assert!(out.ends_with("../sibling"));
        assert!(Path::new(&out).is_absolute());
    }

    #[test]
    fn test_paths_empty_string_is_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let input = search_paths(&[("global", &[""])]);
        let out = absolute_paths(&input).unwrap();
        assert_eq!(out["global"], vec![cwd.to_string_lossy().into_owned()]);
    }

    proptest! {
        #[test]
        fn prop_paths_always_absolute_and_idempotent(
            segments in proptest::collection::vec("[a-z0-9]{1,8}", 1..4),
            leading_slash in any::<bool>(),
        ) {
            let joined = segments.join("/");
            let raw = if leading_slash { format!("/{joined}") } else { joined.clone() };
            let input = search_paths(&[("ns", &[raw.as_str()])]);

            let once = absolute_paths(&input).unwrap();
            prop_assert!(Path::new(&once["ns"][0]).is_absolute());
            prop_assert!(once["ns"][0].ends_with(&joined));

            let twice = absolute_paths(&once).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
