//! File pattern resolution using glob

use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

/// Resolve file patterns to existing files, sorted and deduplicated
///
/// A pattern naming an existing file is taken literally, so file names
/// containing glob metacharacters still resolve.
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let literal = PathBuf::from(pattern);
        if literal.is_file() {
            files.push(literal);
            continue;
        }

        let paths = glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;
        for path_result in paths {
            let path = path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!(
            "No files found matching the provided patterns: {}",
            patterns.join(", ")
        );
    }

    files.sort();
    files.dedup();

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pattern(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).display().to_string()
    }

    #[test]
    fn test_glob_sorted_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        for name in ["b.md", "a.md", "c.txt"] {
            fs::write(dir.path().join(name), "text").unwrap();
        }

        let files =
            resolve_patterns(&[pattern(&dir, "*.md"), pattern(&dir, "a.md")]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.md", "b.md"]);
    }

    #[test]
    fn test_literal_name_with_metacharacters() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("draft[1].md"), "text").unwrap();
        let files = resolve_patterns(&[pattern(&dir, "draft[1].md")]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_no_matches() {
        let dir = TempDir::new().unwrap();
        let err = resolve_patterns(&[pattern(&dir, "*.txt")]).unwrap_err();
        assert!(err.to_string().contains("No files found"));
    }

    #[test]
    fn test_directories_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub.md")).unwrap();
        assert!(resolve_patterns(&[pattern(&dir, "*.md")]).is_err());
    }
}
