//! File discovery for MWR input directories
//!
//! Station software drops every file of a batch into one flat directory, so
//! discovery lists the regular files directly inside it (no recursion),
//! optionally filtered by a glob on the file name, in name order.

use crate::error::{MwrError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File discovery component for an input directory
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    input_dir: PathBuf,
    pattern: Option<Pattern>,
}

impl FileDiscovery {
    pub fn new(input_dir: PathBuf) -> Self {
        Self {
            input_dir,
            pattern: None,
        }
    }

    /// Only keep files whose name matches `pattern`
    pub fn with_pattern(mut self, pattern: Option<Pattern>) -> Self {
        self.pattern = pattern;
        self
    }

    /// List candidate files, sorted by file name
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(MwrError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }

        debug!("Searching for files in: {}", self.input_dir.display());

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let matches = match (&self.pattern, entry.file_name().to_str()) {
                (Some(pattern), Some(name)) => pattern.matches(name),
                (Some(_), None) => false,
                (None, _) => true,
            };
            if matches {
                files.push(entry.into_path());
            }
        }

        debug!("Found {} files", files.len());
        Ok(files)
    }
}

/// Every regular file directly inside `dir`, sorted by name
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    FileDiscovery::new(dir.to_path_buf()).discover()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_input_dir(temp_dir: &TempDir) -> PathBuf {
        let input = temp_dir.path().join("data");
        fs::create_dir_all(input.join("archive")).unwrap();

        fs::write(input.join("b_MP3000A_RAW_D.txt"), "x").unwrap();
        fs::write(input.join("a_MP3000A_CP_D.txt"), "x").unwrap();
        fs::write(input.join("c_MP3000A_STA_D.txt"), "x").unwrap();
        // nested files are not part of the batch
        fs::write(input.join("archive").join("old_RAW_D.txt"), "x").unwrap();

        input
    }

    #[test]
    fn test_discover_sorted_and_flat() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_input_dir(&temp_dir);

        let files = FileDiscovery::new(input).discover().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(
            names,
            vec!["a_MP3000A_CP_D.txt", "b_MP3000A_RAW_D.txt", "c_MP3000A_STA_D.txt"]
        );
    }

    #[test]
    fn test_discover_with_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_input_dir(&temp_dir);

        let files = FileDiscovery::new(input)
            .with_pattern(Some(Pattern::new("*_RAW_*").unwrap()))
            .discover()
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("b_MP3000A_RAW_D.txt"));
    }

    #[test]
    fn test_discover_files_ignores_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_input_dir(&temp_dir);

        let files = discover_files(&input).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| p.parent() == Some(input.as_path())));
    }

    #[test]
    fn test_discover_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let files = FileDiscovery::new(temp_dir.path().to_path_buf())
            .discover()
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileDiscovery::new(temp_dir.path().join("nope")).discover();
        assert!(matches!(result, Err(MwrError::InputNotFound { .. })));
    }
}
