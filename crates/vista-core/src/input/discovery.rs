//! File discovery for finding images in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::validate::Validator;

/// Discovers image files in directories.
pub struct FileDiscovery<'a> {
    validator: &'a Validator,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl<'a> FileDiscovery<'a> {
    /// Discovery filters by the validator's extension list.
    pub fn new(validator: &'a Validator) -> Self {
        Self { validator }
    }

    /// Discover all supported image files at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, recursively finds all supported files.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.validator.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.validator.is_supported(e.path()))
            .filter_map(|e| {
                let size = e.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: e.into_path(),
                    size,
                })
            })
            .collect();

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputConfig, LimitsConfig};

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"12345").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"123").unwrap();
        std::fs::write(dir.path().join("readme.md"), b"x").unwrap();
        std::fs::write(dir.path().join("nested/c.gif"), b"1").unwrap();
        // Sidecars sit next to images and must not be picked up
        std::fs::write(dir.path().join("a.jpg.detections.json"), b"[]").unwrap();

        let validator = Validator::new(InputConfig::default(), LimitsConfig::default());
        let files = FileDiscovery::new(&validator).discover(dir.path());

        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.gif"]);
        assert_eq!(FileDiscovery::total_size(&files), 9);
    }

    #[test]
    fn test_discover_single_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let validator = Validator::new(InputConfig::default(), LimitsConfig::default());
        assert!(FileDiscovery::new(&validator).discover(&path).is_empty());
    }
}
