//! # Filesystem Probe
//!
//! Existence and classification checks sit behind a trait so evaluation code
//! can run against stub filesystems in tests and richer host metadata in
//! embedders. The default implementation answers from `std::fs` plus path
//! shape.

use std::path::Path;

/// Kind of drive a path resides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveKind {
    /// A local fixed disk (`C:\...`).
    Fixed,
    /// A network location (UNC path or mapped remote drive).
    Network,
    /// Recognized as a drive, but neither fixed nor network (optical,
    /// removable, RAM disk).
    Other,
}

/// Synchronous filesystem questions the evaluation core asks.
///
/// All calls are blocking with no timeout semantics; callers treat them as
/// potentially slow.
pub trait FileSystemProbe {
    /// True when the path exists, whatever it is.
    fn path_exists(&self, path: &str) -> bool;

    /// True when the path exists and is a regular file.
    fn is_file(&self, path: &str) -> bool;

    /// True when the path exists and is a directory.
    fn is_directory(&self, path: &str) -> bool;

    /// The kind of drive the path resides on, when one can be determined.
    fn drive_kind(&self, path: &str) -> Option<DriveKind>;
}

/// Probe answering from the local filesystem.
///
/// Drive classification is derived from path shape alone: UNC prefixes map
/// to [`DriveKind::Network`], drive-letter prefixes to [`DriveKind::Fixed`].
/// Hosts with access to real OS drive-type queries should supply their own
/// [`FileSystemProbe`] when that distinction matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystemProbe for LocalFileSystem {
    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn is_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn is_directory(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn drive_kind(&self, path: &str) -> Option<DriveKind> {
        if path.starts_with(r"\\") || path.starts_with("//") {
            return Some(DriveKind::Network);
        }
        let mut chars = path.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => Some(DriveKind::Fixed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_drive_kind_from_path_shape() {
        let fs = LocalFileSystem;
        assert_eq!(fs.drive_kind(r"C:\Windows\notepad.exe"), Some(DriveKind::Fixed));
        assert_eq!(fs.drive_kind("d:"), Some(DriveKind::Fixed));
        assert_eq!(fs.drive_kind(r"\\server\share\file.dat"), Some(DriveKind::Network));
        assert_eq!(fs.drive_kind("//server/share"), Some(DriveKind::Network));
        assert_eq!(fs.drive_kind("relative/path.txt"), None);
        assert_eq!(fs.drive_kind("/tmp/file.txt"), None);
        assert_eq!(fs.drive_kind(""), None);
    }

    #[test]
    fn test_local_filesystem_answers() {
        let probe = LocalFileSystem;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("probe.txt");
        fs::write(&file_path, "contents").unwrap();

        let dir_str = dir.path().to_string_lossy().to_string();
        let file_str = file_path.to_string_lossy().to_string();
        let missing = dir.path().join("missing.txt").to_string_lossy().to_string();

        assert!(probe.path_exists(&dir_str));
        assert!(probe.path_exists(&file_str));
        assert!(!probe.path_exists(&missing));

        assert!(probe.is_file(&file_str));
        assert!(!probe.is_file(&dir_str));

        assert!(probe.is_directory(&dir_str));
        assert!(!probe.is_directory(&file_str));
    }
}
