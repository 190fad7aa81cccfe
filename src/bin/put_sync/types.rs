use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Separator used in remote paths.
pub const PATH_SEPARATOR: char = '/';

/// Extension used to detect subtitle files.
const SUBTITLE_EXTENSION: &str = ".srt";

/// One remote file-system entry as reported by `rclone lsjson`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    /// Slash-separated path relative to the remote root.
    pub(crate) path: String,
    /// Display name.
    pub(crate) name: String,
    /// Size in bytes. Unknown sizes (reported as -1) are stored as 0.
    #[serde(deserialize_with = "deserialize_size")]
    pub(crate) size: u64,
    #[serde(default)]
    pub(crate) mime_type: String,
    #[serde(default)]
    pub(crate) is_dir: bool,
}

/// A single queued operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Copy a remote path into a local directory.
    Download { source: String, destination: PathBuf },
    /// Remove a remote path, recursively for directories.
    Delete { path: String, is_dir: bool },
}

impl Item {
    #[cfg(test)]
    pub(crate) fn file(path: &str, mime_type: &str, size: u64) -> Self {
        Self {
            path: path.to_string(),
            name: path.rsplit(PATH_SEPARATOR).next().unwrap_or(path).to_string(),
            size,
            mime_type: mime_type.to_string(),
            is_dir: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn dir(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: path.rsplit(PATH_SEPARATOR).next().unwrap_or(path).to_string(),
            size: 0,
            mime_type: "inode/directory".to_string(),
            is_dir: true,
        }
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        !self.is_dir && self.mime_type.starts_with("video/")
    }

    #[must_use]
    pub fn is_subtitle(&self) -> bool {
        !self.is_dir
            && self.mime_type.starts_with("text/")
            && self.name.to_lowercase().ends_with(SUBTITLE_EXTENSION)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download { source, destination } => {
                write!(f, "Download \"{source}\" -> \"{}\"", destination.display())
            }
            Self::Delete { path, is_dir: true } => write!(f, "Delete folder \"{path}\""),
            Self::Delete { path, is_dir: false } => write!(f, "Delete file \"{path}\""),
        }
    }
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let size = i64::deserialize(deserializer)?;
    Ok(u64::try_from(size).unwrap_or(0))
}
