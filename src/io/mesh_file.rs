//! Access to the datasets of an external tessellated-geometry file.
//!
//! Mesh universes never cache what they read: every query goes back to the
//! reader, so results always reflect the file as it is now.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{IoError, Result};
use crate::math::Point3;

/// Width in bytes of one string tag record.
pub const TAG_WIDTH: usize = 32;

/// Source of the three datasets the universe model reads from a mesh file.
///
/// Tag datasets are returned as raw fixed-width records, NUL padded.
pub trait MeshFileReader {
    /// Node coordinates of the tessellation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or dataset cannot be read.
    fn node_coordinates(&self, path: &Path) -> Result<Vec<Point3>>;

    /// Values of the `CATEGORY` tag (`Volume`, `Surface`, `Group`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the file or dataset cannot be read.
    fn category_tags(&self, path: &Path) -> Result<Vec<Vec<u8>>>;

    /// Values of the `NAME` tag (`mat:fuel`, `impl_complement`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the file or dataset cannot be read.
    fn name_tags(&self, path: &Path) -> Result<Vec<Vec<u8>>>;
}

/// Decodes one fixed-width tag record, dropping NUL padding.
///
/// # Errors
///
/// Returns an error if the record is not valid UTF-8.
pub fn decode_tag(path: &Path, record: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(record).map_err(|err| IoError::MeshFile {
        path: path.to_path_buf(),
        reason: format!("tag record is not valid UTF-8: {err}"),
    })?;
    Ok(text.replace('\0', ""))
}

/// Encodes `value` as a NUL-padded record of [`TAG_WIDTH`] bytes.
///
/// Longer values are kept whole rather than truncated.
#[must_use]
pub fn encode_tag(value: &str) -> Vec<u8> {
    let mut record = value.as_bytes().to_vec();
    if record.len() < TAG_WIDTH {
        record.resize(TAG_WIDTH, 0);
    }
    record
}

/// Datasets of one mesh file held in memory.
#[derive(Debug, Clone, Default)]
pub struct MeshFileContents {
    /// Node coordinates.
    pub coordinates: Vec<Point3>,
    /// Encoded `CATEGORY` tag records.
    pub categories: Vec<Vec<u8>>,
    /// Encoded `NAME` tag records.
    pub names: Vec<Vec<u8>>,
}

impl MeshFileContents {
    /// Creates contents with the given node coordinates and no tags.
    #[must_use]
    pub fn new(coordinates: Vec<Point3>) -> Self {
        Self {
            coordinates,
            ..Self::default()
        }
    }

    /// Appends an encoded `CATEGORY` record.
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.categories.push(encode_tag(category));
        self
    }

    /// Appends an encoded `NAME` record.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.names.push(encode_tag(name));
        self
    }
}

/// A [`MeshFileReader`] backed by in-memory contents keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryMeshReader {
    files: HashMap<PathBuf, MeshFileContents>,
}

impl MemoryMeshReader {
    /// Creates a reader with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) the contents of `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: MeshFileContents) {
        self.files.insert(path.into(), contents);
    }

    /// Drops the contents of `path`.
    pub fn remove(&mut self, path: &Path) -> Option<MeshFileContents> {
        self.files.remove(path)
    }

    fn contents(&self, path: &Path) -> Result<&MeshFileContents> {
        self.files.get(path).ok_or_else(|| {
            IoError::MeshFile {
                path: path.to_path_buf(),
                reason: "no such file".into(),
            }
            .into()
        })
    }
}

impl MeshFileReader for MemoryMeshReader {
    fn node_coordinates(&self, path: &Path) -> Result<Vec<Point3>> {
        Ok(self.contents(path)?.coordinates.clone())
    }

    fn category_tags(&self, path: &Path) -> Result<Vec<Vec<u8>>> {
        Ok(self.contents(path)?.categories.clone())
    }

    fn name_tags(&self, path: &Path) -> Result<Vec<Vec<u8>>> {
        Ok(self.contents(path)?.names.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_padding() {
        let record = encode_tag("mat:fuel");
        assert_eq!(record.len(), TAG_WIDTH);
        assert_eq!(decode_tag(Path::new("a.h5m"), &record).unwrap(), "mat:fuel");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(decode_tag(Path::new("a.h5m"), &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn missing_files_are_reported() {
        let reader = MemoryMeshReader::new();
        assert!(reader.node_coordinates(Path::new("missing.h5m")).is_err());
    }
}
