use std::fmt;

use super::FileId;

/// Canonical backing-store key for a downloadable file.
///
/// Keys are derived only from the numeric file id rendered into a fixed
/// template, so no caller-supplied text ever reaches the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn for_file(file_id: FileId) -> Self {
        Self(format!("files/{}.zip", file_id.get()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
