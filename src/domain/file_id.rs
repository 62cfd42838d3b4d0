use std::fmt;

pub const MIN_FILE_ID: i64 = 10_000;
pub const MAX_FILE_ID: i64 = 100_000_000;

/// Identifier of a downloadable file, bounded to the catalogue range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);

impl FileId {
    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for FileId {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if (MIN_FILE_ID..=MAX_FILE_ID).contains(&raw) {
            Ok(Self(raw as u32))
        } else {
            Err(format!(
                "Invalid file id: {}. Expected a value between {} and {}",
                raw, MIN_FILE_ID, MAX_FILE_ID
            ))
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
