//! Run directory naming.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp pattern leading every run directory name.
pub const RUN_DIR_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Number of random bytes in the name suffix (two hex characters each).
const SUFFIX_BYTES: usize = 3;

/// A created run directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDirectory {
    /// Directory name, `<timestamp>_<suffix>`.
    pub name: String,
    /// Full path on disk.
    pub path: PathBuf,
}

/// Build a run directory name from a timestamp and suffix.
pub fn run_dir_name(created_at: DateTime<Utc>, suffix: &str) -> String {
    format!("{}_{suffix}", created_at.format(RUN_DIR_TIMESTAMP_FORMAT))
}

/// Six lowercase hex characters.
pub fn random_suffix() -> String {
    hex::encode(rand::random::<[u8; SUFFIX_BYTES]>())
}

/// Read the creation time back out of a directory name.
///
/// Only the token before the first `_` is considered. Names that do not start
/// with a timestamp return `None`.
pub fn parse_run_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let token = name.split('_').next()?;
    NaiveDateTime::parse_from_str(token, RUN_DIR_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
