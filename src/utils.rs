use anyhow::{anyhow, Result};
use std::path::Path;
use std::str::FromStr;

pub fn parse_number<T: FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow!("Invalid value '{}' for {}", value, name))
}

/// Returns the file name without its extension, e.g. `2007_000032` for
/// `VOC/JPEGImages/2007_000032.jpg`.
pub fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(String::from)
        .ok_or_else(|| anyhow!("Could not get file name of {}", path.display()))
}
