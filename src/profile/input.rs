//! Coordinate input for the interactive viewer.

use std::io;
use std::io::{BufRead, Write};
use thiserror::Error;

pub const DEFAULT_LATITUDE: f64 = 37.25;
pub const DEFAULT_LONGITUDE: f64 = 126.5;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("'{0}' is not a valid coordinate")]
    InvalidCoordinate(String),
}

/// Parses a decimal degree value. Surrounding whitespace is ignored;
/// empty input, non-numbers and non-finite values are rejected.
pub fn parse_coordinate(input: &str) -> Result<f64, InputError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::InvalidCoordinate(trimmed.to_string())),
    }
}

/// The parsed value of `input`, or `default` when it is absent or does not
/// parse.
///
/// ```
/// use gfs_profile::{coordinate_or_default, DEFAULT_LATITUDE};
///
/// assert_eq!(coordinate_or_default(Some("38.5"), DEFAULT_LATITUDE), 38.5);
/// assert_eq!(coordinate_or_default(Some("north"), DEFAULT_LATITUDE), 37.25);
/// assert_eq!(coordinate_or_default(None, DEFAULT_LATITUDE), 37.25);
/// ```
pub fn coordinate_or_default(input: Option<&str>, default: f64) -> f64 {
    input
        .and_then(|raw| parse_coordinate(raw).ok())
        .unwrap_or(default)
}

/// Writes `prompt`, then reads one line. `Ok(None)` on end of input.
pub fn prompt_line<R, W>(reader: &mut R, writer: &mut W, prompt: &str) -> io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(writer, "{}", prompt)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
