//! Shareable single-line level codes.
//!
//! A code carries a room definition as `dungeon:v1:<cols>x<rows>:<payload>`,
//! where the payload is base64-wrapped JSON. The payload embeds a SHA-256
//! checksum over the level content so edited codes are rejected instead of
//! loading a corrupted room.

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use dungeon_crawl_core::LevelDefinition;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const CODE_DOMAIN: &str = "dungeon";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub const CODE_HEADER: &str = "dungeon:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLevel {
    room: String,
    kill_quota: u32,
    rows: Vec<String>,
    checksum: String,
}

/// Encodes a level into a single-line string suitable for clipboard transfer.
#[must_use]
pub fn encode(level: &LevelDefinition) -> String {
    let payload = SerializableLevel {
        room: level.room.clone(),
        kill_quota: level.kill_quota,
        rows: level.rows.clone(),
        checksum: checksum(level),
    };
    let json = serde_json::to_vec(&payload).expect("level serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    let columns = level.rows.iter().map(String::len).max().unwrap_or(0);
    format!(
        "{CODE_HEADER}:{columns}x{}:{encoded}",
        level.rows.len()
    )
}

/// Decodes a level from the provided string representation.
///
/// # Errors
///
/// Returns a [`LevelCodeError`] when any segment is missing or malformed, or
/// when the embedded checksum does not match the decoded content.
pub fn decode(value: &str) -> Result<LevelDefinition, LevelCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelCodeError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelCodeError::MissingPrefix)?;
    let version = parts.next().ok_or(LevelCodeError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LevelCodeError::MissingDimensions)?;
    let payload = parts.next().ok_or(LevelCodeError::MissingPayload)?;

    if domain != CODE_DOMAIN {
        return Err(LevelCodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelCodeError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelCodeError::InvalidEncoding)?;
    let decoded: SerializableLevel =
        serde_json::from_slice(&bytes).map_err(LevelCodeError::InvalidPayload)?;

    let level = LevelDefinition {
        room: decoded.room,
        kill_quota: decoded.kill_quota,
        rows: decoded.rows,
    };

    let actual_columns = level.rows.iter().map(String::len).max().unwrap_or(0);
    if actual_columns != columns as usize || level.rows.len() != rows as usize {
        return Err(LevelCodeError::DimensionMismatch {
            declared: (columns, rows),
            actual: (actual_columns as u32, level.rows.len() as u32),
        });
    }

    let expected = checksum(&level);
    if decoded.checksum != expected {
        return Err(LevelCodeError::ChecksumMismatch);
    }

    Ok(level)
}

/// Hex SHA-256 digest over the room name, kill quota and row text.
fn checksum(level: &LevelDefinition) -> String {
    let mut hasher = Sha256::new();
    hasher.update(level.room.as_bytes());
    hasher.update(level.kill_quota.to_le_bytes());
    for row in &level.rows {
        hasher.update(row.as_bytes());
        hasher.update([b'\n']);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Errors that can occur while decoding level codes.
#[derive(Debug)]
pub enum LevelCodeError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded level.
    MissingPrefix,
    /// The encoded level did not contain a version segment.
    MissingVersion,
    /// The encoded level did not include grid dimensions.
    MissingDimensions,
    /// The encoded level did not include the payload segment.
    MissingPayload,
    /// The encoded level used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded level.
    InvalidDimensions(String),
    /// The declared dimensions disagree with the decoded rows.
    DimensionMismatch {
        /// Columns and rows named in the dimension segment.
        declared: (u32, u32),
        /// Columns and rows measured from the decoded content.
        actual: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The embedded checksum does not match the decoded content.
    ChecksumMismatch,
}

impl fmt::Display for LevelCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "level code was empty"),
            Self::MissingPrefix => write!(f, "level code is missing the prefix"),
            Self::MissingVersion => write!(f, "level code is missing the version"),
            Self::MissingDimensions => write!(f, "level code is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "level code is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "level prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "level version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::DimensionMismatch { declared, actual } => write!(
                f,
                "level code declares {}x{} but contains {}x{}",
                declared.0, declared.1, actual.0, actual.1
            ),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode level payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse level payload: {error}")
            }
            Self::ChecksumMismatch => {
                write!(f, "level checksum does not match the decoded content")
            }
        }
    }
}

impl Error for LevelCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LevelCodeError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LevelCodeError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelCodeError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelCodeError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LevelCodeError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}
