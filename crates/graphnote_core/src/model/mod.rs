//! Domain model for areas, contents, links, frames and hierarchy levels.
//!
//! # Responsibility
//! - Define the passive records the graph engine projects.
//! - Provide constructors and validation for write paths.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Timestamps are Unix epoch milliseconds.
//! - Records carry no behavior beyond construction and validation; graph
//!   semantics live in `crate::graph`.

pub mod area;
pub mod content;
pub mod frame;
pub mod hierarchy;
pub mod link;
pub mod snapshot;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Cached 2D layout position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Validation failures raised by model write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Record id is the nil UUID.
    NilId,
    /// A link points from a content to itself.
    SelfLink,
    /// Display name or title is blank after trim.
    BlankName,
    /// Color is not a `#rrggbb` hex value.
    InvalidColor(String),
    /// Hierarchy depth is outside `0..MAX_HIERARCHY_LEVELS`.
    DepthOutOfRange(usize),
    /// Frame width/height is not a positive finite number.
    InvalidFrameSize,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "id must not be nil"),
            Self::SelfLink => write!(f, "link endpoints must differ"),
            Self::BlankName => write!(f, "name must not be blank"),
            Self::InvalidColor(value) => {
                write!(f, "color must be a #rrggbb hex value, got `{value}`")
            }
            Self::DepthOutOfRange(depth) => {
                write!(f, "hierarchy depth {depth} is outside the supported range")
            }
            Self::InvalidFrameSize => write!(f, "frame width and height must be positive"),
        }
    }
}

impl Error for ModelValidationError {}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Normalizes a user-supplied color to lowercase `#rrggbb`.
///
/// # Errors
/// - Returns `InvalidColor` when the trimmed value is not a 6-digit hex color.
pub fn normalize_color(value: &str) -> Result<String, ModelValidationError> {
    let trimmed = value.trim();
    if !HEX_COLOR_RE.is_match(trimmed) {
        return Err(ModelValidationError::InvalidColor(trimmed.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Trims a display name, rejecting blank input.
pub fn normalize_name(value: &str) -> Result<String, ModelValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_color, normalize_name, ModelValidationError};

    #[test]
    fn normalize_color_lowercases_valid_hex() {
        assert_eq!(normalize_color(" #A1B2C3 ").unwrap(), "#a1b2c3");
    }

    #[test]
    fn normalize_color_rejects_short_and_named_colors() {
        assert!(matches!(
            normalize_color("#abc"),
            Err(ModelValidationError::InvalidColor(_))
        ));
        assert!(normalize_color("red").is_err());
    }

    #[test]
    fn normalize_name_rejects_blank() {
        assert_eq!(normalize_name("   "), Err(ModelValidationError::BlankName));
        assert_eq!(normalize_name(" Research ").unwrap(), "Research");
    }
}
