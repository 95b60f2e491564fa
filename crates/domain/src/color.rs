//! Hex colour values (`#RGB` / `#RRGGBB`).

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Largest 24-bit RGB value.
pub const MAX_RGB: i64 = 0x00FF_FFFF;

/// A validated hex colour. Keeps the spelling it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
    /// Build the `#RRGGBB` colour for a 24-bit value.
    #[must_use]
    pub fn from_rgb(rgb: u32) -> Self {
        Self(format!("#{:06X}", rgb & 0x00FF_FFFF))
    }

    /// The 24-bit value, with `#RGB` expanded to `#RRGGBB`.
    #[must_use]
    pub fn rgb(&self) -> u32 {
        let digits = &self.0[1..];
        let expanded: String = if digits.len() == 3 {
            digits.chars().flat_map(|c| [c, c]).collect()
        } else {
            digits.to_string()
        };
        u32::from_str_radix(&expanded, 16).unwrap_or_default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self("#FFFFFF".to_string())
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s
            .strip_prefix('#')
            .is_some_and(|digits| {
                matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
            });
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidColor(s.to_string()))
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
