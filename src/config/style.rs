//! Severity-to-style mapping for rendered records.
use crate::logging::Severity;
use serde::{Deserialize, Serialize};

/// How one severity class is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// A color name (`red`, `dark_grey`, ...) or `#rrggbb`.
    pub color: String,
    #[serde(default)]
    pub bold: bool,
}

impl Style {
    fn new(color: &str, bold: bool) -> Self {
        Self {
            color: color.to_string(),
            bold,
        }
    }
}

/// One style per severity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    pub debug: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub critical: Style,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            debug: Style::new("dark_grey", false),
            info: Style::new("white", false),
            warning: Style::new("#ff8c00", false),
            error: Style::new("red", false),
            critical: Style::new("red", true),
        }
    }
}

impl StyleSheet {
    pub fn for_severity(&self, severity: Severity) -> &Style {
        match severity {
            Severity::Debug => &self.debug,
            Severity::Info => &self.info,
            Severity::Warning => &self.warning,
            Severity::Error => &self.error,
            Severity::Critical => &self.critical,
        }
    }

    /// Checks every color is a known name or `#rrggbb`.
    pub fn validate(&self) -> Result<(), String> {
        for severity in Severity::ALL {
            let color = &self.for_severity(severity).color;
            if !is_known_color(color) {
                return Err(format!(
                    "unknown color '{}' for {} (use a color name or #rrggbb)",
                    color, severity
                ));
            }
        }
        Ok(())
    }
}

/// Color names a style may use, after lowercasing and mapping `-` and
/// spaces to `_`.
pub const COLOR_NAMES: &[&str] = &[
    "black",
    "red",
    "dark_red",
    "green",
    "dark_green",
    "yellow",
    "dark_yellow",
    "orange",
    "blue",
    "dark_blue",
    "magenta",
    "cyan",
    "white",
    "grey",
    "gray",
    "dark_grey",
    "dark_gray",
];

pub fn normalize_color_name(name: &str) -> String {
    name.to_lowercase().replace(['-', ' '], "_")
}

/// Parses `#rrggbb` into its channels.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn is_known_color(color: &str) -> bool {
    if color.starts_with('#') {
        return parse_hex(color).is_some();
    }
    COLOR_NAMES.contains(&normalize_color_name(color).as_str())
}
