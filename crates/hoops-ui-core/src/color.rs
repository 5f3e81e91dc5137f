//! CSS hex colors as used by viewer configurations.
//!
//! Configuration records carry colors as strings; services and managers work
//! with the parsed [`Rgb`] value, which serializes back to `#rrggbb`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB color. Defaults to black.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The string was not a CSS hex color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColor(pub String);

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color {:?}, expected #rrggbb or #rgb", self.0)
    }
}

impl std::error::Error for InvalidColor {}

impl FromStr for Rgb {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_css_color(s).ok_or_else(|| InvalidColor(s.to_string()))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a CSS hex color string (`#6366f1` or the short `#63f` form).
///
/// Returns `None` for anything else, including named colors.
pub fn parse_css_color(color: &str) -> Option<Rgb> {
    let hex = color.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        3 => {
            // #abc expands to #aabbcc
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Rgb::new(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

/// Check whether a string is an accepted CSS hex color.
pub fn is_css_color(color: &str) -> bool {
    parse_css_color(color).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        assert_eq!(parse_css_color("#6366f1"), Some(Rgb::new(0x63, 0x66, 0xf1)));
        assert_eq!(parse_css_color("#FFFFFF"), Some(Rgb::WHITE));
    }

    #[test]
    fn test_default_is_black() {
        assert_eq!(Rgb::default(), Rgb::BLACK);
        assert_eq!(Rgb::default().to_hex(), "#000000");
    }

    #[test]
    fn test_parse_short_form() {
        assert_eq!(parse_css_color("#f00"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_css_color("#000"), Some(Rgb::BLACK));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(parse_css_color("red"), None);
        assert_eq!(parse_css_color("#12345"), None);
        assert_eq!(parse_css_color("#gg0000"), None);
        assert_eq!(parse_css_color("ff0000"), None);
        assert_eq!(parse_css_color("#ff00é"), None);
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgb::new(0xaa, 0xbb, 0xcc)).unwrap();
        assert_eq!(json, "\"#aabbcc\"");

        let parsed: Rgb = serde_json::from_str("\"#ABC\"").unwrap();
        assert_eq!(parsed, Rgb::new(0xaa, 0xbb, 0xcc));

        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }

    #[test]
    fn test_from_str_error_names_input() {
        let err = "teal".parse::<Rgb>().unwrap_err();
        assert!(err.to_string().contains("teal"));
    }
}
