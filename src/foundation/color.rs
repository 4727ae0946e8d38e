use serde::{Deserialize, Serialize};

use crate::foundation::error::{SafezoneError, SafezoneResult};

/// An opaque sRGB color parsed from `#RRGGBB` (or the `#RGB` shorthand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse(s: &str) -> SafezoneResult<Self> {
        parse_hex(s).map_err(SafezoneError::validation)
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for HexColor {
    type Err = SafezoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> Result<HexColor, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err("hex color must be #RRGGBB or #RGB".to_owned());
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    match s.len() {
        6 => Ok(HexColor::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        3 => {
            let nibble = |i: usize| hex_byte(&s[i..i + 1]).map(|v| v * 17);
            Ok(HexColor::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        _ => Err("hex color must be #RRGGBB or #RGB".to_owned()),
    }
}

/// Color and opacity of the mask overlay.
///
/// Set live from user input; every change triggers a full recomposite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskStyle {
    pub color: HexColor,
    pub opacity: f64,
}

impl Default for MaskStyle {
    fn default() -> Self {
        Self {
            color: HexColor::rgb(0xFF, 0x00, 0x00),
            opacity: 0.4,
        }
    }
}

impl MaskStyle {
    pub fn new(color: HexColor, opacity: f64) -> SafezoneResult<Self> {
        Ok(Self {
            color,
            opacity: check_opacity(opacity)?,
        })
    }

    /// Parse a `#RRGGBB` color string together with an opacity in `[0, 1]`.
    pub fn parse(color: &str, opacity: f64) -> SafezoneResult<Self> {
        Self::new(HexColor::parse(color)?, opacity)
    }

    pub fn validate(&self) -> SafezoneResult<()> {
        check_opacity(self.opacity).map(|_| ())
    }

    /// Straight-alpha RGBA8 used for the single mask fill.
    pub fn fill_rgba8(&self) -> [u8; 4] {
        let a = (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.color.r, self.color.g, self.color.b, a]
    }

    /// CSS `rgba(r, g, b, opacity)` for host UIs that draw the mask themselves.
    pub fn css_rgba(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.color.r, self.color.g, self.color.b, self.opacity
        )
    }
}

fn check_opacity(opacity: f64) -> SafezoneResult<f64> {
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(SafezoneError::validation(format!(
            "mask opacity must be within [0, 1] (got {opacity})"
        )));
    }
    Ok(opacity)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
