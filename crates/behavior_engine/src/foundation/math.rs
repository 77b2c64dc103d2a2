//! Math utilities and types
//!
//! Provides the vector type used for entity positions and the color type
//! used by materials and color-valued properties.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// RGB color with components in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component
    pub r: f32,

    /// Green component
    pub g: f32,

    /// Blue component
    pub b: f32,
}

impl Color {
    /// Create a color from float components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit components
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Parse a color from its string encoding
    ///
    /// Accepts `#RGB`, `#RRGGBB`, and a small set of CSS color names.
    /// Returns `None` when the string is not a recognized color.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        Self::parse_named(s)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        // Length is in bytes; slicing below needs every byte to be a digit
        // candidate, so multi-byte characters are rejected up front.
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                // Expand shorthand digits: #F00 means #FF0000.
                Some(Self::from_u8(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::from_u8(r, g, b))
            }
            _ => None,
        }
    }

    fn parse_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::rgb(0.0, 0.0, 0.0),
            "white" => Self::rgb(1.0, 1.0, 1.0),
            "red" => Self::rgb(1.0, 0.0, 0.0),
            "green" => Self::from_u8(0, 128, 0),
            "blue" => Self::rgb(0.0, 0.0, 1.0),
            "yellow" => Self::rgb(1.0, 1.0, 0.0),
            "cyan" => Self::rgb(0.0, 1.0, 1.0),
            "magenta" => Self::rgb(1.0, 0.0, 1.0),
            "gray" | "grey" => Self::from_u8(128, 128, 128),
            "orange" => Self::from_u8(255, 165, 0),
            _ => return None,
        };
        Some(color)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02X}{:02X}{:02X}",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b)
        )
    }
}
