/// An sRGB color as used in rendered markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` literal
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// Parse from hex string like "#ff0000" or "ff0000"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self { r, g, b })
    }

    /// CSS hex notation, always lowercase with a leading `#`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_with_hash() {
        let color = Color::from_hex("#ff5500").unwrap();
        assert_eq!(color.r, 255);
        assert_eq!(color.g, 85);
        assert_eq!(color.b, 0);
    }

    #[test]
    fn from_hex_returns_none_for_invalid() {
        assert!(Color::from_hex("fff").is_none());
        assert!(Color::from_hex("gggggg").is_none());
    }

    #[test]
    fn from_u32_matches_hex() {
        assert_eq!(Color::from_u32(0x282828), Color::from_hex("#282828").unwrap());
    }

    #[test]
    fn to_hex_round_trips() {
        assert_eq!(Color::from_u32(0x0a1b2c).to_hex(), "#0a1b2c");
        assert_eq!(Color::from_hex(&Color::BLACK.to_hex()), Some(Color::BLACK));
    }
}
