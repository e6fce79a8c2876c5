// File: ./src/color_utils.rs

// Color name resolution for calendar colors.
// Project colors arrive as palette names ("berry_red"); CalDAV servers want "#RRGGBB".

use thiserror::Error;

/// Fallback used when a project color cannot be resolved.
pub const DEFAULT_CALENDAR_COLOR: &str = "#000000";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a known color name")]
pub struct UnknownColor(pub String);

// Task service palette. Looked up before the CSS names so that shared names
// ("red", "blue", ...) keep the shade the user picked in the service.
const PALETTE: &[(&str, &str)] = &[
    ("berry_red", "#b8256f"),
    ("red", "#db4035"),
    ("orange", "#ff9933"),
    ("yellow", "#fad000"),
    ("olive_green", "#afb83b"),
    ("lime_green", "#7ecc49"),
    ("green", "#299438"),
    ("mint_green", "#6accbc"),
    ("teal", "#158fad"),
    ("sky_blue", "#14aaf5"),
    ("light_blue", "#96c3eb"),
    ("blue", "#4073ff"),
    ("grape", "#884dff"),
    ("violet", "#af38eb"),
    ("lavender", "#eb96eb"),
    ("magenta", "#e05194"),
    ("salmon", "#ff8d85"),
    ("charcoal", "#808080"),
    ("grey", "#b8b8b8"),
    ("taupe", "#ccac93"),
];

const CSS_NAMES: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("silver", "#c0c0c0"),
    ("gray", "#808080"),
    ("maroon", "#800000"),
    ("purple", "#800080"),
    ("fuchsia", "#ff00ff"),
    ("lime", "#00ff00"),
    ("olive", "#808000"),
    ("navy", "#000080"),
    ("aqua", "#00ffff"),
    ("cyan", "#00ffff"),
    ("pink", "#ffc0cb"),
    ("brown", "#a52a2a"),
    ("gold", "#ffd700"),
    ("indigo", "#4b0082"),
];

/// Resolves a color name (or an already-hex value) to lowercase "#rrggbb".
pub fn name_to_hex(name: &str) -> Result<String, UnknownColor> {
    let key = name.trim().to_lowercase().replace([' ', '-'], "_");

    if let Some((r, g, b)) = parse_hex_to_u8(&key)
        && key.trim_start_matches('#').len() == 6
    {
        return Ok(format!("#{:02x}{:02x}{:02x}", r, g, b));
    }

    PALETTE
        .iter()
        .chain(CSS_NAMES)
        .find(|(n, _)| *n == key)
        .map(|(_, hex)| hex.to_string())
        .ok_or_else(|| UnknownColor(name.to_string()))
}

/// Parse a hex color string like "#RRGGBB" or "RRGGBB" into u8 tuple.
pub fn parse_hex_to_u8(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() < 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_names_resolve() {
        assert_eq!(name_to_hex("berry_red").unwrap(), "#b8256f");
        assert_eq!(name_to_hex("charcoal").unwrap(), "#808080");
        assert_eq!(name_to_hex("Sky Blue").unwrap(), "#14aaf5");
    }

    #[test]
    fn test_palette_wins_over_css() {
        assert_eq!(name_to_hex("red").unwrap(), "#db4035");
        assert_eq!(name_to_hex("navy").unwrap(), "#000080");
    }

    #[test]
    fn test_hex_passthrough() {
        assert_eq!(name_to_hex("#AABBCC").unwrap(), "#aabbcc");
        assert_eq!(name_to_hex("ff0000").unwrap(), "#ff0000");
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            name_to_hex("not_a_color"),
            Err(UnknownColor("not_a_color".to_string()))
        );
        assert!(name_to_hex("").is_err());
    }
}
