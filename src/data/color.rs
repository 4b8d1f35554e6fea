//! Line colors: hex strings, a few named colors and the default palette.

use egui::Color32;

const PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

const NAMED: [(&str, Color32); 12] = [
    ("red", Color32::from_rgb(255, 0, 0)),
    ("green", Color32::from_rgb(0, 128, 0)),
    ("blue", Color32::from_rgb(0, 0, 255)),
    ("black", Color32::from_rgb(0, 0, 0)),
    ("white", Color32::from_rgb(255, 255, 255)),
    ("gray", Color32::from_rgb(128, 128, 128)),
    ("grey", Color32::from_rgb(128, 128, 128)),
    ("orange", Color32::from_rgb(255, 165, 0)),
    ("purple", Color32::from_rgb(128, 0, 128)),
    ("cyan", Color32::from_rgb(0, 255, 255)),
    ("magenta", Color32::from_rgb(255, 0, 255)),
    ("yellow", Color32::from_rgb(255, 255, 0)),
];

/// Distinct color for the n-th line of a chart.
pub fn alloc_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

/// Hex string for the n-th palette color.
pub fn alloc_color_hex(index: usize) -> String {
    to_hex(alloc_color(index))
}

/// `#rrggbb`, lowercase.
pub fn to_hex(c: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b())
}

/// Parse `#rrggbb`, `#rgb`, palette shorthands `C0`..`C9` or a basic color name.
pub fn parse_color(s: &str) -> Option<Color32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(idx) = s.strip_prefix('C').and_then(|d| d.parse::<usize>().ok()) {
        return Some(alloc_color(idx));
    }
    let lower = s.to_ascii_lowercase();
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, c)| *c)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 | 8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color32::from_rgb(r, g, b))
        }
        3 => {
            let mut v = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let d = c.to_digit(16)? as u8;
                v[i] = d * 17;
            }
            Some(Color32::from_rgb(v[0], v[1], v[2]))
        }
        _ => None,
    }
}
