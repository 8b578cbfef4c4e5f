use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::Color32;

/// Deterministic pseudo-random pair in [-1, 1] derived from an id, so a node
/// without a saved position always lands on the same starting spot.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Parses `#rgb` or `#rrggbb` hex colors. Anything else returns `None` and the
/// caller falls through to the next color in its resolution chain.
pub fn parse_hex_color(raw: &str) -> Option<Color32> {
    let hex = raw.trim().strip_prefix('#')?;

    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (slot, ch) in channels.iter_mut().zip(hex.chars()) {
                let value = ch.to_digit(16)? as u8;
                *slot = (value << 4) | value;
            }
            Some(Color32::from_rgb(channels[0], channels[1], channels[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color32::from_rgb(r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x1, y1) = stable_pair("aria-the-wanderer");
        let (x2, y2) = stable_pair("aria-the-wanderer");
        assert_eq!((x1, y1), (x2, y2));
        assert!((-1.0..=1.0).contains(&x1));
        assert!((-1.0..=1.0).contains(&y1));
    }

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(
            parse_hex_color("#8b5cf6"),
            Some(Color32::from_rgb(0x8b, 0x5c, 0xf6))
        );
        assert_eq!(parse_hex_color("#f80"), Some(Color32::from_rgb(255, 136, 0)));
        assert_eq!(parse_hex_color("8b5cf6"), None);
        assert_eq!(parse_hex_color("#nope"), None);
    }
}
