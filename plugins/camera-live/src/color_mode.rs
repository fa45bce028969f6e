use std::fmt;

/// A selectable pixel format and the bit depth frames have in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMode {
    pub pixel_format: String,
    pub bits_depth: u8,
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bits)", self.pixel_format, self.bits_depth)
    }
}

/// Color modes offered when the module declares none
pub fn default_color_modes() -> Vec<ColorMode> {
    vec![ColorMode { pixel_format: "Mono8".to_string(), bits_depth: 8 }]
}

/// Parse a `format:bits` list such as `"Mono8:8,Mono12:12"`
pub fn parse_color_modes(list: &str) -> Result<Vec<ColorMode>, String> {
    let mut modes = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (format, bits) = entry
            .split_once(':')
            .ok_or_else(|| format!("color mode '{}' is not of the form format:bits", entry))?;
        let format = format.trim();
        if format.is_empty() {
            return Err(format!("color mode '{}' has no pixel format", entry));
        }
        let bits_depth = bits
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|b| (1..=16).contains(b))
            .ok_or_else(|| format!("color mode '{}' has an invalid bit depth", entry))?;
        modes.push(ColorMode { pixel_format: format.to_string(), bits_depth });
    }
    if modes.is_empty() {
        return Err("no color mode declared".to_string());
    }
    Ok(modes)
}

/// Find a mode by pixel format name or by position in the list
pub fn select_color_mode<'a>(modes: &'a [ColorMode], value: &str) -> Option<&'a ColorMode> {
    let value = value.trim();
    modes
        .iter()
        .find(|m| m.pixel_format == value)
        .or_else(|| value.parse::<usize>().ok().and_then(|i| modes.get(i)))
}
