//! Color tokens and palettes

use egui::Color32;
use indexmap::IndexMap;

use crate::data::{Severity, ThreatLevel};
use crate::error::{ConfigError, ConfigResult};

/// Parse a `#rrggbb` or `#rrggbbaa` color token.
pub fn parse_color_token(token: &str) -> ConfigResult<Color32> {
    let hex = token
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| ConfigError::InvalidColor(token.to_string()))?;

    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return Err(ConfigError::InvalidColor(token.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConfigError::InvalidColor(token.to_string()))
    };

    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
}

/// Get a categorical color from the dashboard palette
pub fn categorical_color(index: usize) -> Color32 {
    const PALETTE: &[Color32] = &[
        Color32::from_rgb(59, 130, 246),  // Blue
        Color32::from_rgb(239, 68, 68),   // Red
        Color32::from_rgb(245, 158, 11),  // Amber
        Color32::from_rgb(16, 185, 129),  // Emerald
        Color32::from_rgb(139, 92, 246),  // Violet
        Color32::from_rgb(6, 182, 212),   // Cyan
        Color32::from_rgb(236, 72, 153),  // Pink
        Color32::from_rgb(132, 204, 22),  // Lime
    ];
    PALETTE[index % PALETTE.len()]
}

/// Same color with a different alpha
pub fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Lighten (positive) or darken (negative) a color by a percentage
pub fn adjust_brightness(color: Color32, percent: i32) -> Color32 {
    let scale = |c: u8| ((c as i32 * (100 + percent)) / 100).clamp(0, 255) as u8;
    Color32::from_rgba_unmultiplied(scale(color.r()), scale(color.g()), scale(color.b()), color.a())
}

pub fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Critical => Color32::from_rgb(244, 63, 94),
        Severity::High => Color32::from_rgb(249, 115, 22),
        Severity::Medium => Color32::from_rgb(234, 179, 8),
        Severity::Low => Color32::from_rgb(59, 130, 246),
    }
}

pub fn threat_level_color(level: ThreatLevel) -> Color32 {
    match level {
        ThreatLevel::Low => Color32::from_rgb(34, 197, 94),
        ThreatLevel::Moderate => Color32::from_rgb(59, 130, 246),
        ThreatLevel::Elevated => Color32::from_rgb(234, 179, 8),
        ThreatLevel::High => Color32::from_rgb(249, 115, 22),
        ThreatLevel::Critical => Color32::from_rgb(220, 38, 38),
    }
}

/// Resolved category → color mapping with palette fallback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorMap {
    colors: IndexMap<String, Color32>,
}

impl ColorMap {
    /// Resolve every token up front so a bad token fails at construction
    pub fn from_tokens<'a, I>(tokens: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let colors = tokens
            .into_iter()
            .map(|(category, token)| Ok((category.clone(), parse_color_token(token)?)))
            .collect::<ConfigResult<IndexMap<_, _>>>()?;
        Ok(Self { colors })
    }

    pub fn insert(&mut self, category: impl Into<String>, color: Color32) {
        self.colors.insert(category.into(), color);
    }

    /// Color for `category`, falling back to the palette entry at `index`
    pub fn resolve(&self, category: &str, index: usize) -> Color32 {
        self.colors
            .get(category)
            .copied()
            .unwrap_or_else(|| categorical_color(index))
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
