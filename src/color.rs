use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Dashboard palette
// ---------------------------------------------------------------------------

/// Navy: private sector, headings.
pub const PRIMARY: Color32 = Color32::from_rgb(0x2D, 0x40, 0x59);
/// Orange: public sector, highlights.
pub const SECONDARY: Color32 = Color32::from_rgb(0xF0, 0x7B, 0x3F);
/// Yellow: medians and focus marks.
pub const ACCENT: Color32 = Color32::from_rgb(0xFF, 0xD4, 0x60);
/// Red: warnings and the fit line.
pub const DANGER: Color32 = Color32::from_rgb(0xEA, 0x54, 0x55);
/// Green: favourable quadrant.
pub const SUCCESS: Color32 = Color32::from_rgb(0x28, 0xC7, 0x6F);

/// Colour of a sector in every chart.
pub fn sector_color(private: bool) -> Color32 {
    if private {
        PRIMARY
    } else {
        SECONDARY
    }
}

// ---------------------------------------------------------------------------
// Sequential gradients for ranking tables
// ---------------------------------------------------------------------------

/// Single-hue ramps, light for low values and dark for high ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gradient {
    Blues,
    Reds,
    Greens,
}

impl Gradient {
    fn hue(self) -> f32 {
        match self {
            Gradient::Blues => 210.0,
            Gradient::Reds => 0.0,
            Gradient::Greens => 130.0,
        }
    }

    /// Colour for `value` within `[min, max]`. `reversed` makes low values dark.
    pub fn color_for(self, value: f64, min: f64, max: f64, reversed: bool) -> Color32 {
        let span = max - min;
        let mut t = if value.is_finite() && span.is_finite() && span > 0.0 {
            ((value - min) / span).clamp(0.0, 1.0) as f32
        } else {
            0.5
        };
        if reversed {
            t = 1.0 - t;
        }
        let hsl = Hsl::new(self.hue(), 0.65, 0.92 - 0.5 * t);
        let rgb: Srgb = hsl.into_color();
        Color32::from_rgb(
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        )
    }
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lightness(c: Color32) -> u32 {
        let [r, g, b, _] = c.to_array();
        r as u32 + g as u32 + b as u32
    }

    #[test]
    fn higher_values_are_darker() {
        let low = Gradient::Blues.color_for(0.0, 0.0, 10.0, false);
        let high = Gradient::Blues.color_for(10.0, 0.0, 10.0, false);
        assert!(lightness(high) < lightness(low));
    }

    #[test]
    fn reversed_ramp_flips() {
        let low = Gradient::Greens.color_for(0.0, 0.0, 10.0, true);
        let high = Gradient::Greens.color_for(10.0, 0.0, 10.0, true);
        assert!(lightness(low) < lightness(high));
    }

    #[test]
    fn degenerate_span_uses_midpoint() {
        let flat = Gradient::Reds.color_for(3.0, 3.0, 3.0, false);
        let nan = Gradient::Reds.color_for(f64::NAN, 0.0, 10.0, false);
        assert_eq!(flat, nan);
    }

    #[test]
    fn text_contrasts_with_background() {
        assert_eq!(text_on(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_on(PRIMARY), Color32::WHITE);
    }
}
