use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn validate(self) -> LayoutResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(LayoutError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Equal-weight channel average. Returns `None` for an empty input.
    #[must_use]
    pub fn average(colors: &[Color]) -> Option<Self> {
        if colors.is_empty() {
            return None;
        }
        let n = colors.len() as f64;
        let mut sum = Self::rgba(0.0, 0.0, 0.0, 0.0);
        for color in colors {
            sum.red += color.red;
            sum.green += color.green;
            sum.blue += color.blue;
            sum.alpha += color.alpha;
        }
        Some(Self::rgba(sum.red / n, sum.green / n, sum.blue / n, sum.alpha / n))
    }
}

/// Palette lookup provided by the host.
///
/// Palette interpolation lives outside the layout engine; nodes only ask for
/// a categorical entry by bucket id or a single fallback color.
pub trait ColorPalette {
    fn categorical(&self, bucket: u32) -> Color;

    fn fallback(&self) -> Color;
}

/// Small built-in categorical palette for headless use and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultPalette {
    pub entries: Vec<Color>,
    pub fallback: Color,
}

impl Default for DefaultPalette {
    fn default() -> Self {
        Self {
            entries: vec![
                Color::rgb(0.122, 0.467, 0.706),
                Color::rgb(1.0, 0.498, 0.055),
                Color::rgb(0.173, 0.627, 0.173),
                Color::rgb(0.839, 0.153, 0.157),
                Color::rgb(0.580, 0.404, 0.741),
                Color::rgb(0.549, 0.337, 0.294),
                Color::rgb(0.890, 0.467, 0.761),
                Color::rgb(0.498, 0.498, 0.498),
            ],
            fallback: Color::rgb(0.6, 0.6, 0.6),
        }
    }
}

impl ColorPalette for DefaultPalette {
    fn categorical(&self, bucket: u32) -> Color {
        if self.entries.is_empty() {
            return self.fallback;
        }
        self.entries[bucket as usize % self.entries.len()]
    }

    fn fallback(&self) -> Color {
        self.fallback
    }
}
