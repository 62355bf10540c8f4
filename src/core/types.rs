use serde::{Deserialize, Serialize};

use crate::core::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[must_use]
    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Center of the viewport and the radius of the largest centered circle.
    #[must_use]
    pub fn inscribed_circle(self) -> (f64, f64, f64) {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        (w * 0.5, h * 0.5, w.min(h) * 0.5)
    }
}
