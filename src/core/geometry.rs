use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

impl Circle {
    #[must_use]
    pub const fn new(cx: f64, cy: f64, r: f64) -> Self {
        Self { cx, cy, r }
    }

    /// Area-preserving radius for a weight: `sqrt(size / pi)`.
    #[must_use]
    pub fn radius_for_size(size: f64) -> f64 {
        if size.is_finite() && size > 0.0 {
            (size / std::f64::consts::PI).sqrt()
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.cx, self.cy)
    }

    #[must_use]
    pub fn area(self) -> f64 {
        std::f64::consts::PI * self.r * self.r
    }

    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        self.center().distance(point) <= self.r
    }

    /// Applies `offset` then uniform `scale`, then moves the result to `origin`.
    #[must_use]
    pub fn transformed(self, offset: Point, scale: f64, origin: Point) -> Self {
        Self {
            cx: origin.x + (self.cx + offset.x) * scale,
            cy: origin.y + (self.cy + offset.y) * scale,
            r: self.r * scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn area(self) -> f64 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.h
    }

    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Shrinks the rectangle by `margin` on every side, never below zero size.
    #[must_use]
    pub fn inset(self, margin: f64) -> Self {
        let margin = margin.max(0.0);
        let w = (self.w - 2.0 * margin).max(0.0);
        let h = (self.h - 2.0 * margin).max(0.0);
        Self {
            x: self.x + margin.min(self.w * 0.5),
            y: self.y + margin.min(self.h * 0.5),
            w,
            h,
        }
    }
}

/// Angular band of a sunburst; angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wedge {
    pub r_inner: f64,
    pub r_outer: f64,
    pub angle_start: f64,
    pub angle_delta: f64,
}

impl Wedge {
    #[must_use]
    pub const fn new(r_inner: f64, r_outer: f64, angle_start: f64, angle_delta: f64) -> Self {
        Self {
            r_inner,
            r_outer,
            angle_start,
            angle_delta,
        }
    }

    /// Tests a point given relative to the sunburst center.
    ///
    /// Angles grow clockwise in screen space starting at the positive x axis.
    #[must_use]
    pub fn contains_relative(self, dx: f64, dy: f64) -> bool {
        let radius = dx.hypot(dy);
        if radius < self.r_inner || radius > self.r_outer {
            return false;
        }
        if self.angle_delta >= 360.0 {
            return true;
        }
        let angle = dy.atan2(dx).to_degrees();
        let relative = (angle - self.angle_start).rem_euclid(360.0);
        relative <= self.angle_delta
    }
}

/// Placed geometry descriptor, tagged by the algorithm that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Circle(Circle),
    Rect(Rect),
    Wedge(Wedge),
    Point(Point),
}

impl Geometry {
    pub fn validate(self) -> LayoutResult<()> {
        let values = match self {
            Self::Circle(c) => vec![c.cx, c.cy, c.r],
            Self::Rect(r) => vec![r.x, r.y, r.w, r.h],
            Self::Wedge(w) => vec![w.r_inner, w.r_outer, w.angle_start, w.angle_delta],
            Self::Point(p) => vec![p.x, p.y],
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::InvalidData(
                "geometry coordinates must be finite".to_owned(),
            ));
        }
        let negative_extent = match self {
            Self::Circle(c) => c.r < 0.0,
            Self::Rect(r) => r.w < 0.0 || r.h < 0.0,
            Self::Wedge(w) => w.r_outer < w.r_inner || w.angle_delta < 0.0,
            Self::Point(_) => false,
        };
        if negative_extent {
            return Err(LayoutError::InvalidData(
                "geometry extent must be non-negative".to_owned(),
            ));
        }
        Ok(())
    }
}
