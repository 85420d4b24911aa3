//! Pure 2D math for item placement: affine transforms, bounding boxes, and
//! the anchor and step computations behind Align and Move.
//!
//! Nothing here touches pixels or items. Callers pass plain numbers in and
//! get plain numbers back, which keeps the render pipeline's geometry
//! branches trivially testable.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing transforms that went through trigonometry.
pub const EPSILON: f64 = 1e-9;

// ============================================================================
// Points and rectangles
// ============================================================================

/// A point in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test on all four edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grow (positive) or shrink (negative) the rectangle on every side.
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            (self.width + 2.0 * amount).max(0.0),
            (self.height + 2.0 * amount).max(0.0),
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// The eight resize handles: corners and edge midpoints, clockwise from
    /// the top-left corner.
    pub fn handles(&self) -> [Point; 8] {
        let c = self.center();
        [
            Point::new(self.x, self.y),
            Point::new(c.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), c.y),
            Point::new(self.right(), self.bottom()),
            Point::new(c.x, self.bottom()),
            Point::new(self.x, self.bottom()),
            Point::new(self.x, c.y),
        ]
    }

    /// Clip to a `width x height` pixel grid, returning the half-open pixel
    /// span `(x0, y0, x1, y1)`, or `None` when nothing overlaps.
    pub fn pixel_span(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.x.floor().max(0.0);
        let y0 = self.y.floor().max(0.0);
        let x1 = self.right().ceil().min(width as f64);
        let y1 = self.bottom().ceil().min(height as f64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Axis-aligned bounds of the four corners after `transform`.
    pub fn transformed_bounds(&self, transform: &Transform) -> Rect {
        let pts = self.corners().map(|p| transform.apply(p));
        let min_x = pts.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = pts.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

// ============================================================================
// Affine transform
// ============================================================================

/// 2D affine matrix in canvas order:
///
/// ```text
/// x' = a*x + c*y + e
/// y' = b*x + d*y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self { e: tx, f: ty, ..Self::IDENTITY }
    }

    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    /// Rotation by `degrees` about `pivot`: translate to the pivot, rotate,
    /// translate back.
    pub fn rotation_about(pivot: Point, degrees: f64) -> Self {
        Self::translation(pivot.x, pivot.y)
            .multiply(&Self::rotation(degrees.to_radians()))
            .multiply(&Self::translation(-pivot.x, -pivot.y))
    }

    /// `self * other`: `other` is applied to a point first.
    pub fn multiply(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Inverse transform, or `None` for a singular matrix.
    pub fn invert(&self) -> Option<Transform> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        Some(Transform {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    pub fn approx_eq(&self, other: &Transform, eps: f64) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
            && (self.e - other.e).abs() <= eps
            && (self.f - other.f).abs() <= eps
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, EPSILON)
    }
}

// ============================================================================
// Anchors and unit steps
// ============================================================================

/// The nine alignment targets on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Up,
    Down,
    Left,
    Right,
    UpRight,
    DownRight,
    DownLeft,
    UpLeft,
    Center,
}

impl Anchor {
    pub fn all() -> &'static [Anchor] {
        &[
            Anchor::Up,
            Anchor::Down,
            Anchor::Left,
            Anchor::Right,
            Anchor::UpRight,
            Anchor::DownRight,
            Anchor::DownLeft,
            Anchor::UpLeft,
            Anchor::Center,
        ]
    }

    /// Horizontal component: -1 left edge, 0 untouched, 1 right edge.
    /// `Center` is handled separately since it pins both axes.
    fn horizontal(self) -> i8 {
        match self {
            Anchor::Left | Anchor::UpLeft | Anchor::DownLeft => -1,
            Anchor::Right | Anchor::UpRight | Anchor::DownRight => 1,
            _ => 0,
        }
    }

    fn vertical(self) -> i8 {
        match self {
            Anchor::Up | Anchor::UpLeft | Anchor::UpRight => -1,
            Anchor::Down | Anchor::DownLeft | Anchor::DownRight => 1,
            _ => 0,
        }
    }
}

impl FromStr for Anchor {
    type Err = String;

    /// Accepts `snake_case`, `kebab-case` or compact names, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase();
        match key.as_str() {
            "up" | "top" => Ok(Anchor::Up),
            "down" | "bottom" => Ok(Anchor::Down),
            "left" => Ok(Anchor::Left),
            "right" => Ok(Anchor::Right),
            "upright" | "topright" => Ok(Anchor::UpRight),
            "downright" | "bottomright" => Ok(Anchor::DownRight),
            "downleft" | "bottomleft" => Ok(Anchor::DownLeft),
            "upleft" | "topleft" => Ok(Anchor::UpLeft),
            "center" | "centre" => Ok(Anchor::Center),
            _ => Err(format!("unknown anchor {s:?}")),
        }
    }
}

/// How an item's `(dx, dy)` relates to its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Images: the position is the top-left corner.
    TopLeft,
    /// Text: the position is the center.
    Center,
}

impl Origin {
    /// Bounding box of a `width x height` item positioned at `(dx, dy)`.
    pub fn bounds(self, dx: f64, dy: f64, width: f64, height: f64) -> Rect {
        match self {
            Origin::TopLeft => Rect::new(dx, dy, width, height),
            Origin::Center => Rect::centered(dx, dy, width, height),
        }
    }

    /// Visual center of the item, which is the rotation pivot.
    pub fn pivot(self, dx: f64, dy: f64, width: f64, height: f64) -> Point {
        match self {
            Origin::TopLeft => Point::new(dx + width / 2.0, dy + height / 2.0),
            Origin::Center => Point::new(dx, dy),
        }
    }
}

/// Position that places an item's box on `anchor` of a `surface_w x surface_h`
/// surface. Axes the anchor does not name keep their current value.
pub fn align_position(
    anchor: Anchor,
    origin: Origin,
    current: Point,
    size: (f64, f64),
    surface: (f64, f64),
) -> Point {
    let (w, h) = size;
    let (sw, sh) = surface;
    // Offset from the box's top-left to the item's origin.
    let (ox, oy) = match origin {
        Origin::TopLeft => (0.0, 0.0),
        Origin::Center => (w / 2.0, h / 2.0),
    };

    if anchor == Anchor::Center {
        return Point::new(sw / 2.0 - w / 2.0 + ox, sh / 2.0 - h / 2.0 + oy);
    }

    let x = match anchor.horizontal() {
        -1 => ox,
        1 => sw - w + ox,
        _ => current.x,
    };
    let y = match anchor.vertical() {
        -1 => oy,
        1 => sh - h + oy,
        _ => current.y,
    };
    Point::new(x, y)
}

/// Eight-way unit step used by Move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpRight,
    DownRight,
    DownLeft,
    UpLeft,
}

impl Direction {
    pub fn all() -> &'static [Direction] {
        &[
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
            Direction::UpRight,
            Direction::DownRight,
            Direction::DownLeft,
            Direction::UpLeft,
        ]
    }

    /// Unit delta in surface space (y grows downward).
    pub fn delta(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::UpRight => (1.0, -1.0),
            Direction::DownRight => (1.0, 1.0),
            Direction::DownLeft => (-1.0, 1.0),
            Direction::UpLeft => (-1.0, -1.0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownRight => Direction::UpLeft,
            Direction::DownLeft => Direction::UpRight,
            Direction::UpLeft => Direction::DownRight,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Anchor>()? {
            Anchor::Up => Ok(Direction::Up),
            Anchor::Down => Ok(Direction::Down),
            Anchor::Left => Ok(Direction::Left),
            Anchor::Right => Ok(Direction::Right),
            Anchor::UpRight => Ok(Direction::UpRight),
            Anchor::DownRight => Ok(Direction::DownRight),
            Anchor::DownLeft => Ok(Direction::DownLeft),
            Anchor::UpLeft => Ok(Direction::UpLeft),
            Anchor::Center => Err(format!("unknown direction {s:?}")),
        }
    }
}

// ============================================================================
// Resize arithmetic
// ============================================================================

/// New image size for a Resize value, applied as an absolute pixel delta
/// against the previous value. `0` restores the original size.
pub fn resized_dimensions(
    current: (f64, f64),
    original: (f64, f64),
    value: f64,
    previous: Option<f64>,
) -> (f64, f64) {
    if value == 0.0 {
        return original;
    }
    let (w, h) = current;
    match previous {
        Some(prev) if prev != 0.0 && prev > value => ((w - value).max(0.0), (h - value).max(0.0)),
        Some(prev) if prev != 0.0 && prev == value => (w, h),
        _ => (w + value, h + value),
    }
}

/// Rotation angle actually used to build the matrix: `0` and `360` both
/// become a full turn.
pub fn normalized_turn(degrees: f64) -> f64 {
    if degrees == 0.0 || degrees == 360.0 { 360.0 } else { degrees }
}
