use serde::{Deserialize, Serialize};

/// Fractional 2D quantity: velocities, subpixel remainders, sprite origins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Whole-pixel (or whole-cell) 2D coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// Axis-aligned integer rectangle. `w`/`h` are extents, so the
/// covered pixel span is `x..x+w` by `y..y+h` (exclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn translated(&self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            w: self.w,
            h: self.h,
        }
    }

    /// Strict overlap test. Empty rects intersect nothing, and two
    /// rects that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_do_not_count_as_overlap() {
        let left = Rect::new(0, 0, 4, 4);
        let adjacent = Rect::new(4, 0, 4, 4);
        assert!(!left.intersects(&adjacent));
        assert!(!adjacent.intersects(&left));
    }

    #[test]
    fn rect_overlap_is_symmetric() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(3, 3, 4, 4);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn empty_rect_never_intersects() {
        let empty = Rect::new(1, 1, 0, 5);
        let full = Rect::new(0, 0, 10, 10);
        assert!(!empty.intersects(&full));
        assert!(!full.intersects(&empty));
    }

    #[test]
    fn translated_moves_origin_only() {
        let rect = Rect::new(2, 3, 5, 7);
        let moved = rect.translated(Point::new(-2, 4));
        assert_eq!(moved, Rect::new(0, 7, 5, 7));
        assert_eq!(moved.w, rect.w);
        assert_eq!(moved.h, rect.h);
    }

    #[test]
    fn contains_rect_requires_full_enclosure() {
        let outer = Rect::new(0, 0, 10, 10);
        assert!(outer.contains_rect(&Rect::new(0, 0, 10, 10)));
        assert!(outer.contains_rect(&Rect::new(3, 3, 2, 2)));
        assert!(!outer.contains_rect(&Rect::new(8, 8, 4, 4)));
        assert!(!outer.contains_rect(&Rect::new(-1, 0, 4, 4)));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0, 0, 4, 4);
        assert!(rect.contains_point(Point::new(0, 0)));
        assert!(rect.contains_point(Point::new(3, 3)));
        assert!(!rect.contains_point(Point::new(4, 0)));
        assert!(!rect.contains_point(Point::new(0, 4)));
    }
}
