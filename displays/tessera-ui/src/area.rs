//! Screen areas
//!
//! Areas use inclusive corner coordinates, the same convention the flush
//! callback reports to the panel.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Inclusive rectangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    /// Create an area from inclusive corners
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create an area from a top-left corner and a size
    ///
    /// A zero-sized area comes out with `x2 < x1` (or `y2 < y1`) and
    /// reports itself as empty.
    pub const fn from_origin(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width as i32 - 1,
            y2: y + height as i32 - 1,
        }
    }

    /// Width in pixels (`x2 - x1 + 1`), zero for empty areas
    pub const fn width(&self) -> u32 {
        if self.x2 < self.x1 {
            0
        } else {
            (self.x2 - self.x1 + 1) as u32
        }
    }

    /// Height in pixels (`y2 - y1 + 1`), zero for empty areas
    pub const fn height(&self) -> u32 {
        if self.y2 < self.y1 {
            0
        } else {
            (self.y2 - self.y1 + 1) as u32
        }
    }

    /// Number of pixels covered
    pub const fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    /// Check if a point lies inside the area
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    /// Check if `other` lies completely inside this area
    pub const fn covers(&self, other: &Area) -> bool {
        other.x1 >= self.x1 && other.x2 <= self.x2 && other.y1 >= self.y1 && other.y2 <= self.y2
    }

    /// Overlapping part of two areas, if any
    pub fn intersection(&self, other: &Area) -> Option<Area> {
        let area = Area {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        if area.is_empty() {
            None
        } else {
            Some(area)
        }
    }

    /// Smallest area containing both
    pub fn union(&self, other: &Area) -> Area {
        Area {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Top-left corner
    pub const fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Convert to an `embedded-graphics` rectangle
    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::new(self.top_left(), Size::new(self.width(), self.height()))
    }

    /// Convert from an `embedded-graphics` rectangle
    pub fn from_rectangle(rect: &Rectangle) -> Self {
        Self::from_origin(
            rect.top_left.x,
            rect.top_left.y,
            rect.size.width,
            rect.size.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_size() {
        let area = Area::new(10, 20, 10, 20);
        assert_eq!(area.width(), 1);
        assert_eq!(area.height(), 1);

        let area = Area::new(0, 0, 799, 119);
        assert_eq!(area.width(), 800);
        assert_eq!(area.height(), 120);
        assert_eq!(area.pixel_count(), 96_000);
    }

    #[test]
    fn test_empty_from_origin() {
        let area = Area::from_origin(5, 5, 0, 10);
        assert!(area.is_empty());
        assert_eq!(area.width(), 0);
    }

    #[test]
    fn test_intersection_and_union() {
        let a = Area::new(0, 0, 9, 9);
        let b = Area::new(5, 5, 14, 14);
        assert_eq!(a.intersection(&b), Some(Area::new(5, 5, 9, 9)));
        assert_eq!(a.union(&b), Area::new(0, 0, 14, 14));

        let far = Area::new(20, 20, 30, 30);
        assert_eq!(a.intersection(&far), None);
    }

    #[test]
    fn test_rectangle_conversion() {
        let area = Area::new(3, 4, 12, 8);
        let rect = area.to_rectangle();
        assert_eq!(rect.size, Size::new(10, 5));
        assert_eq!(Area::from_rectangle(&rect), area);
    }

    #[test]
    fn test_contains_and_covers() {
        let area = Area::new(0, 0, 9, 9);
        assert!(area.contains(Point::new(9, 9)));
        assert!(!area.contains(Point::new(10, 0)));
        assert!(area.covers(&Area::new(2, 2, 3, 3)));
        assert!(!area.covers(&Area::new(2, 2, 10, 3)));
    }
}
