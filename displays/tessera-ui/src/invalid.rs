//! Invalidated area bookkeeping
//!
//! Areas are clipped to the screen on entry. Areas already covered by a
//! queued one are dropped; when the queue is full everything collapses into
//! a single bounding area.

use heapless::Vec;

use crate::area::Area;

/// Maximum number of separately tracked dirty areas
pub const MAX_INVALID_AREAS: usize = 8;

/// Queue of screen areas that need to be redrawn
#[derive(Debug, Default)]
pub struct InvalidAreas {
    screen: Option<Area>,
    areas: Vec<Area, MAX_INVALID_AREAS>,
}

impl InvalidAreas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clipping bounds; nothing is queued until a screen exists
    pub fn set_screen(&mut self, screen: Area) {
        self.screen = Some(screen);
    }

    /// Queue an area for redraw
    pub fn push(&mut self, area: Area) {
        let Some(area) = self.screen.and_then(|screen| screen.intersection(&area)) else {
            return;
        };

        if self.areas.iter().any(|queued| queued.covers(&area)) {
            return;
        }
        self.areas.retain(|queued| !area.covers(queued));

        if let Err(area) = self.areas.push(area) {
            let merged = self.areas.iter().fold(area, |acc, a| acc.union(a));
            self.areas.clear();
            // Empty after clear
            let _ = self.areas.push(merged);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn as_slice(&self) -> &[Area] {
        &self.areas
    }

    /// Take every queued area, leaving the queue empty
    pub fn take(&mut self) -> Vec<Area, MAX_INVALID_AREAS> {
        core::mem::take(&mut self.areas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> InvalidAreas {
        let mut q = InvalidAreas::new();
        q.set_screen(Area::new(0, 0, 99, 99));
        q
    }

    #[test]
    fn test_ignored_without_screen() {
        let mut q = InvalidAreas::new();
        q.push(Area::new(0, 0, 10, 10));
        assert!(q.is_empty());
    }

    #[test]
    fn test_clipped_to_screen() {
        let mut q = queue();
        q.push(Area::new(-10, 90, 20, 120));
        assert_eq!(q.as_slice(), &[Area::new(0, 90, 20, 99)]);

        q.push(Area::new(200, 200, 210, 210));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_covered_areas_dropped() {
        let mut q = queue();
        q.push(Area::new(10, 10, 20, 20));
        q.push(Area::new(12, 12, 15, 15));
        assert_eq!(q.len(), 1);

        q.push(Area::new(0, 0, 50, 50));
        assert_eq!(q.as_slice(), &[Area::new(0, 0, 50, 50)]);
    }

    #[test]
    fn test_overflow_merges() {
        let mut q = queue();
        for i in 0..=MAX_INVALID_AREAS as i32 {
            q.push(Area::new(i * 10, 0, i * 10 + 5, 5));
        }
        assert_eq!(q.len(), 1);
        assert_eq!(q.as_slice()[0], Area::new(0, 0, 85, 5));
    }

    #[test]
    fn test_take_empties() {
        let mut q = queue();
        q.push(Area::new(0, 0, 5, 5));
        let taken = q.take();
        assert_eq!(taken.len(), 1);
        assert!(q.is_empty());
    }
}
