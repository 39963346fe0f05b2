use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// Which edge of the target block a dragged block lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSide {
    Before,
    After,
}

impl DropSide {
    pub fn label(self) -> &'static str {
        match self {
            DropSide::Before => "insert before",
            DropSide::After => "insert after",
        }
    }
}

/// Axis-aligned bounding box in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn mid_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// Resolves a block back to its on-screen bounds.
pub trait GeometryProvider {
    fn bounds_of(&self, block: &BlockId) -> Option<Rect>;
}

impl GeometryProvider for HashMap<BlockId, Rect> {
    fn bounds_of(&self, block: &BlockId) -> Option<Rect> {
        self.get(block).copied()
    }
}

/// Midpoint rule: strictly above the middle is `Before`, the midpoint itself and below is `After`.
pub fn resolve_side(pointer_y: f32, bounds: Rect) -> DropSide {
    if pointer_y < bounds.mid_y() {
        DropSide::Before
    } else {
        DropSide::After
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_resolves_after() {
        let rect = Rect::new(0., 100., 200., 40.);
        assert_eq!(resolve_side(100., rect), DropSide::Before);
        assert_eq!(resolve_side(119.9, rect), DropSide::Before);
        assert_eq!(resolve_side(120., rect), DropSide::After);
        assert_eq!(resolve_side(139., rect), DropSide::After);
    }

    #[test]
    fn pointer_outside_box_still_resolves() {
        let rect = Rect::new(0., 100., 200., 40.);
        assert_eq!(resolve_side(-5., rect), DropSide::Before);
        assert_eq!(resolve_side(500., rect), DropSide::After);
    }

    #[test]
    fn map_acts_as_geometry_provider() {
        let mut provider: HashMap<BlockId, Rect> = HashMap::new();
        provider.insert(BlockId::new("b2"), Rect::new(0., 10., 10., 10.));
        assert_eq!(
            provider.bounds_of(&BlockId::new("b2")),
            Some(Rect::new(0., 10., 10., 10.))
        );
        assert_eq!(provider.bounds_of(&BlockId::new("b3")), None);
    }
}
