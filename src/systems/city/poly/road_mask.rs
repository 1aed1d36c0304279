// expands road centerlines into rectangular no-build corridors

use bevy_math::Vec2;

use crate::config::DEGENERATE_SEGMENT_LENGTH;
use crate::systems::city::Polygon;
use crate::systems::city::descriptor::Roads;
use super::utils::{BBox, polygons_intersect};

/// Road footprints as rectangles, one per segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadMask {
    pub rects: Vec<Polygon>,
}

impl RoadMask {
    /// True if `polygon` touches any road rectangle.
    pub fn intersects(&self, polygon: &[Vec2]) -> bool {
        self.rects.iter().any(|rect| polygons_intersect(polygon, rect))
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Offsets the segment by half the width along its unit normal on both sides.
/// # Returns an empty polygon for zero-length segments.
pub fn expand_line_to_rect(start: Vec2, end: Vec2, width: f32) -> Polygon {
    let dir = end - start;
    let len = dir.length();
    if len < DEGENERATE_SEGMENT_LENGTH {
        return Vec::new();
    }

    let offset = Vec2::new(-dir.y, dir.x) / len * (width / 2.0);
    vec![start + offset, end + offset, end - offset, start - offset]
}

/// Road rectangles whose bounds reach into `bbox`. Rectangles further away can
/// never intersect anything inside `bbox`, so they are left out.
pub fn create_road_mask(roads: &Roads, bbox: &BBox) -> RoadMask {
    let rects = roads
        .segments()
        .map(|(start, end)| expand_line_to_rect(start, end, roads.width))
        .filter(|rect| {
            BBox::from_polygon(rect).is_some_and(|rect_box| rect_box.intersects(bbox))
        })
        .collect();

    RoadMask { rects }
}
