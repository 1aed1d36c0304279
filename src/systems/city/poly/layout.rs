// block building generators
// every strategy emits raw candidates, culling happens in `filter`

use bevy_math::{Vec2, Vec3};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::config::*;
use crate::systems::city::Polygon;
use crate::systems::city::descriptor::{Block, Building, Layout, Roads};
use super::point_gen::poisson_disk_sample;
use super::utils::{BBox, angle, building_corners, building_rect, point_segment_distance, polygon_area, segment_intersects_polygon};

/// A building footprint that has not survived filtering yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingCandidate {
    pub center: Vec2,
    pub width: f32,
    pub length: f32,
    pub rotation: f32, // degrees
}

impl BuildingCandidate {
    pub fn corners(&self) -> [Vec2; 4] {
        building_corners(self.center, self.width, self.length, self.rotation)
    }

    pub fn rect(&self) -> Polygon {
        building_rect(self.center, self.width, self.length, self.rotation)
    }

    pub fn area(&self) -> f32 {
        self.width * self.length
    }

    pub fn into_building(self, height: f32) -> Building {
        Building {
            center: self.center,
            size: Vec3::new(self.width, self.length, height),
            rotation: self.rotation,
        }
    }
}

/// Scales `value` by a uniform factor in `[1 - spread/2, 1 + spread/2)`.
fn jitter(value: f32, spread: f32, rng: &mut StdRng) -> f32 {
    value * (1.0 + rng.random_range(-0.5_f32..0.5) * spread)
}

/// Road segments that touch or cross the block boundary.
pub fn adjacent_road_segments(boundary: &[Vec2], roads: &Roads) -> Vec<(Vec2, Vec2)> {
    roads
        .segments()
        .filter(|&(start, end)| segment_intersects_polygon(start, end, boundary))
        .collect()
}

/// One row of buildings on each side of a road segment, `offset` meters from
/// its centerline. The row is centered on the segment at a pitch of
/// `width + spacing`, every building faces the road.
fn road_row(start: Vec2, end: Vec2, offset: f32, block: &Block, rng: &mut StdRng, out: &mut Vec<BuildingCandidate>) {
    let dir = end - start;
    let len = dir.length();
    if len < DEGENERATE_SEGMENT_LENGTH {
        return;
    }

    let (width, length) = (block.size.x, block.size.y);
    let pitch = width + block.spacing;
    if pitch <= 0.0 {
        return;
    }

    let count = (len / pitch).floor() as usize;
    if count == 0 {
        return;
    }

    let unit = dir / len;
    let normal = Vec2::new(-unit.y, unit.x);
    let rotation = angle(start, end);
    let margin = (len - count as f32 * pitch) / 2.0;

    for i in 0..count {
        let along = start + unit * (margin + pitch * (i as f32 + 0.5));
        for side in [1.0, -1.0] {
            out.push(BuildingCandidate {
                center: along + normal * offset * side,
                width: jitter(width, PERIMETER_JITTER, rng),
                length: jitter(length, PERIMETER_JITTER, rng),
                rotation,
            });
        }
    }
}

fn front_offset(block: &Block, roads: &Roads) -> f32 {
    roads.width / 2.0 + block.size.y / 2.0 + block.spacing
}

/// A single street-front row along every road touching the block.
pub fn perimeter_candidates(block: &Block, roads: &Roads, rng: &mut StdRng) -> Vec<BuildingCandidate> {
    let offset = front_offset(block, roads);
    let mut out = Vec::new();

    for (start, end) in adjacent_road_segments(&block.boundary, roads) {
        road_row(start, end, offset, block, rng, &mut out);
    }

    out
}

/// Street-front rows repeated inward until the block span is covered.
pub fn fill_candidates(block: &Block, roads: &Roads, rng: &mut StdRng) -> Vec<BuildingCandidate> {
    let offset = front_offset(block, roads);
    let step_inward = block.size.y + block.spacing;
    let Some(bbox) = BBox::from_polygon(&block.boundary) else {
        return Vec::new();
    };
    if step_inward <= 0.0 {
        return perimeter_candidates(block, roads, rng);
    }

    let rows = (bbox.width().max(bbox.height()) / step_inward).ceil() as usize;
    let mut out = Vec::new();

    for (start, end) in adjacent_road_segments(&block.boundary, roads) {
        for row in 0..rows {
            road_row(start, end, offset + row as f32 * step_inward, block, rng, &mut out);
        }
    }

    out
}

/// Street-front row plus randomly rotated buildings on Poisson-disk points in
/// the interior, kept well away from every road.
pub fn scatter_candidates(block: &Block, roads: &Roads, rng: &mut StdRng) -> Vec<BuildingCandidate> {
    let mut out = perimeter_candidates(block, roads, rng);

    let Some(bbox) = BBox::from_polygon(&block.boundary) else {
        return out;
    };
    let (width, length) = (block.size.x, block.size.y);
    let building_area = width * length;
    if building_area <= 0.0 {
        return out;
    }

    let target = (polygon_area(&block.boundary) * block.coverage / building_area * SCATTER_INTERIOR_SHARE).floor() as usize;
    let min_dist = width.max(length) + block.spacing;
    let clearance = roads.width / 2.0 + length + 2.0 * block.spacing;

    let points = poisson_disk_sample(&bbox, min_dist, target * SCATTER_OVERSAMPLE, rng);
    for point in points {
        let near_road = roads
            .segments()
            .any(|(start, end)| point_segment_distance(point, start, end) <= clearance);
        if near_road {
            continue;
        }

        out.push(BuildingCandidate {
            center: point,
            width: jitter(width, SCATTER_JITTER, rng),
            length: jitter(length, SCATTER_JITTER, rng),
            rotation: rng.random_range(0.0..360.0),
        });
    }

    out
}

/// Raw candidates for the block's layout.
pub fn generate_candidates(block: &Block, roads: &Roads, rng: &mut StdRng) -> Vec<BuildingCandidate> {
    match block.layout {
        Layout::Perimeter => perimeter_candidates(block, roads, rng),
        Layout::Scatter => scatter_candidates(block, roads, rng),
        Layout::Fill => fill_candidates(block, roads, rng),
    }
}
