// approximate polygon difference on a raster
//
// Cells are classified by their centers, 4-connected free cells are grouped
// and every group is re-bounded by the convex hull of its cell centers. Concave
// results come back convexified and regions thinner than a cell may vanish.
// Swap in a real clipping routine behind `polygon_difference` if exact
// booleans are ever needed.

use std::collections::VecDeque;

use bevy_math::Vec2;

use crate::config::DIFFERENCE_GRID_RESOLUTION;
use crate::systems::city::Polygon;
use super::utils::{BBox, convex_hull, point_in_polygon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Outside,
    Available,
    Occupied,
}

/// `subject` minus every polygon in `holes`, as a list of convex regions.
pub fn polygon_difference(subject: &[Vec2], holes: &[Polygon]) -> Vec<Polygon> {
    polygon_difference_with_resolution(subject, holes, DIFFERENCE_GRID_RESOLUTION)
}

pub fn polygon_difference_with_resolution(subject: &[Vec2], holes: &[Polygon], resolution: f32) -> Vec<Polygon> {
    let Some(bbox) = BBox::from_polygon(subject) else {
        return Vec::new();
    };
    if resolution <= 0.0 {
        return Vec::new();
    }

    let cols = (bbox.width() / resolution).ceil().max(1.0) as usize;
    let rows = (bbox.height() / resolution).ceil().max(1.0) as usize;
    let center = |col: usize, row: usize| {
        bbox.min + Vec2::new((col as f32 + 0.5) * resolution, (row as f32 + 0.5) * resolution)
    };

    let mut cells = vec![Cell::Outside; cols * rows];
    for row in 0..rows {
        for col in 0..cols {
            let p = center(col, row);
            if point_in_polygon(p, subject) {
                cells[row * cols + col] = if holes.iter().any(|hole| point_in_polygon(p, hole)) {
                    Cell::Occupied
                } else {
                    Cell::Available
                };
            }
        }
    }

    // flood fill free regions
    let mut visited = vec![false; cols * rows];
    let mut regions = Vec::new();

    for start in 0..cells.len() {
        if visited[start] || cells[start] != Cell::Available {
            continue;
        }

        let mut region_points = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(idx) = queue.pop_front() {
            let (col, row) = (idx % cols, idx / cols);
            region_points.push(center(col, row));

            let neighbors = [
                (col > 0).then(|| idx - 1),
                (col + 1 < cols).then(|| idx + 1),
                (row > 0).then(|| idx - cols),
                (row + 1 < rows).then(|| idx + cols),
            ];
            for next in neighbors.into_iter().flatten() {
                if !visited[next] && cells[next] == Cell::Available {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        let hull = convex_hull(&region_points);
        if hull.len() >= 3 {
            regions.push(hull);
        }
    }

    regions
}
