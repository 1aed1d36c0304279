// handles point generation logic

use bevy_math::Vec2;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::config::{POISSON_MAX_ATTEMPTS, POISSON_NEIGHBOR_CELLS};
use super::utils::BBox;

/// Dart-throwing Poisson-disk sampling inside `bbox`.
/// Points keep at least `min_dist` from each other. Returns fewer than
/// `target_count` points when the box saturates first.
pub fn poisson_disk_sample(bbox: &BBox, min_dist: f32, target_count: usize, rng: &mut StdRng) -> Vec<Vec2> {
    if target_count == 0 || min_dist <= 0.0 || bbox.width() < 0.0 || bbox.height() < 0.0 {
        return Vec::new();
    }

    // background grid, one sample per cell at most
    let cell = min_dist / std::f32::consts::SQRT_2;
    let cols = (bbox.width() / cell).floor() as i64 + 1;
    let rows = (bbox.height() / cell).floor() as i64 + 1;
    let mut grid: Vec<Option<usize>> = vec![None; (cols * rows) as usize];

    let cell_of = |p: Vec2| -> (i64, i64) {
        let ix = (((p.x - bbox.min.x) / cell).floor() as i64).clamp(0, cols - 1);
        let iy = (((p.y - bbox.min.y) / cell).floor() as i64).clamp(0, rows - 1);
        (ix, iy)
    };

    let mut points: Vec<Vec2> = Vec::with_capacity(target_count);
    let mut active: Vec<usize> = Vec::new();

    // seed with one random point
    let seed = Vec2::new(
        rng.random_range(bbox.min.x..=bbox.max.x),
        rng.random_range(bbox.min.y..=bbox.max.y),
    );
    let (ix, iy) = cell_of(seed);
    grid[(iy * cols + ix) as usize] = Some(0);
    points.push(seed);
    active.push(0);

    while !active.is_empty() && points.len() < target_count {
        let pick = rng.random_range(0..active.len());
        let base = points[active[pick]];
        let mut accepted = false;

        for _ in 0..POISSON_MAX_ATTEMPTS {
            // candidate in the annulus [min_dist, 2 * min_dist)
            let theta = rng.random_range(0.0..std::f32::consts::TAU);
            let radius = rng.random_range(min_dist..2.0 * min_dist);
            let candidate = base + Vec2::from_angle(theta) * radius;

            if !bbox.contains(candidate) {
                continue;
            }

            let (cx, cy) = cell_of(candidate);
            let mut clear = true;
            'scan: for dy in -POISSON_NEIGHBOR_CELLS..=POISSON_NEIGHBOR_CELLS {
                for dx in -POISSON_NEIGHBOR_CELLS..=POISSON_NEIGHBOR_CELLS {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if nx < 0 || ny < 0 || nx >= cols || ny >= rows {
                        continue;
                    }
                    if let Some(idx) = grid[(ny * cols + nx) as usize] {
                        if points[idx].distance(candidate) < min_dist {
                            clear = false;
                            break 'scan;
                        }
                    }
                }
            }

            if clear {
                let idx = points.len();
                grid[(cy * cols + cx) as usize] = Some(idx);
                points.push(candidate);
                active.push(idx);
                accepted = true;
                break;
            }
        }

        if !accepted {
            // retire it, the point itself stays in the result
            active.swap_remove(pick);
        }
    }

    points
}
