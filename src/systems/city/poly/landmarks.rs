// moves landmarks off the road network

use bevy_log::{debug, warn};
use bevy_math::Vec2;

use crate::config::{SPIRAL_ANGLE_STEP_DEG, SPIRAL_RADIUS_FACTOR, SPIRAL_RADIUS_STEP};
use crate::systems::city::descriptor::{Landmark, Roads};
use super::road_mask::create_road_mask;
use super::utils::{BBox, building_rect};

/// Returns the landmark unchanged when it stays clear of every road. Otherwise
/// searches outward in rings of `SPIRAL_RADIUS_STEP` up to
/// `SPIRAL_RADIUS_FACTOR * max(width, length)` and moves it to the first clear
/// spot of the closest ring. When no ring has one the landmark keeps its
/// original position.
pub fn adjust_landmark_position(landmark: &Landmark, roads: &Roads) -> Landmark {
    let rect = landmark.rect();
    let Some(bbox) = BBox::from_polygon(&rect) else {
        return *landmark;
    };

    if !create_road_mask(roads, &bbox).intersects(&rect) {
        return *landmark;
    }

    let max_radius = SPIRAL_RADIUS_FACTOR * landmark.width().max(landmark.length());
    // one mask covering every position the search can reach
    let mask = create_road_mask(roads, &bbox.expand(max_radius));

    let mut best: Option<(Vec2, f32)> = None;
    let mut radius = SPIRAL_RADIUS_STEP;

    while radius <= max_radius {
        for step in (0..360).step_by(SPIRAL_ANGLE_STEP_DEG) {
            let theta = (step as f32).to_radians();
            let center = landmark.center + Vec2::from_angle(theta) * radius;
            let candidate = building_rect(center, landmark.width(), landmark.length(), landmark.rotation);

            if mask.intersects(&candidate) {
                continue;
            }

            let dist = center.distance(landmark.center);
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((center, dist));
            }
        }

        if best.is_some_and(|(_, best_dist)| best_dist <= radius) {
            break;
        }
        radius += SPIRAL_RADIUS_STEP;
    }

    match best {
        Some((center, dist)) => {
            debug!(
                "landmark at {} moved {:.1} m to {} to clear the roads",
                landmark.center, dist, center
            );
            Landmark { center, ..*landmark }
        }
        None => {
            warn!(
                "no road-free position within {:.1} m of landmark at {}, keeping it in place",
                max_radius, landmark.center
            );
            *landmark
        }
    }
}
