// candidate culling: containment, road and obstacle exclusion, de-overlap and coverage cap

use bevy_math::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::systems::city::Polygon;
use crate::systems::city::descriptor::{Landmark, Park};
use super::layout::BuildingCandidate;
use super::road_mask::RoadMask;
use super::utils::{BBox, point_in_polygon, polygons_intersect, polygons_overlap};

/// How surviving candidates are packed. Both steps are heuristics, swapping the
/// strategy changes which buildings win without touching the generators.
pub trait PackingStrategy {
    /// Drops candidates that overlap one that was kept.
    fn deoverlap(&self, candidates: Vec<BuildingCandidate>) -> Vec<BuildingCandidate>;

    /// Keeps candidates while their summed footprint stays within `budget`.
    fn cap_coverage(&self, candidates: Vec<BuildingCandidate>, budget: f32, rng: &mut StdRng) -> Vec<BuildingCandidate>;
}

/// First come, first served in generation order, then a shuffled coverage cap.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPacking;

/// Biggest footprints first for both steps. Deterministic, ignores the rng.
#[derive(Debug, Default, Clone, Copy)]
pub struct LargestFirstPacking;

impl PackingStrategy for GreedyPacking {
    fn deoverlap(&self, candidates: Vec<BuildingCandidate>) -> Vec<BuildingCandidate> {
        keep_first_non_overlapping(candidates)
    }

    fn cap_coverage(&self, mut candidates: Vec<BuildingCandidate>, budget: f32, rng: &mut StdRng) -> Vec<BuildingCandidate> {
        candidates.shuffle(rng); // Fisher-Yates
        take_within_budget(candidates, budget)
    }
}

impl PackingStrategy for LargestFirstPacking {
    fn deoverlap(&self, mut candidates: Vec<BuildingCandidate>) -> Vec<BuildingCandidate> {
        sort_by_area_desc(&mut candidates);
        keep_first_non_overlapping(candidates)
    }

    fn cap_coverage(&self, mut candidates: Vec<BuildingCandidate>, budget: f32, _rng: &mut StdRng) -> Vec<BuildingCandidate> {
        sort_by_area_desc(&mut candidates);
        take_within_budget(candidates, budget)
    }
}

fn sort_by_area_desc(candidates: &mut [BuildingCandidate]) {
    candidates.sort_by(|a, b| b.area().total_cmp(&a.area()));
}

fn keep_first_non_overlapping(candidates: Vec<BuildingCandidate>) -> Vec<BuildingCandidate> {
    let mut kept: Vec<(BuildingCandidate, Polygon)> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let rect = candidate.rect();
        if kept.iter().all(|(_, other)| !polygons_intersect(&rect, other)) {
            kept.push((candidate, rect));
        }
    }

    kept.into_iter().map(|(candidate, _)| candidate).collect()
}

fn take_within_budget(candidates: Vec<BuildingCandidate>, budget: f32) -> Vec<BuildingCandidate> {
    let mut total = 0.0;
    let mut kept = Vec::new();

    for candidate in candidates {
        let area = candidate.area();
        if total + area > budget {
            break;
        }
        total += area;
        kept.push(candidate);
    }

    kept
}

/// Candidates whose four corners are all inside `boundary`.
pub fn within_boundary(candidates: Vec<BuildingCandidate>, boundary: &[Vec2]) -> Vec<BuildingCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.corners().iter().all(|&corner| point_in_polygon(corner, boundary)))
        .collect()
}

/// Candidates that stay clear of the road mask.
pub fn outside_roads(candidates: Vec<BuildingCandidate>, mask: &RoadMask) -> Vec<BuildingCandidate> {
    candidates
        .into_iter()
        .filter(|c| !mask.intersects(&c.rect()))
        .collect()
}

/// Candidates that touch none of `obstacles`.
pub fn exclude_obstacles(candidates: Vec<BuildingCandidate>, obstacles: &[Polygon]) -> Vec<BuildingCandidate> {
    if obstacles.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|c| {
            let rect = c.rect();
            obstacles.iter().all(|obstacle| !polygons_intersect(&rect, obstacle))
        })
        .collect()
}

/// Candidates that overlap none of `carve_outs`. Carve-outs may be concave.
pub fn avoid_carve_outs(candidates: Vec<BuildingCandidate>, carve_outs: &[Polygon]) -> Vec<BuildingCandidate> {
    if carve_outs.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|c| {
            let rect = c.rect();
            carve_outs.iter().all(|hole| !polygons_overlap(&rect, hole))
        })
        .collect()
}

/// Bounding rectangles of the landmarks followed by those of the parks.
pub fn obstacle_rects(landmarks: &[Landmark], parks: &[Park]) -> Vec<Polygon> {
    landmarks
        .iter()
        .map(Landmark::rect)
        .chain(parks.iter().map(|park| park.vertices.clone()))
        .filter_map(|polygon| BBox::from_polygon(&polygon))
        .map(|bbox| bbox.to_polygon())
        .collect()
}

/// Everything a block's candidates are filtered against.
pub struct FilterContext<'a> {
    pub boundary: &'a [Vec2],
    pub road_mask: &'a RoadMask,
    pub obstacles: &'a [Polygon],
    pub carve_outs: &'a [Polygon], // parks and rivers reaching into the block
    pub budget: f32,
}

/// The full culling pipeline, in order: containment, road exclusion,
/// de-overlap, obstacle and carve-out exclusion, coverage cap.
pub fn filter_candidates(
    candidates: Vec<BuildingCandidate>,
    ctx: &FilterContext,
    strategy: &dyn PackingStrategy,
    rng: &mut StdRng,
) -> Vec<BuildingCandidate> {
    let inside = within_boundary(candidates, ctx.boundary);
    let clear = outside_roads(inside, ctx.road_mask);
    let separated = strategy.deoverlap(clear);
    let unobstructed = avoid_carve_outs(exclude_obstacles(separated, ctx.obstacles), ctx.carve_outs);
    strategy.cap_coverage(unobstructed, ctx.budget, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_math::Vec3;
    use rand::SeedableRng;

    fn cand(x: f32, y: f32, size: f32) -> BuildingCandidate {
        BuildingCandidate {
            center: Vec2::new(x, y),
            width: size,
            length: size,
            rotation: 0.0,
        }
    }

    fn block() -> Polygon {
        vec![
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
        ]
    }

    #[test]
    fn boundary_keeps_fully_contained() {
        let kept = within_boundary(vec![cand(50.0, 50.0, 10.0), cand(98.0, 50.0, 10.0)], &block());
        assert_eq!(kept, vec![cand(50.0, 50.0, 10.0)]);
    }

    #[test]
    fn greedy_deoverlap_is_first_wins() {
        let kept = GreedyPacking.deoverlap(vec![
            cand(10.0, 10.0, 10.0),
            cand(15.0, 10.0, 20.0),
            cand(40.0, 10.0, 10.0),
        ]);
        assert_eq!(kept, vec![cand(10.0, 10.0, 10.0), cand(40.0, 10.0, 10.0)]);

        let largest = LargestFirstPacking.deoverlap(vec![
            cand(10.0, 10.0, 10.0),
            cand(15.0, 10.0, 20.0),
            cand(40.0, 10.0, 10.0),
        ]);
        assert_eq!(largest, vec![cand(15.0, 10.0, 20.0), cand(40.0, 10.0, 10.0)]);
    }

    #[test]
    fn coverage_cap_never_exceeds_budget() {
        let mut rng = StdRng::seed_from_u64(5);
        let candidates: Vec<_> = (0..10).map(|i| cand(i as f32 * 20.0, 0.0, 10.0)).collect();

        let kept = GreedyPacking.cap_coverage(candidates.clone(), 450.0, &mut rng);
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|c| candidates.contains(c)));

        assert!(GreedyPacking.cap_coverage(candidates, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn obstacles_include_landmarks_and_park_bounds() {
        let landmark = Landmark {
            center: Vec2::new(50.0, 50.0),
            size: Vec3::new(10.0, 10.0, 30.0),
            rotation: 0.0,
        };
        let park = Park {
            vertices: vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(0.0, 20.0)],
        };
        let obstacles = obstacle_rects(&[landmark], &[park]);
        assert_eq!(obstacles.len(), 2);

        // (15, 15) is outside the park triangle but inside its bounding rectangle
        let kept = exclude_obstacles(
            vec![cand(15.0, 15.0, 4.0), cand(52.0, 52.0, 4.0), cand(80.0, 80.0, 4.0)],
            &obstacles,
        );
        assert_eq!(kept, vec![cand(80.0, 80.0, 4.0)]);

        let untouched = exclude_obstacles(vec![cand(15.0, 15.0, 4.0)], &[]);
        assert_eq!(untouched.len(), 1);
    }

    #[test]
    fn rotated_landmark_blocks_its_bounding_rectangle() {
        let landmark = Landmark {
            center: Vec2::new(50.0, 50.0),
            size: Vec3::new(10.0, 10.0, 30.0),
            rotation: 45.0,
        };
        let obstacles = obstacle_rects(&[landmark], &[]);
        let bbox = BBox::from_polygon(&obstacles[0]).expect("four corners");
        assert!((bbox.width() - 10.0 * 2f32.sqrt()).abs() < 1e-3);

        // clear of the diamond, inside its bounds
        let kept = exclude_obstacles(vec![cand(43.0, 43.0, 2.0)], &obstacles);
        assert!(kept.is_empty());
    }

    #[test]
    fn carve_outs_follow_the_exact_outline() {
        // river bending around the top right corner
        let river = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(40.0, 0.0),
            Vec2::new(40.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 40.0),
            Vec2::new(0.0, 40.0),
        ];
        let kept = avoid_carve_outs(
            vec![cand(25.0, 25.0, 4.0), cand(20.0, 5.0, 4.0), cand(5.0, 30.0, 20.0), cand(80.0, 80.0, 4.0)],
            &[river],
        );
        assert_eq!(kept, vec![cand(25.0, 25.0, 4.0), cand(80.0, 80.0, 4.0)]);
    }

    #[test]
    fn pipeline_drops_candidates_on_a_river() {
        let river = vec![Vec2::new(0.0, 45.0), Vec2::new(100.0, 45.0), Vec2::new(100.0, 55.0), Vec2::new(0.0, 55.0)];
        let (boundary, road_mask, carve_outs) = (block(), RoadMask::default(), vec![river]);
        let ctx = FilterContext {
            boundary: &boundary,
            road_mask: &road_mask,
            obstacles: &[],
            carve_outs: &carve_outs,
            budget: 10_000.0,
        };
        let mut rng = StdRng::seed_from_u64(6);
        let kept = filter_candidates(
            vec![cand(20.0, 20.0, 10.0), cand(20.0, 50.0, 10.0), cand(20.0, 80.0, 10.0)],
            &ctx,
            &LargestFirstPacking,
            &mut rng,
        );
        assert_eq!(kept.len(), 2);
        assert!(!kept.contains(&cand(20.0, 50.0, 10.0)));
    }
}
