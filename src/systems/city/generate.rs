use bevy_ecs::prelude::*;
use bevy_log::{debug, info, warn};
use bevy_math::Vec2;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::*;
use super::descriptor::{Block, Building, CityDescriptor, Landmark, Layout, Park, River, Roads};
use super::poly::difference::polygon_difference;
use super::poly::filter::{FilterContext, GreedyPacking, PackingStrategy, filter_candidates, obstacle_rects};
use super::poly::landmarks::adjust_landmark_position;
use super::poly::layout::generate_candidates;
use super::poly::road_mask::create_road_mask;
use super::poly::utils::{BBox, polygon_area};

/// Per block statistics of a generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockReport {
    pub index: usize,
    pub layout: Layout,
    pub candidates: usize,
    pub accepted: usize,
    pub footprint_area: f32,
    pub target_area: f32,
    pub buildable_regions: Vec<Polygon>, // boundary minus overlapping parks and rivers
}

// rivers are not adjusted yet
pub fn generate_city_rivers(rivers: &[River]) -> Vec<River> {
    rivers.to_vec()
}

// parks are not moved relative to the roads yet
pub fn generate_city_parks(parks: &[Park], _roads: &Roads) -> Vec<Park> {
    parks.to_vec()
}

/// Landmarks of the descriptor, moved off the roads where needed.
pub fn generate_landmark_buildings(city: &CityDescriptor) -> Vec<Landmark> {
    city.buildings
        .landmarks
        .iter()
        .map(|landmark| adjust_landmark_position(landmark, &city.roads))
        .collect()
}

/// Ordinary buildings for every block, packed greedily.
pub fn generate_block_buildings(city: &CityDescriptor, landmarks: &[Landmark], seed: u64) -> Vec<Building> {
    generate_block_layouts(city, landmarks, seed, &GreedyPacking).0
}

/// Lays out every block in descriptor order. Block `i` draws from its own rng
/// seeded with `seed + i`. Buildings accepted for earlier blocks become
/// obstacles for later ones, next to landmark and park bounds. No building is
/// kept on a park or river outline.
pub fn generate_block_layouts(
    city: &CityDescriptor,
    landmarks: &[Landmark],
    seed: u64,
    strategy: &dyn PackingStrategy,
) -> (Vec<Building>, Vec<BlockReport>) {
    let mut obstacles = obstacle_rects(landmarks, &city.parks);
    let carve_outs: Vec<Polygon> = city
        .parks
        .iter()
        .map(|park| park.vertices.clone())
        .chain(city.rivers.iter().map(|river| river.vertices.clone()))
        .collect();

    let mut buildings = Vec::new();
    let mut reports = Vec::new();

    for (index, block) in city.resolved_blocks().iter().enumerate() {
        let mut block_rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
        let (block_buildings, report) = layout_block(index, block, &city.roads, &obstacles, &carve_outs, strategy, &mut block_rng);

        info!(
            "block {} ({}): {} of {} candidates kept, footprint {:.0} / {:.0} m2",
            index, report.layout, report.accepted, report.candidates, report.footprint_area, report.target_area
        );

        obstacles.extend(block_buildings.iter().map(Building::rect));
        buildings.extend(block_buildings);
        reports.push(report);
    }

    (buildings, reports)
}

fn layout_block(
    index: usize,
    block: &Block,
    roads: &Roads,
    obstacles: &[Polygon],
    carve_outs: &[Polygon],
    strategy: &dyn PackingStrategy,
    rng: &mut StdRng,
) -> (Vec<Building>, BlockReport) {
    let target_area = polygon_area(&block.boundary) * block.coverage;
    let mut report = BlockReport {
        index,
        layout: block.layout,
        candidates: 0,
        accepted: 0,
        footprint_area: 0.0,
        target_area,
        buildable_regions: Vec::new(),
    };

    let Some(bbox) = BBox::from_polygon(&block.boundary) else {
        warn!("block {} has an empty boundary, skipping", index);
        return (Vec::new(), report);
    };

    let road_mask = create_road_mask(roads, &bbox);
    let holes = holes_near(&bbox, carve_outs);
    let candidates = generate_candidates(block, roads, rng);
    report.candidates = candidates.len();

    let ctx = FilterContext {
        boundary: &block.boundary,
        road_mask: &road_mask,
        obstacles,
        carve_outs: &holes,
        budget: target_area,
    };
    let accepted = filter_candidates(candidates, &ctx, strategy, rng);

    let (min_height, max_height) = (block.height.x.min(block.height.y), block.height.x.max(block.height.y));
    let buildings: Vec<Building> = accepted
        .into_iter()
        .map(|candidate| candidate.into_building(rng.random_range(min_height..=max_height)))
        .collect();

    report.accepted = buildings.len();
    report.footprint_area = buildings.iter().map(Building::footprint_area).sum();
    report.buildable_regions = buildable_regions(&block.boundary, &holes);

    (buildings, report)
}

// park and river outlines whose bounds reach into the block
fn holes_near(bbox: &BBox, carve_outs: &[Polygon]) -> Vec<Polygon> {
    carve_outs
        .iter()
        .filter(|hole| BBox::from_polygon(hole).is_some_and(|hole_box| hole_box.intersects(bbox)))
        .cloned()
        .collect()
}

fn buildable_regions(boundary: &[Vec2], holes: &[Polygon]) -> Vec<Polygon> {
    if holes.is_empty() {
        return vec![boundary.to_vec()];
    }

    debug!("carving {} park/river polygons out of a block", holes.len());
    polygon_difference(boundary, holes)
}

/// One complete generation pass.
pub fn generate_city(city: &CityDescriptor, seed: u64) -> CityLayout {
    let rivers = generate_city_rivers(&city.rivers);
    let parks = generate_city_parks(&city.parks, &city.roads);
    let landmarks = generate_landmark_buildings(city);
    let (buildings, blocks) = generate_block_layouts(city, &landmarks, seed, &GreedyPacking);

    info!(
        "generated {} landmarks and {} buildings across {} blocks",
        landmarks.len(),
        buildings.len(),
        blocks.len()
    );

    CityLayout {
        seed,
        rivers,
        parks,
        landmarks,
        buildings,
        blocks,
    }
}

pub fn handle_regeneration(
    mut events: EventReader<RegenerateEvent>,
    mut seed: ResMut<Seed>,
    city: Option<Res<CityDescriptor>>,
    mut layout: ResMut<CityLayout>,
) {
    for event in events.read() {
        seed.0 = event.seed;

        let Some(city) = city.as_deref() else {
            warn!("regeneration requested without a city descriptor");
            continue;
        };
        *layout = generate_city(city, event.seed);
    }
}
