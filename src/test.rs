// end to end checks of the layout pipeline

use bevy_app::App;
use bevy_math::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::systems::city::descriptor::*;
use crate::systems::city::generate::*;
use crate::systems::city::poly::filter::LargestFirstPacking;
use crate::systems::city::poly::point_gen::poisson_disk_sample;
use crate::systems::city::poly::road_mask::create_road_mask;
use crate::systems::city::poly::utils::{BBox, point_in_polygon, polygon_area, polygons_intersect, polygons_overlap};
use crate::systems::city::{CityLayout, CityLayoutPlugin, Polygon, RegenerateEvent, Seed};

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Polygon {
    vec![Vec2::new(x0, y0), Vec2::new(x1, y0), Vec2::new(x1, y1), Vec2::new(x0, y1)]
}

fn block(boundary: Polygon, layout: Layout) -> BlockSpec {
    BlockSpec {
        boundary,
        overrides: BlockDefaults {
            layout: Some(layout),
            ..Default::default()
        },
    }
}

fn perimeter_city() -> CityDescriptor {
    CityDescriptor {
        roads: Roads {
            width: 10.0,
            lines: vec![vec![Vec2::new(0.0, 30.0), Vec2::new(100.0, 30.0)]],
        },
        buildings: BuildingsSpec {
            blocks: vec![BlockSpec {
                boundary: rect(0.0, 0.0, 100.0, 60.0),
                overrides: BlockDefaults {
                    size: Some(Vec2::new(10.0, 10.0)),
                    spacing: Some(2.0),
                    coverage: Some(0.3),
                    layout: Some(Layout::Perimeter),
                    ..Default::default()
                },
            }],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn mixed_city() -> CityDescriptor {
    CityDescriptor {
        roads: Roads {
            width: 8.0,
            lines: vec![
                vec![Vec2::new(0.0, 100.0), Vec2::new(300.0, 100.0)],
                vec![Vec2::new(150.0, 0.0), Vec2::new(150.0, 300.0)],
            ],
        },
        parks: vec![Park {
            vertices: vec![Vec2::new(200.0, 150.0), Vec2::new(240.0, 150.0), Vec2::new(220.0, 180.0)],
        }],
        rivers: vec![River {
            vertices: rect(0.0, 250.0, 300.0, 258.0),
        }],
        buildings: BuildingsSpec {
            landmarks: vec![Landmark {
                center: Vec2::new(60.0, 100.0),
                size: Vec3::new(20.0, 20.0, 80.0),
                rotation: 0.0,
            }],
            blocks: vec![
                block(rect(0.0, 0.0, 145.0, 200.0), Layout::Fill),
                block(rect(155.0, 0.0, 300.0, 200.0), Layout::Scatter),
                block(rect(0.0, 210.0, 300.0, 300.0), Layout::Perimeter),
            ],
            defaults: BlockDefaults {
                size: Some(Vec2::new(12.0, 9.0)),
                height: Some(Vec2::new(8.0, 30.0)),
                spacing: Some(3.0),
                coverage: Some(0.35),
                layout: None,
            },
        },
    }
}

fn everything() -> BBox {
    BBox { min: Vec2::splat(-1e4), max: Vec2::splat(1e4) }
}

fn assert_block_invariants(city: &CityDescriptor, buildings: &[Building], reports: &[BlockReport]) {
    let blocks = city.resolved_blocks();
    let mask = create_road_mask(&city.roads, &everything());
    let mut offset = 0;

    for report in reports {
        let block = &blocks[report.index];
        let own = &buildings[offset..offset + report.accepted];
        offset += report.accepted;

        let mut footprint = 0.0;
        for (i, b) in own.iter().enumerate() {
            let r = b.rect();
            assert!(r.iter().all(|&c| point_in_polygon(c, &block.boundary)), "block {} building escapes", report.index);
            assert!(!mask.intersects(&r), "block {} building on a road", report.index);
            assert!((block.height.x..=block.height.y).contains(&b.height()));
            for other in &own[i + 1..] {
                assert!(!polygons_intersect(&r, &other.rect()));
            }
            footprint += b.footprint_area();
        }

        assert!(footprint <= block.coverage * polygon_area(&block.boundary) + 1e-2);
        assert!((footprint - report.footprint_area).abs() < 1e-2);
    }

    assert_eq!(offset, buildings.len());
}

#[test]
fn perimeter_scenario_places_two_rows() {
    let city = perimeter_city();
    let buildings = generate_block_buildings(&city, &[], 42);

    // 8 per side of the road, all under the 1800 m2 budget
    assert_eq!(buildings.len(), 16);
    let total: f32 = buildings.iter().map(Building::footprint_area).sum();
    assert!(total <= 0.3 * 6000.0);

    for row_y in [18.0, 42.0] {
        let mut xs: Vec<f32> = buildings
            .iter()
            .filter(|b| (b.center.y - row_y).abs() < 1e-4)
            .map(|b| b.center.x)
            .collect();
        xs.sort_by(f32::total_cmp);
        assert_eq!(xs.len(), 8);
        for pair in xs.windows(2) {
            assert!((pair[1] - pair[0] - 12.0).abs() < 1e-3);
        }
    }

    let (buildings, reports) = generate_block_layouts(&city, &[], 42, &LargestFirstPacking);
    assert_block_invariants(&city, &buildings, &reports);
}

#[test]
fn landmark_on_road_is_moved_clear() {
    let mut city = perimeter_city();
    city.buildings.landmarks.push(Landmark {
        center: Vec2::new(50.0, 30.0),
        size: Vec3::new(12.0, 12.0, 50.0),
        rotation: 30.0,
    });

    let placed = generate_landmark_buildings(&city);
    assert_eq!(placed.len(), 1);
    assert_ne!(placed[0].center, city.buildings.landmarks[0].center);

    let rect = placed[0].rect();
    let bbox = BBox::from_polygon(&rect).expect("four corners");
    assert!(!create_road_mask(&city.roads, &bbox).intersects(&rect));
}

#[test]
fn landmark_off_road_is_unchanged() {
    let mut city = perimeter_city();
    let landmark = Landmark {
        center: Vec2::new(50.0, 80.0),
        size: Vec3::new(12.0, 12.0, 50.0),
        rotation: 10.0,
    };
    city.buildings.landmarks.push(landmark);
    assert_eq!(generate_landmark_buildings(&city), vec![landmark]);
}

#[test]
fn poisson_scenario() {
    let bbox = BBox { min: Vec2::ZERO, max: Vec2::splat(100.0) };
    let points = poisson_disk_sample(&bbox, 10.0, 50, &mut StdRng::seed_from_u64(99));
    assert!(points.len() <= 50);
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            assert!(a.distance(*b) >= 10.0 - 1e-4);
        }
    }
}

#[test]
fn mixed_city_honors_every_invariant() {
    let city = mixed_city();
    let layout = generate_city(&city, 7);

    assert_eq!(layout.blocks.len(), 3);
    assert!(!layout.buildings.is_empty());
    assert_block_invariants(&city, &layout.buildings, &layout.blocks);

    // later blocks never overlap earlier ones, nothing overlaps landmarks, park bounds or the river
    let park_box = BBox::from_polygon(&city.parks[0].vertices).expect("park").to_polygon();
    let river = &city.rivers[0].vertices;
    for (i, b) in layout.buildings.iter().enumerate() {
        let r = b.rect();
        for other in &layout.buildings[i + 1..] {
            assert!(!polygons_intersect(&r, &other.rect()));
        }
        for landmark in &layout.landmarks {
            assert!(!polygons_intersect(&r, &landmark.rect()));
        }
        assert!(!polygons_intersect(&r, &park_box));
        assert!(!polygons_intersect(&r, river), "building on the river at {}", b.center);
        assert!(!polygons_overlap(&r, river));
    }

    // randomly rotated interior buildings survive filtering in the scatter block
    let scatter_start = layout.blocks[0].accepted;
    let scatter = &layout.buildings[scatter_start..scatter_start + layout.blocks[1].accepted];
    let off_axis = |rotation: f32| (1e-3..90.0 - 1e-3).contains(&rotation.rem_euclid(90.0));
    assert!(scatter.iter().any(|b| off_axis(b.rotation)));

    // the landmark sat on the horizontal road
    assert_ne!(layout.landmarks[0].center, city.buildings.landmarks[0].center);

    // parks and rivers pass through untouched
    assert_eq!(layout.parks, city.parks);
    assert_eq!(layout.rivers, city.rivers);

    // the river splits the top block, the others have nothing to carve
    assert_eq!(layout.blocks[0].buildable_regions, vec![city.buildings.blocks[0].boundary.clone()]);
    assert_eq!(layout.blocks[1].buildable_regions.len(), 1);
    assert_eq!(layout.blocks[2].buildable_regions.len(), 2);
}

#[test]
fn largest_first_packing_keeps_invariants() {
    let city = mixed_city();
    let landmarks = generate_landmark_buildings(&city);
    let (buildings, reports) = generate_block_layouts(&city, &landmarks, 3, &LargestFirstPacking);
    assert_block_invariants(&city, &buildings, &reports);
}

#[test]
fn same_seed_same_city() {
    let city = mixed_city();
    assert_eq!(generate_city(&city, 1234), generate_city(&city, 1234));
}

#[test]
fn plugin_regenerates_on_event() {
    let mut app = App::new();
    app.add_plugins(CityLayoutPlugin).insert_resource(mixed_city());

    app.world_mut().send_event(RegenerateEvent { seed: 5 });
    app.update();

    assert_eq!(app.world().resource::<Seed>().0, 5);
    let layout = app.world().resource::<CityLayout>();
    assert_eq!(layout.seed, 5);
    assert_eq!(*layout, generate_city(&mixed_city(), 5));
}

#[test]
fn plugin_without_descriptor_keeps_empty_layout() {
    let mut app = App::new();
    app.add_plugins(CityLayoutPlugin);

    app.world_mut().send_event(RegenerateEvent { seed: 9 });
    app.update();

    assert_eq!(app.world().resource::<Seed>().0, 9);
    assert!(app.world().resource::<CityLayout>().buildings.is_empty());
}
