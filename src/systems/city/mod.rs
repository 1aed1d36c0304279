// this is the entry point for the city layout plugin
use bevy_app::{App, Plugin, Update};
use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::INITIAL_SEED;

pub mod descriptor;
pub mod generate;
pub mod poly;

use descriptor::{Building, Landmark, Park, River};
use generate::BlockReport;

// my 2d polygon datatype, also used for polylines
pub type Polygon = Vec<Vec2>;

// resources
#[derive(Resource)]
pub struct Seed(pub u64);

/// Output of the last generation pass, ready for instancing.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityLayout {
    pub seed: u64,
    pub rivers: Vec<River>,
    pub parks: Vec<Park>,
    pub landmarks: Vec<Landmark>,
    pub buildings: Vec<Building>,
    pub blocks: Vec<BlockReport>,
}

// Event for regeneration
#[derive(Event)]
pub struct RegenerateEvent {
    pub seed: u64,
}

// main plugin for generation
// expects a `CityDescriptor` resource, regenerates `CityLayout` on every `RegenerateEvent`
pub struct CityLayoutPlugin;

impl Plugin for CityLayoutPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Seed(INITIAL_SEED))
            .init_resource::<CityLayout>()
            .add_event::<RegenerateEvent>()
            .add_systems(Update, generate::handle_regeneration);
    }
}
