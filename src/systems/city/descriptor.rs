// city descriptor, the declarative input of a generation pass
// loaded from JSON, merged with defaults and optionally validated before use

use std::fmt;
use std::path::Path;

use bevy_ecs::prelude::Resource;
use bevy_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::*;
use crate::error::CityError;
use crate::systems::city::Polygon;

/// Block population strategy. Unknown names deserialize to `Fill`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Layout {
    #[default]
    Fill,
    Perimeter,
    Scatter,
}

impl From<String> for Layout {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "perimeter" => Layout::Perimeter,
            "scatter" => Layout::Scatter,
            _ => Layout::Fill,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Fill => "fill",
            Layout::Perimeter => "perimeter",
            Layout::Scatter => "scatter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roads {
    #[serde(default = "default_road_width")]
    pub width: f32,
    #[serde(default)]
    pub lines: Vec<Polygon>, // polylines, every consecutive pair is a segment
}

fn default_road_width() -> f32 {
    DEFAULT_ROAD_WIDTH
}

impl Default for Roads {
    fn default() -> Self {
        Self {
            width: DEFAULT_ROAD_WIDTH,
            lines: Vec::new(),
        }
    }
}

impl Roads {
    /// Every consecutive point pair of every line.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.lines
            .iter()
            .flat_map(|line| line.windows(2).map(|pair| (pair[0], pair[1])))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Park {
    pub vertices: Polygon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct River {
    pub vertices: Polygon,
}

/// A placed building. Landmarks share the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub center: Vec2,
    pub size: Vec3, // (width, length, height)
    #[serde(default)]
    pub rotation: f32, // degrees
}

pub type Landmark = Building;

impl Building {
    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn length(&self) -> f32 {
        self.size.y
    }

    pub fn height(&self) -> f32 {
        self.size.z
    }

    pub fn footprint_area(&self) -> f32 {
        self.size.x * self.size.y
    }

    pub fn rect(&self) -> Polygon {
        crate::systems::city::poly::utils::building_rect(self.center, self.width(), self.length(), self.rotation)
    }
}

/// Optional block fields shared by `buildings.defaults` and every block entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec2>, // (width, length)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Vec2>, // (min, max)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

/// A block as written in the descriptor. Unset fields come from the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub boundary: Polygon,
    #[serde(flatten)]
    pub overrides: BlockDefaults,
}

/// A fully resolved block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub boundary: Polygon,
    pub size: Vec2,
    pub height: Vec2,
    pub spacing: f32,
    pub coverage: f32,
    pub layout: Layout,
}

impl BlockSpec {
    /// Shallow, field-wise merge: block fields win over `defaults`, which win over built-ins.
    pub fn resolve(&self, defaults: &BlockDefaults) -> Block {
        let own = &self.overrides;
        Block {
            boundary: self.boundary.clone(),
            size: own
                .size
                .or(defaults.size)
                .unwrap_or(Vec2::new(DEFAULT_BUILDING_WIDTH, DEFAULT_BUILDING_LENGTH)),
            height: own
                .height
                .or(defaults.height)
                .unwrap_or(Vec2::new(DEFAULT_HEIGHT_MIN, DEFAULT_HEIGHT_MAX)),
            spacing: own.spacing.or(defaults.spacing).unwrap_or(DEFAULT_SPACING),
            coverage: own.coverage.or(defaults.coverage).unwrap_or(DEFAULT_COVERAGE),
            layout: own.layout.or(defaults.layout).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingsSpec {
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub defaults: BlockDefaults,
}

/// Declarative description of a city.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityDescriptor {
    #[serde(default)]
    pub roads: Roads,
    #[serde(default)]
    pub parks: Vec<Park>,
    #[serde(default)]
    pub rivers: Vec<River>,
    #[serde(default)]
    pub buildings: BuildingsSpec,
}

impl CityDescriptor {
    pub fn from_json_str(json: &str) -> Result<Self, CityError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CityError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Blocks with defaults applied, in descriptor order.
    pub fn resolved_blocks(&self) -> Vec<Block> {
        self.buildings
            .blocks
            .iter()
            .map(|spec| spec.resolve(&self.buildings.defaults))
            .collect()
    }

    /// Pre-flight checks. The engine itself accepts anything, this catches
    /// inputs that would make its output meaningless.
    pub fn validate(&self) -> Result<(), CityError> {
        if self.roads.width <= 0.0 || !self.roads.width.is_finite() {
            return Err(CityError::InvalidRoadWidth(self.roads.width));
        }
        if let Some(line) = self.roads.lines.iter().position(|line| line.len() < 2) {
            return Err(CityError::ShortRoadLine { line });
        }

        for (block, resolved) in self.resolved_blocks().iter().enumerate() {
            if resolved.boundary.len() < 3 {
                return Err(CityError::DegenerateBoundary {
                    block,
                    vertices: resolved.boundary.len(),
                });
            }
            if !(0.0..=1.0).contains(&resolved.coverage) {
                return Err(CityError::CoverageOutOfRange {
                    block,
                    coverage: resolved.coverage,
                });
            }
            if resolved.size.x <= 0.0 || resolved.size.y <= 0.0 {
                return Err(CityError::InvalidBuildingSize { block });
            }
            if resolved.height.x > resolved.height.y {
                return Err(CityError::InvertedHeightRange {
                    block,
                    min: resolved.height.x,
                    max: resolved.height.y,
                });
            }
            if resolved.spacing < 0.0 {
                return Err(CityError::NegativeSpacing {
                    block,
                    spacing: resolved.spacing,
                });
            }
        }

        Ok(())
    }
}
