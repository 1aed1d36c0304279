// procedural city block layout: landmarks and building footprints from a declarative city descriptor

pub mod config;
pub mod error;
pub mod systems;

#[cfg(test)]
pub mod test;

pub use error::CityError;
pub use systems::city::descriptor::CityDescriptor;
pub use systems::city::generate::generate_city;
pub use systems::city::{CityLayout, CityLayoutPlugin, RegenerateEvent};
