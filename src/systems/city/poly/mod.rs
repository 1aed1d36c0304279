// geometry and layout algorithms

pub mod utils;
pub mod road_mask;
pub mod point_gen;
pub mod landmarks;
pub mod layout;
pub mod filter;
pub mod difference;
