pub mod aggregator;
pub mod ports;
pub mod services;

pub use aggregator::{food_hazard_level, restaurant_hazard_level};
pub use ports::*;
