pub mod create_restaurant;
pub mod get_restaurant;
