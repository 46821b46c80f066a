pub mod food;
pub mod health;
pub mod ingredient;
pub mod maintenance;
pub mod proposal;
pub mod restaurant;
pub mod server;
