pub mod approve_food;
pub mod create_food;
pub mod get_food;
pub mod list_approvable;
pub mod list_foods;
