pub mod create_ingredient;
pub mod list_ingredients;
