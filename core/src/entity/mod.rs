//! sea-orm models for the tables created by `migrations/`.

pub mod food_approvals;
pub mod food_change_approvals;
pub mod food_changes;
pub mod food_ingredients;
pub mod foods;
pub mod ingredients;
pub mod restaurants;
pub mod users;
