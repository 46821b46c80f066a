pub mod approval;
pub mod audit;
pub mod authentication;
pub mod catalog;
pub mod common;
pub mod hazard;
pub mod health;
pub mod proposal;
