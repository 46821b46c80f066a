pub mod audit;
pub mod memory;
pub mod postgres;
