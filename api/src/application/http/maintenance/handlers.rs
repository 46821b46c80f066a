pub mod process_pending_changes;
pub mod recalculate_hazards;
