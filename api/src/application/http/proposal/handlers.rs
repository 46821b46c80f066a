pub mod cast_vote;
pub mod get_proposal;
pub mod list_pending;
pub mod submit_change;
pub mod submit_removal;
