use std::sync::Arc;

use foodwatch_core::application::FoodwatchService;

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: FoodwatchService,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: FoodwatchService) -> Self {
        Self { args, service }
    }
}
