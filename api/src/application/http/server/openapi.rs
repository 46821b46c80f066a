use utoipa::OpenApi;

use crate::application::http::{
    food::router::FoodApiDoc,
    health::HealthApiDoc,
    ingredient::router::IngredientApiDoc,
    maintenance::router::MaintenanceApiDoc,
    proposal::router::{FoodProposalApiDoc, ProposalApiDoc},
    restaurant::router::RestaurantApiDoc,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Foodwatch API"
    ),
    nest(
        (path = "/foods", api = FoodApiDoc),
        (path = "/foods/{food_id}", api = FoodProposalApiDoc),
        (path = "/proposals", api = ProposalApiDoc),
        (path = "/restaurants", api = RestaurantApiDoc),
        (path = "/ingredients", api = IngredientApiDoc),
        (path = "/maintenance", api = MaintenanceApiDoc),
        (path = "/health", api = HealthApiDoc),
    )
)]
pub struct ApiDoc;
