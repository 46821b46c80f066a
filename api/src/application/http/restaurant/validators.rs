use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRestaurantValidator {
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "cuisine is limited to 100 characters"))]
    pub cuisine: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(url(message = "image must be a URL"))]
    pub image: Option<String>,
}
