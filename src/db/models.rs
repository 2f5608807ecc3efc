use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub recipe_title: String,
    pub recipe_content: String,
    pub video_id: Option<String>,
    pub video_url: Option<String>,
    pub video_title: Option<String>,
    pub video_metadata: Option<String>,
}

/// The columns the listing and filter queries read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RecipeSummary {
    pub id: i64,
    pub recipe_title: String,
    pub recipe_content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRecipe {
    pub recipe_title: String,
    pub recipe_content: String,
    pub video_id: Option<String>,
    pub video_url: Option<String>,
    pub video_title: Option<String>,
    pub video_metadata: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecipe {
    pub recipe_title: String,
    pub recipe_content: String,
}

/// Image row without its bytes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImageInfo {
    pub id: i64,
    pub filename: String,
    pub recipe_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub image_data: Vec<u8>,
    pub recipe_id: i64,
}
