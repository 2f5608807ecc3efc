use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::{
    api::models::*,
    catalog::{self, pagination::normalize_page, FilterPage, RecipeFilter, SearchHit},
    config::Settings,
    db::{self, DbPool},
    Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub settings: Settings,
}

/// GET /search - Full-text search over the whole catalog
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>> {
    debug!("Search request: {:?}", params);

    let hits =
        catalog::full_text_search(&state.pool, &params.q, state.settings.pagination.page_size)
            .await?;

    Ok(Json(hits))
}

fn parse_page(raw: Option<&str>) -> Result<usize> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(1),
        Some(s) => s
            .parse::<i64>()
            .map(normalize_page)
            .map_err(|_| Error::Validation(format!("Invalid page value: {s}"))),
    }
}

async fn run_double_filter(state: &AppState, params: DoubleFilterParams) -> Result<FilterPage> {
    let page = parse_page(params.page.as_deref())?;
    let filter = RecipeFilter {
        flavor_profile: params.flavor_profile,
        meat_type: params.meat_type,
        query: params.q,
    };

    catalog::double_filter(
        &state.pool,
        &filter,
        page,
        state.settings.pagination.page_size,
    )
    .await
}

/// GET /double_filter_search - Flavor, meat type and text combined
///
/// Failures never reach the client in detail; they get a fixed error object.
pub async fn double_filter_search(
    State(state): State<AppState>,
    Query(params): Query<DoubleFilterParams>,
) -> Json<Value> {
    debug!("Double filter request: {:?}", params);

    match run_double_filter(&state, params).await {
        Ok(page) => Json(json!(page)),
        Err(e) => {
            error!("Error in double filter search route: {}", e.log_safe());
            Json(json!({
                "error": "An error occurred while processing the search.",
            }))
        }
    }
}

/// Metadata blobs are returned as JSON when they parse, otherwise as a string
fn metadata_value(raw: Option<String>) -> Value {
    match raw {
        None => Value::Null,
        Some(s) => serde_json::from_str(&s).unwrap_or_else(|_| Value::String(s)),
    }
}

/// GET /video_data/:title - Video metadata for an exact title
pub async fn video_data(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<VideoData>> {
    debug!("Video data request: {}", title);

    let recipe = db::recipes::find_recipe_by_title(&state.pool, &title).await?;

    let Some(recipe) = recipe else {
        return Err(Error::NotFound("Recipe not found".to_string()));
    };
    let Some(video_id) = recipe.video_id.filter(|id| !id.is_empty()) else {
        return Err(Error::NotFound("Recipe not found".to_string()));
    };

    Ok(Json(VideoData {
        video_id,
        video_url: recipe.video_url,
        video_title: recipe.video_title,
        video_metadata: metadata_value(recipe.video_metadata),
    }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}
