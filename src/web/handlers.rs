use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::{Deserialize, Deserializer};
use std::any::Any;
use tower_cookies::Cookies;
use tracing::{debug, error, info, warn};

use super::flash::{self, Flash};
use crate::{
    api::handlers::AppState,
    catalog::{self, pagination::normalize_page, ListingEntry},
    db::{
        self,
        models::{ImageInfo, NewImage, Recipe, UpdateRecipe},
    },
    error::Error,
    export::{self, EXPORT_FILENAME},
    Result,
};

/// Read `page` leniently: anything that is not an integer falls back to 1
fn deserialize_page<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(normalize_page)
        .unwrap_or(1))
}

fn default_page() -> usize {
    1
}

fn render<T: Template>(template: &T) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// Generic error page template
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: String,
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "404.html")]
struct NotFoundTemplate {
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "500.html")]
struct ServerErrorTemplate {
    flash: Option<Flash>,
}

fn page_response<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Template render failed: {}", e);
            (status, "Internal server error").into_response()
        }
    }
}

/// Error page with a message, optionally carrying a notice
pub fn error_page(status: StatusCode, message: impl Into<String>, flash: Option<Flash>) -> Response {
    page_response(
        status,
        &ErrorTemplate {
            message: message.into(),
            flash,
        },
    )
}

pub fn not_found_page() -> Response {
    page_response(StatusCode::NOT_FOUND, &NotFoundTemplate { flash: None })
}

pub fn server_error_page() -> Response {
    page_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ServerErrorTemplate { flash: None },
    )
}

/// Fallback for unknown routes
pub async fn not_found() -> Response {
    not_found_page()
}

/// Last-resort handler for panics escaping a request
pub fn panic_page(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown error".to_string()
    };

    error!("Unhandled exception: {}", message);
    error_page(StatusCode::INTERNAL_SERVER_ERROR, message, None)
}

/// Listing page template
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    recipes: Vec<ListingEntry>,
    page: usize,
    total_pages: usize,
    flash: Option<Flash>,
}

#[derive(Deserialize)]
pub struct ListingParams {
    #[serde(default = "default_page", deserialize_with = "deserialize_page")]
    page: usize,
}

/// GET / - Paginated recipe listing
pub async fn home(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<ListingParams>,
) -> Response {
    debug!("Home page is loading...");
    let flash = flash::take(&cookies);

    let listing =
        match catalog::list_page(&state.pool, params.page, state.settings.pagination.page_size)
            .await
        {
            Ok(listing) => listing,
            Err(e) => {
                error!("Error in home route: {}", e.log_safe());
                return error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not load recipes.",
                    flash,
                );
            }
        };

    let page = render(&IndexTemplate {
        recipes: listing.entries,
        page: listing.page,
        total_pages: listing.total_pages,
        flash,
    });

    match page {
        Ok(html) => html.into_response(),
        Err(e) => {
            error!("Error in home route: {}", e.log_safe());
            server_error_page()
        }
    }
}

/// Edit form template
#[derive(Template)]
#[template(path = "edit_recipe.html")]
struct EditTemplate {
    recipe: Recipe,
    images: Vec<ImageInfo>,
    flash: Option<Flash>,
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    title: String,
    content: String,
}

fn recipe_not_found(cookies: &Cookies, recipe_id: i64) -> Response {
    warn!("Recipe {} not found", recipe_id);
    flash::push(cookies, Flash::error("Recipe not found"));
    Redirect::to("/").into_response()
}

async fn edit_page(state: &AppState, recipe_id: i64) -> Result<Html<String>> {
    let recipe = db::recipes::get_recipe(&state.pool, recipe_id).await?;
    let images = db::images::list_images_for_recipe(&state.pool, recipe_id).await?;

    render(&EditTemplate {
        recipe,
        images,
        flash: None,
    })
}

/// GET /edit/:id - Edit form
pub async fn edit_form(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(recipe_id): Path<i64>,
) -> Response {
    match edit_page(&state, recipe_id).await {
        Ok(html) => html.into_response(),
        Err(e) if e.is_not_found() => recipe_not_found(&cookies, recipe_id),
        Err(e) => {
            error!("Error in edit route: {}", e.log_safe());
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not load the recipe.",
                Some(Flash::error("An error occurred while editing the recipe")),
            )
        }
    }
}

/// POST /edit/:id - Apply title and content
pub async fn edit_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(recipe_id): Path<i64>,
    Form(form): Form<EditForm>,
) -> Response {
    let update = UpdateRecipe {
        recipe_title: form.title,
        recipe_content: form.content,
    };

    match db::recipes::update_recipe(&state.pool, recipe_id, &update).await {
        Ok(_) => {
            info!("Updated recipe {}", recipe_id);
            flash::push(&cookies, Flash::success("Recipe updated successfully!"));
            Redirect::to("/").into_response()
        }
        Err(e) if e.is_not_found() => recipe_not_found(&cookies, recipe_id),
        Err(e) => {
            error!("Error in edit route: {}", e.log_safe());
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not save the recipe.",
                Some(Flash::error("An error occurred while editing the recipe")),
            )
        }
    }
}

/// POST /delete/:id - Remove a recipe
pub async fn delete_recipe(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(recipe_id): Path<i64>,
) -> Response {
    match db::recipes::delete_recipe(&state.pool, recipe_id).await {
        Ok(()) => {
            info!("Deleted recipe {}", recipe_id);
            flash::push(&cookies, Flash::success("Recipe deleted successfully!"));
            Redirect::to("/").into_response()
        }
        Err(e) if e.is_not_found() => recipe_not_found(&cookies, recipe_id),
        Err(e) => {
            error!("Error in delete route: {}", e.log_safe());
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not delete the recipe.",
                Some(Flash::error("An error occurred while deleting the recipe")),
            )
        }
    }
}

/// Upload success template
#[derive(Template)]
#[template(path = "success.html")]
struct SuccessTemplate {
    name: String,
    recipe_id: i64,
    flash: Option<Flash>,
}

/// The fields of an image upload form, either of which may be absent
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    recipe_id: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> std::result::Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                // A file input left empty is still sent, with no filename
                if !filename.is_empty() {
                    form.file = Some((filename, data.to_vec()));
                }
            }
            "recipe_id" => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    form.recipe_id = Some(value.trim().to_string());
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /upload_image - Attach an image to a recipe
pub async fn upload_image(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected image upload: {}", e.body_text());
            return (e.status(), e.body_text()).into_response();
        }
    };

    let (Some((filename, image_data)), Some(raw_id)) = (form.file, form.recipe_id) else {
        return (StatusCode::BAD_REQUEST, "File or recipe ID not provided").into_response();
    };

    let recipe_id = match raw_id.parse::<i64>() {
        Ok(recipe_id) => recipe_id,
        Err(e) => {
            error!("Error uploading image: invalid recipe ID {:?}: {}", raw_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred: {e}"),
            )
                .into_response();
        }
    };

    let new_image = NewImage {
        filename,
        image_data,
        recipe_id,
    };

    match db::images::create_image(&state.pool, &new_image).await {
        Ok(image) => {
            info!(
                "Stored image {} ({} bytes) for recipe {}",
                image.filename,
                new_image.image_data.len(),
                recipe_id
            );
            match render(&SuccessTemplate {
                name: image.filename,
                recipe_id,
                flash: None,
            }) {
                Ok(html) => html.into_response(),
                Err(e) => {
                    error!("Error uploading image: {}", e.log_safe());
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("An error occurred: {}", e.log_safe()),
                    )
                        .into_response()
                }
            }
        }
        Err(e) if e.is_not_found() => (
            StatusCode::NOT_FOUND,
            format!("No recipe found with ID {raw_id}"),
        )
            .into_response(),
        Err(e) => {
            error!("Error uploading image: {}", e.log_safe());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred: {}", e.log_safe()),
            )
                .into_response()
        }
    }
}

/// GET /export_csv - Download the whole catalog as CSV
pub async fn export_csv(State(state): State<AppState>) -> Response {
    match export::export_csv(&state.pool).await {
        Ok(export) => (
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={EXPORT_FILENAME}"),
                ),
            ],
            export.data,
        )
            .into_response(),
        Err(Error::NotFound(message)) => error_page(StatusCode::NOT_FOUND, message, None),
        Err(e) => {
            error!("Error exporting CSV: {}", e.log_safe());
            server_error_page()
        }
    }
}
