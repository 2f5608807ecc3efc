use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use recipe_catalog::api::{handlers::AppState, routes};
use recipe_catalog::db::models::NewRecipe;
use recipe_catalog::db::{self, images, recipes, DbPool};
use recipe_catalog::Settings;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "recipe-catalog-boundary";

async fn test_app() -> (Router, DbPool) {
    let settings = Settings::in_memory();
    let pool = db::init_pool(&settings.database.url)
        .await
        .expect("Failed to create in-memory database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState {
        pool: pool.clone(),
        settings: settings.clone(),
    };
    let app = routes::create_router(state, &settings).expect("Failed to build router");

    (app, pool)
}

async fn add_recipe(pool: &DbPool, title: &str, content: &str) -> i64 {
    recipes::create_recipe(
        pool,
        &NewRecipe {
            recipe_title: title.to_string(),
            recipe_content: content.to_string(),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create recipe")
    .id
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_upload(recipe_id: Option<&str>, file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(id) = recipe_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"recipe_id\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload_image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn flash_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("flash="))
        .map(str::to_string)
}

#[tokio::test]
async fn test_home_lists_cleaned_titles() {
    let (app, pool) = test_app().await;
    add_recipe(&pool, "“Shakshuka” (Quick)", "eggs, tomatoes").await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Shakshuka Quick"));
}

#[tokio::test]
async fn test_home_with_garbage_page_falls_back_to_first() {
    let (app, pool) = test_app().await;
    add_recipe(&pool, "Dal", "lentils").await;

    let response = app.oneshot(get("/?page=abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Dal"));
}

#[tokio::test]
async fn test_search_endpoint_returns_listing_pages() {
    let (app, pool) = test_app().await;
    for i in 1..=6 {
        add_recipe(&pool, &format!("Soup {i}"), "broth").await;
    }
    add_recipe(&pool, "Risotto", "arborio rice").await;

    let response = app.clone().oneshot(get("/search?q=arborio")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let hits: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["title"], "Risotto");
    assert_eq!(hits[0]["description"], "arborio rice");
    assert_eq!(hits[0]["page"], 2);

    let response = app.oneshot(get("/search?q=")).await.unwrap();
    let hits: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(hits, serde_json::json!([]));
}

#[tokio::test]
async fn test_double_filter_endpoint_shape() {
    let (app, pool) = test_app().await;
    add_recipe(&pool, "Jerk Chicken", "spicy chicken thighs").await;
    add_recipe(&pool, "Beef Stew", "mild beef chuck").await;

    let response = app
        .clone()
        .oneshot(get("/double_filter_search?flavor_profile=SPICY&meat_type=chicken"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(page["total_pages"], 1);
    assert_eq!(page["current_page"], 1);
    assert_eq!(page["results"][0]["title"], "Jerk Chicken");
    assert_eq!(page["results"].as_array().unwrap().len(), 1);

    let response = app
        .oneshot(get("/double_filter_search?page=two"))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body["error"],
        "An error occurred while processing the search."
    );
}

#[tokio::test]
async fn test_video_data_lookup() {
    let (app, pool) = test_app().await;
    recipes::create_recipe(
        &pool,
        &NewRecipe {
            recipe_title: "Birria".to_string(),
            recipe_content: "goat, chiles".to_string(),
            video_id: Some("abc123".to_string()),
            video_url: Some("https://video.example/abc123".to_string()),
            video_title: Some("Birria at home".to_string()),
            video_metadata: Some(r#"{"duration": 600}"#.to_string()),
        },
    )
    .await
    .unwrap();
    add_recipe(&pool, "No Video", "plain").await;

    let response = app.clone().oneshot(get("/video_data/Birria")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let video: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(video["video_id"], "abc123");
    assert_eq!(video["video_metadata"]["duration"], 600);

    let response = app
        .clone()
        .oneshot(get("/video_data/No%20Video"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/video_data/Missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("Recipe not found"));
}

#[tokio::test]
async fn test_edit_updates_and_redirects_with_notice() {
    let (app, pool) = test_app().await;
    let id = add_recipe(&pool, "Old title", "old content").await;

    let response = app.clone().oneshot(get(&format!("/edit/{id}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Old title"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/edit/{id}"))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title=New+title&content=new+content"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    assert!(flash_cookie(&response).unwrap().contains("success"));

    let recipe = recipes::get_recipe(&pool, id).await.unwrap();
    assert_eq!(recipe.recipe_title, "New title");
    assert_eq!(recipe.recipe_content, "new content");
}

#[tokio::test]
async fn test_missing_recipe_redirects_with_error_notice() {
    let (app, _pool) = test_app().await;

    let response = app.clone().oneshot(get("/edit/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_cookie(&response).unwrap().contains("error"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/delete/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_cookie(&response).unwrap().contains("error"));
}

#[tokio::test]
async fn test_delete_then_fetch_is_not_found() {
    let (app, pool) = test_app().await;
    let id = add_recipe(&pool, "Temporary", "gone soon").await;
    add_recipe(&pool, "Keeper", "stays").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/delete/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_cookie(&response).unwrap().contains("success"));

    assert!(recipes::get_recipe(&pool, id).await.unwrap_err().is_not_found());
    assert_eq!(recipes::count_all_recipes(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_flash_notice_is_shown_once() {
    let (app, pool) = test_app().await;
    add_recipe(&pool, "Bibimbap", "rice, gochujang").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, "flash=success:Recipe%20updated%20successfully%21")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // The notice is consumed: the cookie comes back expired
    assert!(flash_cookie(&response).is_some());
    assert!(body_text(response).await.contains("Recipe updated successfully!"));
}

#[tokio::test]
async fn test_upload_image_flow() {
    let (app, pool) = test_app().await;
    let id = add_recipe(&pool, "Focaccia", "flour, olive oil").await;

    let response = app
        .clone()
        .oneshot(multipart_upload(
            Some(&id.to_string()),
            Some(("focaccia.png", &[0x89, b'P', b'N', b'G'])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("focaccia.png"));
    assert_eq!(images::count_images(&pool).await.unwrap(), 1);

    let response = app
        .clone()
        .oneshot(multipart_upload(Some("999"), Some(("ghost.png", &[1, 2]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "No recipe found with ID 999");
    assert_eq!(images::count_images(&pool).await.unwrap(), 1);

    let response = app
        .oneshot(multipart_upload(None, Some(("orphan.png", &[1]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "File or recipe ID not provided");
}

#[tokio::test]
async fn test_export_csv_attachment() {
    let (app, pool) = test_app().await;

    let response = app.clone().oneshot(get("/export_csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("No recipes found to export."));

    add_recipe(&pool, "Paella", "rice, saffron").await;

    let response = app.oneshot(get("/export_csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=recipe_export.csv"
    );

    let csv = body_text(response).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,recipe_title,recipe_content,video_id,video_url,video_title,video_metadata"
    );
    assert_eq!(lines.next().unwrap(), "1,Paella,\"rice, saffron\",,,,");
}

#[tokio::test]
async fn test_upload_with_non_numeric_recipe_id_is_server_error() {
    let (app, pool) = test_app().await;
    add_recipe(&pool, "Naan", "flour, yoghurt").await;

    let response = app
        .oneshot(multipart_upload(Some("abc"), Some(("naan.png", &[1, 2, 3]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_text(response).await,
        "An error occurred: invalid digit found in string"
    );
    assert_eq!(images::count_images(&pool).await.unwrap(), 0);
}

/// Leave the pool usable but make every recipe query fail
async fn break_store(pool: &DbPool) {
    sqlx::query("DROP TABLE recipe")
        .execute(pool)
        .await
        .expect("Failed to drop recipe table");
}

fn post(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_home_failure_renders_error_page_with_pending_notice() {
    let (app, pool) = test_app().await;
    break_store(&pool).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, "flash=success:Recipe%20deleted%20successfully%21")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Could not load recipes."));
    assert!(html.contains("Recipe deleted successfully!"));
}

#[tokio::test]
async fn test_edit_and_delete_failures_render_error_page() {
    let (app, pool) = test_app().await;
    add_recipe(&pool, "Ramen", "noodles").await;
    break_store(&pool).await;

    let response = app.clone().oneshot(get("/edit/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response)
        .await
        .contains("An error occurred while editing the recipe"));

    let response = app
        .clone()
        .oneshot(post("/edit/1", "title=Udon&content=thick+noodles"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Could not save the recipe."));
    assert!(html.contains("An error occurred while editing the recipe"));

    let response = app.oneshot(post("/delete/1", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Could not delete the recipe."));
    assert!(html.contains("An error occurred while deleting the recipe"));
}

#[tokio::test]
async fn test_query_failures_never_leak_details() {
    let (app, pool) = test_app().await;
    add_recipe(&pool, "Laksa", "coconut curry").await;
    break_store(&pool).await;

    let response = app.clone().oneshot(get("/export_csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("Server error"));

    let response = app
        .clone()
        .oneshot(get("/double_filter_search?meat_type=chicken"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "error": "An error occurred while processing the search." })
    );

    let response = app.oneshot(get("/search?q=curry")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Database error");
}
