use axum::{
    body::Body,
    extract::{ConnectInfo, DefaultBodyLimit},
    http::{header, HeaderValue, Request, StatusCode},
    middleware,
    response::Response,
    routing::{get, post, MethodRouter},
    Router,
};
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorError, GovernorLayer,
};
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::api::handlers::{self as api_handlers, AppState};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::web::handlers as web_handlers;

/// Rate-limit key: the peer IP when the server was started with connect info,
/// localhost otherwise (tests, or a proxy that hides the client).
#[derive(Clone, Copy, Debug)]
struct FallbackIpKeyExtractor;

impl KeyExtractor for FallbackIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(&self, req: &Request<B>) -> std::result::Result<Self::Key, GovernorError> {
        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

/// Apply a per-IP budget of `per_minute` requests, replenished evenly
fn rate_limited(router: Router, per_minute: u32) -> Result<Router> {
    let per_minute = per_minute.max(1);
    let replenish_ms = (60_000 / u64::from(per_minute)).max(1);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_millisecond(replenish_ms)
            .burst_size(per_minute)
            .finish()
            .ok_or_else(|| Error::Config(format!("Invalid rate limit: {per_minute}/minute")))?,
    );

    Ok(router.layer(GovernorLayer {
        config: governor_conf,
    }))
}

/// A single route with its own per-IP budget
fn limited_route(
    path: &str,
    method_router: MethodRouter<AppState>,
    state: &AppState,
    per_minute: u32,
) -> Result<Router> {
    let router = Router::new()
        .route(path, method_router)
        .with_state(state.clone());

    rate_limited(router, per_minute)
}

/// Rewrite the limiter's plain-text rejection as the JSON notice clients expect
async fn rate_limit_notice(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    let body = json!({ "error": "Too many requests, slow down" }).to_string();

    Response::from_parts(parts, Body::from(body))
}

/// Create the router with all endpoints (HTML pages + JSON API)
pub fn create_router(state: AppState, settings: &Settings) -> Result<Router> {
    let limits = &settings.rate_limit;

    let default_routes: [(&str, MethodRouter<AppState>); 6] = [
        ("/", get(web_handlers::home)),
        ("/search", get(api_handlers::search_recipes)),
        (
            "/double_filter_search",
            get(api_handlers::double_filter_search),
        ),
        (
            "/edit/:recipe_id",
            get(web_handlers::edit_form).post(web_handlers::edit_submit),
        ),
        ("/delete/:recipe_id", post(web_handlers::delete_recipe)),
        ("/export_csv", get(web_handlers::export_csv)),
    ];

    let mut router = Router::new();
    for (path, method_router) in default_routes {
        router = router.merge(limited_route(
            path,
            method_router,
            &state,
            limits.default_per_minute,
        )?);
    }

    router = router.merge(limited_route(
        "/video_data/:title",
        get(api_handlers::video_data),
        &state,
        limits.video_per_minute,
    )?);

    router = router.merge(limited_route(
        "/upload_image",
        post(web_handlers::upload_image)
            .layer(DefaultBodyLimit::max(settings.server.max_upload_size)),
        &state,
        limits.upload_per_minute,
    )?);

    let health_routes = Router::new().route("/health", get(api_handlers::health_check));

    // Static file serving
    let static_routes = Router::new().nest_service("/static", ServeDir::new("src/web/static"));

    let router = router
        .merge(health_routes)
        .merge(static_routes)
        .fallback(web_handlers::not_found)
        .layer(middleware::map_response(rate_limit_notice))
        .layer(CookieManagerLayer::new())
        .layer(
            // Uploads are the largest bodies this app accepts
            RequestBodyLimitLayer::new(settings.server.max_upload_size),
        )
        .layer(
            // Security headers
            SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(
                "default-src 'self'; style-src 'self'; script-src 'self'; img-src 'self' data:; object-src 'none'; base-uri 'self'",
            ),
        ))
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::custom(web_handlers::panic_page))
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
