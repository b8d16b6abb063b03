//! UI serving routes
//!
//! HTML shells and scripts are compiled into the binary. Each page script
//! reads `location.pathname` to decide what to render.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const TRAINEE_HTML: &str = include_str!("../ui/trainee.html");
const MANAGER_HTML: &str = include_str!("../ui/manager.html");
const APP_CSS: &str = include_str!("../ui/app.css");
const COMMON_JS: &str = include_str!("../ui/common.js");
const RECORDER_JS: &str = include_str!("../ui/recorder.js");
const TRAINEE_JS: &str = include_str!("../ui/trainee.js");
const MANAGER_JS: &str = include_str!("../ui/manager.js");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /train/:token[/:section]
pub async fn serve_trainee() -> Html<&'static str> {
    Html(TRAINEE_HTML)
}

/// GET /manager[/...]
pub async fn serve_manager() -> Html<&'static str> {
    Html(MANAGER_HTML)
}

fn asset(content_type: &'static str, body: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// GET /static/app.css
pub async fn serve_app_css() -> Response {
    asset("text/css; charset=utf-8", APP_CSS)
}

/// GET /static/common.js
pub async fn serve_common_js() -> Response {
    asset("application/javascript", COMMON_JS)
}

/// GET /static/recorder.js
pub async fn serve_recorder_js() -> Response {
    asset("application/javascript", RECORDER_JS)
}

/// GET /static/trainee.js
pub async fn serve_trainee_js() -> Response {
    asset("application/javascript", TRAINEE_JS)
}

/// GET /static/manager.js
pub async fn serve_manager_js() -> Response {
    asset("application/javascript", MANAGER_JS)
}

/// Page and asset routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/train/:token", get(serve_trainee))
        .route("/train/:token/:section", get(serve_trainee))
        .route("/manager", get(serve_manager))
        .route("/manager/dashboard", get(serve_manager))
        .route("/manager/trainee/:id", get(serve_manager))
        .route("/manager/content", get(serve_manager))
        .route("/static/app.css", get(serve_app_css))
        .route("/static/common.js", get(serve_common_js))
        .route("/static/recorder.js", get(serve_recorder_js))
        .route("/static/trainee.js", get(serve_trainee_js))
        .route("/static/manager.js", get(serve_manager_js))
}
