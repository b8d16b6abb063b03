//! Manager login and session middleware
//!
//! One shared manager password. A successful login sets a signed
//! `manager_session` cookie that the middleware checks on manager routes.

use admit_common::session::{self, SESSION_COOKIE};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::cookie::{time::Duration as CookieDuration, SameSite};
use tower_cookies::{Cookie, Cookies};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::milliseconds(session::SESSION_TTL_MS))
        .build()
}

/// POST /api/manager
///
/// Verifies the manager password and starts a session.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let Some(expected) = state.config.manager_password.as_deref() else {
        return Err(ApiError::internal("Manager password not configured"));
    };

    let provided = request.password.unwrap_or_default();
    if !session::verify_password(&provided, expected) {
        warn!("Manager login rejected");
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    let token = session::issue_token(&state.session_secret, admit_common::time::now_millis());
    cookies.add(session_cookie(token, state.config.secure_cookies));
    info!("Manager logged in");

    Ok(Json(json!({ "success": true })))
}

/// POST /api/manager/logout
pub async fn logout(cookies: Cookies) -> Json<Value> {
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    Json(json!({ "success": true }))
}

/// Rejects requests without a valid manager session cookie
pub async fn require_manager(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    };

    if let Err(e) = session::validate_token(
        cookie.value(),
        &state.session_secret,
        admit_common::time::now_millis(),
    ) {
        debug!(path = %request.uri().path(), "Manager session rejected: {}", e);
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("123.abc".to_string(), true);
        assert_eq!(cookie.name(), "manager_session");
        assert_eq!(cookie.value(), "123.abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(24)));
    }
}
