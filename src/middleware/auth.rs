use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::utils::token::{token_from_cookie_header, Claims};
use crate::AppState;

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

/// Bearer header first, then the session cookie. `Err` carries the error
/// code for a header that is present but unusable.
fn extract_token(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| "bad_authorization")?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or("unsupported_scheme")?;
        return Ok(Some(token.trim()));
    }

    Ok(headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_cookie_header))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, Response> {
    let token = match extract_token(headers) {
        Ok(Some(token)) => token,
        Ok(None) => return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization")),
        Err(code) => return Err(reject(StatusCode::UNAUTHORIZED, code)),
    };

    state.jwt.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "rejected session token");
        reject(StatusCode::UNAUTHORIZED, "invalid_token")
    })
}

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(&state, req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(response) => response,
    }
}

/// Attaches claims when a valid token is present and never rejects.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Ok(claims) = authenticate(&state, req.headers()) {
        req.extensions_mut().insert(claims);
    }
    next.run(req).await
}

pub async fn require_mentor(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(&state, req.headers()) {
        Ok(claims) if claims.is_mentor() => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(_) => reject(StatusCode::FORBIDDEN, "forbidden"),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=xyz"));
        assert_eq!(extract_token(&headers), Ok(Some("abc")));
    }

    #[test]
    fn cookie_is_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; auth_token=xyz"));
        assert_eq!(extract_token(&headers), Ok(Some("xyz")));
        assert_eq!(extract_token(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn basic_scheme_is_unsupported() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(extract_token(&headers), Err("unsupported_scheme"));
    }
}
