use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ServiceError, ServiceResult},
    models::CurrentUser,
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id
    pub email: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

/// Verifies an HS256 token and returns the user id it was issued for.
pub fn extract_user_id(token: &str, secret: &str) -> ServiceResult<String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| ServiceError::Unauthorized(format!("error parsing token: {e}")))?;

    let user_id = data.claims.email.trim();
    if user_id.is_empty() {
        return Err(ServiceError::Unauthorized("email not found in token".into()));
    }
    Ok(user_id.to_string())
}

pub fn make_jwt_with_minutes(secret: &str, user_id: &str, minutes: i64) -> ServiceResult<String> {
    let exp = (Utc::now() + Duration::minutes(minutes)).timestamp().max(0) as usize;

    let claims = Claims {
        email: user_id.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Unauthorized(e.to_string()))
}

/// `Authorization: <token>` or `Authorization: Bearer <token>`.
fn get_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();

    (!token.is_empty()).then(|| token.to_string())
}

pub async fn inject_current_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(token) = get_token(req.headers()) {
        match extract_user_id(&token, &state.settings.jwt_secret) {
            // Store user in request extensions so handlers can access it
            Ok(id) => {
                req.extensions_mut().insert(CurrentUser { id });
            }
            Err(e) => tracing::debug!(error = %e, "rejected bearer token"),
        }
    }

    next.run(req).await
}

fn is_public_path(path: &str) -> bool {
    path == "/health"
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    // If inject_current_user already put CurrentUser in extensions => authenticated
    if req.extensions().get::<CurrentUser>().is_some() {
        return next.run(req).await;
    }

    let msg = if req.headers().contains_key(header::AUTHORIZATION) {
        "invalid or expired token"
    } else {
        "no token found"
    };
    ServiceError::Unauthorized(msg.into()).into_response()
}
