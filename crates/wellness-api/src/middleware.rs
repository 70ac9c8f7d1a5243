use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::AppState;
use crate::auth::verify_token;
use crate::error::ApiError;
use crate::run_blocking;
use crate::users::user_profile;

/// Extract and validate the JWT from the Authorization header, then load the
/// user it names. Handlers behind this layer receive an
/// `Extension<UserProfile>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized("Missing bearer token"))?;

    let claims = verify_token(&state.auth.jwt_secret, bearer.token())
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token"))?;

    let user_id = claims.sub.to_string();
    let row = run_blocking(&state, move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or(ApiError::Unauthorized("User not found"))?;

    req.extensions_mut().insert(user_profile(row)?);
    Ok(next.run(req).await)
}
