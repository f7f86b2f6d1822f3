use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::IntoResponse,
};
use vaultix_core::error::AppError;

use crate::{
    models::{Role, User},
    services::TokenStage,
    AppState,
};

/// Middleware gating protected routes on an authenticated-stage bearer
/// token. An otp-stage token never passes here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let claims = state
        .tokens
        .verify(token)
        .filter(|c| c.stage == TokenStage::Auth)
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid or expired token")))?;

    // Tokens are stateless, but the identity must still resolve to a live
    // user record.
    let user = state
        .store
        .find_user_by_id(&claims.user_id)
        .await
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Unknown user")))?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Extractor handing handlers the resolved user record.
#[derive(Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("User missing from request extensions"))
        })
    }
}

/// Role gate. An empty allow-list admits any authenticated user.
pub fn authorize(user: &User, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.is_empty() || allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, role = %user.role, "Role not permitted for operation");
        Err(AppError::Forbidden(anyhow::anyhow!("Forbidden")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user_with_role(role: Role) -> User {
        User::new(
            "Test".to_string(),
            "test@example.com".to_string(),
            role,
            None,
            "$argon2id$stub".to_string(),
        )
    }

    #[test]
    fn matching_role_is_allowed() {
        let user = user_with_role(Role::DataOwner);
        assert!(authorize(&user, &[Role::DataOwner]).is_ok());
        assert!(authorize(&user, &[Role::DataOwner, Role::TrustAuthority]).is_ok());
    }

    #[test]
    fn non_member_role_is_forbidden() {
        let user = user_with_role(Role::DataUser);
        let err = authorize(&user, &[Role::DataOwner]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn empty_allow_list_admits_everyone() {
        for role in [Role::DataOwner, Role::DataUser, Role::TrustAuthority] {
            assert!(authorize(&user_with_role(role), &[]).is_ok());
        }
    }
}
