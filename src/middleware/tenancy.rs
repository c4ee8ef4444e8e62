// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// A empresa do usuário logado. Vem sempre da sessão, nunca de cabeçalho do
// cliente: toda consulta por tenant usa este id.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn tenant_comes_from_the_session() {
        let id = Uuid::new_v4();
        let (mut parts, _) = Request::builder().extension(TenantContext(id)).body(()).unwrap().into_parts();
        let TenantContext(found) = TenantContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, id);
    }

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let (mut parts, _) = Request::builder()
            .header("x-tenant-id", Uuid::new_v4().to_string())
            .body(())
            .unwrap()
            .into_parts();
        let err = TenantContext::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
