// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    common::{error::AppError, log},
    config::AppState,
    middleware::tenancy::TenantContext,
    models::usuario::Usuario,
    services::auth::{hoje, verificar_sessao},
};

pub const SESSION_COOKIE: &str = "formaturas_token";

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie vazio com `Max-Age=0`: o navegador apaga a sessão.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

// Bearer tem prioridade; o navegador manda o cookie
fn token_from(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Carrega usuário e empresa a cada requisição e encerra a sessão se a
/// empresa estiver inativa ou com a assinatura vencida.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from(request.headers()).ok_or(AppError::InvalidToken)?;
    let (usuario, empresa) = app_state.auth_service.validate_token(&token).await?;

    if let Err(e) = verificar_sessao(&empresa, hoje()) {
        log::audit(&usuario, &format!("Sessão encerrada: {}", e));
        return Err(e);
    }

    request.extensions_mut().insert(TenantContext(usuario.empresa_id));
    request.extensions_mut().insert(empresa);
    request.extensions_mut().insert(AuthenticatedUser(usuario));
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Usuario);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(COOKIE, HeaderValue::from_static("formaturas_token=xyz"));
        assert_eq!(token_from(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_used_without_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("outro=1; formaturas_token=xyz"));
        assert_eq!(token_from(&headers).as_deref(), Some("xyz"));
        assert_eq!(token_from(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("tok".into()).to_string();
        assert!(cookie.starts_with("formaturas_token=tok"));
        assert!(cookie.contains("HttpOnly"));
    }
}
