// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::ORIGIN, request::Parts},
};
use std::marker::PhantomData;

use crate::{
    common::{error::AppError, log},
    config::{AppState, Config},
    middleware::auth::AuthenticatedUser,
    models::usuario::{Papel, Usuario},
};

/// 1. O Trait que define quem passa pela porta
pub trait RoleDef: Send + Sync + 'static {
    fn allows(usuario: &Usuario, config: &Config) -> bool;
}

/// 2. O Extractor (Guardião). Devolve o usuário já autorizado.
pub struct RequireRole<T>(pub Usuario, pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let AuthenticatedUser(usuario) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !T::allows(&usuario, &app_state.config) {
            log::audit(&usuario, &format!("Acesso negado a {}", parts.uri.path()));
            return Err(AppError::AcessoNegado("Acesso negado!".to_string()));
        }

        Ok(RequireRole(usuario, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct SomenteAdm;
impl RoleDef for SomenteAdm {
    fn allows(usuario: &Usuario, _: &Config) -> bool {
        usuario.papel == Papel::Adm
    }
}

pub struct AdmOuEditor;
impl RoleDef for AdmOuEditor {
    fn allows(usuario: &Usuario, _: &Config) -> bool {
        usuario.papel.pode_editar()
    }
}

pub struct SuperAdmin;
impl RoleDef for SuperAdmin {
    fn allows(usuario: &Usuario, config: &Config) -> bool {
        config.is_super_admin(&usuario.email)
    }
}

/// `Origin` ausente passa; presente, precisa conter um host permitido.
pub fn origem_confiavel(origin: Option<&str>, allowed: &[String]) -> bool {
    match origin {
        None => true,
        Some(origin) => allowed.iter().any(|host| origin.contains(host.as_str())),
    }
}

/// Barra requisições de origem não confiável (validação de senha).
pub struct OrigemConfiavel;

impl<S> FromRequestParts<S> for OrigemConfiavel
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let origin = parts.headers.get(ORIGIN).and_then(|v| v.to_str().ok());

        if origem_confiavel(origin, &app_state.config.allowed_origins) {
            return Ok(OrigemConfiavel);
        }

        let evento = format!("Origem não confiável bloqueada: {}", origin.unwrap_or_default());
        match parts.extensions.get::<AuthenticatedUser>() {
            Some(AuthenticatedUser(usuario)) => log::audit(usuario, &evento),
            None => log::audit(log::Actor::anonimo(), &evento),
        }
        Err(AppError::OrigemNaoConfiavel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn usuario(papel: Papel, email: &str) -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            email: email.into(),
            nome: "Teste".into(),
            username: None,
            foto_perfil: None,
            senha_hash: String::new(),
            papel,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn state() -> AppState {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::with_pool(config, pool)
    }

    #[test]
    fn role_gates() {
        let config = Config::for_tests();
        let editor = usuario(Papel::Editor, "ed@studio.com");
        let viewer = usuario(Papel::Visualizador, "vi@studio.com");
        let adm = usuario(Papel::Adm, "adm@studio.com");

        assert!(SomenteAdm::allows(&adm, &config));
        assert!(!SomenteAdm::allows(&editor, &config));
        assert!(AdmOuEditor::allows(&editor, &config));
        assert!(!AdmOuEditor::allows(&viewer, &config));
        assert!(!SuperAdmin::allows(&adm, &config));
        assert!(SuperAdmin::allows(&usuario(Papel::Adm, &config.super_admin_email), &config));
    }

    #[test]
    fn origin_must_contain_an_allowed_host() {
        let allowed = vec!["localhost".to_string(), "formaturas.app".to_string()];
        assert!(origem_confiavel(None, &allowed));
        assert!(origem_confiavel(Some("https://formaturas.app"), &allowed));
        assert!(origem_confiavel(Some("http://localhost:3000"), &allowed));
        assert!(!origem_confiavel(Some("https://evil.example"), &allowed));
    }

    #[tokio::test]
    async fn viewer_is_denied_admin_routes() {
        let state = state();
        let (mut parts, _) = Request::builder()
            .uri("/api/equipe")
            .extension(AuthenticatedUser(usuario(Papel::Visualizador, "vi@studio.com")))
            .body(())
            .unwrap()
            .into_parts();

        let result = RequireRole::<SomenteAdm>::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AppError::AcessoNegado(_))));
    }

    #[tokio::test]
    async fn untrusted_origin_is_rejected() {
        let state = state();
        let (mut parts, _) = Request::builder()
            .header(ORIGIN, "https://evil.example")
            .body(())
            .unwrap()
            .into_parts();

        let result = OrigemConfiavel::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AppError::OrigemNaoConfiavel)));
    }
}
