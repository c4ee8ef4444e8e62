// src/handlers/auth.rs

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::{
    common::{error::AppError, json::AppJson, log},
    config::AppState,
    middleware::auth::{removal_cookie, session_cookie, AuthenticatedUser},
    models::usuario::{LoginPayload, LoginResponse, MessageResponse},
};

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Sistema",
    responses((status = 200, description = "Serviço no ar"))
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Autenticação",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado; token no corpo e no cookie", body = LoginResponse),
        (status = 401, description = "E-mail, senha, assinatura ou empresa inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    match app_state.auth_service.login(&payload.email, &payload.senha).await {
        Ok((token, usuario)) => {
            log::access(&usuario, "Login realizado");
            Ok((
                jar.add(session_cookie(token.clone())),
                Json(LoginResponse {
                    success: true,
                    message: "Login realizado com sucesso!".to_string(),
                    token,
                    usuario,
                }),
            ))
        }
        Err(e) => {
            log::audit(log::Actor::email(&payload.email), &format!("Falha de login: {}", e));
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Autenticação",
    responses((status = 200, description = "Sessão encerrada", body = MessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn logout(
    AuthenticatedUser(usuario): AuthenticatedUser,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    log::access(&usuario, "Logout");
    (jar.add(removal_cookie()), Json(MessageResponse::ok("Você saiu do sistema.")))
}
