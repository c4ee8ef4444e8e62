// src/handlers/perfil.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, log},
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::OrigemConfiavel},
    models::usuario::{
        AlterarSenhaPayload, FotoPerfilPayload, MessageResponse, UpdatePerfilPayload, Usuario,
        ValidarSenhaPayload, ValidarSenhaResponse,
    },
};

#[utoipa::path(
    get,
    path = "/api/perfil",
    tag = "Perfil",
    responses((status = 200, description = "Usuário logado", body = Usuario)),
    security(("api_jwt" = []))
)]
pub async fn get_perfil(AuthenticatedUser(usuario): AuthenticatedUser) -> Json<Usuario> {
    log::access(&usuario, "Acesso ao perfil");
    Json(usuario)
}

#[utoipa::path(
    put,
    path = "/api/perfil",
    tag = "Perfil",
    request_body = UpdatePerfilPayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Usuario),
        (status = 409, description = "Nome de usuário já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_perfil(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    AppJson(payload): AppJson<UpdatePerfilPayload>,
) -> Result<Json<Usuario>, AppError> {
    let atualizado = app_state.perfil_service.update(&usuario, &payload).await?;
    log::crud(&usuario, "atualizou o próprio perfil");
    Ok(Json(atualizado))
}

#[utoipa::path(
    post,
    path = "/api/perfil/foto",
    tag = "Perfil",
    request_body = FotoPerfilPayload,
    responses(
        (status = 200, description = "Foto salva", body = Usuario),
        (status = 400, description = "Imagem inválida ou formato não permitido")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_foto(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    AppJson(payload): AppJson<FotoPerfilPayload>,
) -> Result<Json<Usuario>, AppError> {
    let atualizado = app_state
        .perfil_service
        .set_foto(&usuario, &payload.cropped_image_data)
        .await?;
    log::crud(&usuario, "atualizou a foto de perfil");
    Ok(Json(atualizado))
}

#[utoipa::path(
    delete,
    path = "/api/perfil/foto",
    tag = "Perfil",
    responses((status = 200, description = "Foto removida", body = Usuario)),
    security(("api_jwt" = []))
)]
pub async fn delete_foto(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
) -> Result<Json<Usuario>, AppError> {
    let atualizado = app_state.perfil_service.delete_foto(&usuario).await?;
    log::crud(&usuario, "removeu a foto de perfil");
    Ok(Json(atualizado))
}

#[utoipa::path(
    post,
    path = "/api/perfil/senha",
    tag = "Perfil",
    request_body = AlterarSenhaPayload,
    responses(
        (status = 200, description = "Senha alterada", body = MessageResponse),
        (status = 400, description = "Senha atual incorreta ou confirmação diferente")
    ),
    security(("api_jwt" = []))
)]
pub async fn alterar_senha(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    AppJson(payload): AppJson<AlterarSenhaPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    app_state.perfil_service.alterar_senha(&usuario, &payload).await?;
    log::audit(&usuario, "Senha alterada");

    Ok(Json(MessageResponse::ok("Senha alterada com sucesso!")))
}

#[utoipa::path(
    post,
    path = "/api/perfil/validar-senha",
    tag = "Perfil",
    request_body = ValidarSenhaPayload,
    responses(
        (status = 200, description = "Resultado da conferência", body = ValidarSenhaResponse),
        (status = 403, description = "Origem não confiável")
    ),
    security(("api_jwt" = []))
)]
pub async fn validar_senha(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    _origem: OrigemConfiavel,
    AppJson(payload): AppJson<ValidarSenhaPayload>,
) -> Result<Json<ValidarSenhaResponse>, AppError> {
    let valid = app_state
        .perfil_service
        .validar_senha(&usuario, payload.current_password.as_deref())
        .await?;
    Ok(Json(ValidarSenhaResponse { valid }))
}
