// src/handlers/equipe.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, log},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, SomenteAdm},
        tenancy::TenantContext,
    },
    models::usuario::{CreateUsuarioPayload, MessageResponse, UpdateUsuarioPayload, Usuario},
};

#[utoipa::path(
    get,
    path = "/api/equipe",
    tag = "Equipe",
    responses((status = 200, description = "Usuários da empresa", body = Vec<Usuario>)),
    security(("api_jwt" = []))
)]
pub async fn list_equipe(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    tenant: TenantContext,
) -> Result<Json<Vec<Usuario>>, AppError> {
    log::access(&usuario, "Acesso à página de equipe");
    Ok(Json(app_state.equipe_service.list(tenant.0).await?))
}

#[utoipa::path(
    post,
    path = "/api/equipe",
    tag = "Equipe",
    request_body = CreateUsuarioPayload,
    responses(
        (status = 201, description = "Usuário criado", body = Usuario),
        (status = 409, description = "E-mail em uso ou limite de usuários atingido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_usuario(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SomenteAdm>,
    tenant: TenantContext,
    AppJson(payload): AppJson<CreateUsuarioPayload>,
) -> Result<(StatusCode, Json<Usuario>), AppError> {
    payload.validate()?;

    let novo = app_state.equipe_service.create(tenant.0, &payload).await?;
    log::crud(&usuario, &format!("criou o usuário {} ({})", novo.email, novo.papel.as_str()));

    Ok((StatusCode::CREATED, Json(novo)))
}

#[utoipa::path(
    put,
    path = "/api/equipe/{id}",
    tag = "Equipe",
    request_body = UpdateUsuarioPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário atualizado", body = Usuario),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_usuario(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SomenteAdm>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUsuarioPayload>,
) -> Result<Json<Usuario>, AppError> {
    payload.validate()?;

    let editado = app_state.equipe_service.update(tenant.0, id, &payload).await?;
    log::crud(
        &usuario,
        &format!("editou o usuário {} (papel: {})", editado.email, editado.papel.as_str()),
    );

    Ok(Json(editado))
}

#[utoipa::path(
    delete,
    path = "/api/equipe/{id}",
    tag = "Equipe",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário excluído", body = MessageResponse),
        (status = 400, description = "Tentativa de excluir o próprio usuário"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_usuario(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SomenteAdm>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.equipe_service.delete(&usuario, id).await?;
    log::crud_warn(&usuario, &format!("excluiu o usuário {}", id));

    Ok(Json(MessageResponse::ok("Usuário excluído com sucesso!")))
}
