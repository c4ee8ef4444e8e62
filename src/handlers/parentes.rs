// src/handlers/parentes.rs
//
// Toda mutação devolve a lista atualizada de parentes do aluno.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, json::AppJson, log},
    config::AppState,
    middleware::{
        rbac::{AdmOuEditor, RequireRole},
        tenancy::TenantContext,
    },
    models::formando::{Parente, ParentePayload},
};

#[utoipa::path(
    post,
    path = "/api/parentes",
    tag = "Parentes",
    request_body = ParentePayload,
    responses(
        (status = 200, description = "Parente criado; lista atualizada", body = Vec<Parente>),
        (status = 400, description = "Dados inválidos ou aluno ausente"),
        (status = 404, description = "Aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_parente(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    AppJson(payload): AppJson<ParentePayload>,
) -> Result<Json<Vec<Parente>>, AppError> {
    let (parente, parentes) = app_state.parente_service.create(tenant.0, &payload).await?;
    log::crud(
        &usuario,
        &format!(
            "criou o parente '{}' (grau: {}) para o aluno {}",
            parente.nome, parente.grau, parente.formando_id
        ),
    );
    Ok(Json(parentes))
}

#[utoipa::path(
    put,
    path = "/api/parentes/{id}",
    tag = "Parentes",
    request_body = ParentePayload,
    params(("id" = Uuid, Path, description = "ID do parente")),
    responses(
        (status = 200, description = "Parente editado; lista atualizada", body = Vec<Parente>),
        (status = 404, description = "Parente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_parente(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ParentePayload>,
) -> Result<Json<Vec<Parente>>, AppError> {
    let (parente, parentes) = app_state.parente_service.update(tenant.0, id, &payload).await?;
    log::crud(&usuario, &format!("editou o parente '{}' ({})", parente.nome, parente.id));
    Ok(Json(parentes))
}

#[utoipa::path(
    delete,
    path = "/api/parentes/{id}",
    tag = "Parentes",
    params(("id" = Uuid, Path, description = "ID do parente")),
    responses(
        (status = 200, description = "Parente excluído; lista atualizada", body = Vec<Parente>),
        (status = 404, description = "Parente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_parente(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Parente>>, AppError> {
    let (parente, parentes) = app_state.parente_service.delete(tenant.0, id).await?;
    log::crud_warn(&usuario, &format!("excluiu o parente '{}' ({})", parente.nome, parente.id));
    Ok(Json(parentes))
}
