// src/handlers/empresas.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, log},
    config::AppState,
    middleware::rbac::{RequireRole, SomenteAdm, SuperAdmin},
    models::{
        empresa::{CreateEmpresaPayload, Empresa, EmpresaResumo, UpdateEmpresaPayload},
        usuario::MessageResponse,
    },
};

#[utoipa::path(
    get,
    path = "/api/empresas",
    tag = "Empresas",
    responses(
        (status = 200, description = "Todas as empresas com total de usuários", body = Vec<EmpresaResumo>),
        (status = 403, description = "Somente o super-admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_empresas(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SuperAdmin>,
) -> Result<Json<Vec<EmpresaResumo>>, AppError> {
    log::access(&usuario, "Acesso ao painel de empresas");
    Ok(Json(app_state.empresa_service.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/empresas",
    tag = "Empresas",
    request_body = CreateEmpresaPayload,
    responses(
        (status = 201, description = "Empresa e administrador criados", body = Empresa),
        (status = 409, description = "Nome de empresa ou e-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_empresa(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SuperAdmin>,
    AppJson(payload): AppJson<CreateEmpresaPayload>,
) -> Result<(StatusCode, Json<Empresa>), AppError> {
    payload.validate()?;

    let (empresa, admin) = app_state.empresa_service.create_with_admin(&payload).await?;
    log::crud(
        &usuario,
        &format!("criou a empresa '{}' ({}) com o ADM {}", empresa.nome, empresa.id, admin.email),
    );

    Ok((StatusCode::CREATED, Json(empresa)))
}

#[utoipa::path(
    put,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    request_body = UpdateEmpresaPayload,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa atualizada", body = Empresa),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_empresa(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateEmpresaPayload>,
) -> Result<Json<Empresa>, AppError> {
    payload.validate()?;

    let empresa = app_state.empresa_service.update(id, &payload).await?;
    log::crud(&usuario, &format!("editou a empresa '{}' ({})", empresa.nome, empresa.id));

    Ok(Json(empresa))
}

#[utoipa::path(
    delete,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa e todos os seus dados removidos", body = MessageResponse),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_empresa(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let empresa = app_state.empresa_service.get(id).await?;
    app_state.empresa_service.delete(id).await?;
    log::crud_warn(&usuario, &format!("excluiu a empresa '{}' ({})", empresa.nome, empresa.id));

    Ok(Json(MessageResponse::ok("Empresa excluída com sucesso!")))
}

#[utoipa::path(
    get,
    path = "/api/empresas/minha",
    tag = "Empresas",
    responses((status = 200, description = "Dados da empresa do ADM logado", body = Empresa)),
    security(("api_jwt" = []))
)]
pub async fn minha_empresa(
    RequireRole(usuario, _): RequireRole<SomenteAdm>,
    Extension(empresa): Extension<Empresa>,
) -> Json<Empresa> {
    log::access(&usuario, "Acesso às informações da empresa");
    Json(empresa)
}
