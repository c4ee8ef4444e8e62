// src/handlers/turmas.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, json::AppJson, log},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdmOuEditor, RequireRole},
        tenancy::TenantContext,
    },
    models::{
        formando::{
            AddAlunoPayload, Formando, ImportResult, ImportarArquivo, ListAlunosQuery, Parente, RenameTurmaPayload,
            TurmaDetalhe, TurmasOverview,
        },
        usuario::MessageResponse,
    },
};

const CAMPO_ARQUIVO: &str = "arquivo";

#[utoipa::path(
    get,
    path = "/api/turmas",
    tag = "Turmas",
    responses(
        (status = 200, description = "Resumo por turma e totais", body = TurmasOverview),
        (status = 409, description = "Nenhuma turma cadastrada (code SEM_TURMAS)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_turmas(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    tenant: TenantContext,
) -> Result<Json<TurmasOverview>, AppError> {
    log::access(&usuario, "Acesso à página de turmas");
    Ok(Json(app_state.turma_service.overview(tenant.0).await?))
}

#[utoipa::path(
    post,
    path = "/api/turmas/importar",
    tag = "Turmas",
    request_body(content = ImportarArquivo, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Linhas importadas", body = ImportResult),
        (status = 400, description = "Arquivo ausente, vazio ou em formato inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn importar(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResult>), AppError> {
    let mut arquivo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Upload inválido: {}", e)))?
    {
        if field.name() != Some(CAMPO_ARQUIVO) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Upload inválido: {}", e)))?;
        arquivo = Some((filename, bytes));
    }

    let (filename, bytes) = arquivo
        .filter(|(filename, _)| !filename.is_empty())
        .ok_or_else(|| AppError::BadRequest("Nenhum arquivo enviado!".to_string()))?;

    let inseridos = app_state.turma_service.importar(tenant.0, &filename, &bytes).await?;
    log::crud(&usuario, &format!("importou {} registros do arquivo '{}'", inseridos, filename));

    Ok((
        StatusCode::CREATED,
        Json(ImportResult {
            success: true,
            message: format!("Importação ok! {} registros inseridos.", inseridos),
            inseridos,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/turmas/{turma}",
    tag = "Turmas",
    params(("turma" = String, Path, description = "Nome da turma"), ListAlunosQuery),
    responses((status = 200, description = "Alunos da turma", body = TurmaDetalhe)),
    security(("api_jwt" = []))
)]
pub async fn get_turma(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    tenant: TenantContext,
    Path(turma): Path<String>,
    Query(query): Query<ListAlunosQuery>,
) -> Result<Json<TurmaDetalhe>, AppError> {
    log::access(&usuario, &format!("Acesso à turma '{}'", turma));
    Ok(Json(app_state.turma_service.detalhe(tenant.0, &turma, query.order).await?))
}

#[utoipa::path(
    put,
    path = "/api/turmas/{turma}",
    tag = "Turmas",
    request_body = RenameTurmaPayload,
    params(("turma" = String, Path, description = "Nome atual da turma")),
    responses(
        (status = 200, description = "Turma renomeada", body = MessageResponse),
        (status = 400, description = "Novo nome ausente"),
        (status = 404, description = "Turma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_turma(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    Path(turma): Path<String>,
    AppJson(payload): AppJson<RenameTurmaPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    let nova = app_state
        .turma_service
        .rename(tenant.0, &turma, payload.nova_turma.as_deref())
        .await?;
    log::crud(&usuario, &format!("renomeou a turma '{}' para '{}'", turma, nova));

    Ok(Json(MessageResponse::ok("Turma renomeada!")))
}

#[utoipa::path(
    delete,
    path = "/api/turmas/{turma}",
    tag = "Turmas",
    params(("turma" = String, Path, description = "Nome da turma")),
    responses(
        (status = 200, description = "Turma e alunos removidos", body = MessageResponse),
        (status = 404, description = "Turma não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_turma(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    Path(turma): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removidos = app_state.turma_service.delete_turma(tenant.0, &turma).await?;
    log::crud_warn(&usuario, &format!("excluiu a turma '{}' ({} alunos)", turma, removidos));

    Ok(Json(MessageResponse::ok("Turma excluída!")))
}

#[utoipa::path(
    post,
    path = "/api/turmas/{turma}/alunos",
    tag = "Turmas",
    request_body = AddAlunoPayload,
    params(("turma" = String, Path, description = "Nome da turma")),
    responses(
        (status = 201, description = "Aluno adicionado", body = Formando),
        (status = 400, description = "Nome do aluno ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_aluno(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    Path(turma): Path<String>,
    AppJson(payload): AppJson<AddAlunoPayload>,
) -> Result<(StatusCode, Json<Formando>), AppError> {
    let formando = app_state
        .turma_service
        .add_aluno(tenant.0, &turma, payload.aluno.as_deref())
        .await?;
    log::crud(&usuario, &format!("adicionou o aluno '{}' à turma '{}'", formando.aluno, formando.turma));

    Ok((StatusCode::CREATED, Json(formando)))
}

#[utoipa::path(
    delete,
    path = "/api/alunos/{id}",
    tag = "Turmas",
    params(("id" = Uuid, Path, description = "ID do aluno")),
    responses(
        (status = 200, description = "Aluno e parentes removidos", body = MessageResponse),
        (status = 404, description = "Aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_aluno(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<AdmOuEditor>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let formando = app_state.turma_service.delete_aluno(tenant.0, id).await?;
    log::crud_warn(
        &usuario,
        &format!("excluiu o aluno '{}' da turma '{}'", formando.aluno, formando.turma),
    );

    Ok(Json(MessageResponse::ok("Aluno excluído da Turma!")))
}

#[utoipa::path(
    get,
    path = "/api/alunos/{id}/parentes",
    tag = "Parentes",
    params(("id" = Uuid, Path, description = "ID do aluno")),
    responses(
        (status = 200, description = "Parentes do aluno", body = Vec<Parente>),
        (status = 404, description = "Aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_parentes(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Parente>>, AppError> {
    Ok(Json(app_state.parente_service.list(tenant.0, id).await?))
}
