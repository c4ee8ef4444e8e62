// src/handlers/relatorios.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::{error::AppError, json::AppJson, log},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, SomenteAdm},
        tenancy::TenantContext,
    },
    models::relatorio::{AlunoNome, ExportPayload, OpcoesRelatorio, PreviewPayload, PreviewResponse},
    services::turma_service::TelaComTurmas,
};

#[utoipa::path(
    get,
    path = "/api/relatorios/opcoes",
    tag = "Relatórios",
    responses(
        (status = 200, description = "Turmas, alunos e cidades para os filtros", body = OpcoesRelatorio),
        (status = 409, description = "Nenhuma turma cadastrada (code SEM_TURMAS)")
    ),
    security(("api_jwt" = []))
)]
pub async fn opcoes(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SomenteAdm>,
    tenant: TenantContext,
) -> Result<Json<OpcoesRelatorio>, AppError> {
    app_state
        .turma_service
        .exigir_turmas(tenant.0, TelaComTurmas::Relatorios)
        .await?;
    log::access(&usuario, "Acesso à página de relatórios");
    Ok(Json(app_state.relatorio_service.opcoes(tenant.0).await?))
}

#[utoipa::path(
    get,
    path = "/api/relatorios/alunos/{turma}",
    tag = "Relatórios",
    params(("turma" = String, Path, description = "Nome da turma ou TODAS")),
    responses((status = 200, description = "Alunos da turma", body = Vec<AlunoNome>)),
    security(("api_jwt" = []))
)]
pub async fn alunos_por_turma(
    State(app_state): State<AppState>,
    AuthenticatedUser(_usuario): AuthenticatedUser,
    tenant: TenantContext,
    Path(turma): Path<String>,
) -> Result<Json<Vec<AlunoNome>>, AppError> {
    Ok(Json(app_state.relatorio_service.alunos(tenant.0, &turma).await?))
}

#[utoipa::path(
    post,
    path = "/api/relatorios/preview",
    tag = "Relatórios",
    request_body = PreviewPayload,
    responses(
        (status = 200, description = "Até 3 linhas com os campos escolhidos", body = PreviewResponse),
        (status = 400, description = "Nenhum campo ou campo desconhecido")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview(
    State(app_state): State<AppState>,
    RequireRole(_usuario, _): RequireRole<SomenteAdm>,
    tenant: TenantContext,
    AppJson(payload): AppJson<PreviewPayload>,
) -> Result<Json<PreviewResponse>, AppError> {
    let preview = app_state
        .relatorio_service
        .preview(tenant.0, &payload.filtros, &payload.fields)
        .await?;
    Ok(Json(PreviewResponse { preview }))
}

#[utoipa::path(
    post,
    path = "/api/relatorios/exportar",
    tag = "Relatórios",
    request_body = ExportPayload,
    responses(
        (status = 200, description = "Arquivo XLSX ou PDF para download (Content-Disposition: attachment)"),
        (status = 400, description = "Tipo de exportação ou campos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn exportar(
    State(app_state): State<AppState>,
    RequireRole(usuario, _): RequireRole<SomenteAdm>,
    tenant: TenantContext,
    AppJson(payload): AppJson<ExportPayload>,
) -> Result<Response, AppError> {
    let exportacao = app_state.relatorio_service.exportar(tenant.0, payload).await?;
    log::access(&usuario, &format!("Relatório exportado: {}", exportacao.filename));

    let disposition = format!("attachment; filename=\"{}\"", exportacao.filename);
    Ok((
        [
            (header::CONTENT_TYPE, exportacao.mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exportacao.bytes,
    )
        .into_response())
}
