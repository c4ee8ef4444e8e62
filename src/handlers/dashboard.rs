// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::{error::AppError, log},
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::dashboard::{Dashboard, DashboardQuery},
    services::turma_service::TelaComTurmas,
};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Indicadores, gráficos e ranking", body = Dashboard),
        (status = 409, description = "Nenhuma turma cadastrada (code SEM_TURMAS)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    app_state
        .turma_service
        .exigir_turmas(tenant.0, TelaComTurmas::Dashboard)
        .await?;
    log::access(&usuario, "Acesso ao dashboard");

    Ok(Json(app_state.dashboard_service.get(tenant.0, &query).await?))
}
