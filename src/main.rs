//src/main.rs

use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

#[cfg(test)]
mod integration_tests;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Planilhas de importação podem passar do limite padrão do axum
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Console compacto + arquivo diário em `LOG_DIR`. O guard precisa viver até o fim do processo.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "formaturas.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().compact())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    guard
}

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/health", get(handlers::auth::health))
        .route("/auth/login", post(handlers::auth::login));

    // Tudo abaixo passa pelo auth_guard (sessão + empresa ativa + assinatura válida)
    let protected_routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        // Perfil
        .route(
            "/perfil",
            get(handlers::perfil::get_perfil).put(handlers::perfil::update_perfil),
        )
        .route(
            "/perfil/foto",
            post(handlers::perfil::upload_foto).delete(handlers::perfil::delete_foto),
        )
        .route("/perfil/senha", post(handlers::perfil::alterar_senha))
        .route("/perfil/validar-senha", post(handlers::perfil::validar_senha))
        // Empresas
        .route(
            "/empresas",
            get(handlers::empresas::list_empresas).post(handlers::empresas::create_empresa),
        )
        .route("/empresas/minha", get(handlers::empresas::minha_empresa))
        .route(
            "/empresas/{id}",
            put(handlers::empresas::update_empresa).delete(handlers::empresas::delete_empresa),
        )
        // Equipe
        .route(
            "/equipe",
            get(handlers::equipe::list_equipe).post(handlers::equipe::create_usuario),
        )
        .route(
            "/equipe/{id}",
            put(handlers::equipe::update_usuario).delete(handlers::equipe::delete_usuario),
        )
        // Turmas e alunos
        .route("/turmas", get(handlers::turmas::list_turmas))
        .route(
            "/turmas/importar",
            post(handlers::turmas::importar).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/turmas/{turma}",
            get(handlers::turmas::get_turma)
                .put(handlers::turmas::rename_turma)
                .delete(handlers::turmas::delete_turma),
        )
        .route("/turmas/{turma}/alunos", post(handlers::turmas::add_aluno))
        .route("/alunos/{id}", delete(handlers::turmas::delete_aluno))
        .route("/alunos/{id}/parentes", get(handlers::turmas::list_parentes))
        // Parentes
        .route("/parentes", post(handlers::parentes::create_parente))
        .route(
            "/parentes/{id}",
            put(handlers::parentes::update_parente).delete(handlers::parentes::delete_parente),
        )
        // Relatórios
        .route("/relatorios/opcoes", get(handlers::relatorios::opcoes))
        .route("/relatorios/alunos/{turma}", get(handlers::relatorios::alunos_por_turma))
        .route("/relatorios/preview", post(handlers::relatorios::preview))
        .route("/relatorios/exportar", post(handlers::relatorios::exportar))
        // Dashboard
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .nest_service("/uploads", ServeDir::new(&app_state.config.upload_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _log_guard = init_tracing(&config.log_dir);

    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    app_state
        .empresa_service
        .seed_super_admin(
            &app_state.config.super_admin_email,
            app_state.config.super_admin_password.as_deref(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao criar o super-admin: {}", e))?;

    let addr = app_state.config.bind_addr.clone();
    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
