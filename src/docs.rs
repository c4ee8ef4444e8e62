// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Sistema / Auth ---
        handlers::auth::health,
        handlers::auth::login,
        handlers::auth::logout,

        // --- Perfil ---
        handlers::perfil::get_perfil,
        handlers::perfil::update_perfil,
        handlers::perfil::upload_foto,
        handlers::perfil::delete_foto,
        handlers::perfil::alterar_senha,
        handlers::perfil::validar_senha,

        // --- Empresas ---
        handlers::empresas::list_empresas,
        handlers::empresas::create_empresa,
        handlers::empresas::update_empresa,
        handlers::empresas::delete_empresa,
        handlers::empresas::minha_empresa,

        // --- Equipe ---
        handlers::equipe::list_equipe,
        handlers::equipe::create_usuario,
        handlers::equipe::update_usuario,
        handlers::equipe::delete_usuario,

        // --- Turmas ---
        handlers::turmas::list_turmas,
        handlers::turmas::importar,
        handlers::turmas::get_turma,
        handlers::turmas::rename_turma,
        handlers::turmas::delete_turma,
        handlers::turmas::add_aluno,
        handlers::turmas::delete_aluno,
        handlers::turmas::list_parentes,

        // --- Parentes ---
        handlers::parentes::create_parente,
        handlers::parentes::update_parente,
        handlers::parentes::delete_parente,

        // --- Relatórios ---
        handlers::relatorios::opcoes,
        handlers::relatorios::alunos_por_turma,
        handlers::relatorios::preview,
        handlers::relatorios::exportar,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // --- Usuários ---
            models::usuario::Papel,
            models::usuario::Usuario,
            models::usuario::LoginPayload,
            models::usuario::LoginResponse,
            models::usuario::CreateUsuarioPayload,
            models::usuario::UpdateUsuarioPayload,
            models::usuario::UpdatePerfilPayload,
            models::usuario::FotoPerfilPayload,
            models::usuario::AlterarSenhaPayload,
            models::usuario::ValidarSenhaPayload,
            models::usuario::ValidarSenhaResponse,
            models::usuario::MessageResponse,

            // --- Empresas ---
            models::empresa::StatusEmpresa,
            models::empresa::Empresa,
            models::empresa::EmpresaResumo,
            models::empresa::CreateEmpresaPayload,
            models::empresa::UpdateEmpresaPayload,

            // --- Turmas / Parentes ---
            models::formando::Formando,
            models::formando::TurmaResumo,
            models::formando::TurmasOverview,
            models::formando::TurmaDetalhe,
            models::formando::Ordem,
            models::formando::RenameTurmaPayload,
            models::formando::AddAlunoPayload,
            models::formando::ImportResult,
            models::formando::ImportarArquivo,
            models::formando::Parente,
            models::formando::ParentePayload,

            // --- Relatórios ---
            models::relatorio::CampoRelatorio,
            models::relatorio::FiltrosRelatorio,
            models::relatorio::PreviewPayload,
            models::relatorio::PreviewResponse,
            models::relatorio::ExportPayload,
            models::relatorio::OpcoesRelatorio,
            models::relatorio::AlunoNome,

            // --- Dashboard ---
            models::dashboard::Dashboard,
            models::dashboard::DashboardStats,
            models::dashboard::ChartData,
            models::dashboard::AlunosTurmaChart,
            models::dashboard::CidadeChart,
            models::dashboard::RankingEntry,
            models::dashboard::FiltrosAplicados,
        )
    ),
    tags(
        (name = "Sistema", description = "Saúde do serviço"),
        (name = "Autenticação", description = "Login e logout"),
        (name = "Perfil", description = "Dados, foto e senha do usuário logado"),
        (name = "Empresas", description = "Gestão de empresas (super-admin)"),
        (name = "Equipe", description = "Usuários da empresa"),
        (name = "Turmas", description = "Turmas, alunos e importação de planilhas"),
        (name = "Parentes", description = "Familiares dos formandos"),
        (name = "Relatórios", description = "Filtros, prévia e exportação Excel/PDF"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_group_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/api/auth/login", "/api/turmas/{turma}", "/api/relatorios/exportar", "/api/dashboard"] {
            assert!(doc.paths.paths.contains_key(path), "rota sem documentação: {}", path);
        }
    }
}
