pub mod auth;
pub mod dashboard_service;
pub mod empresa_service;
pub mod equipe_service;
pub mod parente_service;
pub mod perfil_service;
pub mod relatorio_service;
pub mod turma_service;
