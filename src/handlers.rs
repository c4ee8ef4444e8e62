pub mod auth;
pub mod dashboard;
pub mod empresas;
pub mod equipe;
pub mod parentes;
pub mod perfil;
pub mod relatorios;
pub mod turmas;
