pub mod empresa_repo;
pub use empresa_repo::EmpresaRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod formando_repo;
pub use formando_repo::FormandoRepository;
pub mod parente_repo;
pub use parente_repo::ParenteRepository;
pub mod relatorio_repo;
pub use relatorio_repo::RelatorioRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
