pub mod dashboard;
pub mod empresa;
pub mod formando;
pub mod relatorio;
pub mod usuario;
