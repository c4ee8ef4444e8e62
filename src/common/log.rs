// src/common/log.rs
//
// Três trilhas de log com targets próprios (`access`, `crud`, `audit`), todas com
// o prefixo `[empresa:<id>]` e o usuário responsável.

use uuid::Uuid;

use crate::models::usuario::Usuario;

/// Quem está agindo: (tenant, usuário). Anônimo quando não há sessão.
pub struct Actor<'a> {
    pub empresa_id: Option<Uuid>,
    pub email: &'a str,
}

impl<'a> Actor<'a> {
    pub fn anonimo() -> Self {
        Self { empresa_id: None, email: "anonimo" }
    }

    pub fn email(email: &'a str) -> Self {
        Self { empresa_id: None, email }
    }

    fn tenant(&self) -> String {
        self.empresa_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "desconhecido".to_string())
    }
}

impl<'a> From<&'a Usuario> for Actor<'a> {
    fn from(usuario: &'a Usuario) -> Self {
        Self { empresa_id: Some(usuario.empresa_id), email: &usuario.email }
    }
}

/// Acessos (páginas, tentativas de login).
pub fn access<'a>(actor: impl Into<Actor<'a>>, mensagem: &str) {
    let actor = actor.into();
    tracing::info!(target: "access", "[empresa:{}] {} | Usuário: {}", actor.tenant(), mensagem, actor.email);
}

/// Criação, edição e exclusão de dados.
pub fn crud<'a>(actor: impl Into<Actor<'a>>, acao: &str) {
    let actor = actor.into();
    tracing::info!(target: "crud", "[empresa:{}] Usuário: {} {}", actor.tenant(), actor.email, acao);
}

/// Exclusões em massa e remoções sensíveis sobem para WARN, como no log de CRUD.
pub fn crud_warn<'a>(actor: impl Into<Actor<'a>>, acao: &str) {
    let actor = actor.into();
    tracing::warn!(target: "crud", "[empresa:{}] Usuário: {} {}", actor.tenant(), actor.email, acao);
}

/// Eventos de segurança: falhas de login, origens bloqueadas, sessões encerradas.
pub fn audit<'a>(actor: impl Into<Actor<'a>>, evento: &str) {
    let actor = actor.into();
    tracing::warn!(target: "audit", "[empresa:{}] {} | Usuário: {}", actor.tenant(), evento, actor.email);
}
