// src/services/equipe_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        text::{normalize_email, preenchido},
    },
    db::{EmpresaRepository, UsuarioRepository},
    models::usuario::{CreateUsuarioPayload, UpdateUsuarioPayload, Usuario},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct EquipeService {
    usuario_repo: UsuarioRepository,
    empresa_repo: EmpresaRepository,
    pool: PgPool,
}

impl EquipeService {
    pub fn new(usuario_repo: UsuarioRepository, empresa_repo: EmpresaRepository, pool: PgPool) -> Self {
        Self { usuario_repo, empresa_repo, pool }
    }

    pub async fn list(&self, empresa_id: Uuid) -> Result<Vec<Usuario>, AppError> {
        self.usuario_repo.list_by_empresa(empresa_id).await
    }

    /// Cadastra um usuário na empresa, respeitando o limite de usuários dela.
    /// Contagem e inserção rodam com a empresa travada (`FOR UPDATE`).
    pub async fn create(&self, empresa_id: Uuid, payload: &CreateUsuarioPayload) -> Result<Usuario, AppError> {
        let nome = preenchido(&payload.nome, "O nome é obrigatório.")?;
        let email = normalize_email(&payload.email);
        if self.usuario_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }
        let senha_hash = hash_password(&payload.senha).await?;

        let mut tx = self.pool.begin().await?;

        let empresa = self
            .empresa_repo
            .lock_by_id(&mut *tx, empresa_id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        let total = self.usuario_repo.count_by_empresa(&mut *tx, empresa_id).await?;
        if total >= empresa.limite_usuarios() {
            return Err(AppError::LimiteUsuariosAtingido);
        }

        let novo = self
            .usuario_repo
            .create(&mut *tx, empresa_id, &email, nome, &senha_hash, payload.papel)
            .await?;
        tx.commit().await?;

        Ok(novo)
    }

    pub async fn update(
        &self,
        empresa_id: Uuid,
        id: Uuid,
        payload: &UpdateUsuarioPayload,
    ) -> Result<Usuario, AppError> {
        let nome = payload
            .nome
            .as_deref()
            .map(|n| preenchido(n, "O nome não pode ser vazio."))
            .transpose()?;
        self.usuario_repo
            .update_in_empresa(id, empresa_id, nome, payload.papel)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    pub async fn delete(&self, atual: &Usuario, id: Uuid) -> Result<(), AppError> {
        if atual.id == id {
            return Err(AppError::BadRequest("Você não pode excluir o próprio usuário.".to_string()));
        }
        match self.usuario_repo.delete_in_empresa(id, atual.empresa_id).await? {
            0 => Err(AppError::NotFound("Usuário")),
            _ => Ok(()),
        }
    }
}
