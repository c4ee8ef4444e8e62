// src/db/usuario_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::usuario::{Papel, Usuario},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'.
// E-mails chegam aqui já normalizados.
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    pub async fn list_by_empresa(&self, empresa_id: Uuid) -> Result<Vec<Usuario>, AppError> {
        let usuarios = sqlx::query_as::<_, Usuario>(
            "SELECT * FROM usuarios WHERE empresa_id = $1 ORDER BY nome ASC",
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(usuarios)
    }

    pub async fn count_by_empresa<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios WHERE empresa_id = $1")
            .bind(empresa_id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        email: &str,
        nome: &str,
        senha_hash: &str,
        papel: Papel,
    ) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (empresa_id, email, nome, senha_hash, papel)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(empresa_id)
        .bind(email)
        .bind(nome)
        .bind(senha_hash)
        .bind(papel)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_unique_violation)
    }

    /// Altera nome/papel de um usuário da mesma empresa. `None` se não pertencer a ela.
    pub async fn update_in_empresa(
        &self,
        id: Uuid,
        empresa_id: Uuid,
        nome: Option<&str>,
        papel: Option<Papel>,
    ) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios SET
                nome = COALESCE($3, nome),
                papel = COALESCE($4, papel),
                updated_at = NOW()
            WHERE id = $1 AND empresa_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(empresa_id)
        .bind(nome)
        .bind(papel)
        .fetch_optional(&self.pool)
        .await?;
        Ok(usuario)
    }

    pub async fn delete_in_empresa(&self, id: Uuid, empresa_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1 AND empresa_id = $2")
            .bind(id)
            .bind(empresa_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn username_taken_by_other(&self, username: &str, id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM usuarios WHERE username = $1 AND id <> $2)",
        )
        .bind(username)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn update_perfil(
        &self,
        id: Uuid,
        nome: &str,
        username: Option<&str>,
    ) -> Result<Usuario, AppError> {
        sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios SET nome = $2, username = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(nome)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_unique_violation)
    }

    pub async fn set_foto(&self, id: Uuid, foto_perfil: Option<&str>) -> Result<Usuario, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            "UPDATE usuarios SET foto_perfil = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(foto_perfil)
        .fetch_one(&self.pool)
        .await?;
        Ok(usuario)
    }

    pub async fn set_senha(&self, id: Uuid, senha_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE usuarios SET senha_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(senha_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
