// src/db/empresa_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::empresa::{Empresa, EmpresaResumo, StatusEmpresa},
};

// O repositório de empresas (tenants)
#[derive(Clone)]
pub struct EmpresaRepository {
    pool: PgPool,
}

impl EmpresaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Empresa>, AppError> {
        let empresa = sqlx::query_as::<_, Empresa>("SELECT * FROM empresas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(empresa)
    }

    /// Trava a linha da empresa até o fim da transação (serializa cadastros na equipe).
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Empresa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let empresa = sqlx::query_as::<_, Empresa>("SELECT * FROM empresas WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(empresa)
    }

    pub async fn find_by_nome(&self, nome: &str) -> Result<Option<Empresa>, AppError> {
        let empresa = sqlx::query_as::<_, Empresa>("SELECT * FROM empresas WHERE nome = $1")
            .bind(nome)
            .fetch_optional(&self.pool)
            .await?;
        Ok(empresa)
    }

    /// Todas as empresas, com a contagem de usuários (visão do super-admin)
    pub async fn list_with_user_counts(&self) -> Result<Vec<EmpresaResumo>, AppError> {
        let empresas = sqlx::query_as::<_, EmpresaResumo>(
            r#"
            SELECT e.*, COUNT(u.id) AS total_usuarios
            FROM empresas e
            LEFT JOIN usuarios u ON u.empresa_id = e.id
            GROUP BY e.id
            ORDER BY e.nome ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(empresas)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        nome: &str,
        assinatura_ativa_ate: NaiveDate,
        max_usuarios: i32,
    ) -> Result<Empresa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Empresa>(
            r#"
            INSERT INTO empresas (nome, assinatura_ativa_ate, max_usuarios)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(assinatura_ativa_ate)
        .bind(max_usuarios)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_unique_violation)
    }

    /// Atualiza só os campos informados.
    pub async fn update(
        &self,
        id: Uuid,
        nome: Option<&str>,
        assinatura_ativa_ate: Option<NaiveDate>,
        max_usuarios: Option<i32>,
        status: Option<StatusEmpresa>,
    ) -> Result<Option<Empresa>, AppError> {
        sqlx::query_as::<_, Empresa>(
            r#"
            UPDATE empresas SET
                nome = COALESCE($2, nome),
                assinatura_ativa_ate = COALESCE($3, assinatura_ativa_ate),
                max_usuarios = COALESCE($4, max_usuarios),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(nome)
        .bind(assinatura_ativa_ate)
        .bind(max_usuarios)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from_unique_violation)
    }

    /// Remove a empresa; usuários, formandos e parentes caem junto (ON DELETE CASCADE).
    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM empresas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
