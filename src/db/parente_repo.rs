// src/db/parente_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::formando::{Parente, ParenteDados},
};

// Parentes não têm empresa_id próprio: o isolamento passa sempre pelo formando.
#[derive(Clone)]
pub struct ParenteRepository {
    pool: PgPool,
}

impl ParenteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_formando(&self, empresa_id: Uuid, formando_id: Uuid) -> Result<Vec<Parente>, AppError> {
        let parentes = sqlx::query_as::<_, Parente>(
            r#"
            SELECT p.id, p.formando_id, p.nome, p.grau, p.cidade, p.telefone,
                   p.data_nascimento, p.profissao, p.comprou_foto
            FROM parentes p
            JOIN formandos f ON f.id = p.formando_id
            WHERE p.formando_id = $1 AND f.empresa_id = $2
            ORDER BY p.nome ASC
            "#,
        )
        .bind(formando_id)
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(parentes)
    }

    pub async fn find_in_empresa(&self, empresa_id: Uuid, id: Uuid) -> Result<Option<Parente>, AppError> {
        let parente = sqlx::query_as::<_, Parente>(
            r#"
            SELECT p.id, p.formando_id, p.nome, p.grau, p.cidade, p.telefone,
                   p.data_nascimento, p.profissao, p.comprou_foto
            FROM parentes p
            JOIN formandos f ON f.id = p.formando_id
            WHERE p.id = $1 AND f.empresa_id = $2
            "#,
        )
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(parente)
    }

    pub async fn create(&self, formando_id: Uuid, dados: &ParenteDados) -> Result<Parente, AppError> {
        let parente = sqlx::query_as::<_, Parente>(
            r#"
            INSERT INTO parentes (
                formando_id, nome, grau, cidade, telefone,
                data_nascimento, profissao, comprou_foto
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, formando_id, nome, grau, cidade, telefone,
                      data_nascimento, profissao, comprou_foto
            "#,
        )
        .bind(formando_id)
        .bind(&dados.nome)
        .bind(&dados.grau)
        .bind(&dados.cidade)
        .bind(&dados.telefone)
        .bind(dados.data_nascimento)
        .bind(dados.profissao.as_deref())
        .bind(dados.comprou_foto)
        .fetch_one(&self.pool)
        .await?;
        Ok(parente)
    }

    pub async fn update(&self, id: Uuid, dados: &ParenteDados) -> Result<Parente, AppError> {
        let parente = sqlx::query_as::<_, Parente>(
            r#"
            UPDATE parentes SET
                nome = $2, grau = $3, cidade = $4, telefone = $5,
                data_nascimento = $6, profissao = $7, comprou_foto = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, formando_id, nome, grau, cidade, telefone,
                      data_nascimento, profissao, comprou_foto
            "#,
        )
        .bind(id)
        .bind(&dados.nome)
        .bind(&dados.grau)
        .bind(&dados.cidade)
        .bind(&dados.telefone)
        .bind(dados.data_nascimento)
        .bind(dados.profissao.as_deref())
        .bind(dados.comprou_foto)
        .fetch_one(&self.pool)
        .await?;
        Ok(parente)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM parentes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
