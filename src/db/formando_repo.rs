// src/db/formando_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::formando::{Formando, NovoFormando, Ordem, TurmaResumo},
};

// Postgres aceita até 65535 parâmetros por comando; 3 por linha.
const LINHAS_POR_INSERT: usize = 1000;

#[derive(Clone)]
pub struct FormandoRepository {
    pool: PgPool,
}

impl FormandoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A empresa tem ao menos uma turma?
    pub async fn has_any(&self, empresa_id: Uuid) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM formandos WHERE empresa_id = $1)")
                .bind(empresa_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn turma_resumos(&self, empresa_id: Uuid) -> Result<Vec<TurmaResumo>, AppError> {
        let resumos = sqlx::query_as::<_, TurmaResumo>(
            r#"
            SELECT
                f.turma,
                COUNT(DISTINCT f.id) AS alunos_count,
                COUNT(p.id) AS parentes_count,
                COALESCE(SUM(CASE WHEN p.comprou_foto THEN 1 ELSE 0 END), 0)::BIGINT AS fotos_compradas_count
            FROM formandos f
            LEFT JOIN parentes p ON p.formando_id = f.id
            WHERE f.empresa_id = $1
            GROUP BY f.turma
            ORDER BY f.turma ASC
            "#,
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(resumos)
    }

    pub async fn list_by_turma(
        &self,
        empresa_id: Uuid,
        turma: &str,
        ordem: Ordem,
    ) -> Result<Vec<Formando>, AppError> {
        let sql = match ordem {
            Ordem::Asc => "SELECT * FROM formandos WHERE empresa_id = $1 AND turma = $2 ORDER BY aluno ASC",
            Ordem::Desc => "SELECT * FROM formandos WHERE empresa_id = $1 AND turma = $2 ORDER BY aluno DESC",
        };
        let alunos = sqlx::query_as::<_, Formando>(sql)
            .bind(empresa_id)
            .bind(turma)
            .fetch_all(&self.pool)
            .await?;
        Ok(alunos)
    }

    pub async fn find_in_empresa(&self, empresa_id: Uuid, id: Uuid) -> Result<Option<Formando>, AppError> {
        let formando = sqlx::query_as::<_, Formando>(
            "SELECT * FROM formandos WHERE id = $1 AND empresa_id = $2",
        )
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(formando)
    }

    pub async fn create(&self, empresa_id: Uuid, turma: &str, aluno: &str) -> Result<Formando, AppError> {
        let formando = sqlx::query_as::<_, Formando>(
            "INSERT INTO formandos (empresa_id, turma, aluno) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(empresa_id)
        .bind(turma)
        .bind(aluno)
        .fetch_one(&self.pool)
        .await?;
        Ok(formando)
    }

    /// Insere as linhas em lotes, dentro do executor (transação) recebido.
    pub async fn insert_many(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        empresa_id: Uuid,
        linhas: &[NovoFormando],
    ) -> Result<u64, AppError> {
        let mut inseridos = 0;
        for lote in linhas.chunks(LINHAS_POR_INSERT) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO formandos (empresa_id, turma, aluno) ");
            builder.push_values(lote, |mut row, linha| {
                row.push_bind(empresa_id)
                    .push_bind(linha.turma.as_str())
                    .push_bind(linha.aluno.as_str());
            });
            inseridos += builder.build().execute(&mut **tx).await?.rows_affected();
        }
        Ok(inseridos)
    }

    /// Renomear turma é um UPDATE em massa da string nos formandos da empresa.
    pub async fn rename_turma(&self, empresa_id: Uuid, turma: &str, nova: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE formandos SET turma = $3 WHERE empresa_id = $1 AND turma = $2")
            .bind(empresa_id)
            .bind(turma)
            .bind(nova)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_turma(&self, empresa_id: Uuid, turma: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM formandos WHERE empresa_id = $1 AND turma = $2")
            .bind(empresa_id)
            .bind(turma)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_in_empresa<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Formando>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let formando = sqlx::query_as::<_, Formando>(
            "DELETE FROM formandos WHERE id = $1 AND empresa_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(formando)
    }
}
