// src/db/dashboard_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{CidadeCount, RankingEntry},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

/// Contagens brutas do topo do dashboard
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Contagens {
    pub turmas: i64,
    pub alunos: i64,
    pub parentes: i64,
    pub compraram_foto: i64,
    pub alunos_com_foto: i64,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Indicadores. A cidade só restringe as contagens de parentes.
    pub async fn contagens(
        &self,
        empresa_id: Uuid,
        turma: Option<&str>,
        cidade: Option<&str>,
    ) -> Result<Contagens, AppError> {
        // As três contagens leem o mesmo snapshot.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (alunos, turmas): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT turma)
            FROM formandos
            WHERE empresa_id = $1 AND ($2::TEXT IS NULL OR turma = $2)
            "#,
        )
        .bind(empresa_id)
        .bind(turma)
        .fetch_one(&mut *tx)
        .await?;

        let (parentes, compraram_foto): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(p.id),
                   COUNT(p.id) FILTER (WHERE p.comprou_foto)
            FROM parentes p
            JOIN formandos f ON f.id = p.formando_id
            WHERE f.empresa_id = $1
              AND ($2::TEXT IS NULL OR f.turma = $2)
              AND ($3::TEXT IS NULL OR p.cidade = $3)
            "#,
        )
        .bind(empresa_id)
        .bind(turma)
        .bind(cidade)
        .fetch_one(&mut *tx)
        .await?;

        let alunos_com_foto: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT f.id)
            FROM formandos f
            JOIN parentes p ON p.formando_id = f.id
            WHERE f.empresa_id = $1
              AND p.comprou_foto
              AND ($2::TEXT IS NULL OR f.turma = $2)
            "#,
        )
        .bind(empresa_id)
        .bind(turma)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Contagens { turmas, alunos, parentes, compraram_foto, alunos_com_foto })
    }

    // 2. Pizza: parentes por cidade normalizada (trim + lower)
    pub async fn parentes_por_cidade(
        &self,
        empresa_id: Uuid,
        turma: Option<&str>,
    ) -> Result<Vec<CidadeCount>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT TRIM(LOWER(p.cidade)) AS cidade, COUNT(p.id) AS total
            FROM parentes p
            JOIN formandos f ON f.id = p.formando_id
            WHERE f.empresa_id = "#,
        );
        builder.push_bind(empresa_id);
        if let Some(turma) = turma {
            builder.push(" AND f.turma = ").push_bind(turma);
        }
        builder.push(" GROUP BY 1 ORDER BY 2 DESC");

        let linhas = builder
            .build_query_as::<CidadeCount>()
            .fetch_all(&self.pool)
            .await?;
        Ok(linhas)
    }

    // 3. Ranking: alunos e alunos com foto, por turma
    pub async fn ranking(&self, empresa_id: Uuid) -> Result<Vec<RankingEntry>, AppError> {
        let linhas = sqlx::query_as::<_, RankingEntry>(
            r#"
            SELECT f.turma,
                   COUNT(DISTINCT f.id) AS total_alunos,
                   COUNT(DISTINCT f.id) FILTER (WHERE p.comprou_foto) AS alunos_com_foto
            FROM formandos f
            LEFT JOIN parentes p ON p.formando_id = f.id
            WHERE f.empresa_id = $1
            GROUP BY f.turma
            "#,
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    pub async fn all_cidades(&self, empresa_id: Uuid) -> Result<Vec<String>, AppError> {
        let cidades = sqlx::query_scalar(
            r#"
            SELECT DISTINCT p.cidade
            FROM parentes p
            JOIN formandos f ON f.id = p.formando_id
            WHERE f.empresa_id = $1
            ORDER BY p.cidade
            "#,
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cidades)
    }

    pub async fn all_turmas(&self, empresa_id: Uuid) -> Result<Vec<String>, AppError> {
        let turmas = sqlx::query_scalar(
            "SELECT DISTINCT turma FROM formandos WHERE empresa_id = $1 ORDER BY turma",
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(turmas)
    }
}
