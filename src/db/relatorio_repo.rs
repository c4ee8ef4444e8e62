// src/db/relatorio_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::relatorio::{AlunoNome, FiltroFoto, FiltrosRelatorio, RelatorioLinha, TODAS, TODOS},
};

#[derive(Clone)]
pub struct RelatorioRepository {
    pool: PgPool,
}

/// Valor de filtro efetivo: vazio ou o coringa ("TODAS"/"TODOS") não filtram.
fn filtro_ativo<'a>(value: &'a Option<String>, coringa: &str) -> Option<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != coringa)
}

/// Monta o JOIN parentes × formandos da empresa com os filtros do relatório.
pub(crate) fn build_relatorio_query(
    empresa_id: Uuid,
    filtros: &FiltrosRelatorio,
    limit: Option<i64>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT f.turma, f.aluno, p.nome AS parente, p.cidade, p.telefone, p.grau, p.comprou_foto
        FROM parentes p
        JOIN formandos f ON f.id = p.formando_id
        WHERE f.empresa_id = "#,
    );
    builder.push_bind(empresa_id);

    if let Some(turma) = filtro_ativo(&filtros.turma, TODAS) {
        builder.push(" AND f.turma = ").push_bind(turma.to_string());
    }
    if let Some(aluno) = filtro_ativo(&filtros.aluno, TODOS) {
        builder.push(" AND f.aluno = ").push_bind(aluno.to_string());
    }
    if let Some(cidade) = filtro_ativo(&filtros.cidade, TODAS) {
        builder.push(" AND p.cidade = ").push_bind(cidade.to_string());
    }
    match FiltroFoto::parse(filtros.comprou_foto.as_deref()) {
        FiltroFoto::Sim => {
            builder.push(" AND p.comprou_foto IS TRUE");
        }
        FiltroFoto::Nao => {
            builder.push(" AND p.comprou_foto IS FALSE");
        }
        FiltroFoto::Todas => {}
    }

    builder.push(" ORDER BY f.turma ASC, f.aluno ASC, p.nome ASC");
    if let Some(limit) = limit {
        builder.push(" LIMIT ").push_bind(limit);
    }
    builder
}

impl RelatorioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_linhas(
        &self,
        empresa_id: Uuid,
        filtros: &FiltrosRelatorio,
        limit: Option<i64>,
    ) -> Result<Vec<RelatorioLinha>, AppError> {
        let mut builder = build_relatorio_query(empresa_id, filtros, limit);
        let linhas = builder
            .build_query_as::<RelatorioLinha>()
            .fetch_all(&self.pool)
            .await?;
        Ok(linhas)
    }

    pub async fn distinct_turmas(&self, empresa_id: Uuid) -> Result<Vec<String>, AppError> {
        let turmas = sqlx::query_scalar(
            "SELECT DISTINCT turma FROM formandos WHERE empresa_id = $1 ORDER BY turma",
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(turmas)
    }

    pub async fn distinct_alunos(&self, empresa_id: Uuid) -> Result<Vec<String>, AppError> {
        let alunos = sqlx::query_scalar(
            "SELECT DISTINCT aluno FROM formandos WHERE empresa_id = $1 ORDER BY aluno",
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(alunos)
    }

    pub async fn distinct_cidades(&self, empresa_id: Uuid) -> Result<Vec<String>, AppError> {
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

    /// Alunos de uma turma, ou de todas com "TODAS".
    pub async fn alunos_by_turma(&self, empresa_id: Uuid, turma: &str) -> Result<Vec<AlunoNome>, AppError> {
        let alunos = if turma == TODAS {
            sqlx::query_as::<_, AlunoNome>(
                "SELECT aluno FROM formandos WHERE empresa_id = $1 ORDER BY aluno",
            )
            .bind(empresa_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, AlunoNome>(
                "SELECT aluno FROM formandos WHERE empresa_id = $1 AND turma = $2 ORDER BY aluno",
            )
            .bind(empresa_id)
            .bind(turma)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(alunos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(filtros: FiltrosRelatorio, limit: Option<i64>) -> String {
        build_relatorio_query(Uuid::new_v4(), &filtros, limit).sql().to_string()
    }

    #[test]
    fn query_is_always_scoped_to_the_tenant() {
        let sql = sql(FiltrosRelatorio::default(), None);
        assert!(sql.contains("WHERE f.empresa_id = $1"));
        assert!(!sql.contains("f.turma = "));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn wildcards_do_not_filter() {
        let sql = sql(
            FiltrosRelatorio {
                turma: Some("TODAS".into()),
                aluno: Some("TODOS".into()),
                cidade: Some("  ".into()),
                comprou_foto: Some("Todas".into()),
            },
            None,
        );
        assert!(!sql.contains("f.turma = "));
        assert!(!sql.contains("f.aluno = "));
        assert!(!sql.contains("p.cidade = "));
        assert!(!sql.contains("comprou_foto IS"));
    }

    #[test]
    fn filters_compose_in_order() {
        let sql = sql(
            FiltrosRelatorio {
                turma: Some("3A".into()),
                aluno: None,
                cidade: Some("Campinas".into()),
                comprou_foto: Some("Não".into()),
            },
            Some(3),
        );
        assert!(sql.contains("AND f.turma = $2"));
        assert!(sql.contains("AND p.cidade = $3"));
        assert!(sql.contains("AND p.comprou_foto IS FALSE"));
        assert!(sql.ends_with("LIMIT $4"));
    }
}
