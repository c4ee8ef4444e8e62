// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    pub turma: Option<String>,
    pub cidade: Option<String>,
}

// 1. Indicadores (os cards do topo)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub turmas: i64,
    pub alunos: i64,
    pub parentes: i64,
    pub compraram_foto: i64,
    pub nao_compraram: i64,
    pub media_parentes: f64,     // parentes por aluno
    pub perc_alunos_foto: f64,   // % de alunos com ao menos um parente que comprou
}

// 2. Gráfico agrupado: alunos vs. alunos com foto
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlunosTurmaChart {
    pub labels: Vec<String>,
    pub total: Vec<i64>,
    pub com_foto: Vec<i64>,
}

// 3. Pizza: parentes por cidade
#[derive(Debug, Serialize, ToSchema)]
pub struct CidadeChart {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub alunos_turma: AlunosTurmaChart,
    pub pais_cidade: CidadeChart,
}

// 4. Ranking de conversão por turma
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub turma: String,
    pub total_alunos: i64,
    pub alunos_com_foto: i64,
    #[sqlx(skip)]
    pub conversion_rate: f64,
}

#[derive(Debug, FromRow)]
pub struct CidadeCount {
    pub cidade: Option<String>,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FiltrosAplicados {
    pub turma: Option<String>,
    pub cidade: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub chart_data: ChartData,
    pub ranking: Vec<RankingEntry>,
    pub filtros: FiltrosAplicados,
    pub all_turmas: Vec<String>,
    pub all_cidades: Vec<String>,
}
