// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, text::capitalize},
    db::{dashboard_repo::Contagens, DashboardRepository},
    models::dashboard::{
        AlunosTurmaChart, ChartData, CidadeChart, CidadeCount, Dashboard, DashboardQuery,
        DashboardStats, FiltrosAplicados, RankingEntry,
    },
};

const TODAS_AS_TURMAS: &str = "Todas as Turmas";
const CIDADE_DESCONHECIDA: &str = "Desconhecido";

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

fn percentual(parte: i64, total: i64) -> f64 {
    if total > 0 { parte as f64 / total as f64 * 100.0 } else { 0.0 }
}

fn filtro(valor: Option<&str>) -> Option<&str> {
    valor.map(str::trim).filter(|v| !v.is_empty())
}

pub fn calcular_stats(c: &Contagens) -> DashboardStats {
    DashboardStats {
        turmas: c.turmas,
        alunos: c.alunos,
        parentes: c.parentes,
        compraram_foto: c.compraram_foto,
        nao_compraram: c.parentes - c.compraram_foto,
        media_parentes: if c.alunos > 0 { c.parentes as f64 / c.alunos as f64 } else { 0.0 },
        perc_alunos_foto: percentual(c.alunos_com_foto, c.alunos),
    }
}

/// Ranking com a taxa de conversão preenchida, da maior para a menor.
pub fn ordenar_ranking(mut ranking: Vec<RankingEntry>) -> Vec<RankingEntry> {
    for entry in &mut ranking {
        entry.conversion_rate = percentual(entry.alunos_com_foto, entry.total_alunos);
    }
    ranking.sort_by(|a, b| b.conversion_rate.total_cmp(&a.conversion_rate));
    ranking
}

/// Sem filtro de turma o gráfico mostra uma barra só, com o total geral.
pub fn chart_alunos(turma: Option<&str>, contagens: &Contagens, ranking: &[RankingEntry]) -> AlunosTurmaChart {
    match turma {
        Some(turma) => {
            let linhas: Vec<&RankingEntry> = ranking.iter().filter(|r| r.turma == turma).collect();
            AlunosTurmaChart {
                labels: linhas.iter().map(|r| r.turma.clone()).collect(),
                total: linhas.iter().map(|r| r.total_alunos).collect(),
                com_foto: linhas.iter().map(|r| r.alunos_com_foto).collect(),
            }
        }
        None => AlunosTurmaChart {
            labels: vec![TODAS_AS_TURMAS.to_string()],
            total: vec![contagens.alunos],
            com_foto: vec![contagens.alunos_com_foto],
        },
    }
}

pub fn chart_cidades(cidades: Vec<CidadeCount>) -> CidadeChart {
    let (labels, data) = cidades
        .into_iter()
        .map(|c| {
            let label = c
                .cidade
                .filter(|cidade| !cidade.is_empty())
                .map(|cidade| capitalize(&cidade))
                .unwrap_or_else(|| CIDADE_DESCONHECIDA.to_string());
            (label, c.total)
        })
        .unzip();
    CidadeChart { labels, data }
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get(&self, empresa_id: Uuid, query: &DashboardQuery) -> Result<Dashboard, AppError> {
        let turma = filtro(query.turma.as_deref());
        let cidade = filtro(query.cidade.as_deref());

        let contagens = self.repo.contagens(empresa_id, turma, cidade).await?;
        let ranking = ordenar_ranking(self.repo.ranking(empresa_id).await?);
        let cidades = self.repo.parentes_por_cidade(empresa_id, turma).await?;

        Ok(Dashboard {
            stats: calcular_stats(&contagens),
            chart_data: ChartData {
                alunos_turma: chart_alunos(turma, &contagens, &ranking),
                pais_cidade: chart_cidades(cidades),
            },
            ranking,
            filtros: FiltrosAplicados {
                turma: turma.map(str::to_string),
                cidade: cidade.map(str::to_string),
            },
            all_turmas: self.repo.all_turmas(empresa_id).await?,
            all_cidades: self.repo.all_cidades(empresa_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(turma: &str, total: i64, com_foto: i64) -> RankingEntry {
        RankingEntry {
            turma: turma.into(),
            total_alunos: total,
            alunos_com_foto: com_foto,
            conversion_rate: 0.0,
        }
    }

    #[test]
    fn stats_handle_empty_tenant() {
        let stats = calcular_stats(&Contagens::default());
        assert_eq!(stats.media_parentes, 0.0);
        assert_eq!(stats.perc_alunos_foto, 0.0);
    }

    #[test]
    fn stats_derive_ratios() {
        let stats = calcular_stats(&Contagens {
            turmas: 2,
            alunos: 4,
            parentes: 10,
            compraram_foto: 3,
            alunos_com_foto: 1,
        });
        assert_eq!(stats.nao_compraram, 7);
        assert_eq!(stats.media_parentes, 2.5);
        assert_eq!(stats.perc_alunos_foto, 25.0);
    }

    #[test]
    fn ranking_is_sorted_by_conversion() {
        let ranking = ordenar_ranking(vec![entry("3A", 10, 1), entry("3B", 4, 2), entry("3C", 0, 0)]);
        let turmas: Vec<&str> = ranking.iter().map(|r| r.turma.as_str()).collect();
        assert_eq!(turmas, ["3B", "3A", "3C"]);
        assert_eq!(ranking[0].conversion_rate, 50.0);
    }

    #[test]
    fn city_labels_are_capitalized() {
        let chart = chart_cidades(vec![
            CidadeCount { cidade: Some("são paulo".into()), total: 3 },
            CidadeCount { cidade: Some("".into()), total: 1 },
            CidadeCount { cidade: None, total: 2 },
        ]);
        assert_eq!(chart.labels, ["São paulo", "Desconhecido", "Desconhecido"]);
        assert_eq!(chart.data, [3, 1, 2]);
    }

    #[test]
    fn alunos_chart_without_filter_is_a_single_bar() {
        let contagens = Contagens { alunos: 9, alunos_com_foto: 4, ..Default::default() };
        let chart = chart_alunos(None, &contagens, &[entry("3A", 5, 2)]);
        assert_eq!(chart.labels, [TODAS_AS_TURMAS]);
        assert_eq!(chart.total, [9]);

        let chart = chart_alunos(Some("3A"), &contagens, &[entry("3A", 5, 2), entry("3B", 4, 2)]);
        assert_eq!(chart.labels, ["3A"]);
        assert_eq!(chart.com_foto, [2]);
    }
}
