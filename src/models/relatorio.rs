// src/models/relatorio.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Valor de filtro que significa "sem filtro".
pub const TODAS: &str = "TODAS";
pub const TODOS: &str = "TODOS";

// Uma linha do relatório: o parente e o formando dele
#[derive(Debug, Clone, FromRow)]
pub struct RelatorioLinha {
    pub turma: String,
    pub aluno: String,
    pub parente: String,
    pub cidade: String,
    pub telefone: String,
    pub grau: String,
    pub comprou_foto: bool,
}

/// Campos que podem sair no relatório, nesta ordem de whitelist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CampoRelatorio {
    Turma,
    Aluno,
    Parente,
    Cidade,
    Telefone,
    ComprouFoto,
    Grau,
}

impl CampoRelatorio {
    pub fn key(&self) -> &'static str {
        match self {
            CampoRelatorio::Turma => "turma",
            CampoRelatorio::Aluno => "aluno",
            CampoRelatorio::Parente => "parente",
            CampoRelatorio::Cidade => "cidade",
            CampoRelatorio::Telefone => "telefone",
            CampoRelatorio::ComprouFoto => "comprou_foto",
            CampoRelatorio::Grau => "grau",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CampoRelatorio::Turma => "Turma",
            CampoRelatorio::Aluno => "Aluno",
            CampoRelatorio::Parente => "Parente",
            CampoRelatorio::Cidade => "Cidade",
            CampoRelatorio::Telefone => "Telefone",
            CampoRelatorio::ComprouFoto => "Comprou Foto",
            CampoRelatorio::Grau => "Grau",
        }
    }

    pub fn value<'a>(&self, linha: &'a RelatorioLinha) -> &'a str {
        match self {
            CampoRelatorio::Turma => &linha.turma,
            CampoRelatorio::Aluno => &linha.aluno,
            CampoRelatorio::Parente => &linha.parente,
            CampoRelatorio::Cidade => &linha.cidade,
            CampoRelatorio::Telefone => &linha.telefone,
            CampoRelatorio::ComprouFoto => {
                if linha.comprou_foto { "Sim" } else { "Não" }
            }
            CampoRelatorio::Grau => &linha.grau,
        }
    }
}

/// Filtro tri-estado de compra de foto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiltroFoto {
    Todas,
    Sim,
    Nao,
}

impl FiltroFoto {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("Sim") => FiltroFoto::Sim,
            Some("Não") | Some("Nao") => FiltroFoto::Nao,
            _ => FiltroFoto::Todas,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FiltrosRelatorio {
    #[schema(example = "TODAS")]
    pub turma: Option<String>,
    #[schema(example = "TODOS")]
    pub aluno: Option<String>,
    #[schema(example = "TODAS")]
    pub cidade: Option<String>,
    /// `Sim`, `Não` ou `Todas`
    #[schema(example = "Todas")]
    pub comprou_foto: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPayload {
    #[serde(flatten)]
    pub filtros: FiltrosRelatorio,
    #[serde(default)]
    pub fields: Vec<CampoRelatorio>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewResponse {
    #[schema(value_type = Vec<Object>)]
    pub preview: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatoExportacao {
    Excel,
    Pdf,
}

impl FormatoExportacao {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value? {
            "excel" => Some(FormatoExportacao::Excel),
            "pdf" => Some(FormatoExportacao::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FormatoExportacao::Excel => "xlsx",
            FormatoExportacao::Pdf => "pdf",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            FormatoExportacao::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            FormatoExportacao::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    #[serde(flatten)]
    pub filtros: FiltrosRelatorio,
    #[serde(default)]
    pub fields: Vec<CampoRelatorio>,
    /// `excel` ou `pdf`
    pub export_type: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OpcoesRelatorio {
    pub turmas: Vec<String>,
    pub alunos: Vec<String>,
    pub cidades: Vec<String>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct AlunoNome {
    pub aluno: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linha(comprou_foto: bool) -> RelatorioLinha {
        RelatorioLinha {
            turma: "3A".into(),
            aluno: "Maria".into(),
            parente: "José".into(),
            cidade: "Campinas".into(),
            telefone: "-".into(),
            grau: "Pai".into(),
            comprou_foto,
        }
    }

    #[test]
    fn purchased_flag_renders_as_sim_nao() {
        assert_eq!(CampoRelatorio::ComprouFoto.value(&linha(true)), "Sim");
        assert_eq!(CampoRelatorio::ComprouFoto.value(&linha(false)), "Não");
        assert_eq!(CampoRelatorio::Parente.value(&linha(true)), "José");
    }

    #[test]
    fn unknown_report_fields_are_rejected() {
        let ok: Vec<CampoRelatorio> = serde_json::from_str(r#"["turma","comprou_foto"]"#).unwrap();
        assert_eq!(ok, vec![CampoRelatorio::Turma, CampoRelatorio::ComprouFoto]);
        assert!(serde_json::from_str::<Vec<CampoRelatorio>>(r#"["senha_hash"]"#).is_err());
    }

    #[test]
    fn photo_filter_is_tri_state() {
        assert_eq!(FiltroFoto::parse(Some("Sim")), FiltroFoto::Sim);
        assert_eq!(FiltroFoto::parse(Some("Não")), FiltroFoto::Nao);
        assert_eq!(FiltroFoto::parse(Some("Todas")), FiltroFoto::Todas);
        assert_eq!(FiltroFoto::parse(None), FiltroFoto::Todas);
    }

    #[test]
    fn export_type_must_be_known() {
        assert_eq!(FormatoExportacao::parse(Some("pdf")), Some(FormatoExportacao::Pdf));
        assert_eq!(FormatoExportacao::parse(Some("csv")), None);
        assert_eq!(FormatoExportacao::parse(None), None);
    }
}
