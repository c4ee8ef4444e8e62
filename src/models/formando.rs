// src/models/formando.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Tamanhos das colunas VARCHAR de `formandos` e `parentes`.
pub const TURMA_MAX: usize = 100;
pub const ALUNO_MAX: usize = 100;
pub const PARENTE_NOME_MAX: usize = 100;
pub const GRAU_MAX: usize = 50;
pub const CIDADE_MAX: usize = 100;
pub const PROFISSAO_MAX: usize = 100;

// ---
// 1. Formando (o aluno). A turma é só uma string de agrupamento.
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Formando {
    pub id: Uuid,
    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub empresa_id: Uuid,
    #[schema(example = "3º Ano A - 2025")]
    pub turma: String,
    #[schema(example = "Maria Oliveira")]
    pub aluno: String,
    pub created_at: DateTime<Utc>,
}

/// Linha aceita de uma importação (ou de um cadastro avulso)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovoFormando {
    pub turma: String,
    pub aluno: String,
}

// Consolidado por turma
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurmaResumo {
    pub turma: String,
    pub alunos_count: i64,
    pub parentes_count: i64,
    pub fotos_compradas_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurmasOverview {
    pub turmas: Vec<TurmaResumo>,
    pub total_turmas: i64,
    pub total_alunos: i64,
    pub total_parentes: i64,
    pub total_fotos_compradas: i64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Ordem {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAlunosQuery {
    #[serde(default)]
    pub order: Ordem,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurmaDetalhe {
    pub turma_atual: String,
    pub alunos: Vec<Formando>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameTurmaPayload {
    pub nova_turma: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAlunoPayload {
    pub aluno: Option<String>,
}

/// Formulário `multipart/form-data` da importação (só para a documentação)
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ImportarArquivo {
    /// Planilha CSV, XLS ou XLSX com as colunas "Turma" e "Aluno"
    #[schema(value_type = String, format = Binary)]
    pub arquivo: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub inseridos: u64,
}

// ---
// 2. Parente (familiar do formando)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Parente {
    pub id: Uuid,
    pub formando_id: Uuid,
    #[schema(example = "José Oliveira")]
    pub nome: String,
    #[schema(example = "Pai")]
    pub grau: String,
    #[schema(example = "São Paulo")]
    pub cidade: String,
    #[schema(example = "11999990000")]
    pub telefone: String,
    pub data_nascimento: Option<NaiveDate>,
    pub profissao: Option<String>,
    pub comprou_foto: bool,
}

/// Campos enviados pelo formulário de parente. Na criação os ausentes recebem
/// padrão; na edição os ausentes mantêm o valor atual.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentePayload {
    pub formando_id: Option<Uuid>,
    pub nome: Option<String>,
    pub grau: Option<String>,
    pub cidade: Option<String>,
    pub telefone: Option<String>,
    /// `AAAA-MM-DD`; vazio remove a data
    pub data_nascimento: Option<String>,
    pub profissao: Option<String>,
    pub comprou_foto: Option<bool>,
}

/// Parente já validado e normalizado, pronto para gravar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenteDados {
    pub nome: String,
    pub grau: String,
    pub cidade: String,
    pub telefone: String,
    pub data_nascimento: Option<NaiveDate>,
    pub profissao: Option<String>,
    pub comprou_foto: bool,
}

impl From<Parente> for ParenteDados {
    fn from(p: Parente) -> Self {
        Self {
            nome: p.nome,
            grau: p.grau,
            cidade: p.cidade,
            telefone: p.telefone,
            data_nascimento: p.data_nascimento,
            profissao: p.profissao,
            comprou_foto: p.comprou_foto,
        }
    }
}
