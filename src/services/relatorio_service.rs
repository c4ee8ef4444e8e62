// src/services/relatorio_service.rs

use std::path::{Path, PathBuf};

use genpdf::{elements, style, Element};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::secure_filename},
    db::RelatorioRepository,
    models::relatorio::{
        AlunoNome, CampoRelatorio, ExportPayload, FiltrosRelatorio, FormatoExportacao,
        OpcoesRelatorio, RelatorioLinha,
    },
};

const LINHAS_PREVIEW: i64 = 3;
const NOME_PADRAO: &str = "relatorio";
const TITULO: &str = "Relatório";
const CABECALHO_PDF: &str = "Relatório - Formaturas App";

/// Arquivo pronto para download
#[derive(Debug)]
pub struct Exportacao {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

#[derive(Clone)]
pub struct RelatorioService {
    relatorio_repo: RelatorioRepository,
    fonts_dir: PathBuf,
}

fn exigir_campos(campos: &[CampoRelatorio]) -> Result<(), AppError> {
    if campos.is_empty() {
        return Err(AppError::BadRequest("Selecione ao menos um campo.".to_string()));
    }
    Ok(())
}

/// Nome final do arquivo: sanitizado, com padrão e extensão do formato.
pub fn nome_arquivo(file_name: Option<&str>, formato: FormatoExportacao) -> String {
    let base = secure_filename(file_name.unwrap_or_default());
    let base = if base.is_empty() { NOME_PADRAO.to_string() } else { base };
    format!("{}.{}", base, formato.extension())
}

/// Linhas como objetos JSON com só os campos pedidos.
pub fn montar_preview(linhas: &[RelatorioLinha], campos: &[CampoRelatorio]) -> Vec<Map<String, Value>> {
    linhas
        .iter()
        .map(|linha| {
            campos
                .iter()
                .map(|campo| (campo.key().to_string(), Value::from(campo.value(linha))))
                .collect()
        })
        .collect()
}

pub fn gerar_excel(linhas: &[RelatorioLinha], campos: &[CampoRelatorio]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(TITULO)?;

    for (col, campo) in campos.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, campo.label(), &bold)?;
    }
    for (row, linha) in linhas.iter().enumerate() {
        for (col, campo) in campos.iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, campo.value(linha))?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn gerar_pdf(
    fonts_dir: &Path,
    linhas: &[RelatorioLinha],
    campos: &[CampoRelatorio],
) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None).map_err(|_| {
        AppError::FontNotFound(format!("Fonte Roboto não encontrada em {}", fonts_dir.display()))
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(TITULO);

    // Cabeçalho de toda página: título, data de geração e número da página
    let gerado_em = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    decorator.set_header(move |page| {
        let mut header = elements::LinearLayout::vertical();
        header.push(
            elements::Paragraph::new(CABECALHO_PDF)
                .styled(style::Style::new().bold().with_font_size(10)),
        );
        header.push(
            elements::Paragraph::new(format!("Gerado em {} | Página {}", gerado_em, page))
                .styled(style::Style::new().with_font_size(8)),
        );
        header.push(elements::Break::new(1));
        header
    });
    doc.set_page_decorator(decorator);

    doc.push(elements::Paragraph::new(TITULO).styled(style::Style::new().bold().with_font_size(16)));
    doc.push(elements::Break::new(1));

    let mut table = elements::TableLayout::new(vec![1; campos.len()]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let bold = style::Style::new().bold().with_font_size(9);
    let mut header = table.row();
    for campo in campos {
        header.push_element(elements::Paragraph::new(campo.label()).styled(bold).padded(1));
    }
    header.push()?;

    let normal = style::Style::new().with_font_size(9);
    for linha in linhas {
        let mut row = table.row();
        for campo in campos {
            row.push_element(elements::Paragraph::new(campo.value(linha)).styled(normal).padded(1));
        }
        row.push()?;
    }
    doc.push(table);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)?;
    Ok(buffer)
}

impl RelatorioService {
    pub fn new(relatorio_repo: RelatorioRepository, fonts_dir: PathBuf) -> Self {
        Self { relatorio_repo, fonts_dir }
    }

    pub async fn opcoes(&self, empresa_id: Uuid) -> Result<OpcoesRelatorio, AppError> {
        Ok(OpcoesRelatorio {
            turmas: self.relatorio_repo.distinct_turmas(empresa_id).await?,
            alunos: self.relatorio_repo.distinct_alunos(empresa_id).await?,
            cidades: self.relatorio_repo.distinct_cidades(empresa_id).await?,
        })
    }

    pub async fn alunos(&self, empresa_id: Uuid, turma: &str) -> Result<Vec<AlunoNome>, AppError> {
        self.relatorio_repo.alunos_by_turma(empresa_id, turma).await
    }

    pub async fn preview(
        &self,
        empresa_id: Uuid,
        filtros: &FiltrosRelatorio,
        campos: &[CampoRelatorio],
    ) -> Result<Vec<Map<String, Value>>, AppError> {
        exigir_campos(campos)?;
        let linhas = self
            .relatorio_repo
            .find_linhas(empresa_id, filtros, Some(LINHAS_PREVIEW))
            .await?;
        Ok(montar_preview(&linhas, campos))
    }

    pub async fn exportar(&self, empresa_id: Uuid, payload: ExportPayload) -> Result<Exportacao, AppError> {
        exigir_campos(&payload.fields)?;
        let formato = FormatoExportacao::parse(payload.export_type.as_deref())
            .ok_or_else(|| AppError::BadRequest("Tipo de exportação inválido.".to_string()))?;

        let linhas = self
            .relatorio_repo
            .find_linhas(empresa_id, &payload.filtros, None)
            .await?;
        tracing::debug!("Exportando {} linhas em {}", linhas.len(), formato.extension());

        let campos = payload.fields;
        let fonts_dir = self.fonts_dir.clone();
        let bytes = tokio::task::spawn_blocking(move || match formato {
            FormatoExportacao::Excel => gerar_excel(&linhas, &campos),
            FormatoExportacao::Pdf => gerar_pdf(&fonts_dir, &linhas, &campos),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de exportação: {}", e))??;

        Ok(Exportacao {
            bytes,
            filename: nome_arquivo(payload.file_name.as_deref(), formato),
            mime: formato.mime(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linhas() -> Vec<RelatorioLinha> {
        vec![
            RelatorioLinha {
                turma: "3A".into(),
                aluno: "Maria".into(),
                parente: "José".into(),
                cidade: "Campinas".into(),
                telefone: "19999990000".into(),
                grau: "Pai".into(),
                comprou_foto: true,
            },
            RelatorioLinha {
                turma: "3A".into(),
                aluno: "Maria".into(),
                parente: "Ana".into(),
                cidade: "Campinas".into(),
                telefone: "-".into(),
                grau: "Mãe".into(),
                comprou_foto: false,
            },
        ]
    }

    #[test]
    fn preview_keeps_only_selected_fields() {
        let preview = montar_preview(&linhas(), &[CampoRelatorio::Parente, CampoRelatorio::ComprouFoto]);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].len(), 2);
        assert_eq!(preview[0]["parente"], "José");
        assert_eq!(preview[1]["comprou_foto"], "Não");
        assert!(!preview[0].contains_key("turma"));
    }

    #[test]
    fn file_name_is_sanitized_with_default() {
        assert_eq!(nome_arquivo(Some("Turma 3A/2025"), FormatoExportacao::Excel), "Turma_3A2025.xlsx");
        assert_eq!(nome_arquivo(Some("../.."), FormatoExportacao::Pdf), "relatorio.pdf");
        assert_eq!(nome_arquivo(None, FormatoExportacao::Pdf), "relatorio.pdf");
    }

    #[test]
    fn excel_export_is_an_xlsx_zip() {
        let bytes = gerar_excel(&linhas(), &[CampoRelatorio::Turma, CampoRelatorio::Aluno]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn pdf_export_requires_fonts() {
        let dir = tempfile::tempdir().unwrap();
        let err = gerar_pdf(dir.path(), &linhas(), &[CampoRelatorio::Turma]).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }

    #[test]
    fn at_least_one_field_is_required() {
        assert!(matches!(exigir_campos(&[]), Err(AppError::BadRequest(_))));
        assert!(exigir_campos(&[CampoRelatorio::Grau]).is_ok());
    }
}
