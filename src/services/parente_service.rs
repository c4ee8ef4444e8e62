// src/services/parente_service.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        text::{limitar, title_case},
    },
    db::{FormandoRepository, ParenteRepository},
    models::formando::{
        Parente, ParenteDados, ParentePayload, CIDADE_MAX, GRAU_MAX, PARENTE_NOME_MAX, PROFISSAO_MAX,
    },
};

const TELEFONE_MAX: usize = 15;

#[derive(Clone)]
pub struct ParenteService {
    parente_repo: ParenteRepository,
    formando_repo: FormandoRepository,
}

fn obrigatorio(campo: &str, valor: &str, max: usize) -> Result<String, AppError> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Err(AppError::BadRequest(format!(
            "O campo '{}' é obrigatório e não pode ser vazio.",
            campo
        )));
    }
    Ok(limitar(campo, valor, max)?.to_string())
}

fn telefone(valor: &str) -> Result<String, AppError> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Ok("-".to_string());
    }
    if valor.chars().count() > TELEFONE_MAX {
        return Err(AppError::BadRequest(format!(
            "O telefone deve ter no máximo {} caracteres.",
            TELEFONE_MAX
        )));
    }
    Ok(valor.to_string())
}

/// `AAAA-MM-DD`; vazio vira `None`.
fn data_nascimento(valor: &str) -> Result<Option<NaiveDate>, AppError> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(valor, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            AppError::BadRequest("Formato inválido para data_nascimento. Use AAAA-MM-DD.".to_string())
        })
}

fn profissao(valor: &str) -> Result<Option<String>, AppError> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Ok(None);
    }
    Ok(Some(limitar("profissao", valor, PROFISSAO_MAX)?.to_string()))
}

/// Valida um parente novo: ausentes recebem os padrões do formulário.
pub fn validar_novo(payload: &ParentePayload) -> Result<ParenteDados, AppError> {
    Ok(ParenteDados {
        nome: obrigatorio("nome", payload.nome.as_deref().unwrap_or("Sem nome"), PARENTE_NOME_MAX)?,
        grau: obrigatorio("grau", payload.grau.as_deref().unwrap_or_default(), GRAU_MAX)?,
        cidade: title_case(&obrigatorio("cidade", payload.cidade.as_deref().unwrap_or_default(), CIDADE_MAX)?),
        telefone: telefone(payload.telefone.as_deref().unwrap_or_default())?,
        data_nascimento: data_nascimento(payload.data_nascimento.as_deref().unwrap_or_default())?,
        profissao: payload.profissao.as_deref().map(profissao).transpose()?.flatten(),
        comprou_foto: payload.comprou_foto.unwrap_or(false),
    })
}

/// Edição parcial: só os campos enviados mudam, com as mesmas regras da criação.
pub fn mesclar(atual: ParenteDados, payload: &ParentePayload) -> Result<ParenteDados, AppError> {
    Ok(ParenteDados {
        nome: match payload.nome.as_deref() {
            Some(nome) => obrigatorio("nome", nome, PARENTE_NOME_MAX)?,
            None => atual.nome,
        },
        grau: match payload.grau.as_deref() {
            Some(grau) => obrigatorio("grau", grau, GRAU_MAX)?,
            None => atual.grau,
        },
        cidade: match payload.cidade.as_deref() {
            Some(cidade) => title_case(&obrigatorio("cidade", cidade, CIDADE_MAX)?),
            None => atual.cidade,
        },
        telefone: match payload.telefone.as_deref() {
            Some(valor) => telefone(valor)?,
            None => atual.telefone,
        },
        data_nascimento: match payload.data_nascimento.as_deref() {
            Some(valor) => data_nascimento(valor)?,
            None => atual.data_nascimento,
        },
        profissao: match payload.profissao.as_deref() {
            Some(valor) => profissao(valor)?,
            None => atual.profissao,
        },
        comprou_foto: payload.comprou_foto.unwrap_or(atual.comprou_foto),
    })
}

impl ParenteService {
    pub fn new(parente_repo: ParenteRepository, formando_repo: FormandoRepository) -> Self {
        Self { parente_repo, formando_repo }
    }

    /// Parentes de um formando da empresa; formando de outra empresa é 404.
    pub async fn list(&self, empresa_id: Uuid, formando_id: Uuid) -> Result<Vec<Parente>, AppError> {
        self.formando_repo
            .find_in_empresa(empresa_id, formando_id)
            .await?
            .ok_or(AppError::NotFound("Aluno"))?;
        self.parente_repo.list_by_formando(empresa_id, formando_id).await
    }

    pub async fn create(
        &self,
        empresa_id: Uuid,
        payload: &ParentePayload,
    ) -> Result<(Parente, Vec<Parente>), AppError> {
        let formando_id = payload
            .formando_id
            .ok_or_else(|| AppError::BadRequest("Faltou ID do Aluno".to_string()))?;
        let dados = validar_novo(payload)?;

        self.formando_repo
            .find_in_empresa(empresa_id, formando_id)
            .await?
            .ok_or(AppError::NotFound("Aluno"))?;

        let parente = self.parente_repo.create(formando_id, &dados).await?;
        let parentes = self.parente_repo.list_by_formando(empresa_id, formando_id).await?;
        Ok((parente, parentes))
    }

    pub async fn update(
        &self,
        empresa_id: Uuid,
        id: Uuid,
        payload: &ParentePayload,
    ) -> Result<(Parente, Vec<Parente>), AppError> {
        let atual = self
            .parente_repo
            .find_in_empresa(empresa_id, id)
            .await?
            .ok_or(AppError::NotFound("Parente"))?;
        let formando_id = atual.formando_id;

        let dados = mesclar(atual.into(), payload)?;
        let parente = self.parente_repo.update(id, &dados).await?;
        let parentes = self.parente_repo.list_by_formando(empresa_id, formando_id).await?;
        Ok((parente, parentes))
    }

    pub async fn delete(&self, empresa_id: Uuid, id: Uuid) -> Result<(Parente, Vec<Parente>), AppError> {
        let parente = self
            .parente_repo
            .find_in_empresa(empresa_id, id)
            .await?
            .ok_or(AppError::NotFound("Parente"))?;

        self.parente_repo.delete(id).await?;
        let parentes = self
            .parente_repo
            .list_by_formando(empresa_id, parente.formando_id)
            .await?;
        Ok((parente, parentes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ParentePayload {
        ParentePayload {
            formando_id: Some(Uuid::new_v4()),
            grau: Some(" Mãe ".into()),
            cidade: Some("  são josé dos campos ".into()),
            ..Default::default()
        }
    }

    #[test]
    fn new_parente_gets_form_defaults() {
        let dados = validar_novo(&payload()).unwrap();
        assert_eq!(dados.nome, "Sem nome");
        assert_eq!(dados.grau, "Mãe");
        assert_eq!(dados.cidade, "São José Dos Campos");
        assert_eq!(dados.telefone, "-");
        assert_eq!(dados.data_nascimento, None);
        assert!(!dados.comprou_foto);
    }

    #[test]
    fn grau_and_cidade_are_required() {
        let mut sem_grau = payload();
        sem_grau.grau = None;
        assert!(matches!(validar_novo(&sem_grau), Err(AppError::BadRequest(ref m)) if m.contains("'grau'")));

        let mut cidade_vazia = payload();
        cidade_vazia.cidade = Some("   ".into());
        assert!(matches!(validar_novo(&cidade_vazia), Err(AppError::BadRequest(ref m)) if m.contains("'cidade'")));
    }

    #[test]
    fn fields_longer_than_the_columns_are_rejected() {
        let mut grau_longo = payload();
        grau_longo.grau = Some("g".repeat(GRAU_MAX + 1));
        assert!(matches!(validar_novo(&grau_longo), Err(AppError::BadRequest(ref m)) if m.contains("'grau'")));

        let mut profissao_longa = payload();
        profissao_longa.profissao = Some("p".repeat(PROFISSAO_MAX + 1));
        assert!(matches!(validar_novo(&profissao_longa), Err(AppError::BadRequest(ref m)) if m.contains("'profissao'")));

        let atual = validar_novo(&payload()).unwrap();
        let edicao = ParentePayload { nome: Some("n".repeat(PARENTE_NOME_MAX + 1)), ..Default::default() };
        assert!(matches!(mesclar(atual.clone(), &edicao), Err(AppError::BadRequest(ref m)) if m.contains("'nome'")));

        let edicao = ParentePayload { cidade: Some("c".repeat(CIDADE_MAX)), ..Default::default() };
        assert_eq!(mesclar(atual, &edicao).unwrap().cidade.chars().count(), CIDADE_MAX);
    }

    #[test]
    fn birth_date_must_be_iso() {
        let mut p = payload();
        p.data_nascimento = Some("1975-03-09".into());
        assert_eq!(validar_novo(&p).unwrap().data_nascimento, NaiveDate::from_ymd_opt(1975, 3, 9));

        p.data_nascimento = Some("09/03/1975".into());
        let err = validar_novo(&p).unwrap_err();
        assert_eq!(err.to_string(), "Formato inválido para data_nascimento. Use AAAA-MM-DD.");
    }

    #[test]
    fn long_phone_numbers_are_rejected() {
        let mut p = payload();
        p.telefone = Some("+55 (11) 99999-0000".into());
        assert!(validar_novo(&p).is_err());
    }

    #[test]
    fn partial_edit_keeps_untouched_fields() {
        let atual = validar_novo(&ParentePayload {
            nome: Some("José".into()),
            telefone: Some("11999990000".into()),
            profissao: Some("Médico".into()),
            ..payload()
        })
        .unwrap();

        let editado = mesclar(
            atual.clone(),
            &ParentePayload {
                cidade: Some("CAMPINAS".into()),
                comprou_foto: Some(true),
                profissao: Some("".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(editado.nome, atual.nome);
        assert_eq!(editado.telefone, "11999990000");
        assert_eq!(editado.cidade, "Campinas");
        assert_eq!(editado.profissao, None);
        assert!(editado.comprou_foto);
    }
}
