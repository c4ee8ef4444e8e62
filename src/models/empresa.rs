// src/models/empresa.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Limite de usuários quando a empresa não define um.
pub const DEFAULT_LIMITE_USUARIOS: i32 = 5;

/// Dias de assinatura concedidos a uma empresa nova sem data informada.
pub const DIAS_ASSINATURA_PADRAO: i64 = 30;

// Mapeia o CREATE TYPE status_empresa do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "status_empresa")]
pub enum StatusEmpresa {
    Ativa,
    Inativa,
}

// ---
// Empresa (o tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: Uuid,
    #[schema(example = "Foto Arte Formaturas")]
    pub nome: String,
    pub assinatura_ativa_ate: NaiveDate,
    #[schema(example = 5)]
    pub max_usuarios: i32,
    pub status: StatusEmpresa,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Empresa {
    /// Assinatura vale até o fim do dia `assinatura_ativa_ate`, inclusive.
    pub fn assinatura_valida(&self, hoje: NaiveDate) -> bool {
        self.assinatura_ativa_ate >= hoje
    }

    pub fn ativa(&self) -> bool {
        self.status == StatusEmpresa::Ativa
    }

    pub fn limite_usuarios(&self) -> i64 {
        if self.max_usuarios > 0 {
            self.max_usuarios as i64
        } else {
            DEFAULT_LIMITE_USUARIOS as i64
        }
    }
}

// Listagem do super-admin: a empresa e quantos usuários ela tem
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaResumo {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub empresa: Empresa,
    pub total_usuarios: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmpresaPayload {
    #[validate(length(min = 1, max = 100, message = "O nome da empresa é obrigatório."))]
    pub nome_empresa: String,

    #[validate(
        email(message = "O e-mail do administrador é inválido."),
        length(max = 120, message = "O e-mail deve ter no máximo 120 caracteres.")
    )]
    pub email_admin: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha_admin: String,

    pub max_usuarios: Option<i32>,

    pub assinatura_ativa_ate: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmpresaPayload {
    #[validate(length(min = 1, max = 100, message = "O nome da empresa não pode ser vazio."))]
    pub nome: Option<String>,

    pub assinatura_ativa_ate: Option<NaiveDate>,

    #[validate(range(min = 1, message = "O limite de usuários deve ser positivo."))]
    pub max_usuarios: Option<i32>,

    pub status: Option<StatusEmpresa>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empresa(ate: NaiveDate, max_usuarios: i32) -> Empresa {
        Empresa {
            id: Uuid::new_v4(),
            nome: "Studio".into(),
            assinatura_ativa_ate: ate,
            max_usuarios,
            status: StatusEmpresa::Ativa,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn subscription_is_valid_through_the_expiry_day() {
        let hoje = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(empresa(hoje, 5).assinatura_valida(hoje));
        assert!(!empresa(hoje.pred_opt().unwrap(), 5).assinatura_valida(hoje));
    }

    #[test]
    fn zero_user_limit_falls_back_to_default() {
        let hoje = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(empresa(hoje, 0).limite_usuarios(), 5);
        assert_eq!(empresa(hoje, 12).limite_usuarios(), 12);
    }
}
