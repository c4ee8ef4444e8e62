// src/models/usuario.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Tamanhos das colunas de `usuarios`.
pub const NOME_MAX: usize = 50;
pub const USERNAME_MAX: usize = 50;

// Mapeia o CREATE TYPE papel_usuario do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "papel_usuario", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Papel {
    Adm,
    Editor,
    Visualizador,
}

impl Papel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Papel::Adm => "ADM",
            Papel::Editor => "EDITOR",
            Papel::Visualizador => "VISUALIZADOR",
        }
    }

    /// Pode criar, editar e excluir formandos e parentes.
    pub fn pode_editar(&self) -> bool {
        matches!(self, Papel::Adm | Papel::Editor)
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    pub empresa_id: Uuid,
    #[schema(example = "ana@fotoarte.com")]
    pub email: String,
    #[schema(example = "Ana Souza")]
    pub nome: String,
    pub username: Option<String>,
    pub foto_perfil: Option<String>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub senha_hash: String,

    pub papel: Papel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para login. Sem validação de formato: o e-mail digitado volta na resposta de erro.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[schema(example = "ana@fotoarte.com")]
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub usuario: Usuario,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do usuário
    pub exp: usize, // Expiração
    pub iat: usize, // Emissão
}

// --- Equipe ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsuarioPayload {
    #[validate(
        email(message = "O e-mail fornecido é inválido."),
        length(max = 120, message = "O e-mail deve ter no máximo 120 caracteres.")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,
    pub papel: Papel,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsuarioPayload {
    #[validate(length(min = 1, max = 50, message = "O nome não pode ser vazio."))]
    pub nome: Option<String>,
    pub papel: Option<Papel>,
}

// --- Perfil ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerfilPayload {
    pub nome: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FotoPerfilPayload {
    /// `data:image/<ext>;base64,<dados>` gerado pelo recorte no navegador
    pub cropped_image_data: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlterarSenhaPayload {
    pub current_password: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidarSenhaPayload {
    pub current_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidarSenhaResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_adm_and_editor_can_edit() {
        assert!(Papel::Adm.pode_editar());
        assert!(Papel::Editor.pode_editar());
        assert!(!Papel::Visualizador.pode_editar());
    }

    #[test]
    fn roles_use_the_uppercase_wire_names() {
        let papel: Papel = serde_json::from_str("\"VISUALIZADOR\"").unwrap();
        assert_eq!(papel, Papel::Visualizador);
        assert_eq!(serde_json::to_string(&Papel::Adm).unwrap(), "\"ADM\"");
        assert!(serde_json::from_str::<Papel>("\"GERENTE\"").is_err());
    }
}
