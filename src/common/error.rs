// src/common/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::auth::removal_cookie;

// O tipo de erro único da aplicação. Todo handler devolve `Result<_, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Corpo da requisição inválido: {0}")]
    JsonInvalido(String),

    // --- Login (cada falha tem sua mensagem, e o e-mail volta para o formulário) ---
    #[error("E-mail não cadastrado.")]
    EmailNaoCadastrado { email: String },

    #[error("Senha incorreta.")]
    SenhaIncorreta { email: String },

    #[error("Assinatura expirada! Regularize seu pagamento para acessar o sistema.")]
    AssinaturaExpirada { email: String },

    #[error("Empresa inativa. Entre em contato com o suporte.")]
    EmpresaInativa { email: String },

    // --- Sessão ---
    #[error("Token de autenticação inválido ou ausente.")]
    InvalidToken,

    #[error("{0}")]
    SessaoEncerrada(String),

    // --- Autorização ---
    #[error("{0}")]
    AcessoNegado(String),

    #[error("Origem não autorizada.")]
    OrigemNaoConfiavel,

    #[error("{0} não encontrado.")]
    NotFound(&'static str),

    // --- Conflitos ---
    #[error("Este e-mail já está em uso.")]
    EmailAlreadyExists,

    #[error("Nome de usuário já está em uso. Escolha outro.")]
    UsernameAlreadyExists,

    #[error("Já existe uma empresa com esse nome.")]
    EmpresaNomeAlreadyExists,

    #[error("Valor duplicado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Limite de usuários atingido para sua empresa.")]
    LimiteUsuariosAtingido,

    #[error("{mensagem}")]
    SemTurmas { titulo: String, mensagem: String },

    // --- Arquivos ---
    #[error("Erro ao ler planilha: {0}")]
    PlanilhaInvalida(String),

    #[error("Erro ao processar a imagem: {0}")]
    ImagemInvalida(#[from] image::ImageError),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // --- Infraestrutura ---
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro ao gerar planilha: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Erro ao gerar PDF: {0}")]
    PdfError(#[from] genpdf::error::Error),

    #[error("Erro de arquivo: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::JsonInvalido(rejection.body_text())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::PlanilhaInvalida(e.to_string())
    }
}

impl From<calamine::Error> for AppError {
    fn from(e: calamine::Error) -> Self {
        AppError::PlanilhaInvalida(e.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::JsonInvalido(_)
            | AppError::PlanilhaInvalida(_)
            | AppError::ImagemInvalida(_) => StatusCode::BAD_REQUEST,

            AppError::EmailNaoCadastrado { .. }
            | AppError::SenhaIncorreta { .. }
            | AppError::AssinaturaExpirada { .. }
            | AppError::EmpresaInativa { .. }
            | AppError::InvalidToken
            | AppError::SessaoEncerrada(_) => StatusCode::UNAUTHORIZED,

            AppError::AcessoNegado(_) | AppError::OrigemNaoConfiavel => StatusCode::FORBIDDEN,

            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists
            | AppError::UsernameAlreadyExists
            | AppError::EmpresaNomeAlreadyExists
            | AppError::UniqueConstraintViolation(_)
            | AppError::LimiteUsuariosAtingido
            | AppError::SemTurmas { .. } => StatusCode::CONFLICT,

            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte violações de UNIQUE do Postgres nos erros amigáveis, pelo nome da constraint.
    pub fn from_unique_violation(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some("usuarios_email_key") => AppError::EmailAlreadyExists,
                    Some("usuarios_username_key") => AppError::UsernameAlreadyExists,
                    Some("empresas_nome_key") => AppError::EmpresaNomeAlreadyExists,
                    Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                    None => AppError::UniqueConstraintViolation("desconhecida".to_string()),
                };
            }
        }
        e.into()
    }

    fn body(&self) -> Value {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "success": false,
                    "message": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::EmailNaoCadastrado { email }
            | AppError::SenhaIncorreta { email }
            | AppError::AssinaturaExpirada { email }
            | AppError::EmpresaInativa { email } => json!({
                "success": false,
                "message": self.to_string(),
                "email": email,
            }),
            AppError::SemTurmas { titulo, mensagem } => json!({
                "success": false,
                "code": "SEM_TURMAS",
                "title": titulo,
                "message": mensagem,
            }),
            AppError::OrigemNaoConfiavel => json!({ "valid": false }),
            e if e.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                // O detalhe vai para o log, nunca para o cliente.
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({ "success": false, "message": "Ocorreu um erro inesperado." })
            }
            e => json!({ "success": false, "message": e.to_string() }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.body());

        if let AppError::SessaoEncerrada(_) = self {
            return (
                status,
                [(header::SET_COOKIE, removal_cookie().to_string())],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_errors_echo_the_submitted_email() {
        let err = AppError::SenhaIncorreta { email: "ana@studio.com".into() };
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let body = err.body();
        assert_eq!(body["email"], "ana@studio.com");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Senha incorreta.");
    }

    #[test]
    fn each_login_failure_has_a_distinct_message() {
        let email = || "x@y.com".to_string();
        let messages = [
            AppError::EmailNaoCadastrado { email: email() }.to_string(),
            AppError::SenhaIncorreta { email: email() }.to_string(),
            AppError::AssinaturaExpirada { email: email() }.to_string(),
            AppError::EmpresaInativa { email: email() }.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body()["message"], "Ocorreu um erro inesperado.");
    }

    #[test]
    fn session_end_clears_the_cookie() {
        let response = AppError::SessaoEncerrada("Empresa inativa.".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.starts_with("formaturas_token="));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn sem_turmas_carries_a_code() {
        let err = AppError::SemTurmas {
            titulo: "Sem turmas cadastradas".into(),
            mensagem: "Adicione ao menos uma turma.".into(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.body()["code"], "SEM_TURMAS");
    }
}
