// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{NaiveDate, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::normalize_email},
    db::{EmpresaRepository, UsuarioRepository},
    models::{
        empresa::Empresa,
        usuario::{Claims, Usuario},
    },
};

const TOKEN_VALIDADE_DIAS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    empresa_repo: EmpresaRepository,
    jwt_secret: String,
}

/// Data de hoje no fuso do servidor; a assinatura vence por dia-calendário.
pub fn hoje() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// O bcrypt é caro: roda fora das threads do runtime.
pub async fn hash_password(senha: &str) -> Result<String, AppError> {
    let senha = senha.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&senha, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(senha: &str, senha_hash: &str) -> Result<bool, AppError> {
    let senha = senha.to_owned();
    let senha_hash = senha_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&senha, &senha_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

/// Regras da empresa no login: primeiro a assinatura, depois o status.
pub fn verificar_empresa_login(empresa: &Empresa, hoje: NaiveDate, email: &str) -> Result<(), AppError> {
    if !empresa.assinatura_valida(hoje) {
        return Err(AppError::AssinaturaExpirada { email: email.to_string() });
    }
    if !empresa.ativa() {
        return Err(AppError::EmpresaInativa { email: email.to_string() });
    }
    Ok(())
}

/// Regras da empresa a cada requisição autenticada; falhar encerra a sessão.
pub fn verificar_sessao(empresa: &Empresa, hoje: NaiveDate) -> Result<(), AppError> {
    if !empresa.ativa() {
        return Err(AppError::SessaoEncerrada(
            "Sua empresa está inativa. Sessão encerrada.".to_string(),
        ));
    }
    if !empresa.assinatura_valida(hoje) {
        return Err(AppError::SessaoEncerrada(
            "Assinatura expirada! Regularize o pagamento para acessar o sistema.".to_string(),
        ));
    }
    Ok(())
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, empresa_repo: EmpresaRepository, jwt_secret: String) -> Self {
        Self { usuario_repo, empresa_repo, jwt_secret }
    }

    /// Valida as credenciais e as regras da empresa; devolve o token e o usuário.
    pub async fn login(&self, email: &str, senha: &str) -> Result<(String, Usuario), AppError> {
        let email = normalize_email(email);

        let usuario = self
            .usuario_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::EmailNaoCadastrado { email: email.clone() })?;

        if !verify_password(senha, &usuario.senha_hash).await? {
            return Err(AppError::SenhaIncorreta { email });
        }

        let empresa = self.empresa_of(&usuario).await?;
        verificar_empresa_login(&empresa, hoje(), &email)?;

        let token = self.create_token(usuario.id)?;
        Ok((token, usuario))
    }

    /// Decodifica o token e carrega o usuário e a empresa dele.
    pub async fn validate_token(&self, token: &str) -> Result<(Usuario, Empresa), AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let usuario = self
            .usuario_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;
        let empresa = self.empresa_of(&usuario).await?;

        Ok((usuario, empresa))
    }

    async fn empresa_of(&self, usuario: &Usuario) -> Result<Empresa, AppError> {
        self.empresa_repo
            .find_by_id(usuario.empresa_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("usuário {} sem empresa", usuario.id).into())
    }

    pub fn create_token(&self, usuario_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_VALIDADE_DIAS);

        let claims = Claims {
            sub: usuario_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
