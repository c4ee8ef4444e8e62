// src/services/perfil_service.rs

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageOutputFormat;

use crate::{
    common::{error::AppError, text::limitar},
    db::UsuarioRepository,
    models::usuario::{AlterarSenhaPayload, UpdatePerfilPayload, Usuario, NOME_MAX, USERNAME_MAX},
    services::auth::{hash_password, verify_password},
};

const EXTENSOES_PERMITIDAS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
const QUALIDADE_JPEG: u8 = 85;

/// Prefixo público das fotos (servidas em `/uploads`).
const PREFIXO_PUBLICO: &str = "uploads/";

#[derive(Clone)]
pub struct PerfilService {
    usuario_repo: UsuarioRepository,
    upload_dir: PathBuf,
}

/// Separa `data:image/<ext>;base64,<dados>` em extensão e bytes decodificados.
pub fn parse_data_url(data: &str) -> Result<(String, Vec<u8>), AppError> {
    let rest = data
        .strip_prefix("data:image/")
        .ok_or_else(|| AppError::BadRequest("Formato de imagem inválido.".to_string()))?;
    let (ext, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::BadRequest("Formato de imagem inválido.".to_string()))?;

    let ext = ext.to_lowercase();
    if !EXTENSOES_PERMITIDAS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest("Formato de imagem não permitido.".to_string()));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::BadRequest("Imagem com base64 inválido.".to_string()))?;
    Ok((ext, bytes))
}

/// Decodifica a imagem (validando-a) e regrava no formato da extensão.
/// JPEG perde o canal alfa e sai com qualidade 85.
pub fn reencode(bytes: &[u8], ext: &str) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(bytes)?;
    let mut out = Vec::new();
    match ext {
        "jpg" | "jpeg" => {
            let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_to(&mut out, ImageOutputFormat::Jpeg(QUALIDADE_JPEG))?;
        }
        "gif" => img.write_to(&mut out, ImageOutputFormat::Gif)?,
        _ => img.write_to(&mut out, ImageOutputFormat::Png)?,
    }
    Ok(out)
}

impl PerfilService {
    pub fn new(usuario_repo: UsuarioRepository, upload_dir: PathBuf) -> Self {
        Self { usuario_repo, upload_dir }
    }

    pub async fn update(&self, usuario: &Usuario, payload: &UpdatePerfilPayload) -> Result<Usuario, AppError> {
        let nome = payload
            .nome
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&usuario.nome);
        let nome = limitar("nome", nome, NOME_MAX)?;

        let username = match payload.username.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(username) => {
                if username.contains('<') || username.contains('>') {
                    return Err(AppError::BadRequest(
                        "O nome de usuário contém caracteres inválidos.".to_string(),
                    ));
                }
                let username = limitar("username", username, USERNAME_MAX)?;
                if self.usuario_repo.username_taken_by_other(username, usuario.id).await? {
                    return Err(AppError::UsernameAlreadyExists);
                }
                Some(username)
            }
            None => usuario.username.as_deref(),
        };

        self.usuario_repo.update_perfil(usuario.id, nome, username).await
    }

    /// Salva a foto recortada como `fotos/user_<id>.<ext>` e remove a anterior.
    pub async fn set_foto(&self, usuario: &Usuario, data_url: &str) -> Result<Usuario, AppError> {
        let (ext, bytes) = parse_data_url(data_url)?;

        let ext_clone = ext.clone();
        let encoded = tokio::task::spawn_blocking(move || reencode(&bytes, &ext_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de imagem: {}", e))??;

        let pasta = self.upload_dir.join("fotos");
        tokio::fs::create_dir_all(&pasta).await?;

        let filename = format!("user_{}.{}", usuario.id, ext);
        let destino = pasta.join(&filename);

        // A foto antiga só sai depois que a nova está no disco e no banco.
        tokio::fs::write(&destino, encoded).await?;

        let publico = format!("{}fotos/{}", PREFIXO_PUBLICO, filename);
        let atualizado = self.usuario_repo.set_foto(usuario.id, Some(&publico)).await?;

        if let Some(antiga) = usuario.foto_perfil.as_deref().map(|p| self.disk_path(p)) {
            if antiga != destino {
                remove_if_exists(&antiga).await?;
            }
        }
        Ok(atualizado)
    }

    pub async fn delete_foto(&self, usuario: &Usuario) -> Result<Usuario, AppError> {
        if let Some(foto) = usuario.foto_perfil.as_deref() {
            remove_if_exists(&self.disk_path(foto)).await?;
        }
        self.usuario_repo.set_foto(usuario.id, None).await
    }

    pub async fn alterar_senha(&self, usuario: &Usuario, payload: &AlterarSenhaPayload) -> Result<(), AppError> {
        if !verify_password(&payload.current_password, &usuario.senha_hash).await? {
            return Err(AppError::BadRequest("Senha atual incorreta!".to_string()));
        }
        if payload.new_password != payload.confirm_password {
            return Err(AppError::BadRequest("As novas senhas não conferem!".to_string()));
        }

        let senha_hash = hash_password(&payload.new_password).await?;
        self.usuario_repo.set_senha(usuario.id, &senha_hash).await
    }

    pub async fn validar_senha(&self, usuario: &Usuario, senha: Option<&str>) -> Result<bool, AppError> {
        match senha.filter(|s| !s.is_empty()) {
            Some(senha) => verify_password(senha, &usuario.senha_hash).await,
            None => Ok(false),
        }
    }

    /// Caminho no disco de um caminho público gravado no banco.
    fn disk_path(&self, publico: &str) -> PathBuf {
        let relativo = publico.strip_prefix(PREFIXO_PUBLICO).unwrap_or(publico);
        // Só o nome do arquivo importa; nada de sair da pasta de uploads.
        let nome = Path::new(relativo).file_name().map(PathBuf::from).unwrap_or_default();
        self.upload_dir.join("fotos").join(nome)
    }
}

async fn remove_if_exists(path: &Path) -> Result<(), AppError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
