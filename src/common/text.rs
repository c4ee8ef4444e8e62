// src/common/text.rs

use crate::common::error::AppError;

/// Normaliza um e-mail para armazenamento e busca.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Capitaliza cada palavra: a primeira letra depois de um caractere não alfabético
/// vira maiúscula, o resto minúscula ("são  PAULO" -> "São  Paulo").
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Primeira letra maiúscula, resto minúsculo ("são paulo" -> "São paulo").
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Texto obrigatório: aparado, e só espaços conta como vazio.
pub fn preenchido<'a>(valor: &'a str, mensagem: &str) -> Result<&'a str, AppError> {
    match valor.trim() {
        "" => Err(AppError::BadRequest(mensagem.to_string())),
        valor => Ok(valor),
    }
}

/// Cabe numa coluna VARCHAR(max)? Conta caracteres, não bytes.
pub fn cabe(valor: &str, max: usize) -> bool {
    valor.chars().count() <= max
}

/// Rejeita com 400 o texto que não cabe na coluna onde será gravado.
pub fn limitar<'a>(campo: &str, valor: &'a str, max: usize) -> Result<&'a str, AppError> {
    if cabe(valor, max) {
        Ok(valor)
    } else {
        Err(AppError::BadRequest(format!(
            "O campo '{}' deve ter no máximo {} caracteres.",
            campo, max
        )))
    }
}

/// Nome de arquivo seguro para `Content-Disposition`.
pub fn secure_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_handles_accents_and_spacing() {
        assert_eq!(title_case("são paulo"), "São Paulo");
        assert_eq!(title_case("RIO DE JANEIRO"), "Rio De Janeiro");
        assert_eq!(title_case("santa bárbara d'oeste"), "Santa Bárbara D'Oeste");
    }

    #[test]
    fn capitalize_only_touches_the_first_letter() {
        assert_eq!(capitalize("são paulo"), "São paulo");
        assert_eq!(capitalize("RIBEIRÃO PRETO"), "Ribeirão preto");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        assert!(cabe(&"ã".repeat(100), 100));
        assert!(!cabe(&"a".repeat(101), 100));
        assert_eq!(limitar("aluno", "Ana", 100).unwrap(), "Ana");
        let err = limitar("aluno", &"x".repeat(101), 100).unwrap_err();
        assert_eq!(err.to_string(), "O campo 'aluno' deve ter no máximo 100 caracteres.");
    }

    #[test]
    fn blank_text_is_not_filled_in() {
        assert_eq!(preenchido("  Studio Luz ", "vazio").unwrap(), "Studio Luz");
        assert_eq!(preenchido("   ", "O nome é obrigatório.").unwrap_err().to_string(), "O nome é obrigatório.");
    }

    #[test]
    fn emails_are_lowercased_and_trimmed() {
        assert_eq!(normalize_email("  Ana.Souza@Studio.COM "), "ana.souza@studio.com");
    }

    #[test]
    fn filenames_lose_path_tricks() {
        assert_eq!(secure_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(secure_filename("relatório turma A"), "relatrio_turma_A");
        assert_eq!(secure_filename("   "), "");
    }
}
