// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FINGERPRINT DE CONTEÚDO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Hash determinístico do conteúdo normalizado (título + corpo sem front-matter,
// truncado). É a chave de invalidação do cache de embeddings.
//
// Mudanças depois do ponto de truncamento NÃO alteram o fingerprint.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Tamanho máximo (em caracteres) do texto normalizado
pub const DEFAULT_MAX_CHARS: usize = 30_000;

const FRONT_MATTER_DELIMITER: &str = "---";

/// Hash hexadecimal do conteúdo normalizado
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Reconstrói um fingerprint já calculado (ex: lido do cache)
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Documento preparado para embedding: o texto exato enviado ao provedor
/// e o fingerprint desse texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    pub fingerprint: Fingerprint,
    pub text: String,
}

/// Remove o bloco de front-matter inicial (`--- ... ---`).
///
/// Sem delimitador de fechamento o conteúdo volta inalterado.
pub fn strip_front_matter(content: &str) -> &str {
    if let Some(rest) = content.strip_prefix(FRONT_MATTER_DELIMITER) {
        if let Some(end) = rest.find(FRONT_MATTER_DELIMITER) {
            return rest[end + FRONT_MATTER_DELIMITER.len()..].trim();
        }
    }
    content
}

/// Trunca para no máximo `max_chars` caracteres sem quebrar UTF-8
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Monta o texto normalizado: `"Title: {title}\n\n{body}"`, truncado.
pub fn normalize_content(title: &str, raw: &str, max_chars: usize) -> String {
    let body = strip_front_matter(raw);
    let combined = format!("Title: {}\n\n{}", title, body);
    truncate_chars(&combined, max_chars).to_string()
}

/// SHA-256 em hexadecimal de um texto já normalizado
pub fn hash_text(text: &str) -> Fingerprint {
    let digest = Sha256::digest(text.as_bytes());
    let hex = digest.iter().map(|b| format!("{:02x}", b)).collect::<String>();
    Fingerprint(hex)
}

/// Fingerprint de um documento (título + conteúdo bruto)
pub fn fingerprint(title: &str, raw: &str) -> Fingerprint {
    prepare(title, raw, DEFAULT_MAX_CHARS).fingerprint
}

/// Normaliza e calcula o fingerprint em um passo
pub fn prepare(title: &str, raw: &str, max_chars: usize) -> PreparedDocument {
    let text = normalize_content(title, raw, max_chars);
    PreparedDocument {
        fingerprint: hash_text(&text),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_front_matter() {
        let raw = "---\ntitle: Hello\ntags: [a]\n---\n\nBody text\n";
        assert_eq!(strip_front_matter(raw), "Body text");
    }

    #[test]
    fn test_strip_front_matter_unclosed_or_absent() {
        assert_eq!(strip_front_matter("---\ntitle: x\nbody"), "---\ntitle: x\nbody");
        assert_eq!(strip_front_matter("  plain body "), "  plain body ");
    }

    #[test]
    fn test_normalize_content_layout() {
        let text = normalize_content("Hello", "---\na: 1\n---\nWorld", DEFAULT_MAX_CHARS);
        assert_eq!(text, "Title: Hello\n\nWorld");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint("Title", "body");
        let b = fingerprint("Title", "body");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let base = fingerprint("Title", "body");
        assert_ne!(base, fingerprint("Title", "body!"));
        assert_ne!(base, fingerprint("Other", "body"));
    }

    #[test]
    fn test_fingerprint_ignores_front_matter_changes() {
        let a = fingerprint("T", "---\ndate: 2020-01-01\n---\nbody");
        let b = fingerprint("T", "---\ndate: 2024-06-01\n---\nbody");
        assert_eq!(a, b);
    }

    #[test]
    fn test_changes_beyond_truncation_are_invisible() {
        let prefix = "x".repeat(100);
        let a = prepare("T", &format!("{}AAAA", prefix), 50);
        let b = prepare("T", &format!("{}BBBB", prefix), 50);
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.text.chars().count(), 50);
    }
}
