//! Normalização de caminhos de documentos.
//!
//! O cliente compara o caminho da página atual (que pode vir com barra
//! inicial, prefixo do site ou percent-encoding) com os caminhos relativos
//! gravados no índice.

use std::borrow::Cow;

/// Remove barras iniciais (`/2024/01/a/` → `2024/01/a/`)
pub fn root_relative(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Decodifica percent-encoding; caminhos inválidos voltam inalterados
pub fn percent_decoded(path: &str) -> Cow<'_, str> {
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

/// Nome do arquivo de dados por documento.
///
/// Remove barras das pontas, troca `/` por `-`, remove `.html`/`.htm`
/// e acrescenta `.json`: `/2024/01/02/hello/` → `2024-01-02-hello.json`.
pub fn data_file_name(path: &str) -> String {
    let trimmed = path.trim_matches('/').replace('/', "-");
    let stem = trimmed
        .strip_suffix(".html")
        .or_else(|| trimmed.strip_suffix(".htm"))
        .unwrap_or(&trimmed);
    format!("{}.json", stem)
}

/// `candidate` é o documento sendo visualizado em `current_path`?
///
/// Considera igualdade nas formas crua, relativa à raiz e decodificada,
/// e também `current_path` terminando com o caminho do candidato em uma
/// fronteira de segmento (site publicado sob um subdiretório).
pub fn is_current_document(current_path: &str, candidate: &str) -> bool {
    let candidate = root_relative(candidate);
    if candidate.is_empty() {
        return root_relative(current_path).is_empty();
    }

    let decoded = percent_decoded(current_path);
    [current_path, decoded.as_ref()].iter().any(|form| {
        let relative = root_relative(form);
        relative == candidate || ends_with_segment(relative, candidate)
    })
}

fn ends_with_segment(path: &str, suffix: &str) -> bool {
    match path.strip_suffix(suffix) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('/'),
        None => false,
    }
}
