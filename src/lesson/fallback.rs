//! Canned suggestions served when the model cannot answer.

const INICIAL: [&str; 4] = [
    "Participa en conversaciones espontáneas.",
    "Explora materiales con sus sentidos.",
    "Reconoce partes de su cuerpo.",
    "Expresa sus emociones verbal y no verbalmente.",
];

const PRIMARIA: [&str; 4] = [
    "Recupera información explícita de textos orales.",
    "Explica el tema y el propósito comunicativo.",
    "Deduce características implícitas de personas y personajes.",
    "Adecúa el texto a la situación comunicativa.",
];

const SECUNDARIA: [&str; 4] = [
    "Identifica información explícita, relevante y complementaria.",
    "Infiere e interpreta información del texto escrito.",
    "Justifica su posición sobre textos leídos.",
    "Evalúa el uso del lenguaje y la intención del autor.",
];

/// Performance-indicator suggestions for `nivel`; unknown levels get Primaria's.
///
/// Only performance indicators (desempeños) have a canned list, so it is
/// served whatever field was requested.
pub fn fallback_suggestions(nivel: &str) -> Vec<String> {
    let list: &[&str] = match nivel {
        "Inicial" => &INICIAL,
        "Secundaria" => &SECUNDARIA,
        _ => &PRIMARIA,
    };
    list.iter().map(|s| s.to_string()).collect()
}
