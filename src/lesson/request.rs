//! Form payloads posted by the planning UI.
//!
//! Every field is optional on the wire; accessors apply the defaults used in
//! prompts and documents.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Placeholder for a field left out of the form.
pub const NOT_AVAILABLE: &str = "N/A";

/// Session length used when `tiempo` is missing or not a number.
pub const DEFAULT_MINUTES: u32 = 90;

/// Request for option suggestions for one form field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestRequest {
    pub campo: Option<String>,
    pub tema: Option<String>,
    pub nivel: Option<String>,
    pub grado: Option<String>,
    pub area: Option<String>,
}

/// A [`SuggestRequest`] with every field present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestFields {
    pub campo: String,
    pub tema: String,
    pub nivel: String,
    pub grado: String,
    pub area: String,
}

impl SuggestRequest {
    /// All five fields, or `None` if any is missing or empty.
    pub fn validate(&self) -> Option<SuggestFields> {
        fn present(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        Some(SuggestFields {
            campo: present(&self.campo)?,
            tema: present(&self.tema)?,
            nivel: present(&self.nivel)?,
            grado: present(&self.grado)?,
            area: present(&self.area)?,
        })
    }
}

/// Everything the docente fills in for a full lesson session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionForm {
    pub tema: Option<String>,
    pub nivel: Option<String>,
    pub grado: Option<String>,
    pub area: Option<String>,
    pub competencia: Option<String>,
    pub capacidad: Option<String>,
    pub desempeno: Option<String>,
    pub comp_transversal: Option<String>,
    pub cap_transversal: Option<String>,
    pub enfoque: Option<String>,
    pub valor: Option<String>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub tiempo: Option<u32>,
    pub tipo_sesion: Option<String>,

    // Administrative data, only used in the exported document.
    pub dre: Option<String>,
    pub ugel: Option<String>,
    pub ie: Option<String>,
    pub distrito: Option<String>,
    pub seccion: Option<String>,
    pub ciclo: Option<String>,
    pub director: Option<String>,
    pub docente: Option<String>,
    pub fecha: Option<String>,
    pub duracion: Option<String>,
}

fn or_na(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or(NOT_AVAILABLE)
}

impl SessionForm {
    pub fn tema(&self) -> &str {
        self.tema.as_deref().unwrap_or("Tema no especificado")
    }

    pub fn nivel(&self) -> &str {
        or_na(&self.nivel)
    }

    pub fn grado(&self) -> &str {
        or_na(&self.grado)
    }

    pub fn area(&self) -> &str {
        or_na(&self.area)
    }

    pub fn competencia(&self) -> &str {
        or_na(&self.competencia)
    }

    pub fn capacidad(&self) -> &str {
        or_na(&self.capacidad)
    }

    pub fn desempeno(&self) -> &str {
        or_na(&self.desempeno)
    }

    pub fn comp_transversal(&self) -> &str {
        or_na(&self.comp_transversal)
    }

    pub fn cap_transversal(&self) -> &str {
        or_na(&self.cap_transversal)
    }

    pub fn enfoque(&self) -> &str {
        or_na(&self.enfoque)
    }

    pub fn valor(&self) -> &str {
        or_na(&self.valor)
    }

    pub fn minutes(&self) -> u32 {
        self.tiempo.unwrap_or(DEFAULT_MINUTES)
    }

    pub fn tipo_sesion(&self) -> &str {
        self.tipo_sesion.as_deref().unwrap_or("Detallada")
    }
}

/// Request for EPT (Educación para el Trabajo) curricular options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EptRequest {
    pub nivel: Option<String>,
    pub grado: Option<String>,
    #[serde(default, deserialize_with = "null_as_blank")]
    pub especialidad: Option<String>,
    pub tema: Option<String>,
}

impl EptRequest {
    pub fn nivel(&self) -> &str {
        self.nivel.as_deref().unwrap_or("Secundaria")
    }

    pub fn grado(&self) -> &str {
        self.grado.as_deref().unwrap_or("Grado no especificado")
    }

    pub fn especialidad(&self) -> &str {
        self.especialidad.as_deref().unwrap_or("No especificada")
    }

    pub fn tema(&self) -> &str {
        self.tema.as_deref().unwrap_or("Tema no especificado")
    }

    /// A specialty sent as `""` or `null` is rejected; an absent one gets the
    /// default. Whitespace counts as a value.
    pub fn has_blank_especialidad(&self) -> bool {
        self.especialidad.as_deref().is_some_and(str::is_empty)
    }
}

/// A present `null` reads as an empty value, unlike an absent key.
fn null_as_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Accept `90`, `"90"` or garbage (treated as absent) for the session length.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u32>().ok(),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => {
            return Err(de::Error::invalid_type(
                de::Unexpected::Other(&other.to_string()),
                &"a number of minutes",
            ));
        }
    })
}
