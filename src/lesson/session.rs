//! Records decoded from model output.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A generated lesson session.
///
/// Every field defaults when absent or `null`, and text fields accept any
/// JSON value (see [`value_text`]). Unknown keys are kept in `extra` so the
/// UI sees everything the model returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonSession {
    #[serde(deserialize_with = "any_text")]
    pub titulo_sesion: String,
    #[serde(deserialize_with = "any_text")]
    pub proposito: String,
    #[serde(deserialize_with = "any_text")]
    pub evidencia: String,
    #[serde(deserialize_with = "optional_text")]
    pub estandar_aprendizaje: Option<String>,
    #[serde(deserialize_with = "object_or_default")]
    pub datos_adicionales: AdditionalData,
    pub criterios_evaluacion: TextOrList,
    #[serde(deserialize_with = "object_or_default")]
    pub secuencia_didactica: DidacticSequence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursos_virtuales: Option<TextOrList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalData {
    #[serde(deserialize_with = "any_text")]
    pub competencia_transversal: String,
    #[serde(deserialize_with = "any_text")]
    pub capacidad_transversal: String,
    #[serde(deserialize_with = "any_text")]
    pub enfoque_transversal: String,
    #[serde(deserialize_with = "any_text")]
    pub valor_asociado: String,
    pub tiempo_total: Option<Value>,
}

impl AdditionalData {
    /// Leading integer of `tiempo_total` ("90 minutos" → 90).
    pub fn total_minutes(&self) -> Option<u32> {
        match self.tiempo_total.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.split(' ').next()?.parse().ok(),
            _ => None,
        }
    }
}

/// Start, development and closing activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DidacticSequence {
    #[serde(deserialize_with = "any_text")]
    pub inicio: String,
    #[serde(deserialize_with = "any_text")]
    pub desarrollo: String,
    #[serde(deserialize_with = "any_text")]
    pub cierre: String,
}

/// Render any JSON value as document text.
///
/// `null` is empty, strings are kept, lists become `• item` lines and
/// anything else is its JSON text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| format!("• {}", value_text(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn any_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Value::deserialize(deserializer)?))
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_text(&other)),
    })
}

/// Decode a nested object; `null` or a non-object value yields the default.
fn object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        object @ Value::Object(_) => serde_json::from_value(object).map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

/// A field the model sometimes returns as a list and sometimes as one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextOrList {
    List(Vec<String>),
    Text(String),
}

impl<'de> Deserialize<'de> for TextOrList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => TextOrList::default(),
            Value::Array(items) => TextOrList::List(items.iter().map(value_text).collect()),
            other => TextOrList::Text(value_text(&other)),
        })
    }
}

impl Default for TextOrList {
    fn default() -> Self {
        TextOrList::List(Vec::new())
    }
}

impl TextOrList {
    /// Lists become `• item` lines; plain text is returned as is.
    pub fn to_bullets(&self) -> String {
        match self {
            TextOrList::List(items) => items
                .iter()
                .map(|item| format!("• {}", item))
                .collect::<Vec<_>>()
                .join("\n"),
            TextOrList::Text(text) => text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TextOrList::List(items) => items.is_empty(),
            TextOrList::Text(text) => text.is_empty(),
        }
    }
}

/// EPT curricular options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EptStructure {
    pub competencias: Vec<Competency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Competency {
    pub nombre: String,
    pub capacidades: Vec<String>,
    pub desempenos: Vec<String>,
}

/// Pick suggestions out of a decoded payload.
///
/// Uses `key` when present, otherwise the first entry if it is a list.
/// `None` when neither applies.
pub fn pick_suggestions(payload: &Map<String, Value>, key: &str) -> Option<Value> {
    if let Some(value) = payload.get(key) {
        return Some(value.clone());
    }

    payload
        .values()
        .next()
        .filter(|v| v.is_array())
        .cloned()
}
