//! Lesson generation: prompt → Gemini (with retry) → extracted JSON → record.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::lesson::fallback::fallback_suggestions;
use crate::lesson::prompt::{
    build_ept_prompt, build_session_prompt, build_suggest_prompt, sanitize_field, suggestion_key,
};
use crate::lesson::request::{EptRequest, SessionForm, SuggestFields};
use crate::lesson::session::{EptStructure, LessonSession, pick_suggestions};
use crate::llm::{CallError, RetryPolicy, TextGenerator, call_with_retry, extract_json};

/// Result of a suggestion request. Never an error: failures fall back.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    /// Options produced by the model.
    Generated(Value),
    /// Canned options, used because the model call or decode failed.
    Fallback(Vec<String>),
    /// The model answered with valid JSON that holds no usable list.
    Unusable,
}

/// Runs lesson prompts against a text generator.
#[derive(Clone)]
pub struct LessonGenerator {
    generator: Arc<dyn TextGenerator>,
    model: String,
    policy: RetryPolicy,
}

impl LessonGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            model: model.into(),
            policy,
        }
    }

    /// One model call under the retry policy.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        call_with_retry(&self.policy, || self.generator.generate(&self.model, prompt))
            .await
            .map_err(|e| match e {
                CallError::ServiceUnavailable {
                    attempts,
                    last_error,
                } => GenerationError::ServiceUnavailable {
                    attempts,
                    last_error,
                },
                CallError::Permanent(e) => GenerationError::Upstream(e),
            })
    }

    /// Suggest four options for one form field.
    pub async fn suggest(&self, fields: &SuggestFields) -> Suggestions {
        let prompt = build_suggest_prompt(fields);
        let key = suggestion_key(&sanitize_field(&fields.campo));

        let payload = match self.complete(&prompt).await.and_then(|raw| decode::<Value>(&raw)) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(nivel = %fields.nivel, "Suggestion payload is not an object, using fallback");
                return Suggestions::Fallback(fallback_suggestions(&fields.nivel));
            }
            Err(e) => {
                warn!(nivel = %fields.nivel, error = %e, "Suggestion generation failed, using fallback");
                return Suggestions::Fallback(fallback_suggestions(&fields.nivel));
            }
        };

        match pick_suggestions(&payload, &key) {
            Some(value) => Suggestions::Generated(value),
            None => {
                warn!(key = %key, "Suggestion payload has no usable list");
                Suggestions::Unusable
            }
        }
    }

    /// Generate a full lesson session.
    pub async fn generate_session(&self, form: &SessionForm) -> Result<LessonSession, GenerationError> {
        let prompt = build_session_prompt(form);
        let raw = self.complete(&prompt).await?;
        let session: LessonSession = decode(&raw)?;
        info!(
            tema = %form.tema(),
            nivel = %form.nivel(),
            "Generated lesson session"
        );
        Ok(session)
    }

    /// Generate EPT competency options.
    pub async fn generate_ept_structure(
        &self,
        request: &EptRequest,
    ) -> Result<EptStructure, GenerationError> {
        let prompt = build_ept_prompt(request);
        let raw = self.complete(&prompt).await?;
        ept_structure_from(decode::<Value>(&raw)?)
    }
}

/// Extract the JSON payload from raw model text and decode it.
fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    let json_text = extract_json(raw);
    serde_json::from_str(&json_text).map_err(|source| {
        debug!(raw_output = %raw, error = %source, "Model output failed to decode");
        GenerationError::Decode {
            raw_output: raw.to_string(),
            source,
        }
    })
}

/// Accept `{"competencias": [...]}` or a bare list of competencies.
fn ept_structure_from(value: Value) -> Result<EptStructure, GenerationError> {
    let competencias = match value {
        Value::Object(mut map) => match map.remove("competencias") {
            Some(list @ Value::Array(_)) => list,
            _ => return Err(missing_competencias()),
        },
        list @ Value::Array(_) => list,
        _ => return Err(missing_competencias()),
    };

    let competencias = serde_json::from_value(competencias).map_err(|e| {
        GenerationError::InvalidStructure(format!("Estructura JSON inválida: {}", e))
    })?;
    Ok(EptStructure { competencias })
}

fn missing_competencias() -> GenerationError {
    GenerationError::InvalidStructure(
        "Estructura JSON inválida: Falta clave 'competencias'".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mockall::predicate::{always, eq};
    use serde_json::json;

    use crate::error::GeminiError;
    use crate::llm::gemini::MockTextGenerator;

    const MODEL: &str = "gemini-test";

    fn generator(mock: MockTextGenerator, max_attempts: u32) -> LessonGenerator {
        LessonGenerator::new(
            Arc::new(mock),
            MODEL,
            RetryPolicy::new(max_attempts, Duration::from_secs(3)),
        )
    }

    fn overloaded() -> GeminiError {
        GeminiError::Api {
            code: 503,
            status: "UNAVAILABLE".to_string(),
            message: "The model is overloaded.".to_string(),
        }
    }

    fn bad_request() -> GeminiError {
        GeminiError::Api {
            code: 400,
            status: "INVALID_ARGUMENT".to_string(),
            message: "API key not valid.".to_string(),
        }
    }

    fn fields(nivel: &str) -> SuggestFields {
        SuggestFields {
            campo: "desempeno".to_string(),
            tema: "La célula".to_string(),
            nivel: nivel.to_string(),
            grado: "2do".to_string(),
            area: "Ciencia y Tecnología".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_from_fenced_response() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .with(eq(MODEL), always())
            .times(1)
            .returning(|_, _| {
                Ok("```json\n{\"titulo_sesion\": \"La célula\", \"proposito\": \"Observar\"}\n```".to_string())
            });

        let session = generator(mock, 3)
            .generate_session(&SessionForm::default())
            .await
            .unwrap();
        assert_eq!(session.titulo_sesion, "La célula");
        assert_eq!(session.proposito, "Observar");
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_retries_then_reports_unavailable() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(3).returning(|_, _| Err(overloaded()));

        let err = generator(mock, 3)
            .generate_session(&SessionForm::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::ServiceUnavailable { attempts: 3, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_permanent_error_is_not_retried() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(1).returning(|_, _| Err(bad_request()));

        let err = generator(mock, 5)
            .generate_session(&SessionForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Upstream(GeminiError::Api { code: 400, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_decode_failure_keeps_raw_output() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok("Lo siento, no puedo ayudar con eso.".to_string()));

        let err = generator(mock, 3)
            .generate_session(&SessionForm::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.raw_output_preview(9).as_deref(),
            Some("Lo siento")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_rejects_non_object_payload() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok(r#"["inicio", "cierre"]"#.to_string()));

        let err = generator(mock, 3)
            .generate_session(&SessionForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Decode { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_uses_named_key() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(1).returning(|_, _| {
            Ok(r#"{"desempeno_sugerencias": ["Describe", "Explica", "Compara", "Argumenta"]}"#.to_string())
        });

        let result = generator(mock, 3).suggest(&fields("Secundaria")).await;
        assert_eq!(
            result,
            Suggestions::Generated(json!(["Describe", "Explica", "Compara", "Argumenta"]))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_falls_back_on_upstream_failure() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(2).returning(|_, _| Err(overloaded()));

        let result = generator(mock, 2).suggest(&fields("Inicial")).await;
        assert_eq!(result, Suggestions::Fallback(fallback_suggestions("Inicial")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_falls_back_on_garbage() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok("no braces here".to_string()));

        let result = generator(mock, 3).suggest(&fields("Secundaria")).await;
        assert_eq!(result, Suggestions::Fallback(fallback_suggestions("Secundaria")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_unusable_payload() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Ok(r#"{"mensaje": "sin opciones"}"#.to_string()));

        let result = generator(mock, 3).suggest(&fields("Primaria")).await;
        assert_eq!(result, Suggestions::Unusable);
    }

    #[test]
    fn test_ept_structure_from_object() {
        let value = json!({"competencias": [{"nombre": "Gestiona proyectos", "capacidades": ["Crea"], "desempenos": ["Diseña"]}]});
        let structure = ept_structure_from(value).unwrap();
        assert_eq!(structure.competencias.len(), 1);
        assert_eq!(structure.competencias[0].nombre, "Gestiona proyectos");
    }

    #[test]
    fn test_ept_structure_from_bare_list() {
        let value = json!([{"nombre": "A"}, {"nombre": "B"}]);
        let structure = ept_structure_from(value).unwrap();
        assert_eq!(structure.competencias.len(), 2);
        assert!(structure.competencias[1].capacidades.is_empty());
    }

    #[test]
    fn test_ept_structure_missing_key() {
        let err = ept_structure_from(json!({"opciones": []})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Estructura JSON inválida: Falta clave 'competencias'"
        );

        let err = ept_structure_from(json!({"competencias": "varias"})).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidStructure(_)));
    }
}
