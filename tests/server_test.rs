//! Integration tests for the HTTP routes, with Gemini mocked by wiremock.

mod common;

use axum::http::{StatusCode, header};
use serde_json::json;
use tower::ServiceExt;
use wiremock::MockServer;

use common::{body_bytes, body_json, gemini_error, get, post_json, test_app};
use minedu_sessions::document::CONTENT_TYPE;
use minedu_sessions::lesson::fallback_suggestions;

const BUSY: &str = "La IA está ocupada en este momento. Por favor espera unos segundos.";

fn suggest_body(nivel: &str) -> serde_json::Value {
    json!({
        "campo": "desempeno",
        "tema": "Las fracciones",
        "nivel": nivel,
        "grado": "3ro",
        "area": "Matemática"
    })
}

fn session_form() -> serde_json::Value {
    json!({
        "tema": "Las fracciones en nuestra vida diaria",
        "nivel": "Primaria",
        "grado": "3er grado",
        "area": "Matemática",
        "tiempo": "90",
        "tipo_sesion": "Resumida",
        "docente": "Rosa Pérez"
    })
}

// =============================================================================
// STATIC AND HEALTH
// =============================================================================

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let response = test_app(&server).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "minedu-sessions");
}

#[tokio::test]
async fn test_index_and_assets() {
    let server = MockServer::start().await;

    let response = test_app(&server).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response.into_body()).await).unwrap();
    assert!(html.contains("Generador de Sesiones MINEDU"));

    let response = test_app(&server).oneshot(get("/script.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_index() {
    let server = MockServer::start().await;
    let app = minedu_sessions::router(common::test_state(
        &server,
        common::fixtures_dir().join("gemini"),
    ));

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "Error: No se encuentra el archivo index.html.");
}

// =============================================================================
// SUGGEST
// =============================================================================

#[tokio::test]
async fn test_suggest_returns_model_options() {
    let server = MockServer::start().await;
    common::mount_text(
        &server,
        r#"{"desempeno_sugerencias": ["Representa", "Compara", "Explica", "Resuelve"]}"#,
    )
    .await;

    let response = test_app(&server)
        .oneshot(post_json("/suggest", suggest_body("Primaria")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["sugerencias"][0], "Representa");
    assert_eq!(body["sugerencias"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn test_suggest_requires_all_fields() {
    let server = MockServer::start().await;
    let mut body = suggest_body("Primaria");
    body["area"] = json!("");

    let response = test_app(&server)
        .oneshot(post_json("/suggest", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(
        body["error"],
        "Faltan datos requeridos (Tema, Nivel, Grado o Área)."
    );
}

#[tokio::test]
async fn test_suggest_falls_back_when_model_fails() {
    let server = MockServer::start().await;
    common::mount_response(&server, gemini_error(500, "INTERNAL", "Internal error")).await;

    let response = test_app(&server)
        .oneshot(post_json("/suggest", suggest_body("Secundaria")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["sugerencias"], json!(fallback_suggestions("Secundaria")));
}

#[tokio::test]
async fn test_suggest_without_usable_list() {
    let server = MockServer::start().await;
    common::mount_text(&server, r#"{"mensaje": "No tengo sugerencias"}"#).await;

    let response = test_app(&server)
        .oneshot(post_json("/suggest", suggest_body("Primaria")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "No se pudieron generar sugerencias.");
}

// =============================================================================
// GENERATE AND DOWNLOAD
// =============================================================================

#[tokio::test]
async fn test_generate_then_download() {
    let server = MockServer::start().await;
    let reply = common::read_fixture(common::gemini_fixture("session_fenced.txt"));
    common::mount_text(&server, &reply).await;
    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(post_json("/generate", session_form()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(
        body["sesion"]["titulo_sesion"],
        "Las fracciones en nuestra vida diaria"
    );
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/download?session_id={}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], CONTENT_TYPE);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("Sesion_Primaria_3er_grado.docx"));
    let bytes = body_bytes(response.into_body()).await;
    assert!(bytes.starts_with(b"PK"));

    // Without an id the latest session is served.
    let response = app.oneshot(get("/download")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_generate_accepts_null_and_list_fields() {
    let server = MockServer::start().await;
    let reply = json!({
        "titulo_sesion": ["Las fracciones", "en casa"],
        "proposito": "Representar fracciones",
        "evidencia": null,
        "estandar_aprendizaje": ["Resuelve problemas", "Representa"],
        "datos_adicionales": {"valor_asociado": null, "tiempo_total": "90 minutos"},
        "criterios_evaluacion": null,
        "secuencia_didactica": {"inicio": ["Saludo", "Pregunta"], "desarrollo": null, "cierre": "Reflexión"}
    });
    common::mount_text(&server, &reply.to_string()).await;
    let app = test_app(&server);

    let mut form = session_form();
    form["nivel"] = json!("Secundaria");
    let response = app
        .clone()
        .oneshot(post_json("/generate", form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    let sesion = &body["sesion"];
    assert_eq!(sesion["titulo_sesion"], "• Las fracciones\n• en casa");
    assert_eq!(sesion["evidencia"], "");
    assert_eq!(sesion["estandar_aprendizaje"], "• Resuelve problemas\n• Representa");
    assert_eq!(sesion["datos_adicionales"]["valor_asociado"], "");
    assert_eq!(sesion["secuencia_didactica"]["inicio"], "• Saludo\n• Pregunta");
    assert_eq!(sesion["secuencia_didactica"]["desarrollo"], "");

    let session_id = body["session_id"].as_str().unwrap().to_string();
    let response = app
        .oneshot(get(&format!("/download?session_id={}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response.into_body()).await;
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn test_download_filename_with_quotes_and_newlines() {
    let server = MockServer::start().await;
    let reply = common::read_fixture(common::gemini_fixture("session_fenced.txt"));
    common::mount_text(&server, &reply).await;
    let app = test_app(&server);

    let mut form = session_form();
    form["grado"] = json!("3er \"B\"\ngrado");
    let response = app
        .clone()
        .oneshot(post_json("/generate", form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/download")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Sesion_Primaria_3er_Bgrado.docx\""
    );
}

#[tokio::test]
async fn test_generate_busy_model() {
    let server = MockServer::start().await;
    common::mount_response(&server, gemini_error(503, "UNAVAILABLE", "The model is overloaded."))
        .await;

    let response = test_app(&server)
        .oneshot(post_json("/generate", session_form()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], BUSY);
}

#[tokio::test]
async fn test_generate_unparseable_reply() {
    let server = MockServer::start().await;
    common::mount_text(&server, "Lo siento, no puedo ayudarte con eso.").await;

    let response = test_app(&server)
        .oneshot(post_json("/generate", session_form()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert_eq!(
        body["error"],
        "Error de formato JSON. La IA respondió: Lo siento, no puedo ayudarte con eso...."
    );
}

#[tokio::test]
async fn test_generate_permanent_upstream_error() {
    let server = MockServer::start().await;
    common::mount_response(&server, gemini_error(400, "INVALID_ARGUMENT", "API key not valid."))
        .await;

    let response = test_app(&server)
        .oneshot(post_json("/generate", session_form()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Error al generar la sesión: "));
    assert!(message.contains("API key not valid."));
}

#[tokio::test]
async fn test_download_without_session() {
    let server = MockServer::start().await;

    let response = test_app(&server).oneshot(get("/download")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "No hay sesión generada");

    let response = test_app(&server)
        .oneshot(get("/download?session_id=not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// EPT STRUCTURE
// =============================================================================

#[tokio::test]
async fn test_ept_wraps_bare_list() {
    let server = MockServer::start().await;
    let reply = common::read_fixture(common::gemini_fixture("ept_bare_list.txt"));
    common::mount_text(&server, &reply).await;

    let response = test_app(&server)
        .oneshot(post_json(
            "/generate_ept_structure",
            json!({"nivel": "Secundaria", "grado": "4to Grado", "tema": "Diseño de Muebles", "especialidad": "Carpintería"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    let competencias = body["competencias"].as_array().unwrap();
    assert_eq!(competencias.len(), 2);
    assert_eq!(competencias[0]["capacidades"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_ept_requires_specialty() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(post_json(
            "/generate_ept_structure",
            json!({"nivel": "Secundaria", "especialidad": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "La especialidad es obligatoria para EPT.");
}

#[tokio::test]
async fn test_ept_rejects_null_specialty() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(post_json(
            "/generate_ept_structure",
            json!({"nivel": "Secundaria", "especialidad": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "La especialidad es obligatoria para EPT.");
}

#[tokio::test]
async fn test_ept_missing_competencias() {
    let server = MockServer::start().await;
    common::mount_text(&server, r#"{"opciones": []}"#).await;

    let response = test_app(&server)
        .oneshot(post_json("/generate_ept_structure", json!({"especialidad": "Cocina"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert_eq!(
        body["error"],
        "Estructura JSON inválida: Falta clave 'competencias'"
    );
}

#[tokio::test]
async fn test_ept_busy_model() {
    let server = MockServer::start().await;
    common::mount_response(
        &server,
        gemini_error(429, "RESOURCE_EXHAUSTED", "Quota exceeded"),
    )
    .await;

    let response = test_app(&server)
        .oneshot(post_json("/generate_ept_structure", json!({"especialidad": "Cocina"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], BUSY);
}
