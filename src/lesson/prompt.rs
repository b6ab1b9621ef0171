//! Prompt construction for lesson generation.
//!
//! Each prompt embeds the form fields and the exact JSON shape expected
//! back. Fields are sanitized before substitution; nothing else inspects them.

use crate::lesson::request::{EptRequest, SessionForm, SuggestFields};

/// Maximum length of a single substituted field.
const MAX_FIELD_LENGTH: usize = 2_000;

/// Strip control characters (keeping newlines and tabs), collapse runs of
/// blank lines, and cap the length.
pub fn sanitize_field(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    let mut blank_run = 0;
    for line in cleaned.trim().lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line.trim_end());
    }

    if out.chars().count() > MAX_FIELD_LENGTH {
        out = out.chars().take(MAX_FIELD_LENGTH).collect();
    }
    out
}

/// JSON key the suggestion prompt asks the model to fill.
pub fn suggestion_key(campo: &str) -> String {
    format!("{}_sugerencias", campo)
}

/// Prompt asking for four options for one form field.
pub fn build_suggest_prompt(fields: &SuggestFields) -> String {
    format!(
        r#"
Eres experto en el Currículo MINEDU.
Con los datos:
Tema: {tema}
Nivel: {nivel}
Grado: {grado}
Área: {area}

Genera SOLO un JSON válido:
{{
    "{key}": [
        "Opción 1",
        "Opción 2",
        "Opción 3",
        "Opción 4"
    ]
}}
"#,
        tema = sanitize_field(&fields.tema),
        nivel = sanitize_field(&fields.nivel),
        grado = sanitize_field(&fields.grado),
        area = sanitize_field(&fields.area),
        key = suggestion_key(&sanitize_field(&fields.campo)),
    )
}

/// Prompt for a full lesson session.
pub fn build_session_prompt(form: &SessionForm) -> String {
    let tema = sanitize_field(form.tema());
    let comp_transversal = sanitize_field(form.comp_transversal());
    let cap_transversal = sanitize_field(form.cap_transversal());
    let enfoque = sanitize_field(form.enfoque());
    let valor = sanitize_field(form.valor());
    let minutes = form.minutes();

    format!(
        r#"
Eres un especialista en diseño curricular del MINEDU – Perú.
Actúas como asistente pedagógico del docente.

REGLAS ABSOLUTAS (NO ROMPER):
1. NO cambies el título de la sesión.
2. NO inventes ni modifiques competencias, capacidades, desempeños, área, grado o nivel.
3. SOLO desarrolla pedagógicamente la sesión.
4. RESPONDE ÚNICAMENTE con un JSON válido (sin texto adicional, sin markdown).
5. NO uses ```json ni explicaciones.

DATOS DEFINIDOS POR EL DOCENTE (NO MODIFICAR):
- Título de la sesión (tema): {tema}
- Nivel: {nivel}
- Grado: {grado}
- Área: {area}
- Competencia: {competencia}
- Capacidad: {capacidad}
- Desempeño: {desempeno}
- Competencia transversal: {comp_transversal}
- Capacidad transversal: {cap_transversal}
- Enfoque transversal: {enfoque}
- Valor: {valor}
- Tiempo total: {minutes} minutos
- Tipo de sesión: {tipo_sesion}

INSTRUCCIÓN PEDAGÓGICA:
- Si Tipo de sesión = "Resumida":
  - Redacta actividades breves, claras y directas.
  - Usa listas cortas o párrafos concisos.
- Si Tipo de sesión = "Detallada":
  - Redacta actividades extensas, explicativas y narrativas.
  - Incluye acciones del docente, del estudiante y preguntas orientadoras.

SALIDA OBLIGATORIA (JSON EXACTO):
{{
  "titulo_sesion": "{tema}",
  "proposito": "Describe el propósito de aprendizaje de forma clara y alineada al desempeño.",
  "evidencia": "Describe brevemente qué producto o actuación demostrará el aprendizaje.",
  "estandar_aprendizaje": "Texto completo del Estándar de Aprendizaje del ciclo correspondiente para la competencia seleccionada.",
  "datos_adicionales": {{
    "competencia_transversal": "{comp_transversal}",
    "capacidad_transversal": "{cap_transversal}",
    "enfoque_transversal": "{enfoque}",
    "valor_asociado": "{valor}",
    "tiempo_total": "{minutes} minutos"
  }},
  "criterios_evaluacion": [
    "Criterio observable alineado al desempeño.",
    "Criterio medible relacionado con la competencia."
  ],
  "secuencia_didactica": {{
    "inicio": "Describe las actividades de inicio respetando el tipo de sesión.",
    "desarrollo": "Describe las actividades de desarrollo respetando el tipo de sesión.",
    "cierre": "Describe las actividades de cierre respetando el tipo de sesión."
  }}
}}
"#,
        nivel = sanitize_field(form.nivel()),
        grado = sanitize_field(form.grado()),
        area = sanitize_field(form.area()),
        competencia = sanitize_field(form.competencia()),
        capacidad = sanitize_field(form.capacidad()),
        desempeno = sanitize_field(form.desempeno()),
        tipo_sesion = sanitize_field(form.tipo_sesion()),
    )
}

/// Prompt for a set of EPT competencies to choose from.
pub fn build_ept_prompt(request: &EptRequest) -> String {
    format!(
        r#"
Actúa como especialista del Ministerio de Educación del Perú (MINEDU),
experto en Educación para el Trabajo (EPT).

Contexto:
El usuario ha seleccionado:
- Área: Educación para el Trabajo (EPT)
- Especialidad: {especialidad}
- Nivel: {nivel}
- Grado/Año: {grado}
- Tema: {tema}

Objetivo:
Generar un conjunto de OPCIONES curriculares
para que el docente pueda ELEGIR,
no para asignar automáticamente.

Reglas estrictas:
1. NO completes campos automáticamente.
2. Genera OPCIONES, no decisiones finales.
3. Devuelve TODO en una sola respuesta.
4. Contenido alineado al enfoque del CNEB – EPT Perú.
5. Lenguaje técnico, claro y docente.
6. Optimizado para carga rápida (máx. 1 llamada IA).

Formato de salida (JSON puro):

{{
  "competencias": [
    {{
      "nombre": "Nombre de la Competencia 1",
      "capacidades": ["Capacidad 1.1", "Capacidad 1.2", "Capacidad 1.3"],
      "desempenos": ["Desempeño 1.1", "Desempeño 1.2", "Desempeño 1.3", "Desempeño 1.4"]
    }},
    {{
      "nombre": "Nombre de la Competencia 2",
      "capacidades": ["Capacidad 2.1", "Capacidad 2.2"],
      "desempenos": ["Desempeño 2.1", "Desempeño 2.2", "Desempeño 2.3"]
    }}
  ]
}}

Cantidad:
- 3 a 4 competencias
- 3 a 5 capacidades por competencia
- 4 a 6 desempeños por competencia

Genera solo el JSON.
"#,
        especialidad = sanitize_field(request.especialidad()),
        nivel = sanitize_field(request.nivel()),
        grado = sanitize_field(request.grado()),
        tema = sanitize_field(request.tema()),
    )
}
