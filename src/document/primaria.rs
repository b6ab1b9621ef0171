//! Primaria layout: yellow purpose tables, green approaches and one boxed
//! table per session moment.

use docx_rs::{AlignmentType, Docx, Paragraph, Table};

use crate::document::cells::{
    GeneralData, empty, field_or, header, heading, label, paragraph, run, spacer, table, title_box,
    value,
};
use crate::lesson::request::SessionForm;
use crate::lesson::session::LessonSession;

const YELLOW: &str = "FEF2CC";
const GREEN: &str = "70AD47";
const LIGHT_GREEN: &str = "E2EFDA";
const RED: &str = "FF0000";

/// Fixed minutes for inicio, desarrollo and cierre.
pub const MOMENT_MINUTES: [u32; 3] = [15, 60, 15];

pub fn build(doc: Docx, form: &SessionForm, session: &LessonSession) -> Docx {
    let general = GeneralData::primaria(form);
    let sequence = &session.secuencia_didactica;

    let doc = doc
        .add_paragraph(spacer())
        .add_paragraph(paragraph(
            run("SESIÓN DE APRENDIZAJE", 14).bold().color("000000"),
            AlignmentType::Center,
        ))
        .add_paragraph(spacer())
        .add_table(title_box(field_or(&form.tema, "TEMA DE SESIÓN"), 12))
        .add_paragraph(spacer())
        .add_paragraph(heading("DATOS INFORMATIVOS:"))
        .add_table(general.table())
        .add_paragraph(spacer())
        .add_paragraph(section("II. PROPÓSITOS DE APRENDIZAJE Y EVIDENCIAS DE APRENDIZAJE:"))
        .add_table(purposes_table(form, session))
        .add_paragraph(spacer())
        .add_table(standard_table(session))
        .add_paragraph(spacer())
        .add_table(approaches_table(form))
        .add_paragraph(spacer())
        .add_table(transversal_table(
            field_or(&form.comp_transversal, ""),
            field_or(&form.cap_transversal, ""),
        ))
        .add_paragraph(spacer())
        .add_table(transversal_table(
            "Gestiona su aprendizaje de manera autónoma",
            "Define metas de aprendizaje",
        ))
        .add_paragraph(spacer())
        .add_paragraph(section("III. PREPARACIÓN DE LA SESIÓN"))
        .add_table(preparation_table())
        .add_paragraph(spacer())
        .add_paragraph(section("IV. MOMENTOS DE LA SESIÓN"))
        .add_table(moment_table("INICIO", MOMENT_MINUTES[0], &sequence.inicio))
        .add_paragraph(spacer())
        .add_table(moment_table("DESARROLLO", MOMENT_MINUTES[1], &sequence.desarrollo))
        .add_paragraph(spacer())
        .add_table(moment_table("CIERRE", MOMENT_MINUTES[2], &sequence.cierre))
        .add_paragraph(spacer());

    doc.add_paragraph(section("V. RECURSOS Y BIBLIOGRAFÍA"))
        .add_table(table(
            vec![vec![value(&resources_text(session), 9, AlignmentType::Left)]],
            1,
        ))
        .add_paragraph(spacer())
        .add_paragraph(paragraph(
            run("__________________________\nDOCENTE", 11),
            AlignmentType::Center,
        ))
}

/// Red, bold roman-numbered heading.
fn section(title: &str) -> Paragraph {
    Paragraph::new().add_run(run(title, 11).bold().color(RED))
}

fn purposes_table(form: &SessionForm, session: &LessonSession) -> Table {
    let cell = |text: &str| value(text, 9, AlignmentType::Left);
    table(
        vec![
            vec![
                header("Competencias", 10, YELLOW),
                header("Capacidades", 10, YELLOW),
                header("Desempeños", 10, YELLOW),
                header("Criterios de\nevaluación", 10, YELLOW),
            ],
            vec![
                cell(field_or(&form.competencia, "")),
                cell(field_or(&form.capacidad, "")),
                cell(field_or(&form.desempeno, "")),
                cell(&session.criterios_evaluacion.to_bullets()),
            ],
        ],
        4,
    )
}

fn standard_table(session: &LessonSession) -> Table {
    let standard = session
        .estandar_aprendizaje
        .as_deref()
        .unwrap_or("No especificado en la sesión generada.");
    table(
        vec![
            vec![
                label(
                    "ESTÁNDAR DE APRENDIZAJE POR COMPETENCIAS Y GRADOS",
                    10,
                    Some(YELLOW),
                    AlignmentType::Left,
                )
                .grid_span(2),
            ],
            vec![value(standard, 9, AlignmentType::Both).grid_span(2)],
        ],
        2,
    )
}

fn approaches_table(form: &SessionForm) -> Table {
    let green = |text: &str| label(text, 9, Some(GREEN), AlignmentType::Left);
    let mut rows = vec![
        vec![green("ENFOQUES TRANSVERSALES"), green("VALORES"), green("EJEMPLOS")],
        vec![
            value(field_or(&form.enfoque, ""), 9, AlignmentType::Left),
            value(field_or(&form.valor, ""), 9, AlignmentType::Left),
            value("Ejemplo observable...", 9, AlignmentType::Left),
        ],
    ];
    // Blank rows, filled in by hand.
    rows.extend((0..3).map(|_| vec![empty(), empty(), empty()]));
    table(rows, 3)
}

/// Competency / capacity pair; blanks fall back to the digital-environment one.
fn transversal_table(competencia: &str, capacidad: &str) -> Table {
    let competencia = if competencia.is_empty() {
        "Se desenvuelve en entornos virtuales..."
    } else {
        competencia
    };
    let capacidad = if capacidad.is_empty() {
        "Personaliza entornos..."
    } else {
        capacidad
    };

    table(
        vec![
            vec![
                header("Competencia transversal", 9, YELLOW),
                header("Capacidades Transversales", 9, YELLOW),
            ],
            vec![
                value(competencia, 9, AlignmentType::Left),
                value(capacidad, 9, AlignmentType::Left),
            ],
        ],
        2,
    )
}

fn preparation_table() -> Table {
    table(
        vec![
            vec![
                header("¿Qué se debe hacer antes de la sesión?", 10, YELLOW),
                header("¿Qué recursos o materiales utilizarán en la sesión?", 10, YELLOW),
            ],
            vec![
                value("Preparar fichas, revisar materiales.", 10, AlignmentType::Left),
                value("Plumones, papelógrafos, fichas.", 10, AlignmentType::Left),
            ],
        ],
        2,
    )
}

fn moment_table(name: &str, minutes: u32, content: &str) -> Table {
    table(
        vec![
            vec![
                label(name, 10, Some(LIGHT_GREEN), AlignmentType::Left),
                value(
                    &format!("Tiempo aproximado: {} min", minutes),
                    9,
                    AlignmentType::Right,
                )
                .shading(docx_rs::Shading::new().fill(LIGHT_GREEN)),
            ],
            vec![value(content, 10, AlignmentType::Both).grid_span(2)],
        ],
        2,
    )
}

/// Bulleted resources, or the ministry bibliography when there are none.
fn resources_text(session: &LessonSession) -> String {
    match &session.recursos_virtuales {
        Some(resources) if !resources.is_empty() => resources.to_bullets(),
        _ => "Bibliografía del MED.".to_string(),
    }
}
