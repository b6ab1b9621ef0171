//! Layout used for Secundaria and every level without its own layout.

use docx_rs::{AlignmentType, Docx};

use crate::document::cells::{
    GREY, GeneralData, field_or, header, heading, label, paragraph, run, spacer, table, title_box,
    value,
};
use crate::lesson::request::{DEFAULT_MINUTES, NOT_AVAILABLE, SessionForm};
use crate::lesson::session::LessonSession;

/// Minutes for inicio, desarrollo and cierre: 20% / 60% / 20% of the total.
pub fn sequence_minutes(total: u32) -> (u32, u32, u32) {
    let share = |fraction: f64| (f64::from(total) * fraction).round() as u32;
    (share(0.2), share(0.6), share(0.2))
}

pub fn build(doc: Docx, form: &SessionForm, session: &LessonSession) -> Docx {
    let total = session
        .datos_adicionales
        .total_minutes()
        .unwrap_or(DEFAULT_MINUTES);
    let (inicio, desarrollo, cierre) = sequence_minutes(total);
    let general = GeneralData::secundaria(form);

    doc.add_paragraph(paragraph(
        run("SESIÓN DE APRENDIZAJE\nINNOVACIÓN PEDAGÓGICA", 14).bold(),
        AlignmentType::Center,
    ))
    .add_paragraph(spacer())
    .add_table(title_box(field_or(&form.tema, ""), 11))
    .add_paragraph(spacer())
    .add_paragraph(heading("DATOS INFORMATIVOS:"))
    .add_table(general.table())
    .add_paragraph(spacer())
    .add_paragraph(heading("PROPÓSITO DE APRENDIZAJE"))
    .add_table(purposes_table(form, session))
    .add_paragraph(spacer())
    .add_paragraph(heading("ENFOQUES TRANSVERSALES"))
    .add_table(approaches_table(form))
    .add_paragraph(spacer())
    .add_paragraph(heading("SECUENCIA DIDÁCTICA"))
    .add_table(sequence_table(session, (inicio, desarrollo, cierre)))
    .add_paragraph(spacer())
    .add_paragraph(paragraph(run("• Bibliografía referencial.", 11), AlignmentType::Left))
    .add_paragraph(spacer())
    .add_paragraph(paragraph(
        run("___________________\nV.B. Director", 11),
        AlignmentType::Center,
    ))
    .add_paragraph(spacer())
    .add_paragraph(paragraph(
        run("___________________\nDocente", 11),
        AlignmentType::Center,
    ))
}

fn purposes_table(form: &SessionForm, session: &LessonSession) -> docx_rs::Table {
    let justified = |text: &str| value(text, 9, AlignmentType::Both);

    let mut rows = vec![
        vec![
            header("COMPETENCIA", 9, GREY),
            header("CAPACIDAD", 9, GREY),
            header("DESEMPEÑOS\nPRECISADOS", 9, GREY),
            header("CRITERIOS DE EVALUACIÓN", 9, GREY),
            header("INSTRUMENTO", 9, GREY),
        ],
        vec![
            justified(field_or(&form.competencia, "")),
            justified(field_or(&form.capacidad, "")),
            justified(field_or(&form.desempeno, "")),
            justified(&session.criterios_evaluacion.to_bullets()),
            value("Lista de cotejo", 9, AlignmentType::Center),
        ],
    ];

    if let Some(comp) = form
        .comp_transversal
        .as_deref()
        .filter(|c| !c.is_empty() && *c != NOT_AVAILABLE)
    {
        rows.push(vec![
            justified(comp),
            justified(field_or(&form.cap_transversal, "")),
            justified("Se desenvuelve..."),
            justified("Observación"),
            value("Ficha", 9, AlignmentType::Center),
        ]);
    }

    table(rows, 5)
}

fn approaches_table(form: &SessionForm) -> docx_rs::Table {
    let justified = |text: &str| value(text, 9, AlignmentType::Both);
    table(
        vec![
            vec![
                header("ENFOQUE", 9, GREY),
                header("VALORES", 9, GREY),
                header("ACTITUDES", 9, GREY),
                header("ACCIONES", 9, GREY),
            ],
            vec![
                justified(field_or(&form.enfoque, "")),
                justified(field_or(&form.valor, "")),
                justified("Actitud de ejemplo."),
                justified("Acciones observables."),
            ],
        ],
        4,
    )
}

fn sequence_table(session: &LessonSession, minutes: (u32, u32, u32)) -> docx_rs::Table {
    let sequence = &session.secuencia_didactica;
    let moment = |name: &str, activities: &str, minutes: u32| {
        vec![
            label(name, 9, None, AlignmentType::Left),
            value(activities, 9, AlignmentType::Both),
            value("Recursos clase", 9, AlignmentType::Left),
            label(&format!("{}'", minutes), 10, None, AlignmentType::Center),
        ]
    };

    table(
        vec![
            vec![
                header("MOMENTOS", 10, GREY),
                header("ACTIVIDADES", 10, GREY),
                header("MATERIALES", 10, GREY),
                header("TIEMPO", 10, GREY),
            ],
            moment("MOTIVACIÓN", &sequence.inicio, minutes.0),
            moment("DESARROLLO", &sequence.desarrollo, minutes.1),
            moment("CIERRE", &sequence.cierre, minutes.2),
        ],
        4,
    )
}
