//! Word (`.docx`) export of a generated session.
//!
//! Primaria has its own layout; every other level uses the Secundaria one.

mod cells;
pub mod primaria;
pub mod secundaria;

use std::io::Cursor;

use docx_rs::{Docx, PageMargin};
use tracing::debug;

use crate::error::RenderError;
use crate::lesson::request::SessionForm;
use crate::lesson::session::LessonSession;

pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Level assumed when the form did not send one.
const DEFAULT_LEVEL: &str = "Secundaria";

// A4 in twips.
const A4_WIDTH: u32 = 11_906;
const A4_HEIGHT: u32 = 16_838;

pub fn level(form: &SessionForm) -> &str {
    form.nivel.as_deref().unwrap_or(DEFAULT_LEVEL)
}

/// `Sesion_{nivel}_{grado}.docx`, with spaces in the grade replaced by `_`.
///
/// Quotes, backslashes and control characters are dropped so the name can
/// sit inside a quoted `Content-Disposition` value.
pub fn filename(form: &SessionForm) -> String {
    let grado = form.grado.as_deref().unwrap_or("").replace(' ', "_");
    format!("Sesion_{}_{}.docx", level(form), grado)
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

/// Render `session` with the layout for the form's level.
pub fn render(form: &SessionForm, session: &LessonSession) -> Result<Vec<u8>, RenderError> {
    // 0.5" top/bottom, 0.7" left/right
    let doc = Docx::new().page_size(A4_WIDTH, A4_HEIGHT).page_margin(
        PageMargin::new()
            .top(720)
            .bottom(720)
            .left(1008)
            .right(1008),
    );

    let nivel = level(form);
    let doc = if nivel == "Primaria" {
        primaria::build(doc, form, session)
    } else {
        secundaria::build(doc, form, session)
    };

    let mut buf = Cursor::new(Vec::new());
    doc.build()
        .pack(&mut buf)
        .map_err(|e| RenderError::Pack(e.to_string()))?;

    let bytes = buf.into_inner();
    debug!(nivel, size = bytes.len(), "Rendered session document");
    Ok(bytes)
}
