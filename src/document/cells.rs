//! Paragraph, run and table-cell builders shared by both layouts.

use docx_rs::{
    AlignmentType, BreakType, Paragraph, Run, RunFonts, Shading, Table, TableCell, TableRow,
};

use crate::lesson::request::SessionForm;

pub const FONT: &str = "Arial";

/// Label background of the general data grid.
pub const GREY: &str = "D9D9D9";

/// Usable width of an A4 page with 0.7" side margins, in twips.
pub const CONTENT_WIDTH: usize = 9_890;

/// A run in Arial at `size_pt`, with `\n` rendered as line breaks.
/// Empty text renders as `-`.
pub fn run(text: &str, size_pt: usize) -> Run {
    let text = if text.is_empty() { "-" } else { text };
    let mut run = Run::new()
        .size(size_pt * 2)
        .fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT));
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    run
}

pub fn paragraph(run: Run, align: AlignmentType) -> Paragraph {
    Paragraph::new().add_run(run).align(align)
}

/// Blank line between blocks.
pub fn spacer() -> Paragraph {
    Paragraph::new()
}

/// `☰ TITLE` section heading.
pub fn heading(title: &str) -> Paragraph {
    Paragraph::new()
        .add_run(run("☰ ", 11).bold())
        .add_run(run(title, 11).bold())
}

/// Bold, shaded table cell.
pub fn label(text: &str, size_pt: usize, fill: Option<&str>, align: AlignmentType) -> TableCell {
    let cell = TableCell::new().add_paragraph(paragraph(run(text, size_pt).bold(), align));
    match fill {
        Some(fill) => cell.shading(Shading::new().fill(fill)),
        None => cell,
    }
}

/// Centered header cell.
pub fn header(text: &str, size_pt: usize, fill: &str) -> TableCell {
    label(text, size_pt, Some(fill), AlignmentType::Center)
}

pub fn value(text: &str, size_pt: usize, align: AlignmentType) -> TableCell {
    TableCell::new().add_paragraph(paragraph(run(text, size_pt), align))
}

/// A cell with nothing in it.
pub fn empty() -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new())
}

/// Column widths splitting the page evenly.
pub fn even_grid(columns: usize) -> Vec<usize> {
    vec![CONTENT_WIDTH / columns.max(1); columns.max(1)]
}

pub fn table(rows: Vec<Vec<TableCell>>, columns: usize) -> Table {
    Table::new(rows.into_iter().map(TableRow::new).collect()).set_grid(even_grid(columns))
}

/// Single bordered cell holding the session title.
pub fn title_box(title: &str, size_pt: usize) -> Table {
    table(vec![vec![header(title, size_pt, "FFFFFF")]], 1)
}

/// Administrative values of the general data grid, after level defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralData<'a> {
    pub dre: &'a str,
    pub ugel: &'a str,
    pub ie: &'a str,
    pub distrito: &'a str,
    pub area: &'a str,
    pub grado: &'a str,
    pub seccion: &'a str,
    pub duracion: &'a str,
    pub ciclo: &'a str,
    pub fecha: &'a str,
    pub director: &'a str,
    pub docente: &'a str,
}

/// Value of an optional form field, or `default` when it was not sent.
pub fn field_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().unwrap_or(default)
}

impl<'a> GeneralData<'a> {
    /// Primary schools leave unsent fields blank.
    pub fn primaria(form: &'a SessionForm) -> Self {
        Self {
            dre: field_or(&form.dre, "San Martín"),
            ugel: field_or(&form.ugel, "San Martín"),
            ie: field_or(&form.ie, ""),
            distrito: field_or(&form.distrito, ""),
            area: field_or(&form.area, "N/A"),
            grado: field_or(&form.grado, "N/A"),
            seccion: field_or(&form.seccion, ""),
            duracion: field_or(&form.duracion, "90 min"),
            ciclo: field_or(&form.ciclo, "III/IV/V"),
            fecha: field_or(&form.fecha, ""),
            director: field_or(&form.director, ""),
            docente: field_or(&form.docente, ""),
        }
    }

    pub fn secundaria(form: &'a SessionForm) -> Self {
        Self {
            dre: field_or(&form.dre, "San Martín"),
            ugel: field_or(&form.ugel, "San Martín"),
            ie: field_or(&form.ie, "N/A"),
            distrito: field_or(&form.distrito, "Tarapoto"),
            area: field_or(&form.area, "N/A"),
            grado: field_or(&form.grado, "N/A"),
            seccion: field_or(&form.seccion, "A, B, C, D"),
            duracion: field_or(&form.duracion, "90'"),
            ciclo: field_or(&form.ciclo, "VI"),
            fecha: field_or(&form.fecha, "N/A"),
            director: field_or(&form.director, "N/A"),
            docente: field_or(&form.docente, "N/A"),
        }
    }

    /// Eight-column grid of administrative data.
    pub fn table(&self) -> Table {
        let l = |text: &str| label(text, 9, Some(GREY), AlignmentType::Left);
        let v = |text: &str| value(text, 9, AlignmentType::Left);

        table(
            vec![
                vec![l("DRE"), v(self.dre), l("UGEL"), v(self.ugel).grid_span(5)],
                vec![
                    l("Institución Educativa"),
                    v(self.ie).grid_span(3),
                    l("Distrito"),
                    v(self.distrito).grid_span(3),
                ],
                vec![
                    l("Área curricular"),
                    v(self.area),
                    l("Grado"),
                    v(self.grado),
                    l("Sección"),
                    v(self.seccion),
                    l("Duración"),
                    v(self.duracion),
                ],
                vec![
                    l("Ciclo"),
                    v(self.ciclo),
                    l("Fecha"),
                    v(self.fecha).grid_span(3),
                    l("Director(a)"),
                    v(self.director),
                ],
                vec![l("Docente"), v(self.docente).grid_span(7)],
            ],
            8,
        )
    }
}
