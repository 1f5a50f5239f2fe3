//! Table rendering into pipe-delimited markup lines.

use futures::future::join_all;

use crate::dom::MarkupNode;

use super::main::Engine;

/// Render one table.
///
/// Header cells are collected from the whole table, not a single row, and
/// emitted as one `^ … ^` line. Every row then contributes one `| … |`
/// line for its body cells; rows holding only header cells contribute
/// nothing.
pub(crate) async fn convert_table(engine: &Engine<'_>, table: &MarkupNode) -> String {
    let mut out = String::from("\n");

    let mut headers = Vec::new();
    table.descendants_named("th", &mut headers);
    if !headers.is_empty() {
        let cells = join_all(headers.iter().map(|cell| engine.render_inline(cell))).await;
        out.push_str("^ ");
        out.push_str(&cells.join(" ^ "));
        out.push_str(" ^\n");
    }

    let mut rows = Vec::new();
    table.descendants_named("tr", &mut rows);

    let lines = join_all(rows.iter().map(|row| render_row(engine, row))).await;
    for line in lines.into_iter().flatten() {
        out.push_str(&line);
        out.push('\n');
    }

    out
}

async fn render_row(engine: &Engine<'_>, row: &MarkupNode) -> Option<String> {
    let mut cells = Vec::new();
    row.descendants_named("td", &mut cells);
    if cells.is_empty() {
        return None;
    }

    let rendered = join_all(cells.iter().map(|cell| engine.render_inline(cell))).await;
    Some(format!("| {} |", rendered.join(" | ")))
}
