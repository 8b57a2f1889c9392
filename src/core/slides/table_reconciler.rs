use super::slides_models::{CellLocation, ElementKind, Presentation, SlideRequest, Table, TextRange};

/// How a cell is emptied before the new value is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellClear {
    /// `deleteText` over the whole cell.
    #[default]
    All,
    /// `deleteText` over `[0, end - 1)` using the end index found in the
    /// snapshot; nothing is deleted when the cell holds no text.
    ExactRange,
}

/// Writes `rows` into every table tagged `tag`. Input row `i` lands on table
/// row `i + 1` (row 0 is the header). Rows or columns the table does not have
/// are dropped.
pub fn reconcile_table(
    presentation: &Presentation,
    tag: &str,
    rows: &[Vec<String>],
    clear: CellClear,
) -> Vec<SlideRequest> {
    let mut requests = Vec::new();

    for element in presentation.elements() {
        if element.kind() != ElementKind::Table || element.tag() != Some(tag) {
            continue;
        }
        if let Some(table) = &element.table {
            requests.extend(fill_table(&element.object_id, table, tag, rows, clear));
        }
    }

    requests
}

fn fill_table(
    object_id: &str,
    table: &Table,
    tag: &str,
    rows: &[Vec<String>],
    clear: CellClear,
) -> Vec<SlideRequest> {
    let mut requests = Vec::new();

    for (i, values) in rows.iter().enumerate() {
        let row_index = i + 1;
        if row_index >= table.rows {
            tracing::warn!(
                tag,
                dropped = rows.len() - i,
                table_rows = table.rows,
                "Table has fewer data rows than input, truncating"
            );
            break;
        }

        for (column_index, value) in values.iter().enumerate() {
            if column_index >= table.columns {
                tracing::warn!(
                    tag,
                    row_index,
                    table_columns = table.columns,
                    "Table has fewer columns than input, truncating row"
                );
                break;
            }

            let clear_range = match clear {
                CellClear::All => Some(TextRange::All),
                CellClear::ExactRange => {
                    let end = table
                        .cell(row_index, column_index)
                        .map(|cell| cell.end_index())
                        .unwrap_or(0);
                    (end > 1).then(|| TextRange::fixed(0, end - 1))
                }
            };

            requests.push(SlideRequest::ReplaceTableCellText {
                object_id: object_id.to_string(),
                cell: CellLocation {
                    row_index,
                    column_index,
                },
                clear: clear_range,
                text: value.clone(),
            });
        }
    }

    requests
}
