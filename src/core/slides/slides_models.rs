// Snapshot and edit-operation types for the Slides document model.
//
// The snapshot side mirrors the subset of `presentations.get` we read. Style
// objects are kept as raw JSON maps: we never interpret them, we only copy
// them from the template back onto the replacement text.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Opaque style-property -> value mapping (text run style or paragraph style).
pub type StyleMap = Map<String, Value>;

// =============================================================================
// SNAPSHOT
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slides: Vec<Page>,
}

impl Presentation {
    /// Every page element of every slide, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &PageElement> {
        self.slides.iter().flat_map(|slide| slide.page_elements.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub table: Option<Table>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub sheets_chart: Option<Value>,
}

/// What a page element holds, as far as reconciliation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    TextShape,
    Table,
    Image,
    ChartLink,
    Other,
}

impl PageElement {
    /// The alt-text tag used to match content to this element.
    pub fn tag(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> ElementKind {
        if self.shape.is_some() {
            ElementKind::TextShape
        } else if self.table.is_some() {
            ElementKind::Table
        } else if self.image.is_some() {
            ElementKind::Image
        } else if self.sheets_chart.is_some() {
            ElementKind::ChartLink
        } else {
            ElementKind::Other
        }
    }

    /// Text elements of a shape; empty for anything that is not a text shape.
    pub fn text_elements(&self) -> &[TextElement] {
        self.shape
            .as_ref()
            .and_then(|shape| shape.text.as_ref())
            .map(|text| text.text_elements.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default)]
    pub end_index: usize,
    #[serde(default)]
    pub text_run: Option<TextRun>,
    #[serde(default)]
    pub paragraph_marker: Option<ParagraphMarker>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub style: Option<StyleMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphMarker {
    #[serde(default)]
    pub style: Option<StyleMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub rows: usize,
    pub columns: usize,
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

impl Table {
    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.table_rows
            .get(row)
            .and_then(|r| r.table_cells.get(column))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub text: Option<TextContent>,
}

impl TableCell {
    /// Highest `endIndex` across the cell's text elements (0 for an empty cell).
    pub fn end_index(&self) -> usize {
        self.text
            .as_ref()
            .map(|text| {
                text.text_elements
                    .iter()
                    .map(|el| el.end_index)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

// =============================================================================
// EDIT OPERATIONS
// =============================================================================

/// Range of text addressed by an operation, in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextRange {
    All,
    FixedRange {
        #[serde(rename = "startIndex")]
        start_index: usize,
        #[serde(rename = "endIndex")]
        end_index: usize,
    },
}

impl TextRange {
    pub fn fixed(start_index: usize, end_index: usize) -> Self {
        TextRange::FixedRange {
            start_index,
            end_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLocation {
    pub row_index: usize,
    pub column_index: usize,
}

/// One edit in a `batchUpdate`. Later operations see the effect of earlier
/// ones, so the order of a request list is significant.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideRequest {
    DeleteText {
        object_id: String,
        cell: Option<CellLocation>,
        range: TextRange,
    },
    InsertText {
        object_id: String,
        cell: Option<CellLocation>,
        index: usize,
        text: String,
    },
    UpdateTextStyle {
        object_id: String,
        style: StyleMap,
        range: TextRange,
    },
    UpdateParagraphStyle {
        object_id: String,
        style: StyleMap,
        range: TextRange,
    },
    CreateParagraphBullets {
        object_id: String,
        range: TextRange,
        preset: String,
    },
    DeleteObject {
        object_id: String,
    },
    /// Clear one table cell (when `clear` is set) and write `text` into it.
    ReplaceTableCellText {
        object_id: String,
        cell: CellLocation,
        clear: Option<TextRange>,
        text: String,
    },
}

impl SlideRequest {
    pub fn object_id(&self) -> &str {
        match self {
            SlideRequest::DeleteText { object_id, .. }
            | SlideRequest::InsertText { object_id, .. }
            | SlideRequest::UpdateTextStyle { object_id, .. }
            | SlideRequest::UpdateParagraphStyle { object_id, .. }
            | SlideRequest::CreateParagraphBullets { object_id, .. }
            | SlideRequest::DeleteObject { object_id }
            | SlideRequest::ReplaceTableCellText { object_id, .. } => object_id,
        }
    }

    /// Renders the operation as Slides API request objects.
    ///
    /// `ReplaceTableCellText` has no single wire counterpart and expands to a
    /// `deleteText` + `insertText` pair targeting the cell (the delete is
    /// omitted when there is nothing to clear).
    pub fn to_wire(&self) -> Vec<Value> {
        match self {
            SlideRequest::DeleteText {
                object_id,
                cell,
                range,
            } => {
                let mut body = json!({ "objectId": object_id, "textRange": range });
                if let Some(cell) = cell {
                    body["cellLocation"] = json!(cell);
                }
                vec![json!({ "deleteText": body })]
            }
            SlideRequest::InsertText {
                object_id,
                cell,
                index,
                text,
            } => {
                let mut body = json!({
                    "objectId": object_id,
                    "insertionIndex": index,
                    "text": text,
                });
                if let Some(cell) = cell {
                    body["cellLocation"] = json!(cell);
                }
                vec![json!({ "insertText": body })]
            }
            SlideRequest::UpdateTextStyle {
                object_id,
                style,
                range,
            } => vec![json!({
                "updateTextStyle": {
                    "objectId": object_id,
                    "style": style,
                    "textRange": range,
                    "fields": fields_mask(style),
                }
            })],
            SlideRequest::UpdateParagraphStyle {
                object_id,
                style,
                range,
            } => vec![json!({
                "updateParagraphStyle": {
                    "objectId": object_id,
                    "style": style,
                    "textRange": range,
                    "fields": fields_mask(style),
                }
            })],
            SlideRequest::CreateParagraphBullets {
                object_id,
                range,
                preset,
            } => vec![json!({
                "createParagraphBullets": {
                    "objectId": object_id,
                    "textRange": range,
                    "bulletPreset": preset,
                }
            })],
            SlideRequest::DeleteObject { object_id } => {
                vec![json!({ "deleteObject": { "objectId": object_id } })]
            }
            SlideRequest::ReplaceTableCellText {
                object_id,
                cell,
                clear,
                text,
            } => {
                let mut wire = Vec::with_capacity(2);
                if let Some(clear) = clear {
                    wire.push(json!({
                        "deleteText": {
                            "objectId": object_id,
                            "cellLocation": cell,
                            "textRange": clear,
                        }
                    }));
                }
                wire.push(json!({
                    "insertText": {
                        "objectId": object_id,
                        "cellLocation": cell,
                        "insertionIndex": 0,
                        "text": text,
                    }
                }));
                wire
            }
        }
    }
}

/// Field mask for a style update: every property present in the style.
pub fn fields_mask(style: &StyleMap) -> String {
    style.keys().map(String::as_str).collect::<Vec<_>>().join(",")
}
