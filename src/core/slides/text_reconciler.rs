// Text reconciliation: replace the content of tagged text shapes while keeping
// the template's styling.
//
// For every shape whose alt-text tag has a value we emit, in this order:
//   1. deleteText (ALL)
//   2. insertText at 0
//   3. updateTextStyle per line (or per title part), FIXED_RANGE
//   4. createParagraphBullets (bullet lists only)
//   5. updateParagraphStyle (ALL), from the first styled paragraph marker
//
// Ranges in (3) are computed on the *new* text and are valid because (1) and
// (2) are applied first within the same batch. All indices are UTF-16 code
// units, which is how the Slides API counts.

use super::slide_content::{SlideContent, SlideText};
use super::slides_models::{ElementKind, Presentation, SlideRequest, StyleMap, TextRange};
use super::style_extractor::{extract_styles, ExtractedStyles};

pub const BULLET_PRESET: &str = "BULLET_DISC_CIRCLE_SQUARE";

/// Length of `text` in UTF-16 code units (surrogate pairs count as 2).
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Where the two halves of an emoji title sit in the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleSpans {
    /// End of the emoji part, exclusive.
    pub emoji_end: usize,
    /// Start of the label: emoji plus the separating newline.
    pub label_start: usize,
    /// Total length of the rendered title.
    pub total: usize,
}

impl TitleSpans {
    pub fn new(emoji: &str, label: &str) -> Self {
        let emoji_end = utf16_len(emoji);
        let label_start = utf16_len(&format!("{}\n", emoji));
        Self {
            emoji_end,
            label_start,
            total: label_start + utf16_len(label),
        }
    }
}

/// Builds the requests that rewrite every tagged text shape in `presentation`
/// found in `content`. Shapes whose tag is unknown, and shapes with no text,
/// are left alone.
pub fn reconcile_text(presentation: &Presentation, content: &SlideContent) -> Vec<SlideRequest> {
    let mut requests = Vec::new();

    for element in presentation.elements() {
        if element.kind() != ElementKind::TextShape {
            continue;
        }
        let Some(tag) = element.tag() else {
            continue;
        };
        let Some(value) = content.get(tag) else {
            continue;
        };

        match extract_styles(element.text_elements()) {
            Some(styles) => {
                requests.extend(reconcile_shape(&element.object_id, value, &styles));
            }
            None => tracing::debug!(tag, object_id = %element.object_id, "Skipping empty text shape"),
        }
    }

    requests
}

/// Requests for one shape, given the styles captured from its current text.
pub fn reconcile_shape(
    object_id: &str,
    value: &SlideText,
    styles: &ExtractedStyles,
) -> Vec<SlideRequest> {
    let mut requests = vec![SlideRequest::DeleteText {
        object_id: object_id.to_string(),
        cell: None,
        range: TextRange::All,
    }];

    let text = value.render();
    if text.is_empty() {
        return requests;
    }

    requests.push(SlideRequest::InsertText {
        object_id: object_id.to_string(),
        cell: None,
        index: 0,
        text: text.clone(),
    });

    match value {
        SlideText::Plain(_) => requests.extend(line_styles(object_id, &text, styles)),
        SlideText::Title { emoji, label } => {
            requests.extend(title_styles(object_id, emoji, label, styles))
        }
        SlideText::Bullets(_) => {
            if let Some(style) = styles.line_style(0) {
                requests.push(text_style(object_id, style, TextRange::All));
            }
            requests.push(SlideRequest::CreateParagraphBullets {
                object_id: object_id.to_string(),
                range: TextRange::All,
                preset: BULLET_PRESET.to_string(),
            });
        }
    }

    if let Some(paragraph) = &styles.paragraph_style {
        requests.push(SlideRequest::UpdateParagraphStyle {
            object_id: object_id.to_string(),
            style: paragraph.clone(),
            range: TextRange::All,
        });
    }

    requests
}

/// Line `i` of the new text takes the style line `i` of the old text had.
/// Each range covers the line and its terminating newline.
fn line_styles(object_id: &str, text: &str, styles: &ExtractedStyles) -> Vec<SlideRequest> {
    let mut requests = Vec::new();
    let mut start = 0;

    for (i, line) in text.split('\n').enumerate() {
        let len = utf16_len(line);
        if len > 0 {
            if let Some(style) = styles.line_style(i) {
                requests.push(text_style(
                    object_id,
                    style,
                    TextRange::fixed(start, start + len + 1),
                ));
            }
        }
        start += len + 1;
    }

    requests
}

fn title_styles(
    object_id: &str,
    emoji: &str,
    label: &str,
    styles: &ExtractedStyles,
) -> Vec<SlideRequest> {
    let spans = TitleSpans::new(emoji, label);
    let mut requests = Vec::new();

    if spans.emoji_end > 0 {
        if let Some(style) = styles.line_style(0) {
            requests.push(text_style(
                object_id,
                style,
                TextRange::fixed(0, spans.emoji_end),
            ));
        }
    }

    if spans.label_start < spans.total {
        // A template title without its own label line shares the emoji run.
        if let Some(style) = styles.line_style(1).or_else(|| styles.line_style(0)) {
            requests.push(text_style(
                object_id,
                style,
                TextRange::fixed(spans.label_start, spans.total),
            ));
        }
    }

    requests
}

fn text_style(object_id: &str, style: &StyleMap, range: TextRange) -> SlideRequest {
    SlideRequest::UpdateTextStyle {
        object_id: object_id.to_string(),
        style: style.clone(),
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deck(elements: serde_json::Value) -> Presentation {
        serde_json::from_value(json!({
            "presentationId": "deck",
            "slides": [{"objectId": "slide1", "pageElements": elements}]
        }))
        .unwrap()
    }

    fn style_updates(requests: &[SlideRequest]) -> Vec<(StyleMap, TextRange)> {
        requests
            .iter()
            .filter_map(|r| match r {
                SlideRequest::UpdateTextStyle { style, range, .. } => {
                    Some((style.clone(), range.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn s(value: serde_json::Value) -> StyleMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_utf16_len_counts_surrogate_pairs() {
        assert_eq!(utf16_len("A"), 1);
        assert_eq!(utf16_len("😀"), 2);
        assert_eq!(utf16_len("é"), 1);
        assert_eq!(utf16_len("😀\nHi"), 5);
    }

    #[test]
    fn test_title_spans_for_emoji_and_ascii() {
        let emoji = TitleSpans::new("😀", "Hello");
        assert_eq!(emoji.emoji_end, 2);
        assert_eq!(emoji.label_start, 3);
        assert_eq!(emoji.total, 8);

        let ascii = TitleSpans::new("A", "B");
        assert_eq!(ascii.label_start, 2);
    }

    #[test]
    fn test_three_styled_lines_replaced_by_two() {
        let presentation = deck(json!([{
            "objectId": "insight",
            "description": "insight_1_description",
            "shape": {"text": {"textElements": [
                {"paragraphMarker": {"style": {"alignment": "START"}}},
                {"textRun": {"content": "one\n", "style": {"bold": true}}},
                {"paragraphMarker": {}},
                {"textRun": {"content": "two\n", "style": {"italic": true}}},
                {"paragraphMarker": {}},
                {"textRun": {"content": "three\n", "style": {"underline": true}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("insight_1_description".into(), "first\nsecond".into());

        let requests = reconcile_text(&presentation, &content);
        let updates = style_updates(&requests);

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], (s(json!({"bold": true})), TextRange::fixed(0, 6)));
        assert_eq!(updates[1], (s(json!({"italic": true})), TextRange::fixed(6, 13)));

        assert!(matches!(requests[0], SlideRequest::DeleteText { range: TextRange::All, .. }));
        assert!(matches!(&requests[1], SlideRequest::InsertText { text, index: 0, .. } if text == "first\nsecond"));
        assert!(matches!(
            requests.last(),
            Some(SlideRequest::UpdateParagraphStyle { .. })
        ));
    }

    #[test]
    fn test_extra_new_lines_inherit_shape_default() {
        let presentation = deck(json!([{
            "objectId": "box",
            "description": "competitive_advantage",
            "shape": {"text": {"textElements": [
                {"textRun": {"content": "only\n", "style": {"bold": true}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("competitive_advantage".into(), "a\nb\nc".into());

        let updates = style_updates(&reconcile_text(&presentation, &content));
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1, TextRange::fixed(0, 2));
    }

    #[test]
    fn test_emoji_title_styles_each_part() {
        let presentation = deck(json!([{
            "objectId": "p1title",
            "description": "persona_1_title",
            "shape": {"text": {"textElements": [
                {"textRun": {"content": "🎓\n", "style": {"fontSize": {"magnitude": 28, "unit": "PT"}}}},
                {"paragraphMarker": {"style": {"alignment": "CENTER"}}},
                {"textRun": {"content": "Old label\n", "style": {"fontSize": {"magnitude": 12, "unit": "PT"}}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("persona_1_title".into(), SlideText::title("😀\nHello"));

        let updates = style_updates(&reconcile_text(&presentation, &content));
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].0["fontSize"]["magnitude"], 28);
        assert_eq!(updates[0].1, TextRange::fixed(0, 2));
        assert_eq!(updates[1].0["fontSize"]["magnitude"], 12);
        assert_eq!(updates[1].1, TextRange::fixed(3, 8));
    }

    #[test]
    fn test_emoji_in_plain_line_shifts_following_ranges() {
        let presentation = deck(json!([{
            "objectId": "sig",
            "description": "data_signal_1_title",
            "shape": {"text": {"textElements": [
                {"textRun": {"content": "x\n", "style": {"bold": true}}},
                {"textRun": {"content": "y\n", "style": {"italic": true}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("data_signal_1_title".into(), "🔥 Hot\nNext".into());

        let updates = style_updates(&reconcile_text(&presentation, &content));
        // "🔥 Hot" is 6 UTF-16 units, not 5 chars.
        assert_eq!(updates[0].1, TextRange::fixed(0, 7));
        assert_eq!(updates[1].1, TextRange::fixed(7, 12));
    }

    #[test]
    fn test_bullets_get_bullet_request() {
        let presentation = deck(json!([{
            "objectId": "profiles",
            "description": "persona_1_target_profiles",
            "shape": {"text": {"textElements": [
                {"textRun": {"content": "placeholder\n", "style": {"fontSize": {"magnitude": 10}}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert(
            "persona_1_target_profiles".into(),
            SlideText::Bullets(vec!["Students".into(), "Parents".into()]),
        );

        let requests = reconcile_text(&presentation, &content);
        assert!(requests.iter().any(|r| matches!(
            r,
            SlideRequest::CreateParagraphBullets { preset, .. } if preset == BULLET_PRESET
        )));
        assert_eq!(style_updates(&requests)[0].1, TextRange::All);
    }

    #[test]
    fn test_untagged_unknown_and_empty_shapes_skipped() {
        let presentation = deck(json!([
            {"objectId": "a", "shape": {"text": {"textElements": [{"textRun": {"content": "x\n"}}]}}},
            {"objectId": "b", "description": "not_in_content", "shape": {"text": {"textElements": [{"textRun": {"content": "x\n"}}]}}},
            {"objectId": "c", "description": "cohort_title", "shape": {}},
            {"objectId": "d", "description": "cohort_title", "table": {"rows": 1, "columns": 1}}
        ]));

        let mut content = SlideContent::new();
        content.insert("cohort_title".into(), "Travel".into());

        assert!(reconcile_text(&presentation, &content).is_empty());
    }

    #[test]
    fn test_empty_value_only_clears() {
        let presentation = deck(json!([{
            "objectId": "p6",
            "description": "persona_6_title",
            "shape": {"text": {"textElements": [{"textRun": {"content": "old\n"}}]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("persona_6_title".into(), "".into());

        let requests = reconcile_text(&presentation, &content);
        assert_eq!(requests.len(), 1);
        assert!(matches!(requests[0], SlideRequest::DeleteText { .. }));
    }

    #[test]
    fn test_reconciling_an_already_reconciled_shape_is_stable() {
        let original = deck(json!([{
            "objectId": "def",
            "description": "cohort_definition",
            "shape": {"text": {"textElements": [
                {"paragraphMarker": {"style": {"alignment": "JUSTIFIED"}}},
                {"textRun": {"content": "Old\n", "style": {"bold": true}}},
                {"paragraphMarker": {}},
                {"textRun": {"content": "Older\n", "style": {"italic": true}}}
            ]}}
        }]));
        // The same shape as it reads after the first batch has been applied.
        let reconciled = deck(json!([{
            "objectId": "def",
            "description": "cohort_definition",
            "shape": {"text": {"textElements": [
                {"paragraphMarker": {"style": {"alignment": "JUSTIFIED"}}},
                {"textRun": {"content": "New\n", "style": {"bold": true}}},
                {"paragraphMarker": {}},
                {"textRun": {"content": "Text\n", "style": {"italic": true}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("cohort_definition".into(), "New\nText".into());

        assert_eq!(
            reconcile_text(&original, &content),
            reconcile_text(&reconciled, &content)
        );
    }

    #[test]
    fn test_default_styled_template_sends_no_style_updates() {
        let presentation = deck(json!([{
            "objectId": "definition",
            "description": "cohort_definition",
            "shape": {"text": {"textElements": [
                {"paragraphMarker": {"style": {}}},
                {"textRun": {"content": "Old\n", "style": {}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("cohort_definition".into(), "New".into());

        let requests = reconcile_text(&presentation, &content);
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], SlideRequest::DeleteText { .. }));
        assert!(matches!(&requests[1], SlideRequest::InsertText { text, .. } if text == "New"));
    }

    #[test]
    fn test_empty_run_style_does_not_hide_later_paragraph_style() {
        let presentation = deck(json!([{
            "objectId": "insight",
            "description": "insight_2_title",
            "shape": {"text": {"textElements": [
                {"paragraphMarker": {"style": {}}},
                {"textRun": {"content": "one\n", "style": {}}},
                {"paragraphMarker": {"style": {"alignment": "CENTER"}}},
                {"textRun": {"content": "two\n", "style": {"bold": true}}}
            ]}}
        }]));

        let mut content = SlideContent::new();
        content.insert("insight_2_title".into(), "a\nb".into());

        let requests = reconcile_text(&presentation, &content);
        let updates = style_updates(&requests);
        assert_eq!(updates, vec![(s(json!({"bold": true})), TextRange::fixed(2, 4))]);
        assert!(requests.iter().any(|r| matches!(
            r,
            SlideRequest::UpdateParagraphStyle { style, .. } if *style == s(json!({"alignment": "CENTER"}))
        )));
    }
}
