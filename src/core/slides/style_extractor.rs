use super::slides_models::{StyleMap, TextElement};

/// One visible line of a text shape and the style of the run that started it.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    pub text: String,
    pub style: Option<StyleMap>,
}

/// Styles recovered from a text shape before its content is replaced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedStyles {
    pub lines: Vec<StyledLine>,
    /// First paragraph style found in the shape; alignment is uniform per shape.
    pub paragraph_style: Option<StyleMap>,
}

impl ExtractedStyles {
    /// Style recorded for line `index` of the original text, if any.
    pub fn line_style(&self, index: usize) -> Option<&StyleMap> {
        self.lines.get(index).and_then(|line| line.style.as_ref())
    }
}

/// Walks a shape's text elements and records, per line, the style of the
/// first run that contributed characters to it.
///
/// Returns `None` for a shape without text elements; such shapes are not
/// reconciled at all.
pub fn extract_styles(elements: &[TextElement]) -> Option<ExtractedStyles> {
    if elements.is_empty() {
        return None;
    }

    let mut extracted = ExtractedStyles::default();
    let mut current = String::new();
    let mut current_style: Option<StyleMap> = None;

    for element in elements {
        if let Some(run) = &element.text_run {
            for ch in run.content.chars() {
                if ch == '\n' {
                    extracted.lines.push(StyledLine {
                        text: std::mem::take(&mut current),
                        style: current_style.take(),
                    });
                } else {
                    if current.is_empty() {
                        current_style = non_empty(&run.style);
                    }
                    current.push(ch);
                }
            }
        } else if let Some(marker) = &element.paragraph_marker {
            if !current.is_empty() {
                extracted.lines.push(StyledLine {
                    text: std::mem::take(&mut current),
                    style: current_style.take(),
                });
            }
            if extracted.paragraph_style.is_none() {
                extracted.paragraph_style = non_empty(&marker.style);
            }
        }
    }

    if !current.is_empty() {
        extracted.lines.push(StyledLine {
            text: current,
            style: current_style,
        });
    }

    Some(extracted)
}

/// Default-styled runs and markers come back as `{}`; there is nothing to reapply.
fn non_empty(style: &Option<StyleMap>) -> Option<StyleMap> {
    style.clone().filter(|s| !s.is_empty())
}
