use std::collections::BTreeMap;

/// Replacement value for one tagged text shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideText {
    Plain(String),
    /// `"{emoji}\n{label}"` titles whose two parts carry different styles.
    Title { emoji: String, label: String },
    /// One paragraph per entry, rendered as a bullet list.
    Bullets(Vec<String>),
}

impl SlideText {
    /// The exact string inserted into the shape.
    pub fn render(&self) -> String {
        match self {
            SlideText::Plain(text) => text.clone(),
            SlideText::Title { emoji, label } => format!("{}\n{}", emoji, label),
            SlideText::Bullets(items) => items.join("\n"),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            SlideText::Plain(text) => text.trim().is_empty(),
            SlideText::Title { emoji, label } => {
                emoji.trim().is_empty() && label.trim().is_empty()
            }
            SlideText::Bullets(items) => items.iter().all(|i| i.trim().is_empty()),
        }
    }

    /// Splits a persona-style title on its first newline; single-line text
    /// stays plain.
    pub fn title(text: &str) -> Self {
        match text.split_once('\n') {
            Some((emoji, label)) => SlideText::Title {
                emoji: emoji.to_string(),
                label: label.to_string(),
            },
            None => SlideText::Plain(text.to_string()),
        }
    }
}

impl From<String> for SlideText {
    fn from(text: String) -> Self {
        SlideText::Plain(text)
    }
}

impl From<&str> for SlideText {
    fn from(text: &str) -> Self {
        SlideText::Plain(text.to_string())
    }
}

impl From<f64> for SlideText {
    fn from(value: f64) -> Self {
        SlideText::Plain(format_number(value))
    }
}

/// Tag -> replacement text for every text shape the template exposes.
pub type SlideContent = BTreeMap<String, SlideText>;

/// Tag -> data rows (header row excluded) for the template's tables.
pub type TableContent = Vec<(String, Vec<Vec<String>>)>;

/// Rounds to two decimals and prints the shortest form, keeping one decimal
/// for whole numbers (`3.0`, `10.5`, `31.25`).
pub fn format_number(value: f64) -> String {
    let rounded = round2(value);
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_variants() {
        assert_eq!(SlideText::from("abc").render(), "abc");
        assert_eq!(SlideText::title("😀\nHello").render(), "😀\nHello");
        assert_eq!(
            SlideText::Bullets(vec!["a".into(), "b".into()]).render(),
            "a\nb"
        );
    }

    #[test]
    fn test_title_without_newline_is_plain() {
        assert_eq!(SlideText::title("Hello"), SlideText::Plain("Hello".into()));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.5), "10.5");
        assert_eq!(format_number(3.0), "3.0");
        assert_eq!(format_number(31.256), "31.26");
        assert_eq!(SlideText::from(1.004).render(), "1.0");
    }

    #[test]
    fn test_blank_detection() {
        assert!(SlideText::from("   ").is_blank());
        assert!(!SlideText::title("😀\nChef").is_blank());
    }
}
