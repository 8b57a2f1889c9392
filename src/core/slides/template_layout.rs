use serde::{Deserialize, Serialize};
use std::path::Path;

use super::table_reconciler::CellClear;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid template layout: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Template layout is inconsistent: {0}")]
    Invalid(String),
}

/// Which set of forecast tables the template carries per preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLayout {
    /// `{prefix}_country_tier_state` + `{prefix}_city`.
    #[default]
    Combined,
    /// `{prefix}_tier`, `{prefix}_state`, `{prefix}_city`, `{prefix}_country`.
    Legacy,
}

/// Where things live in the template deck. Loaded once at startup and handed
/// to the reconciliation code; nothing downstream hardcodes slide positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// Zero-based index of the slide laid out for up to four personas.
    pub persona_four_slide: usize,
    /// Zero-based index of the slide laid out for five or six personas.
    pub persona_six_slide: usize,
    /// Slides that are never part of a generated deck.
    pub unused_slides: Vec<usize>,
    pub table_layout: TableLayout,
    pub cell_clear: CellClearMode,
}

/// Serialisable mirror of [`CellClear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellClearMode {
    #[default]
    All,
    ExactRange,
}

impl From<CellClearMode> for CellClear {
    fn from(mode: CellClearMode) -> Self {
        match mode {
            CellClearMode::All => CellClear::All,
            CellClearMode::ExactRange => CellClear::ExactRange,
        }
    }
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            persona_four_slide: 6,
            persona_six_slide: 7,
            unused_slides: vec![5, 8],
            table_layout: TableLayout::Combined,
            cell_clear: CellClearMode::All,
        }
    }
}

impl TemplateLayout {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layout: TemplateLayout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.persona_four_slide == self.persona_six_slide {
            return Err(LayoutError::Invalid(
                "persona layouts must live on different slides".into(),
            ));
        }
        if self.unused_slides.contains(&self.persona_four_slide)
            || self.unused_slides.contains(&self.persona_six_slide)
        {
            return Err(LayoutError::Invalid(
                "a persona slide is also listed as unused".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let layout = TemplateLayout::from_json(r#"{"table_layout": "legacy"}"#).unwrap();
        assert_eq!(layout.table_layout, TableLayout::Legacy);
        assert_eq!(layout.persona_four_slide, 6);
        assert_eq!(layout.unused_slides, vec![5, 8]);
    }

    #[test]
    fn test_rejects_overlapping_slides() {
        let err = TemplateLayout::from_json(r#"{"persona_four_slide": 5}"#).unwrap_err();
        assert!(matches!(err, LayoutError::Invalid(_)));

        let err =
            TemplateLayout::from_json(r#"{"persona_four_slide": 3, "persona_six_slide": 3}"#)
                .unwrap_err();
        assert!(matches!(err, LayoutError::Invalid(_)));
    }

    #[test]
    fn test_cell_clear_mode_maps() {
        let layout = TemplateLayout::from_json(r#"{"cell_clear": "exact_range"}"#).unwrap();
        assert_eq!(CellClear::from(layout.cell_clear), CellClear::ExactRange);
    }
}
