// Slide-content reconciliation: turns (template snapshot, content) into one
// ordered batch of Slides API edits.

pub mod batch_assembler;
pub mod deck_service;
pub mod slide_content;
pub mod slide_pruner;
pub mod slides_models;
pub mod style_extractor;
pub mod table_reconciler;
pub mod template_layout;
pub mod text_reconciler;

pub use batch_assembler::EditBatch;
pub use deck_service::{DeckError, DeckService};
pub use slide_content::{SlideContent, SlideText, TableContent};
pub use slide_pruner::{count_filled_personas, prune_slides};
pub use slides_models::{Presentation, SlideRequest};
pub use table_reconciler::{reconcile_table, CellClear};
pub use template_layout::{LayoutError, TableLayout, TemplateLayout};
pub use text_reconciler::reconcile_text;
