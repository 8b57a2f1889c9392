use super::slides_models::{Presentation, SlideRequest};
use super::template_layout::TemplateLayout;

pub const MAX_PERSONAS: usize = 6;

/// The two persona slide variants the template ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaLayout {
    Four,
    Six,
}

impl PersonaLayout {
    pub fn for_count(filled: usize) -> Self {
        if filled > 4 {
            PersonaLayout::Six
        } else {
            PersonaLayout::Four
        }
    }
}

/// Number of leading persona titles that are not blank. Counting stops at
/// the first blank slot, so a gap hides every persona after it.
pub fn count_filled_personas<S: AsRef<str>>(titles: &[S]) -> usize {
    titles
        .iter()
        .take(MAX_PERSONAS)
        .take_while(|title| !title.as_ref().trim().is_empty())
        .count()
}

/// Deletes the persona variant that is not needed plus the template's
/// always-unused slides. Slides are addressed by object id so the result does
/// not depend on the order deletions are applied in.
pub fn prune_slides(
    presentation: &Presentation,
    layout: &TemplateLayout,
    filled_personas: usize,
) -> Vec<SlideRequest> {
    if filled_personas == 0 {
        tracing::warn!("No persona content; keeping the four-persona slide with blank slots");
    }

    let persona_layout = PersonaLayout::for_count(filled_personas);
    let unused_variant = match persona_layout {
        PersonaLayout::Four => layout.persona_six_slide,
        PersonaLayout::Six => layout.persona_four_slide,
    };

    tracing::debug!(filled_personas, ?persona_layout, "Selected persona layout");

    let mut requests: Vec<SlideRequest> = Vec::new();
    for index in std::iter::once(unused_variant).chain(layout.unused_slides.iter().copied()) {
        let Some(slide) = presentation.slides.get(index) else {
            tracing::warn!(
                index,
                slides = presentation.slides.len(),
                "Template slide index out of range, nothing to delete"
            );
            continue;
        };
        if requests.iter().any(|r| r.object_id() == slide.object_id) {
            continue;
        }
        requests.push(SlideRequest::DeleteObject {
            object_id: slide.object_id.clone(),
        });
    }

    requests
}
