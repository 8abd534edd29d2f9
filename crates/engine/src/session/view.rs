use exam_core::model::PaletteState;

use crate::session::controller::SessionController;

/// Immutable snapshot of the question palette for rendering.
///
/// States are keyed by absolute question index; `filtered` carries the
/// absolute indices of the active subject view in paper order, so renderers
/// can lay out the filtered palette without re-deriving the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteView {
    states: Vec<PaletteState>,
    filtered: Vec<usize>,
    current_index: usize,
}

impl PaletteView {
    /// Captures the palette from a live session.
    #[must_use]
    pub fn capture(controller: &SessionController) -> Self {
        let states = (0..controller.paper().len())
            .map(|i| {
                controller
                    .palette_state_of(i)
                    .unwrap_or(PaletteState::NotVisited)
            })
            .collect();
        Self {
            states,
            filtered: controller.filtered_indices(),
            current_index: controller.current_index(),
        }
    }

    /// Palette state by absolute question index.
    #[must_use]
    pub fn state_of(&self, index: usize) -> Option<PaletteState> {
        self.states.get(index).copied()
    }

    /// Absolute indices of the filtered view, in paper order.
    #[must_use]
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    /// Palette states of the filtered view, in view order.
    #[must_use]
    pub fn filtered_states(&self) -> Vec<PaletteState> {
        self.filtered
            .iter()
            .filter_map(|&i| self.state_of(i))
            .collect()
    }

    /// Absolute index of the question on display. "Current" is presentation
    /// layered on top of the palette states, not a state of its own.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::SessionEvent;
    use exam_core::model::{Question, QuestionId, QuestionOption, Subject, TestId, TestPaper};
    use std::collections::BTreeSet;

    fn question(id: u64, subject: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            None,
            vec![
                QuestionOption::text("a"),
                QuestionOption::text("b"),
                QuestionOption::text("c"),
            ],
            BTreeSet::from([0]),
            false,
            Subject::from(subject),
        )
        .unwrap()
    }

    fn in_progress() -> SessionController {
        let paper = TestPaper::new(
            TestId::new("t1"),
            "Mock",
            600,
            vec![
                question(1, "Physics"),
                question(2, "Math"),
                question(3, "Physics"),
            ],
        )
        .unwrap();
        let mut c = SessionController::new(paper);
        c.start().unwrap();
        c.apply(SessionEvent::FullscreenChanged(true)).unwrap();
        c
    }

    #[test]
    fn capture_reflects_palette_and_cursor() {
        let mut c = in_progress();
        c.select_answer(0, 1).unwrap();
        c.navigate_to(1).unwrap();
        c.toggle_mark(2).unwrap();

        let view = PaletteView::capture(&c);
        assert_eq!(view.len(), 3);
        assert_eq!(view.state_of(0), Some(PaletteState::Answered));
        assert_eq!(view.state_of(1), Some(PaletteState::Unanswered));
        assert_eq!(view.state_of(2), Some(PaletteState::Marked));
        assert_eq!(view.current_index(), 1);
    }

    #[test]
    fn filtered_view_is_in_paper_order_with_absolute_indices() {
        let mut c = in_progress();
        c.select_answer(0, 1).unwrap();
        c.set_subject_filter(Some(Subject::from("Physics"))).unwrap();

        let view = PaletteView::capture(&c);
        assert_eq!(view.filtered(), &[0, 2]);
        assert_eq!(
            view.filtered_states(),
            vec![PaletteState::Answered, PaletteState::NotVisited]
        );
    }
}
