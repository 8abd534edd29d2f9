use serde::{Deserialize, Serialize};

/// Visual/navigation state of one question in the palette.
///
/// "Current" highlighting is a presentation concern layered on top of
/// these states, not a state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteState {
    NotVisited,
    Unanswered,
    Answered,
    Marked,
    AnsweredAndMarked,
}

/// Derives the palette state for one question.
///
/// Precedence when several conditions hold:
/// `AnsweredAndMarked > Marked > Answered > Unanswered (if visited) > NotVisited`.
#[must_use]
pub fn palette_state(visited: bool, marked: bool, answered: bool) -> PaletteState {
    match (marked, answered) {
        (true, true) => PaletteState::AnsweredAndMarked,
        (true, false) => PaletteState::Marked,
        (false, true) => PaletteState::Answered,
        (false, false) => {
            if visited {
                PaletteState::Unanswered
            } else {
                PaletteState::NotVisited
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_table() {
        assert_eq!(palette_state(true, true, true), PaletteState::AnsweredAndMarked);
        assert_eq!(palette_state(true, true, false), PaletteState::Marked);
        assert_eq!(palette_state(true, false, true), PaletteState::Answered);
        assert_eq!(palette_state(true, false, false), PaletteState::Unanswered);
        assert_eq!(palette_state(false, false, false), PaletteState::NotVisited);
    }

    #[test]
    fn marked_wins_over_answered_only_when_both_marked_and_unanswered() {
        // marked + answered must never collapse to plain Marked
        assert_ne!(palette_state(true, true, true), PaletteState::Marked);
    }
}
