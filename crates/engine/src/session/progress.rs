/// Aggregated view of attempt progress, useful for UI.
///
/// `unanswered` counts visited-but-unanswered questions; questions never
/// visited are in `not_visited`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub marked: usize,
    pub not_visited: usize,
    pub is_submitted: bool,
}
