/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// 1-based number of the question on screen, or `total` once exhausted.
    pub presented: usize,
    pub answered: usize,
    pub score: usize,
    pub seconds_remaining: Option<u32>,
    pub is_complete: bool,
}
