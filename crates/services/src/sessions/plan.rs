use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{Rng, rng};

use quiz_core::model::QuestionRecord;

/// How a session draws its questions from the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Whole bank, feed order.
    #[default]
    InOrder,
    /// Whole bank, uniformly shuffled.
    Shuffled,
    /// Uniform random sample of at most this many questions, in random order.
    Sample(usize),
}

/// Per-session settings resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub selection: Selection,
    pub time_limit_secs: Option<u32>,
    /// When set, the presentation layer advances on its own this long after a judgement.
    pub auto_advance: Option<Duration>,
}

/// Builds the question set for a session.
pub struct SessionBuilder<'a> {
    questions: &'a [QuestionRecord],
    selection: Selection,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(questions: &'a [QuestionRecord]) -> Self {
        Self {
            questions,
            selection: Selection::default(),
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<QuestionRecord> {
        self.build_with_rng(&mut rng())
    }

    /// Same as [`Self::build`] with a caller-provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<QuestionRecord> {
        let mut selected = self.questions.to_vec();
        match self.selection {
            Selection::InOrder => {}
            Selection::Shuffled => selected.shuffle(rng),
            Selection::Sample(size) => {
                selected.shuffle(rng);
                selected.truncate(size);
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bank(n: usize) -> Vec<QuestionRecord> {
        (0..n)
            .map(|i| QuestionRecord::new(format!("Q{i}"), format!("A{i}")).unwrap())
            .collect()
    }

    fn prompts(questions: &[QuestionRecord]) -> Vec<&str> {
        questions.iter().map(QuestionRecord::prompt).collect()
    }

    #[test]
    fn in_order_keeps_feed_order() {
        let bank = bank(4);
        let selected = SessionBuilder::new(&bank).build();
        assert_eq!(prompts(&selected), ["Q0", "Q1", "Q2", "Q3"]);
    }

    #[test]
    fn sample_is_capped_and_distinct() {
        let bank = bank(10);
        let mut rng = StdRng::seed_from_u64(7);
        let selected = SessionBuilder::new(&bank)
            .with_selection(Selection::Sample(4))
            .build_with_rng(&mut rng);

        assert_eq!(selected.len(), 4);
        let mut seen = prompts(&selected);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn sample_larger_than_bank_takes_everything() {
        let bank = bank(3);
        let selected = SessionBuilder::new(&bank)
            .with_selection(Selection::Sample(10))
            .build();
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let bank = bank(20);
        let mut rng = StdRng::seed_from_u64(42);
        let selected = SessionBuilder::new(&bank)
            .with_selection(Selection::Shuffled)
            .build_with_rng(&mut rng);

        let mut sorted = prompts(&selected);
        sorted.sort_unstable();
        let mut expected = prompts(&bank);
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }
}
