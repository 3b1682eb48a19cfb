//! Run totals and the check-mode exit policy.

use crate::outcome::Outcome;
use std::iter::Sum;
use std::ops::Add;

/// Files seen per outcome. Merging is pointwise addition, so per-file
/// totals can be combined in any order or grouping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub okay: usize,
    pub incorrect: usize,
    pub error: usize,
}

impl Counts {
    /// Totals for a single file.
    pub fn of(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Unchanged => Counts {
                okay: 1,
                ..Counts::default()
            },
            Outcome::Changed { .. } => Counts {
                incorrect: 1,
                ..Counts::default()
            },
            Outcome::Failed(_) => Counts {
                error: 1,
                ..Counts::default()
            },
        }
    }

    pub fn merge(self, other: Counts) -> Counts {
        Counts {
            okay: self.okay + other.okay,
            incorrect: self.incorrect + other.incorrect,
            error: self.error + other.error,
        }
    }

    pub fn total(&self) -> usize {
        self.okay + self.incorrect + self.error
    }

    /// 2 if any file failed, else 1 if any was incorrect, else 0.
    pub fn exit_code(&self) -> u8 {
        if self.error > 0 {
            2
        } else if self.incorrect > 0 {
            1
        } else {
            0
        }
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(self, rhs: Counts) -> Counts {
        self.merge(rhs)
    }
}

impl Sum for Counts {
    fn sum<I: Iterator<Item = Counts>>(iter: I) -> Counts {
        iter.fold(Counts::default(), Counts::merge)
    }
}
