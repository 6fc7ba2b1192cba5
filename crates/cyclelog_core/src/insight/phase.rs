//! Cycle phase classifier.
//!
//! Fixed-threshold model: the phase depends only on days elapsed since the
//! most recent entry, not on the user's own average cycle length.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Day of the cycle classified as ovulation.
pub const OVULATION_DAY: u32 = 14;

/// Estimated phase of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Follicular,
    Ovulation,
    Luteal,
}

impl CyclePhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Follicular => "Follicular",
            Self::Ovulation => "Ovulation",
            Self::Luteal => "Luteal",
        }
    }
}

impl Display for CyclePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies the phase from days elapsed since the last entry.
pub fn classify_phase(elapsed_days: u32) -> CyclePhase {
    match elapsed_days.cmp(&OVULATION_DAY) {
        std::cmp::Ordering::Less => CyclePhase::Follicular,
        std::cmp::Ordering::Equal => CyclePhase::Ovulation,
        std::cmp::Ordering::Greater => CyclePhase::Luteal,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_phase, CyclePhase};

    #[test]
    fn threshold_is_day_fourteen() {
        assert_eq!(classify_phase(0), CyclePhase::Follicular);
        assert_eq!(classify_phase(13), CyclePhase::Follicular);
        assert_eq!(classify_phase(14), CyclePhase::Ovulation);
        assert_eq!(classify_phase(15), CyclePhase::Luteal);
        assert_eq!(classify_phase(90), CyclePhase::Luteal);
    }

    #[test]
    fn label_matches_display() {
        assert_eq!(CyclePhase::Ovulation.to_string(), "Ovulation");
    }
}
