//! Rotation playbook trigger.
//!
//! Reads a finished [`VerdictSet`]; has no say in how rules evaluate.

use crate::domain::signal::VerdictSet;

/// Red signals needed before the rotation playbook applies.
pub const DEFAULT_ACTION_THRESHOLD: usize = 3;

pub const PLAYBOOK: &str = "rotate per the 1970s playbook \
    (covered-call reduction, TIPS, commodities, gold)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    Hold,
    Rotate,
}

pub fn advise(verdicts: &VerdictSet, threshold: usize) -> Advice {
    if verdicts.red_count >= threshold {
        Advice::Rotate
    } else {
        Advice::Hold
    }
}

pub fn headline(verdicts: &VerdictSet) -> String {
    format!(
        "{} of {} signals flashing red",
        verdicts.red_count,
        verdicts.total()
    )
}
