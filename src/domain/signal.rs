//! Stagflation signal rules and their evaluation.
//!
//! # Evaluation semantics
//!
//! - Every comparison is strict: a reading exactly at its threshold does
//!   not trip the rule.
//! - A rule whose predicate holds takes its configured tier; otherwise
//!   it is `Green`.
//! - `red_count` counts `Red` verdicts only.

use crate::domain::derive::real_rate_spread;
use crate::domain::reading::{Percent, ReadingSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Green => "GREEN",
            Tier::Yellow => "YELLOW",
            Tier::Red => "RED",
        };
        f.write_str(s)
    }
}

pub const CPI_HIGH: Percent = Percent::new(6.5);
pub const GDP_LOW: Percent = Percent::new(1.0);
pub const YIELD_HIGH: Percent = Percent::new(6.5);
pub const EQUITY_FLAT: Percent = Percent::new(5.0);
pub const COMMODITY_SURGE: Percent = Percent::new(50.0);
pub const UNEMPLOYMENT_HIGH: Percent = Percent::new(5.5);
pub const CPI_ELEVATED: Percent = Percent::new(5.0);
pub const REAL_RATE_FLOOR: Percent = Percent::new(2.0);

pub type Predicate = fn(&ReadingSet) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct SignalRule {
    pub id: u8,
    pub name: &'static str,
    pub predicate: Predicate,
    pub tier_on_true: Tier,
}

fn cpi_high_gdp_low(r: &ReadingSet) -> bool {
    r.core_cpi_yoy.value > CPI_HIGH && r.real_gdp_qoq_saar.value < GDP_LOW
}

fn yield_spike_equities_flat(r: &ReadingSet) -> bool {
    r.ten_year_yield.value > YIELD_HIGH && r.equity_ytd.value < EQUITY_FLAT
}

fn commodity_surge(r: &ReadingSet) -> bool {
    r.commodity_change.value > COMMODITY_SURGE
}

fn unemployment_with_inflation(r: &ReadingSet) -> bool {
    r.unemployment_rate.value > UNEMPLOYMENT_HIGH && r.core_cpi_yoy.value > CPI_ELEVATED
}

fn compressed_real_rate(r: &ReadingSet) -> bool {
    real_rate_spread(r.fed_funds.value, r.core_cpi_yoy.value) < REAL_RATE_FLOOR
}

/// The five fixed rules. Built once and never mutated.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: [SignalRule; 5],
}

impl RuleSet {
    /// Standard rules; `real_rate_tier` decides whether the compressed
    /// real rate signal counts as red or only confirms as yellow.
    pub fn standard(real_rate_tier: Tier) -> Self {
        Self {
            rules: [
                SignalRule {
                    id: 1,
                    name: "Core CPI >6.5% + GDP <1%",
                    predicate: cpi_high_gdp_low,
                    tier_on_true: Tier::Red,
                },
                SignalRule {
                    id: 2,
                    name: "10yr Yield >6.5% + S&P YTD <5%",
                    predicate: yield_spike_equities_flat,
                    tier_on_true: Tier::Red,
                },
                SignalRule {
                    id: 3,
                    name: "CRB +50% in 12-18m",
                    predicate: commodity_surge,
                    tier_on_true: Tier::Red,
                },
                SignalRule {
                    id: 4,
                    name: "Unemployment >5.5% + CPI >5%",
                    predicate: unemployment_with_inflation,
                    tier_on_true: Tier::Red,
                },
                SignalRule {
                    id: 5,
                    name: "Real rates <2%",
                    predicate: compressed_real_rate,
                    tier_on_true: real_rate_tier,
                },
            ],
        }
    }

    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard(Tier::Red)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub rule_id: u8,
    pub name: &'static str,
    pub triggered: bool,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerdictSet {
    pub verdicts: Vec<Verdict>,
    pub red_count: usize,
}

impl VerdictSet {
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn get(&self, rule_id: u8) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.rule_id == rule_id)
    }
}

pub fn evaluate(rules: &RuleSet, readings: &ReadingSet) -> VerdictSet {
    let verdicts: Vec<Verdict> = rules
        .rules()
        .iter()
        .map(|rule| {
            let triggered = (rule.predicate)(readings);
            Verdict {
                rule_id: rule.id,
                name: rule.name,
                triggered,
                tier: if triggered { rule.tier_on_true } else { Tier::Green },
            }
        })
        .collect();
    let red_count = verdicts.iter().filter(|v| v.tier == Tier::Red).count();
    VerdictSet {
        verdicts,
        red_count,
    }
}
