//! Scalar readings that feed the signal rules.
//!
//! Every percentage is a [`Percent`] in whole-percent units. A
//! [`ReadingSet`] has one field per reading, so it cannot exist with a
//! slot left empty.

use std::fmt;
use std::ops::Sub;

/// A value in whole-percent units (6.5 means 6.5%).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f64);

impl Percent {
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn from_fraction(fraction: f64) -> Self {
        Self(fraction * 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Sub for Percent {
    type Output = Percent;

    fn sub(self, rhs: Percent) -> Percent {
        Percent(self.0 - rhs.0)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}%", p, self.0),
            None => write!(f, "{}%", self.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingName {
    CoreCpiYoy,
    RealGdpQoqSaar,
    UnemploymentRate,
    FedFunds,
    TenYearYield,
    EquityYtd,
    CommodityChange,
}

impl ReadingName {
    pub const ALL: [ReadingName; 7] = [
        ReadingName::CoreCpiYoy,
        ReadingName::RealGdpQoqSaar,
        ReadingName::UnemploymentRate,
        ReadingName::FedFunds,
        ReadingName::TenYearYield,
        ReadingName::EquityYtd,
        ReadingName::CommodityChange,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReadingName::CoreCpiYoy => "Core CPI YoY",
            ReadingName::RealGdpQoqSaar => "Real GDP QoQ SAAR",
            ReadingName::UnemploymentRate => "Unemployment Rate",
            ReadingName::FedFunds => "Fed Funds",
            ReadingName::TenYearYield => "10yr Yield",
            ReadingName::EquityYtd => "S&P 500 YTD",
            ReadingName::CommodityChange => "CRB Index 12m %",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub name: ReadingName,
    pub value: Percent,
    pub provenance: Provenance,
}

impl Reading {
    pub fn live(name: ReadingName, value: Percent) -> Self {
        Self {
            name,
            value,
            provenance: Provenance::Live,
        }
    }

    pub fn fallback(name: ReadingName, value: Percent) -> Self {
        Self {
            name,
            value,
            provenance: Provenance::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Raw values produced by the macro provider group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroValues {
    pub core_cpi_yoy: Percent,
    pub real_gdp_qoq_saar: Percent,
    pub unemployment_rate: Percent,
    pub fed_funds: Percent,
}

/// Raw values produced by the market provider group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketValues {
    pub ten_year_yield: Percent,
    pub equity_ytd: Percent,
    pub commodity_change: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSet {
    pub core_cpi_yoy: Reading,
    pub real_gdp_qoq_saar: Reading,
    pub unemployment_rate: Reading,
    pub fed_funds: Reading,
    pub ten_year_yield: Reading,
    pub equity_ytd: Reading,
    pub commodity_change: Reading,
}

impl ReadingSet {
    pub fn from_groups(
        macro_values: MacroValues,
        macro_provenance: Provenance,
        market_values: MarketValues,
        market_provenance: Provenance,
    ) -> Self {
        let m = |name, value| Reading {
            name,
            value,
            provenance: macro_provenance,
        };
        let k = |name, value| Reading {
            name,
            value,
            provenance: market_provenance,
        };
        Self {
            core_cpi_yoy: m(ReadingName::CoreCpiYoy, macro_values.core_cpi_yoy),
            real_gdp_qoq_saar: m(ReadingName::RealGdpQoqSaar, macro_values.real_gdp_qoq_saar),
            unemployment_rate: m(ReadingName::UnemploymentRate, macro_values.unemployment_rate),
            fed_funds: m(ReadingName::FedFunds, macro_values.fed_funds),
            ten_year_yield: k(ReadingName::TenYearYield, market_values.ten_year_yield),
            equity_ytd: k(ReadingName::EquityYtd, market_values.equity_ytd),
            commodity_change: k(ReadingName::CommodityChange, market_values.commodity_change),
        }
    }

    pub fn get(&self, name: ReadingName) -> Reading {
        match name {
            ReadingName::CoreCpiYoy => self.core_cpi_yoy,
            ReadingName::RealGdpQoqSaar => self.real_gdp_qoq_saar,
            ReadingName::UnemploymentRate => self.unemployment_rate,
            ReadingName::FedFunds => self.fed_funds,
            ReadingName::TenYearYield => self.ten_year_yield,
            ReadingName::EquityYtd => self.equity_ytd,
            ReadingName::CommodityChange => self.commodity_change,
        }
    }

    /// All seven readings in display order.
    pub fn iter(&self) -> impl Iterator<Item = Reading> + '_ {
        ReadingName::ALL.into_iter().map(move |n| self.get(n))
    }

    pub fn any_fallback(&self) -> bool {
        self.iter().any(|r| r.is_fallback())
    }
}
