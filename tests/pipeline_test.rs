//! Refresh pipeline tests against mock providers.
//!
//! Tests cover:
//! - All-live refresh and derived readings
//! - Group-level fallback (macro and market fail independently)
//! - Signal triggering through derived metrics
//! - Request windows handed to the ports
//! - Cache reuse across refreshes

mod common;

use approx::assert_relative_eq;
use common::*;
use stagwatch::domain::cache::SnapshotCache;
use stagwatch::domain::error::FetchError;
use stagwatch::domain::fallback::{BenchmarkSet, Group};
use stagwatch::domain::pipeline::{Dashboard, PipelineConfig};
use stagwatch::domain::playbook::Advice;
use stagwatch::domain::reading::{Provenance, ReadingName};
use stagwatch::domain::series::{Lookback, SeriesUnit};
use stagwatch::domain::signal::Tier;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod live {
    use super::*;

    #[test]
    fn all_live_readings_are_derived() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        assert!(!snap.readings.any_fallback());
        assert!(snap.notices.is_empty());
        assert_relative_eq!(snap.readings.core_cpi_yoy.value.value(), 3.1);
        assert_relative_eq!(snap.readings.real_gdp_qoq_saar.value.value(), 3.0);
        assert_relative_eq!(snap.readings.unemployment_rate.value.value(), 4.2);
        assert_relative_eq!(snap.readings.fed_funds.value.value(), 5.33);
        assert_relative_eq!(snap.readings.ten_year_yield.value.value(), 4.23);
        assert_relative_eq!(snap.readings.equity_ytd.value.value(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(snap.readings.commodity_change.value.value(), 2.0, epsilon = 1e-9);

        assert_eq!(snap.verdicts.red_count, 0);
        assert_eq!(snap.advice, Advice::Hold);
        assert_eq!(snap.headline(), "0 of 5 signals flashing red");
    }

    #[test]
    fn trends_and_supplementary_come_from_live_series() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        assert_eq!(snap.trends.ten_year_yield.len(), 24);
        assert_eq!(snap.trends.ten_year_yield.last(), Some(&(date(2025, 8, 1), 4.23)));

        // 4.23 against 4.15 eighteen months earlier.
        let change = snap.supplementary.yield_change_18m.unwrap();
        assert_relative_eq!(change.value(), (4.23 / 4.15 - 1.0) * 100.0, epsilon = 1e-9);
        // Three months of CPI cannot cover the twelve-month window.
        assert_eq!(snap.supplementary.cpi_sustained_above_high, None);
    }

    #[test]
    fn sustained_cpi_reported_when_year_of_data() {
        let macro_port = MockMacroPort::calm().with_series(monthly(
            "CPILFESL",
            SeriesUnit::Percent,
            date(2025, 7, 1),
            &[7.0; 13],
        ));
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());
        assert_eq!(snap.supplementary.cpi_sustained_above_high, Some(true));
    }

    #[test]
    fn requests_use_expected_windows() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();

        Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        let macro_requests = macro_port.requests.borrow();
        assert_eq!(macro_requests.len(), 4);
        assert!(macro_requests
            .iter()
            .all(|(_, start)| *start == Some(date(2023, 8, 29))));

        let market_requests = market_port.requests.borrow();
        assert_eq!(
            *market_requests,
            vec![
                ("^TNX".to_string(), Lookback::Months(24)),
                ("^GSPC".to_string(), Lookback::YearToDate),
                ("^CRB".to_string(), Lookback::Months(19)),
            ]
        );
    }
}

mod fallback {
    use super::*;

    #[test]
    fn macro_failure_substitutes_all_four_benchmarks() {
        let macro_port = MockMacroPort::calm().with_error(
            "UNRATE",
            FetchError::Timeout {
                series: "UNRATE".into(),
            },
        );
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();
        let benchmarks = BenchmarkSet::builtin();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        for name in [
            ReadingName::CoreCpiYoy,
            ReadingName::RealGdpQoqSaar,
            ReadingName::UnemploymentRate,
            ReadingName::FedFunds,
        ] {
            assert_eq!(snap.readings.get(name).provenance, Provenance::Fallback);
        }
        assert_eq!(snap.readings.core_cpi_yoy.value, benchmarks.macro_values.core_cpi_yoy);
        assert_eq!(snap.readings.fed_funds.value, benchmarks.macro_values.fed_funds);

        for name in [
            ReadingName::TenYearYield,
            ReadingName::EquityYtd,
            ReadingName::CommodityChange,
        ] {
            assert_eq!(snap.readings.get(name).provenance, Provenance::Live);
        }
        assert_relative_eq!(snap.readings.ten_year_yield.value.value(), 4.23);

        assert_eq!(snap.notices.len(), 1);
        let notice = &snap.notices[0];
        assert_eq!(notice.group, Group::Macro);
        assert_eq!(notice.benchmark_id, "benchmarks-2025-06-30");
        assert_eq!(notice.benchmark_age_days, 60);
        assert!(notice.reason.contains("UNRATE"));
        assert!(!snap.trends.ten_year_yield.is_empty());
    }

    #[test]
    fn market_failure_leaves_macro_live() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::calm().with_error(
            "^GSPC",
            FetchError::Status {
                series: "^GSPC".into(),
                status: 429,
            },
        );
        let config = PipelineConfig::default();
        let benchmarks = BenchmarkSet::builtin();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        assert_eq!(snap.readings.core_cpi_yoy.provenance, Provenance::Live);
        assert_eq!(snap.readings.fed_funds.provenance, Provenance::Live);
        assert_eq!(snap.readings.ten_year_yield.provenance, Provenance::Fallback);
        assert_eq!(
            snap.readings.ten_year_yield.value,
            benchmarks.market_values.ten_year_yield
        );
        assert_eq!(snap.readings.equity_ytd.value, benchmarks.market_values.equity_ytd);
        assert_eq!(snap.notices.len(), 1);
        assert_eq!(snap.notices[0].group, Group::Market);
        assert!(snap.trends.ten_year_yield.is_empty());
        assert_eq!(snap.supplementary.yield_change_18m, None);
    }

    #[test]
    fn derivation_failure_falls_back_like_fetch_failure() {
        // One equity close in the year cannot support a YTD return.
        let market_port = MockMarketPort::calm().with_series(closes(
            "^GSPC",
            SeriesUnit::Level,
            &[(date(2025, 8, 29), 5500.0)],
        ));
        let macro_port = MockMacroPort::calm();
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        assert_eq!(snap.readings.equity_ytd.provenance, Provenance::Fallback);
        assert_eq!(snap.readings.commodity_change.provenance, Provenance::Fallback);
        assert_eq!(snap.notices[0].group, Group::Market);
    }

    #[test]
    fn both_groups_failing_still_produces_verdicts() {
        let macro_port = MockMacroPort::new();
        let market_port = MockMarketPort::new();
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        assert!(snap.readings.iter().all(|r| r.is_fallback()));
        assert_eq!(snap.notices.len(), 2);
        assert_eq!(snap.verdicts.total(), 5);
        // Builtin benchmarks: 4.33 - 2.9 = 1.43 sits under the 2% floor.
        assert_eq!(snap.verdicts.red_count, 1);
        assert_eq!(snap.verdicts.get(5).map(|v| v.tier), Some(Tier::Red));
    }
}

mod signals {
    use super::*;

    #[test]
    fn commodity_surge_trips_rule_three() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::with_crb(310.0);
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        assert_relative_eq!(snap.readings.commodity_change.value.value(), 55.0, epsilon = 1e-9);
        let rule = snap.verdicts.get(3).unwrap();
        assert!(rule.triggered);
        assert_eq!(rule.tier, Tier::Red);
        assert_eq!(snap.verdicts.red_count, 1);
    }

    #[test]
    fn exactly_fifty_percent_does_not_trip() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::with_crb(300.0);
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());
        assert!(!snap.verdicts.get(3).unwrap().triggered);
    }

    #[test]
    fn three_reds_recommend_rotation() {
        let last = date(2025, 7, 1);
        let macro_port = MockMacroPort::new()
            .with_series(monthly("CPILFESL", SeriesUnit::Percent, last, &[7.0]))
            .with_series(monthly("GDPC1", SeriesUnit::Percent, last, &[0.5]))
            .with_series(monthly("UNRATE", SeriesUnit::Percent, last, &[6.0]))
            .with_series(monthly("FEDFUNDS", SeriesUnit::Percent, last, &[4.0]));
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();

        let snap = Dashboard::new(&macro_port, &market_port, &config).refresh(as_of());

        assert_eq!(snap.verdicts.red_count, 3);
        assert_eq!(snap.advice, Advice::Rotate);
        assert_eq!(snap.headline(), "3 of 5 signals flashing red");
    }
}

mod caching {
    use super::*;

    #[test]
    fn cached_snapshot_skips_second_fetch() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();
        let dashboard = Dashboard::new(&macro_port, &market_port, &config);
        let cache = SnapshotCache::new(Duration::from_secs(3600));
        let start = Instant::now();

        let first = cache.get_or_refresh_at(start, || dashboard.refresh(as_of()));
        let second = cache.get_or_refresh_at(start + Duration::from_secs(10), || {
            dashboard.refresh(as_of())
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(macro_port.calls.get(), 4);
        assert_eq!(market_port.calls.get(), 3);
    }

    #[test]
    fn expired_cache_refetches_identical_snapshot() {
        let macro_port = MockMacroPort::calm();
        let market_port = MockMarketPort::calm();
        let config = PipelineConfig::default();
        let dashboard = Dashboard::new(&macro_port, &market_port, &config);
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let start = Instant::now();

        let first = cache.get_or_refresh_at(start, || dashboard.refresh(as_of()));
        let second = cache.get_or_refresh_at(start + Duration::from_secs(61), || {
            dashboard.refresh(as_of())
        });

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(macro_port.calls.get(), 8);
    }
}
