//! Performance measures: time-weighted return, CAGR, and the Sharpe ratio.
//!
//! TWR works over the daily snapshot series in `Decimal`. CAGR and Sharpe
//! follow the dashboard formulas, which are defined over f64 series; this
//! module is the one place in the workspace where float arithmetic is
//! allowed.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// One point of the daily performance series.
#[derive(Debug, Clone)]
pub struct SnapshotPoint {
    /// Snapshot date.
    pub date: NaiveDate,
    /// Net equity at end of day.
    pub net_equity_value: Decimal,
    /// External cash flow during the day (deposits − withdrawals).
    pub net_cash_flow: Decimal,
}

/// A linked return for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MonthlyReturn {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Linked TWR for the month, as a fraction.
    pub value: Decimal,
}

/// Sub-period return with the external flow applied at the start of the
/// period: `r = equity / (prev_equity + flow) - 1`.
///
/// Returns zero when the adjusted opening value is not positive, so a
/// freshly funded or emptied portfolio does not produce a spurious return.
#[must_use]
pub fn subperiod_return(prev_equity: Decimal, equity: Decimal, flow: Decimal) -> Decimal {
    let opening = prev_equity + flow;
    if opening <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    equity / opening - Decimal::ONE
}

/// Time-weighted return over a snapshot series: the geometric link of all
/// sub-period returns, as a fraction.
#[must_use]
pub fn twr(points: &[SnapshotPoint]) -> Decimal {
    let mut linked = Decimal::ONE;
    for pair in points.windows(2) {
        let r = subperiod_return(
            pair[0].net_equity_value,
            pair[1].net_equity_value,
            pair[1].net_cash_flow,
        );
        linked *= Decimal::ONE + r;
    }
    linked - Decimal::ONE
}

/// Links daily sub-period returns within each calendar month.
#[must_use]
pub fn monthly_returns(points: &[SnapshotPoint]) -> Vec<MonthlyReturn> {
    let mut months: Vec<MonthlyReturn> = Vec::new();
    let mut linked = Decimal::ONE;
    let mut current: Option<(i32, u32)> = None;

    for pair in points.windows(2) {
        let key = (pair[1].date.year(), pair[1].date.month());
        if current.is_some_and(|c| c != key) {
            if let Some((year, month)) = current {
                months.push(MonthlyReturn {
                    year,
                    month,
                    value: linked - Decimal::ONE,
                });
            }
            linked = Decimal::ONE;
        }
        current = Some(key);

        let r = subperiod_return(
            pair[0].net_equity_value,
            pair[1].net_equity_value,
            pair[1].net_cash_flow,
        );
        linked *= Decimal::ONE + r;
    }

    if let Some((year, month)) = current {
        months.push(MonthlyReturn {
            year,
            month,
            value: linked - Decimal::ONE,
        });
    }
    months
}

/// Compound annual growth rate as a fraction:
/// `(end / begin)^(1 / years) - 1`.
///
/// Returns zero for non-positive inputs.
#[must_use]
pub fn cagr(begin: f64, end: f64, years: f64) -> f64 {
    if begin <= 0.0 || end <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    (end / begin).powf(1.0 / years) - 1.0
}

/// Fraction of years between two dates, using 365.25-day years.
///
/// Returns zero when `end` is not after `start`.
#[must_use]
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days();
    if days <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let days = days as f64;
    days / 365.25
}

/// CAGR derived from a cumulative TWR over a year span.
#[must_use]
pub fn cagr_from_twr(twr: Decimal, years: f64) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    let growth = (Decimal::ONE + twr).to_f64().unwrap_or(0.0);
    cagr(1.0, growth, years)
}

/// Annualized Sharpe ratio over a monthly return series.
///
/// The annual risk-free rate is de-compounded to a monthly rate,
/// `(1 + rf)^(1/12) - 1`; the excess mean is divided by the population
/// standard deviation and scaled by sqrt(12). Returns zero for an empty
/// series or zero dispersion.
#[must_use]
pub fn sharpe_ratio(monthly: &[f64], annual_risk_free: f64) -> f64 {
    if monthly.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = monthly.len() as f64;
    let mean = monthly.iter().sum::<f64>() / n;
    let variance = monthly.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stdev = variance.sqrt();
    if stdev == 0.0 {
        return 0.0;
    }

    let monthly_rf = (1.0 + annual_risk_free).powf(1.0 / 12.0) - 1.0;
    (mean - monthly_rf) / stdev * 12.0_f64.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn point(day: u32, equity: Decimal, flow: Decimal) -> SnapshotPoint {
        SnapshotPoint {
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            net_equity_value: equity,
            net_cash_flow: flow,
        }
    }

    #[test]
    fn test_subperiod_return_growth() {
        assert_eq!(
            subperiod_return(dec!(1000), dec!(1100), Decimal::ZERO),
            dec!(0.1)
        );
    }

    #[test]
    fn test_subperiod_return_neutralizes_flow() {
        // Equity jumps only because of a deposit: return is zero.
        assert_eq!(
            subperiod_return(dec!(1000), dec!(1500), dec!(500)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_subperiod_return_zero_opening() {
        assert_eq!(
            subperiod_return(Decimal::ZERO, dec!(100), Decimal::ZERO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_twr_flow_free_series() {
        let points = vec![
            point(1, dec!(1000), Decimal::ZERO),
            point(2, dec!(1050), Decimal::ZERO),
            point(3, dec!(1200), Decimal::ZERO),
        ];
        // Without flows, TWR collapses to end/begin - 1.
        assert_eq!(twr(&points), dec!(0.2));
    }

    #[test]
    fn test_twr_ignores_deposit_timing() {
        let points = vec![
            point(1, dec!(1000), Decimal::ZERO),
            point(2, dec!(2100), dec!(1000)),
            point(3, dec!(2310), Decimal::ZERO),
        ];
        // 5% then 10%: linked 15.5%.
        assert_eq!(twr(&points), dec!(0.155));
    }

    #[test]
    fn test_twr_single_point_is_zero() {
        assert_eq!(twr(&[point(1, dec!(1000), Decimal::ZERO)]), Decimal::ZERO);
        assert_eq!(twr(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_returns_split_on_month_boundary() {
        let points = vec![
            SnapshotPoint {
                date: NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
                net_equity_value: dec!(1000),
                net_cash_flow: Decimal::ZERO,
            },
            SnapshotPoint {
                date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
                net_equity_value: dec!(1100),
                net_cash_flow: Decimal::ZERO,
            },
            SnapshotPoint {
                date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                net_equity_value: dec!(1210),
                net_cash_flow: Decimal::ZERO,
            },
        ];

        let months = monthly_returns(&points);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, 1);
        assert_eq!(months[0].value, dec!(0.1));
        assert_eq!(months[1].month, 2);
        assert_eq!(months[1].value, dec!(0.1));
    }

    #[test]
    fn test_cagr_round_trip() {
        // twr = 0.21 over 2 years compounds to roughly 10% a year.
        let value = cagr(1.0, 1.21, 2.0);
        assert!((value - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_cagr_guards() {
        assert_eq!(cagr(0.0, 1.2, 1.0), 0.0);
        assert_eq!(cagr(1.0, -0.5, 1.0), 0.0);
        assert_eq!(cagr(1.0, 1.2, 0.0), 0.0);
    }

    #[test]
    fn test_years_between() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let years = years_between(start, end);
        assert!((years - 2.0).abs() < 0.01);
        assert_eq!(years_between(end, start), 0.0);
        assert_eq!(years_between(start, start), 0.0);
    }

    #[test]
    fn test_cagr_from_twr_matches_direct() {
        let direct = cagr(1.0, 1.21, 2.0);
        let derived = cagr_from_twr(dec!(0.21), 2.0);
        assert!((derived - direct).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_known_series() {
        let series = [0.01, 0.02, -0.01, 0.03];
        let rf = 0.055;

        let mean = series.iter().sum::<f64>() / 4.0;
        let variance = series.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 4.0;
        let monthly_rf = 1.055_f64.powf(1.0 / 12.0) - 1.0;
        let expected = (mean - monthly_rf) / variance.sqrt() * 12.0_f64.sqrt();

        let value = sharpe_ratio(&series, rf);
        assert!((value - expected).abs() < 1e-12);
        assert!(value > 1.8 && value < 1.9);
    }

    #[test]
    fn test_sharpe_empty_and_flat() {
        assert_eq!(sharpe_ratio(&[], 0.055), 0.0);
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.055), 0.0);
    }

    proptest! {
        #[test]
        fn prop_flow_free_twr_is_end_over_begin(
            values in prop::collection::vec(1u32..1_000_000, 2..20),
        ) {
            let points: Vec<SnapshotPoint> = values
                .iter()
                .enumerate()
                .map(|(i, v)| SnapshotPoint {
                    date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
                        + chrono::Days::new(i as u64),
                    net_equity_value: Decimal::from(*v),
                    net_cash_flow: Decimal::ZERO,
                })
                .collect();

            let linked = twr(&points);
            let direct = points.last().unwrap().net_equity_value
                / points.first().unwrap().net_equity_value
                - Decimal::ONE;
            let diff = (linked - direct).abs();
            // Division chains accumulate scale; compare at 12 places.
            prop_assert!(diff < Decimal::new(1, 12));
        }
    }
}
