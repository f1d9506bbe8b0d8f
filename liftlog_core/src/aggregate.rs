//! Period maxima, composite totals and strength score series.
//!
//! Observations are bucketed by [`Period`], reduced to the per-bucket
//! maximum and forward-filled between the first and last observed bucket.

use crate::metrics::strength_score;
use crate::{BodyweightTable, ExerciseTable, Period, Result, Sex, Units, BODYWEIGHT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Series name of a composite total
pub const TOTAL: &str = "Total";

/// Series name of a strength score series
pub const STRENGTH_SCORE: &str = "Strength Score";

/// Anything that can supply dated values for a named series
pub trait SeriesSource {
    /// Dated values for `name`. Unknown names yield no observations.
    fn observations(&self, name: &str) -> Vec<(NaiveDate, f64)>;
}

impl SeriesSource for ExerciseTable {
    fn observations(&self, name: &str) -> Vec<(NaiveDate, f64)> {
        self.iter()
            .filter(|row| row.exercise == name)
            .map(|row| (row.date, row.one_rep_max))
            .collect()
    }
}

impl SeriesSource for BodyweightTable {
    fn observations(&self, name: &str) -> Vec<(NaiveDate, f64)> {
        if name != BODYWEIGHT {
            return Vec::new();
        }
        self.rows().iter().map(|row| (row.date, row.value)).collect()
    }
}

/// Named series of one value per period, keyed by period end date
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PeriodMaxima {
    pub name: String,
    pub values: BTreeMap<NaiveDate, f64>,
}

impl PeriodMaxima {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, period_end: NaiveDate) -> Option<f64> {
        self.values.get(&period_end).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(date, value)| (*date, *value))
    }

    /// Most recent period and its value
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.values
            .iter()
            .next_back()
            .map(|(date, value)| (*date, *value))
    }
}

/// Maximum value per period for one exercise (or bodyweight).
///
/// Periods without observations that lie between the first and last
/// observed period carry the previous period's value forward. A name with
/// no observations gives an empty series.
pub fn period_maxima<S: SeriesSource + ?Sized>(
    source: &S,
    exercise: &str,
    period: Period,
) -> PeriodMaxima {
    let mut observed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in source.observations(exercise) {
        observed
            .entry(period.bucket_end(date))
            .and_modify(|best| *best = best.max(value))
            .or_insert(value);
    }

    let mut series = PeriodMaxima::new(exercise);
    let (Some(&first), Some(&last)) = (observed.keys().next(), observed.keys().next_back())
    else {
        tracing::debug!("No observations for {:?}", exercise);
        return series;
    };

    let mut current = first;
    let mut carried = observed[&first];
    loop {
        if let Some(&value) = observed.get(&current) {
            carried = value;
        }
        series.values.insert(current, carried);

        if current >= last {
            break;
        }
        let next = period.next_end(current);
        if next <= current {
            break;
        }
        current = next;
    }

    tracing::debug!(
        "{:?}: {} observed periods, {} after forward fill",
        exercise,
        observed.len(),
        series.len()
    );
    series
}

/// How periods missing from some inputs of a composite total are handled
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TotalMode {
    /// Only periods present in every input are summed; the rest are dropped
    #[default]
    Intersection,
    /// Every period in any input is kept; missing inputs count as zero
    UnionZeroFill,
}

/// Sum three series period by period, dropping periods not present in all
/// three.
pub fn composite_total(a: &PeriodMaxima, b: &PeriodMaxima, c: &PeriodMaxima) -> PeriodMaxima {
    composite_total_with(a, b, c, TotalMode::Intersection)
}

/// Sum three series period by period using `mode` for misaligned periods
pub fn composite_total_with(
    a: &PeriodMaxima,
    b: &PeriodMaxima,
    c: &PeriodMaxima,
    mode: TotalMode,
) -> PeriodMaxima {
    let mut total = PeriodMaxima::new(TOTAL);
    let inputs = [a, b, c];

    let mut periods: Vec<NaiveDate> = inputs
        .iter()
        .flat_map(|series| series.values.keys().copied())
        .collect();
    periods.sort_unstable();
    periods.dedup();

    let mut dropped = 0usize;
    for period in periods {
        let values: Vec<Option<f64>> = inputs.iter().map(|series| series.get(period)).collect();
        match mode {
            TotalMode::Intersection => {
                if values.iter().all(Option::is_some) {
                    total.values.insert(period, values.iter().flatten().sum());
                } else {
                    dropped += 1;
                }
            }
            TotalMode::UnionZeroFill => {
                total
                    .values
                    .insert(period, values.iter().map(|v| v.unwrap_or(0.0)).sum());
            }
        }
    }

    if dropped > 0 {
        tracing::warn!(
            "Dropped {} periods missing from at least one of {:?}, {:?}, {:?}",
            dropped,
            a.name,
            b.name,
            c.name
        );
    }

    total
}

/// Bodyweight used for a strength score series
#[derive(Clone, Debug)]
pub enum BodyweightSource<'a> {
    /// Same bodyweight for every period
    Fixed(f64),
    /// Bodyweight per period; periods without a value are skipped
    Series(&'a PeriodMaxima),
}

impl BodyweightSource<'_> {
    fn at(&self, period_end: NaiveDate) -> Option<f64> {
        match self {
            BodyweightSource::Fixed(bw) => Some(*bw),
            BodyweightSource::Series(series) => series.get(period_end),
        }
    }
}

/// Strength score for every period of a total.
///
/// # Errors
/// The first degenerate score aborts the whole series.
pub fn strength_score_series(
    total: &PeriodMaxima,
    bodyweight: &BodyweightSource<'_>,
    sex: Sex,
    units: Units,
) -> Result<PeriodMaxima> {
    let mut scores = PeriodMaxima::new(STRENGTH_SCORE);
    for (period, value) in total.iter() {
        let Some(bw) = bodyweight.at(period) else {
            tracing::debug!("No bodyweight for period ending {}", period);
            continue;
        };
        scores
            .values
            .insert(period, strength_score(value, bw, sex, units)?);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BodyMeasurement, LoggedSet};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn set(date: NaiveDate, exercise: &str, one_rep_max: f64) -> LoggedSet {
        LoggedSet {
            date,
            exercise: exercise.into(),
            category: crate::catalog::exercise_category(exercise).into(),
            weight: one_rep_max,
            reps: 1,
            one_rep_max,
        }
    }

    fn series(name: &str, points: &[(NaiveDate, f64)]) -> PeriodMaxima {
        PeriodMaxima {
            name: name.into(),
            values: points.iter().copied().collect(),
        }
    }

    #[test]
    fn test_single_row_monthly() {
        crate::logging::init_test();
        let table = ExerciseTable::from_rows(vec![LoggedSet {
            date: d(2015, 12, 26),
            exercise: "Barbell Squat".into(),
            category: "Legs".into(),
            weight: 225.0,
            reps: 2,
            one_rep_max: 231.75,
        }]);

        let maxima = period_maxima(&table, "Barbell Squat", Period::Month);

        assert_eq!(maxima.name, "Barbell Squat");
        assert_eq!(maxima.len(), 1);
        assert_eq!(maxima.get(d(2015, 12, 31)), Some(231.75));
    }

    #[test]
    fn test_max_within_bucket() {
        let table = ExerciseTable::from_rows(vec![
            set(d(2020, 1, 3), "Deadlift", 400.0),
            set(d(2020, 1, 20), "Deadlift", 420.0),
            set(d(2020, 1, 25), "Deadlift", 410.0),
            set(d(2020, 1, 25), "Barbell Squat", 999.0),
        ]);

        let maxima = period_maxima(&table, "Deadlift", Period::Month);
        assert_eq!(maxima.len(), 1);
        assert_eq!(maxima.get(d(2020, 1, 31)), Some(420.0));
    }

    #[test]
    fn test_forward_fill_uses_preceding_value() {
        let table = ExerciseTable::from_rows(vec![
            set(d(2020, 1, 10), "Deadlift", 400.0),
            set(d(2020, 4, 10), "Deadlift", 450.0),
        ]);

        let maxima = period_maxima(&table, "Deadlift", Period::Month);

        assert_eq!(maxima.len(), 4);
        assert_eq!(maxima.get(d(2020, 1, 31)), Some(400.0));
        assert_eq!(maxima.get(d(2020, 2, 29)), Some(400.0));
        assert_eq!(maxima.get(d(2020, 3, 31)), Some(400.0));
        assert_eq!(maxima.get(d(2020, 4, 30)), Some(450.0));
    }

    #[test]
    fn test_forward_fill_never_backfills_or_extends() {
        let table = ExerciseTable::from_rows(vec![
            set(d(2020, 3, 10), "Deadlift", 500.0),
            set(d(2020, 5, 10), "Deadlift", 300.0),
        ]);

        let maxima = period_maxima(&table, "Deadlift", Period::Month);

        assert_eq!(maxima.values.keys().next(), Some(&d(2020, 3, 31)));
        assert_eq!(maxima.values.keys().next_back(), Some(&d(2020, 5, 31)));
        // Filled from March, not May
        assert_eq!(maxima.get(d(2020, 4, 30)), Some(500.0));
    }

    #[test]
    fn test_weekly_default_buckets() {
        let table = ExerciseTable::from_rows(vec![
            // Saturday and Sunday of the same week
            set(d(2015, 12, 26), "Deadlift", 400.0),
            set(d(2015, 12, 27), "Deadlift", 405.0),
            // Three weeks later
            set(d(2016, 1, 14), "Deadlift", 410.0),
        ]);

        let maxima = period_maxima(&table, "Deadlift", Period::default());

        assert_eq!(maxima.get(d(2015, 12, 27)), Some(405.0));
        assert_eq!(maxima.get(d(2016, 1, 3)), Some(405.0));
        assert_eq!(maxima.get(d(2016, 1, 10)), Some(405.0));
        assert_eq!(maxima.get(d(2016, 1, 17)), Some(410.0));
        assert_eq!(maxima.len(), 4);
    }

    #[test]
    fn test_unknown_exercise_is_empty() {
        let table = ExerciseTable::from_rows(vec![set(d(2020, 1, 1), "Deadlift", 400.0)]);
        let maxima = period_maxima(&table, "Beans", Period::Month);
        assert!(maxima.is_empty());
        assert_eq!(maxima.name, "Beans");
    }

    #[test]
    fn test_bodyweight_maxima() {
        let bodyweight = BodyweightTable::from_rows(vec![
            BodyMeasurement {
                date: d(2015, 9, 1),
                measurement: BODYWEIGHT.into(),
                value: 155.0,
                unit: Units::Pounds,
            },
            BodyMeasurement {
                date: d(2015, 9, 20),
                measurement: BODYWEIGHT.into(),
                value: 157.5,
                unit: Units::Pounds,
            },
        ]);

        let maxima = period_maxima(&bodyweight, BODYWEIGHT, Period::Month);
        assert_eq!(maxima.get(d(2015, 9, 30)), Some(157.5));

        assert!(period_maxima(&bodyweight, "Deadlift", Period::Month).is_empty());
    }

    #[test]
    fn test_composite_total_identical_series() {
        let maxima = series("Barbell Squat", &[(d(2015, 12, 31), 231.75)]);
        let total = composite_total(&maxima, &maxima, &maxima);

        assert_eq!(total.name, TOTAL);
        assert_eq!(total.len(), 1);
        assert_eq!(total.get(d(2015, 12, 31)), Some(695.25));
    }

    #[test]
    fn test_composite_total_drops_misaligned_periods() {
        let squat = series("S", &[(d(2020, 1, 31), 300.0), (d(2020, 2, 29), 310.0)]);
        let bench = series("B", &[(d(2020, 1, 31), 200.0), (d(2020, 2, 29), 205.0)]);
        let dead = series("D", &[(d(2020, 2, 29), 400.0), (d(2020, 3, 31), 410.0)]);

        let total = composite_total(&squat, &bench, &dead);

        assert_eq!(total.len(), 1);
        assert_eq!(total.get(d(2020, 2, 29)), Some(915.0));
        assert_eq!(total.get(d(2020, 1, 31)), None);
        assert_eq!(total.get(d(2020, 3, 31)), None);
    }

    #[test]
    fn test_composite_total_union_zero_fill() {
        let squat = series("S", &[(d(2020, 1, 31), 300.0)]);
        let bench = series("B", &[(d(2020, 1, 31), 200.0)]);
        let dead = series("D", &[(d(2020, 2, 29), 400.0)]);

        let total = composite_total_with(&squat, &bench, &dead, TotalMode::UnionZeroFill);

        assert_eq!(total.get(d(2020, 1, 31)), Some(500.0));
        assert_eq!(total.get(d(2020, 2, 29)), Some(400.0));
    }

    #[test]
    fn test_composite_total_of_empty_is_empty() {
        let empty = PeriodMaxima::new("Beans");
        let full = series("S", &[(d(2020, 1, 31), 300.0)]);
        assert!(composite_total(&empty, &full, &full).is_empty());
    }

    #[test]
    fn test_strength_series_fixed_bodyweight() {
        let total = series(TOTAL, &[(d(2020, 1, 31), 1000.0), (d(2020, 2, 29), 1100.0)]);
        let scores =
            strength_score_series(&total, &BodyweightSource::Fixed(200.0), Sex::Male, Units::Pounds)
                .unwrap();

        assert_eq!(scores.name, STRENGTH_SCORE);
        assert_eq!(scores.len(), 2);
        let january = scores.get(d(2020, 1, 31)).unwrap();
        assert!((january - 288.4).abs() < 1.0);
        assert!(scores.get(d(2020, 2, 29)).unwrap() > january);
    }

    #[test]
    fn test_strength_series_skips_periods_without_bodyweight() {
        let total = series(TOTAL, &[(d(2020, 1, 31), 1000.0), (d(2020, 2, 29), 1100.0)]);
        let bodyweight = series(BODYWEIGHT, &[(d(2020, 2, 29), 200.0)]);

        let scores = strength_score_series(
            &total,
            &BodyweightSource::Series(&bodyweight),
            Sex::Male,
            Units::Pounds,
        )
        .unwrap();

        assert_eq!(scores.len(), 1);
        assert!(scores.get(d(2020, 2, 29)).is_some());
    }

    #[test]
    fn test_strength_series_propagates_degenerate_score() {
        let total = series(TOTAL, &[(d(2020, 1, 31), 1000.0)]);
        let result =
            strength_score_series(&total, &BodyweightSource::Fixed(0.0), Sex::Male, Units::Pounds);
        assert!(result.is_err());
    }
}
