//! Append and remove operations on exercise tables.
//!
//! Both operations borrow the input table and return a new one. The input
//! is never modified; callers that want the previous version keep their
//! own reference to it.

use crate::catalog::CategoryCatalog;
use crate::ingest::parse_date;
use crate::metrics::estimate_one_rep_max;
use crate::{Error, ExerciseTable, LoggedSet, NewExercise, RemovalScope, RemovalSelector, Result};

/// Append a set using the default category catalog.
///
/// See [`add_exercise_with`].
pub fn add_exercise(table: &ExerciseTable, fields: NewExercise) -> Result<ExerciseTable> {
    add_exercise_with(table, fields, crate::catalog::get_default_catalog())
}

/// Append a set, deriving missing fields.
///
/// - `category` defaults to the catalog lookup (possibly the not-found
///   sentinel)
/// - `one_rep_max` defaults to the estimate from weight and reps
/// - `date` is parsed into the table's date representation
///
/// Duplicate (date, exercise) rows are allowed.
///
/// # Errors
/// [`Error::InvalidDate`] for an unparseable date and
/// [`Error::InvalidRecord`] for an empty exercise name, a negative or
/// non-finite weight, or zero reps.
pub fn add_exercise_with(
    table: &ExerciseTable,
    fields: NewExercise,
    catalog: &CategoryCatalog,
) -> Result<ExerciseTable> {
    let row = build_logged_set(fields, catalog)?;
    tracing::debug!(
        "Appending {} {}x{} on {}",
        row.exercise,
        row.weight,
        row.reps,
        row.date
    );

    let mut rows = Vec::with_capacity(table.len() + 1);
    rows.extend_from_slice(table.rows());
    rows.push(row);
    Ok(ExerciseTable::from_rows(rows))
}

/// Validate `fields` and derive the defaulted columns
pub fn build_logged_set(fields: NewExercise, catalog: &CategoryCatalog) -> Result<LoggedSet> {
    if fields.exercise.trim().is_empty() {
        return Err(Error::InvalidRecord("exercise name is required".into()));
    }
    LoggedSet::check_weight_and_reps(fields.weight, fields.reps)?;

    let date = parse_date(&fields.date)?;
    let category = fields
        .category
        .unwrap_or_else(|| catalog.category(&fields.exercise).to_string());
    let one_rep_max = fields
        .one_rep_max
        .unwrap_or_else(|| estimate_one_rep_max(fields.weight, fields.reps));

    Ok(LoggedSet {
        date,
        exercise: fields.exercise,
        category,
        weight: fields.weight,
        reps: fields.reps,
        one_rep_max,
    })
}

/// Remove rows matching `selector` and return the remaining rows.
///
/// With [`RemovalScope::AllMatches`] every matching row goes; with
/// [`RemovalScope::FirstMatch`] only the earliest-appended one does.
/// Matching nothing is not an error and returns an equal table.
pub fn remove_exercise(table: &ExerciseTable, selector: &RemovalSelector) -> ExerciseTable {
    let mut removed = 0usize;
    let remaining: ExerciseTable = table
        .iter()
        .filter(|row| {
            let take = selector.matches(row)
                && (selector.scope == RemovalScope::AllMatches || removed == 0);
            if take {
                removed += 1;
            }
            !take
        })
        .cloned()
        .collect();

    tracing::debug!(
        "Removed {} rows of {} on {}",
        removed,
        selector.exercise,
        selector.date
    );
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATEGORY_NOT_FOUND;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn squat_table() -> ExerciseTable {
        ExerciseTable::from_rows(vec![LoggedSet {
            date: d(2015, 12, 26),
            exercise: "Barbell Squat".into(),
            category: "Legs".into(),
            weight: 225.0,
            reps: 2,
            one_rep_max: 231.75,
        }])
    }

    #[test]
    fn test_add_exercise_derives_defaults() {
        let table = squat_table();
        let added = add_exercise(
            &table,
            NewExercise::new("2019-09-01", "Flat Barbell Bench Press", 330.0, 1),
        )
        .unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(added.rows()[0], table.rows()[0]);

        let row = &added.rows()[1];
        assert_eq!(row.date, d(2019, 9, 1));
        assert_eq!(row.exercise, "Flat Barbell Bench Press");
        assert_eq!(row.category, "Chest");
        assert_eq!(row.weight, 330.0);
        assert_eq!(row.reps, 1);
        assert_eq!(row.one_rep_max, 330.0);
    }

    #[test]
    fn test_add_exercise_leaves_input_untouched() {
        let table = squat_table();
        let _ = add_exercise(&table, NewExercise::new("2019-09-01", "Deadlift", 550.0, 1)).unwrap();
        assert_eq!(table, squat_table());
    }

    #[test]
    fn test_add_exercise_keeps_supplied_fields() {
        let mut fields = NewExercise::new("09/01/2019", "Deadlift", 500.0, 3);
        fields.category = Some("Legs".into());
        fields.one_rep_max = Some(520.0);

        let added = add_exercise(&ExerciseTable::new(), fields).unwrap();
        let row = &added.rows()[0];
        assert_eq!(row.category, "Legs");
        assert_eq!(row.one_rep_max, 520.0);
        assert_eq!(row.date, d(2019, 9, 1));
    }

    #[test]
    fn test_add_unknown_exercise_gets_sentinel_category() {
        let added =
            add_exercise(&ExerciseTable::new(), NewExercise::new("2019-09-01", "Beans", 10.0, 5))
                .unwrap();
        assert_eq!(added.rows()[0].category, CATEGORY_NOT_FOUND);
    }

    #[test]
    fn test_add_with_extended_catalog() {
        let mut extra = std::collections::HashMap::new();
        extra.insert("Beans".to_string(), "Grip".to_string());
        let catalog = crate::catalog::build_default_catalog().extended(&extra);

        let added = add_exercise_with(
            &ExerciseTable::new(),
            NewExercise::new("2019-09-01", "Beans", 10.0, 5),
            &catalog,
        )
        .unwrap();
        assert_eq!(added.rows()[0].category, "Grip");
    }

    #[test]
    fn test_add_duplicates_allowed() {
        let table = squat_table();
        let twice = add_exercise(&table, NewExercise::new("2015-12-26", "Barbell Squat", 225.0, 2))
            .unwrap();
        assert_eq!(twice.len(), 2);
        assert_eq!(twice.rows()[0].date, twice.rows()[1].date);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let table = squat_table();
        assert!(matches!(
            add_exercise(&table, NewExercise::new("someday", "Deadlift", 500.0, 1)),
            Err(Error::InvalidDate(_))
        ));
        assert!(matches!(
            add_exercise(&table, NewExercise::new("2019-09-01", " ", 500.0, 1)),
            Err(Error::InvalidRecord(_))
        ));
        assert!(matches!(
            add_exercise(&table, NewExercise::new("2019-09-01", "Deadlift", -5.0, 1)),
            Err(Error::InvalidRecord(_))
        ));
        assert!(matches!(
            add_exercise(&table, NewExercise::new("2019-09-01", "Deadlift", 500.0, 0)),
            Err(Error::InvalidRecord(_))
        ));
    }

    fn duplicated_table() -> ExerciseTable {
        let table = squat_table();
        let table = add_exercise(
            &table,
            NewExercise::new("2015-12-26", "Barbell Squat", 245.0, 1),
        )
        .unwrap();
        let table = add_exercise(
            &table,
            NewExercise::new("2015-12-26", "Barbell Squat", 225.0, 2),
        )
        .unwrap();
        add_exercise(&table, NewExercise::new("2015-12-26", "Deadlift", 405.0, 1)).unwrap()
    }

    #[test]
    fn test_remove_all_matches() {
        let table = duplicated_table();
        let selector = RemovalSelector::new(d(2015, 12, 26), "Barbell Squat");

        let remaining = remove_exercise(&table, &selector);

        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.rows()[0].exercise, "Deadlift");
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_remove_first_match_only() {
        let table = duplicated_table();
        let mut selector = RemovalSelector::new(d(2015, 12, 26), "Barbell Squat");
        selector.reps = Some(2);
        selector.scope = RemovalScope::FirstMatch;

        let remaining = remove_exercise(&table, &selector);

        assert_eq!(remaining.len(), 3);
        // The earliest 225x2 went, the later identical row stayed
        assert_eq!(remaining.rows()[0].weight, 245.0);
        assert_eq!(remaining.rows()[1].weight, 225.0);
        assert_eq!(remaining.rows()[1].reps, 2);
        assert_eq!(remaining.rows()[2].exercise, "Deadlift");
    }

    #[test]
    fn test_remove_with_weight_filter() {
        let table = duplicated_table();
        let mut selector = RemovalSelector::new(d(2015, 12, 26), "Barbell Squat");
        selector.weight = Some(245.0);

        let remaining = remove_exercise(&table, &selector);
        assert_eq!(remaining.len(), 3);
        assert!(remaining.iter().all(|row| row.weight != 245.0));
    }

    #[test]
    fn test_remove_nothing_matching() {
        let table = duplicated_table();
        let selector = RemovalSelector::new(d(2020, 1, 1), "Barbell Squat");
        assert_eq!(remove_exercise(&table, &selector), table);
    }
}
