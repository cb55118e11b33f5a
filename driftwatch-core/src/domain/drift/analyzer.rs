// driftwatch-core/src/domain/drift/analyzer.rs

// Pure domain logic: two datasets + config in, DriftReport out.
// No IO, no clock except the report timestamp.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::domain::dataset::{Column, ColumnKind, Dataset};
use crate::domain::drift::config::{DriftConfig, StatTest, TestConfig};
use crate::domain::drift::report::{ColumnDriftResult, DriftReport, DriftStatus};
use crate::domain::drift::stats::{self, TestOutcome};
use crate::domain::error::{ColumnConflict, DomainError};

/// Compare `current` against `reference` column by column.
///
/// Fails with [`DomainError::SchemaMismatch`] when the datasets are not
/// comparable after applying `ignore_columns` and `categorical_columns`.
pub fn analyze(
    reference: &Dataset,
    current: &Dataset,
    config: &DriftConfig,
) -> Result<DriftReport, DomainError> {
    config.check()?;

    let mut reference_cols = prepare(reference, config);
    let mut current_cols = prepare(current, config);
    adopt_counterpart_kinds(&mut reference_cols, &mut current_cols);

    let conflicts = find_conflicts(&reference_cols, &current_cols);
    if !conflicts.is_empty() {
        return Err(DomainError::SchemaMismatch { conflicts });
    }

    let mut results = Vec::with_capacity(reference_cols.len());
    for ref_col in &reference_cols {
        let cur_col = current_cols
            .iter()
            .find(|c| c.name() == ref_col.name())
            .ok_or_else(|| DomainError::SchemaMismatch {
                conflicts: vec![ColumnConflict::MissingInCurrent(ref_col.name().to_string())],
            })?;
        results.push(compare_column(ref_col, cur_col, config)?);
    }

    Ok(DriftReport::from_columns(
        results,
        config.share_threshold,
        reference.row_count(),
        current.row_count(),
    ))
}

/// Apply the explicit column handling from the config.
fn prepare<'a>(dataset: &'a Dataset, config: &DriftConfig) -> Vec<Cow<'a, Column>> {
    dataset
        .columns()
        .iter()
        .filter(|c| !config.ignore_columns.iter().any(|name| name == c.name()))
        .map(|c| {
            let forced = config.categorical_columns.iter().any(|n| n == c.name());
            if forced && c.kind() != ColumnKind::Categorical {
                Cow::Owned(c.clone().into_categorical())
            } else {
                Cow::Borrowed(c)
            }
        })
        .collect()
}

/// A column without a single non-null cell carries no type evidence (CSV readers
/// type it as text), so it takes the kind of its counterpart.
fn adopt_counterpart_kinds(reference: &mut [Cow<'_, Column>], current: &mut [Cow<'_, Column>]) {
    for ref_col in reference.iter_mut() {
        let Some(cur_col) = current.iter_mut().find(|c| c.name() == ref_col.name()) else {
            continue;
        };
        if cur_col.kind() == ref_col.kind() {
            continue;
        }
        if !cur_col.has_values() {
            let retyped = cur_col.nulls_of(ref_col.kind());
            *cur_col = Cow::Owned(retyped);
        } else if !ref_col.has_values() {
            let retyped = ref_col.nulls_of(cur_col.kind());
            *ref_col = Cow::Owned(retyped);
        }
    }
}

fn find_conflicts(reference: &[Cow<'_, Column>], current: &[Cow<'_, Column>]) -> Vec<ColumnConflict> {
    let mut conflicts = Vec::new();

    for ref_col in reference {
        match current.iter().find(|c| c.name() == ref_col.name()) {
            None => conflicts.push(ColumnConflict::MissingInCurrent(ref_col.name().to_string())),
            Some(cur_col) if cur_col.kind() != ref_col.kind() => {
                conflicts.push(ColumnConflict::KindMismatch {
                    column: ref_col.name().to_string(),
                    reference: ref_col.kind(),
                    current: cur_col.kind(),
                })
            }
            Some(_) => {}
        }
    }

    let known: HashSet<&str> = reference.iter().map(|c| c.name()).collect();
    for cur_col in current {
        if !known.contains(cur_col.name()) {
            conflicts.push(ColumnConflict::MissingInReference(cur_col.name().to_string()));
        }
    }

    conflicts
}

/// Values of one column pair, shaped for the test family.
enum Sample {
    Ordinal(Vec<f64>, Vec<f64>),
    Labels(Vec<String>, Vec<String>),
}

impl Sample {
    fn of(reference: &Column, current: &Column) -> Self {
        match (reference.ordinal_values(), current.ordinal_values()) {
            (Some(r), Some(c)) => Sample::Ordinal(r, c),
            _ => Sample::Labels(reference.category_labels(), current.category_labels()),
        }
    }

    fn sizes(&self) -> (usize, usize) {
        match self {
            Sample::Ordinal(r, c) => (r.len(), c.len()),
            Sample::Labels(r, c) => (r.len(), c.len()),
        }
    }
}

fn compare_column(
    reference: &Column,
    current: &Column,
    config: &DriftConfig,
) -> Result<ColumnDriftResult, DomainError> {
    let kind = reference.kind();
    let test_cfg = config.test_for(kind);
    let sample = Sample::of(reference, current);
    let (reference_count, current_count) = sample.sizes();

    let base = ColumnDriftResult {
        column: reference.name().to_string(),
        kind,
        test: test_cfg.test,
        statistic: 0.0,
        p_value: None,
        threshold: test_cfg.threshold,
        drifted: false,
        status: DriftStatus::Undetermined,
        reference_count,
        current_count,
    };

    if reference_count == 0 || current_count == 0 {
        return Ok(base);
    }

    let outcome = run_test(test_cfg, &sample, config.bins)?;
    let drifted = test_cfg.is_drift(outcome.score());

    Ok(ColumnDriftResult {
        statistic: outcome.statistic,
        p_value: outcome.p_value,
        drifted,
        status: if drifted {
            DriftStatus::Drifted
        } else {
            DriftStatus::Stable
        },
        ..base
    })
}

fn run_test(test_cfg: &TestConfig, sample: &Sample, bins: usize) -> Result<TestOutcome, DomainError> {
    let outcome = match (test_cfg.test, sample) {
        (StatTest::KolmogorovSmirnov, Sample::Ordinal(r, c)) => stats::ks_two_sample(r, c),
        (StatTest::Wasserstein, Sample::Ordinal(r, c)) => stats::wasserstein_normed(r, c),
        (StatTest::Psi, Sample::Ordinal(r, c)) => {
            let (rp, cp) = stats::histogram_proportions(r, c, bins);
            stats::psi(&rp, &cp)
        }
        (StatTest::JensenShannon, Sample::Ordinal(r, c)) => {
            let (rp, cp) = stats::histogram_proportions(r, c, bins);
            stats::jensen_shannon(&rp, &cp)
        }
        (StatTest::ChiSquare, Sample::Labels(r, c)) => stats::chi_square(r, c),
        (StatTest::Psi, Sample::Labels(r, c)) => {
            let (rp, cp) = stats::category_proportions(r, c);
            stats::psi(&rp, &cp)
        }
        (StatTest::JensenShannon, Sample::Labels(r, c)) => {
            let (rp, cp) = stats::category_proportions(r, c);
            stats::jensen_shannon(&rp, &cp)
        }
        (test, _) => {
            return Err(DomainError::InvalidConfig(format!(
                "{} is not applicable to this column",
                test
            )));
        }
    };
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::ColumnValues;
    use anyhow::Result;
    use chrono::{Duration, TimeZone, Utc};

    fn ages(values: [f64; 4]) -> Dataset {
        Dataset::new(vec![Column::numeric("age", values)]).unwrap()
    }

    #[test]
    fn test_shifted_ages_drift() -> Result<()> {
        let reference = ages([20.0, 21.0, 22.0, 23.0]);
        let current = ages([80.0, 81.0, 82.0, 83.0]);

        let report = analyze(&reference, &current, &DriftConfig::default())?;
        let age = report.column("age").unwrap();

        assert!(age.drifted);
        assert_eq!(age.status, DriftStatus::Drifted);
        assert_eq!(age.test, StatTest::Wasserstein);
        assert_eq!(age.threshold, 0.1);
        assert!(report.overall_drifted);
        assert_eq!(report.drifted_count, 1);
        Ok(())
    }

    #[test]
    fn test_shifted_ages_drift_with_ks() -> Result<()> {
        let config = DriftConfig {
            numeric: TestConfig::new(StatTest::KolmogorovSmirnov, 0.05),
            ..DriftConfig::default()
        };
        let report = analyze(
            &ages([20.0, 21.0, 22.0, 23.0]),
            &ages([80.0, 81.0, 82.0, 83.0]),
            &config,
        )?;
        let age = report.column("age").unwrap();
        assert!(age.drifted);
        assert!(age.p_value.is_some());
        Ok(())
    }

    #[test]
    fn test_identical_datasets_do_not_drift() -> Result<()> {
        let ds = Dataset::new(vec![
            Column::numeric("age", [20.0, 35.0, 41.0, 52.0, 63.0]),
            Column::categorical("city", ["Paris", "Lyon", "Paris", "Nice", "Lyon"]),
            Column::datetime(
                "signup",
                (0..5).map(|d| Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(d)),
            ),
        ])?;

        let report = analyze(&ds, &ds, &DriftConfig::default())?;
        assert!(!report.overall_drifted);
        assert_eq!(report.drifted_count, 0);
        assert!(report.columns.iter().all(|c| c.status == DriftStatus::Stable));
        Ok(())
    }

    #[test]
    fn test_schema_mismatch_names_offending_columns() -> Result<()> {
        let reference = Dataset::new(vec![
            Column::numeric("age", [1.0]),
            Column::categorical("city", ["Paris"]),
        ])?;
        let current = Dataset::new(vec![
            Column::categorical("age", ["1"]),
            Column::numeric("score", [0.5]),
        ])?;

        let err = analyze(&reference, &current, &DriftConfig::default()).unwrap_err();
        assert!(matches!(err, DomainError::SchemaMismatch { .. }));
        assert_eq!(err.offending_columns(), vec!["age", "city", "score"]);
        Ok(())
    }

    #[test]
    fn test_explicit_column_handling_reconciles_schemas() -> Result<()> {
        let reference = Dataset::new(vec![
            Column::numeric("zip", [75001.0, 69001.0]),
            Column::numeric("id", [1.0, 2.0]),
        ])?;
        let current = Dataset::new(vec![Column::categorical("zip", ["75001", "69001"])])?;

        let config = DriftConfig {
            ignore_columns: vec!["id".into()],
            categorical_columns: vec!["zip".into()],
            ..DriftConfig::default()
        };

        let report = analyze(&reference, &current, &config)?;
        assert_eq!(report.columns.len(), 1);
        let zip = report.column("zip").unwrap();
        assert_eq!(zip.kind, ColumnKind::Categorical);
        assert!(!zip.drifted);
        Ok(())
    }

    #[test]
    fn test_all_null_and_empty_columns_are_undetermined() -> Result<()> {
        let reference = Dataset::new(vec![
            Column::new("score", ColumnValues::Numeric(vec![None, None])),
            Column::categorical("city", ["Paris", "Lyon"]),
        ])?;
        let current = Dataset::new(vec![
            Column::new("score", ColumnValues::Numeric(vec![Some(1.0)])),
            Column::new("city", ColumnValues::Categorical(vec![None])),
        ])?;

        let report = analyze(&reference, &current, &DriftConfig::default())?;
        assert_eq!(report.undetermined_count(), 2);
        for col in &report.columns {
            assert!(!col.drifted);
            assert!(col.statistic.is_finite());
        }
        assert!(!report.overall_drifted);

        let empty = Dataset::new(vec![Column::numeric("score", Vec::<f64>::new())])?;
        let report = analyze(&empty, &empty, &DriftConfig::default())?;
        assert_eq!(report.columns[0].status, DriftStatus::Undetermined);
        Ok(())
    }

    #[test]
    fn test_untyped_null_columns_take_counterpart_kind() -> Result<()> {
        let reference = Dataset::new(vec![
            Column::numeric("age", [20.0, 21.0, 22.0]),
            Column::categorical("city", ["Paris", "Lyon", "Paris"]),
        ])?;
        let current = Dataset::new(vec![
            Column::new("age", ColumnValues::Categorical(vec![None, None, None])),
            Column::categorical("city", ["Paris", "Lyon", "Nice"]),
        ])?;

        let report = analyze(&reference, &current, &DriftConfig::default())?;
        let age = report.column("age").unwrap();
        assert_eq!(age.kind, ColumnKind::Numeric);
        assert_eq!(age.status, DriftStatus::Undetermined);
        assert_eq!(age.current_count, 0);

        // Zero rows on the reference side, text-typed by the reader
        let empty = Dataset::new(vec![
            Column::new("age", ColumnValues::Categorical(Vec::new())),
            Column::new("city", ColumnValues::Categorical(Vec::new())),
        ])?;
        let report = analyze(&empty, &reference, &DriftConfig::default())?;
        assert_eq!(report.undetermined_count(), 2);
        assert_eq!(report.column("age").unwrap().kind, ColumnKind::Numeric);
        assert!(!report.overall_drifted);
        Ok(())
    }

    #[test]
    fn test_populated_kind_mismatch_still_fails() {
        let reference = Dataset::new(vec![Column::numeric("age", [20.0])]).unwrap();
        let current = Dataset::new(vec![Column::categorical("age", ["twenty"])]).unwrap();

        let err = analyze(&reference, &current, &DriftConfig::default()).unwrap_err();
        assert!(matches!(err, DomainError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_shifted_dates_drift() -> Result<()> {
        let day = |year: i32, d: i64| Utc.with_ymd_and_hms(year, 3, 1, 0, 0, 0).unwrap() + Duration::days(d);
        let reference = Dataset::new(vec![Column::datetime("signup", (0..10).map(|d| day(2019, d)))])?;
        let current = Dataset::new(vec![Column::datetime("signup", (0..10).map(|d| day(2024, d)))])?;

        let report = analyze(&reference, &current, &DriftConfig::default())?;
        let signup = report.column("signup").unwrap();
        assert_eq!(signup.kind, ColumnKind::Datetime);
        assert_eq!(signup.test, StatTest::Wasserstein);
        assert!(signup.drifted);
        assert!(report.overall_drifted);
        Ok(())
    }

    #[test]
    fn test_categorical_shift_drifts_with_psi_and_js() -> Result<()> {
        let reference = Dataset::new(vec![Column::categorical(
            "plan",
            std::iter::repeat_n("free", 40).chain(std::iter::repeat_n("pro", 40)),
        )])?;
        let current = Dataset::new(vec![Column::categorical(
            "plan",
            std::iter::repeat_n("free", 5).chain(std::iter::repeat_n("pro", 75)),
        )])?;

        for test in [StatTest::Psi, StatTest::JensenShannon] {
            let config = DriftConfig {
                categorical: TestConfig::new(test, 0.1),
                ..DriftConfig::default()
            };
            let report = analyze(&reference, &current, &config)?;
            let plan = report.column("plan").unwrap();
            assert_eq!(plan.test, test);
            assert!(plan.drifted, "{:?} missed the shift ({})", test, plan.statistic);

            let stable = analyze(&reference, &reference, &config)?;
            assert!(!stable.column("plan").unwrap().drifted);
        }
        Ok(())
    }

    #[test]
    fn test_single_value_columns_are_well_defined() -> Result<()> {
        let reference = Dataset::new(vec![
            Column::numeric("flag", [1.0, 1.0, 1.0]),
            Column::categorical("tier", ["gold", "gold", "gold"]),
        ])?;

        let report = analyze(&reference, &reference, &DriftConfig::default())?;
        assert_eq!(report.column("flag").unwrap().statistic, 0.0);
        assert_eq!(report.column("tier").unwrap().p_value, Some(1.0));
        assert!(!report.overall_drifted);
        Ok(())
    }

    #[test]
    fn test_categorical_shift_drifts() -> Result<()> {
        let reference = Dataset::new(vec![Column::categorical(
            "plan",
            std::iter::repeat_n("free", 40).chain(std::iter::repeat_n("pro", 40)),
        )])?;
        let current = Dataset::new(vec![Column::categorical(
            "plan",
            std::iter::repeat_n("free", 5).chain(std::iter::repeat_n("pro", 75)),
        )])?;

        let report = analyze(&reference, &current, &DriftConfig::default())?;
        let plan = report.column("plan").unwrap();
        assert_eq!(plan.test, StatTest::ChiSquare);
        assert!(plan.drifted);
        Ok(())
    }

    #[test]
    fn test_share_threshold_controls_verdict() -> Result<()> {
        let reference = Dataset::new(vec![
            Column::numeric("a", [1.0, 2.0, 3.0, 4.0]),
            Column::numeric("b", [1.0, 2.0, 3.0, 4.0]),
        ])?;
        let current = Dataset::new(vec![
            Column::numeric("a", [101.0, 102.0, 103.0, 104.0]),
            Column::numeric("b", [1.0, 2.0, 3.0, 4.0]),
        ])?;

        let config = DriftConfig {
            share_threshold: 0.5,
            ..DriftConfig::default()
        };
        let report = analyze(&reference, &current, &config)?;
        assert_eq!(report.drift_share, 0.5);
        assert!(!report.overall_drifted);
        Ok(())
    }

    #[test]
    fn test_analysis_is_deterministic() -> Result<()> {
        let reference = Dataset::new(vec![
            Column::numeric("x", [0.3, 1.7, 2.2, 9.1, 4.4, 3.3]),
            Column::categorical("c", ["a", "b", "a", "c", "b", "a"]),
        ])?;
        let current = Dataset::new(vec![
            Column::numeric("x", [1.3, 2.7, 0.2, 5.1, 7.4, 3.9]),
            Column::categorical("c", ["b", "b", "a", "c", "c", "c"]),
        ])?;

        for numeric in [StatTest::Wasserstein, StatTest::KolmogorovSmirnov, StatTest::Psi, StatTest::JensenShannon] {
            let config = DriftConfig {
                numeric: TestConfig::new(numeric, 0.1),
                ..DriftConfig::default()
            };
            let first = analyze(&reference, &current, &config)?;
            let second = analyze(&reference, &current, &config)?;
            assert!(first.same_findings(&second), "{:?} is not deterministic", numeric);
            assert_ne!(first.id, second.id);
        }
        Ok(())
    }
}
