// driftwatch-core/src/domain/drift/config.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::domain::dataset::ColumnKind;
use crate::domain::error::DomainError;

/// Statistical tests available to the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTest {
    /// Two-sample Kolmogorov-Smirnov, p-value.
    #[serde(alias = "ks")]
    KolmogorovSmirnov,
    /// Wasserstein-1 distance normalized by the reference standard deviation.
    #[serde(alias = "wasserstein_distance_norm")]
    Wasserstein,
    /// Chi-squared test of homogeneity over the frequency table, p-value.
    #[serde(alias = "chisquare")]
    ChiSquare,
    /// Population stability index.
    Psi,
    /// Jensen-Shannon distance (natural log).
    #[serde(alias = "jensenshannon")]
    JensenShannon,
}

/// How a test statistic is compared to its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Drift when `p < threshold`.
    PValue,
    /// Drift when `distance >= threshold`.
    Distance,
}

impl StatTest {
    pub fn measure(self) -> Measure {
        match self {
            StatTest::KolmogorovSmirnov | StatTest::ChiSquare => Measure::PValue,
            StatTest::Wasserstein | StatTest::Psi | StatTest::JensenShannon => Measure::Distance,
        }
    }

    pub fn supports(self, kind: ColumnKind) -> bool {
        match kind {
            ColumnKind::Numeric | ColumnKind::Datetime => !matches!(self, StatTest::ChiSquare),
            ColumnKind::Categorical => matches!(
                self,
                StatTest::ChiSquare | StatTest::Psi | StatTest::JensenShannon
            ),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatTest::KolmogorovSmirnov => "K-S p-value",
            StatTest::Wasserstein => "Wasserstein distance (normed)",
            StatTest::ChiSquare => "chi-square p-value",
            StatTest::Psi => "PSI",
            StatTest::JensenShannon => "Jensen-Shannon distance",
        }
    }
}

impl fmt::Display for StatTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Validate)]
pub struct TestConfig {
    pub test: StatTest,
    #[validate(range(min = 0.0))]
    pub threshold: f64,
}

impl TestConfig {
    pub fn new(test: StatTest, threshold: f64) -> Self {
        Self { test, threshold }
    }

    pub fn numeric_default() -> Self {
        Self::new(StatTest::Wasserstein, 0.1)
    }

    pub fn categorical_default() -> Self {
        Self::new(StatTest::ChiSquare, 0.05)
    }

    pub fn datetime_default() -> Self {
        Self::new(StatTest::Wasserstein, 0.1)
    }

    /// Apply the threshold rule of the configured test.
    pub fn is_drift(&self, score: f64) -> bool {
        match self.test.measure() {
            Measure::PValue => score < self.threshold,
            Measure::Distance => score >= self.threshold,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct DriftConfig {
    /// Fraction of drifted columns that must be exceeded for the dataset to drift.
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub share_threshold: f64,

    #[serde(default = "TestConfig::numeric_default")]
    #[validate(nested)]
    pub numeric: TestConfig,

    #[serde(default = "TestConfig::categorical_default")]
    #[validate(nested)]
    pub categorical: TestConfig,

    #[serde(default = "TestConfig::datetime_default")]
    #[validate(nested)]
    pub datetime: TestConfig,

    /// Histogram bins for PSI / Jensen-Shannon on numeric data.
    #[serde(default = "default_bins")]
    #[validate(range(min = 2, max = 1000))]
    pub bins: usize,

    #[serde(default)]
    pub ignore_columns: Vec<String>,

    /// Numeric or datetime columns to analyze as categories (ids, zip codes...).
    #[serde(default)]
    pub categorical_columns: Vec<String>,
}

fn default_bins() -> usize {
    10
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            share_threshold: 0.0,
            numeric: TestConfig::numeric_default(),
            categorical: TestConfig::categorical_default(),
            datetime: TestConfig::datetime_default(),
            bins: default_bins(),
            ignore_columns: Vec::new(),
            categorical_columns: Vec::new(),
        }
    }
}

impl DriftConfig {
    pub fn test_for(&self, kind: ColumnKind) -> &TestConfig {
        match kind {
            ColumnKind::Numeric => &self.numeric,
            ColumnKind::Categorical => &self.categorical,
            ColumnKind::Datetime => &self.datetime,
        }
    }

    /// Range checks plus test/kind compatibility.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;

        for kind in [
            ColumnKind::Numeric,
            ColumnKind::Categorical,
            ColumnKind::Datetime,
        ] {
            let cfg = self.test_for(kind);
            if !cfg.test.supports(kind) {
                return Err(DomainError::InvalidConfig(format!(
                    "{} cannot be used on {} columns",
                    cfg.test, kind
                )));
            }
            if cfg.test.measure() == Measure::PValue && cfg.threshold > 1.0 {
                return Err(DomainError::InvalidConfig(format!(
                    "p-value threshold for {} columns must be within [0, 1], got {}",
                    kind, cfg.threshold
                )));
            }
        }
        Ok(())
    }
}
