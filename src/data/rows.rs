use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Color;

/// One raw cell as yielded by the host's tabular model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Decimal(Decimal),
    Text(String),
    Missing,
}

impl CellValue {
    /// Interprets the cell as a size or weight.
    ///
    /// Missing cells default to `1.0`; text must parse as a number.
    pub fn to_size(&self) -> Result<f64, DataErrorKind> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Decimal(value) => value
                .to_f64()
                .ok_or_else(|| DataErrorKind::NonNumericSize(value.to_string()))?,
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| DataErrorKind::NonNumericSize(text.clone()))?,
            Self::Missing => 1.0,
        };
        if !value.is_finite() {
            return Err(DataErrorKind::NonFiniteSize);
        }
        if value <= 0.0 {
            return Err(DataErrorKind::NonPositiveSize(value));
        }
        Ok(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// One row of a hierarchical data set: a name path plus size and color hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierRow {
    pub path: Vec<String>,
    pub size: CellValue,
    pub color: Option<Color>,
    pub color_bucket: Option<u32>,
}

impl HierRow {
    #[must_use]
    pub fn new<I, S>(path: I, size: impl Into<CellValue>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            size: size.into(),
            color: None,
            color_bucket: None,
        }
    }

    /// Row whose path is given as one `/`-delimited string.
    #[must_use]
    pub fn from_path_str(path: &str, size: impl Into<CellValue>) -> Self {
        Self::new(path.split('/'), size)
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_color_bucket(mut self, bucket: u32) -> Self {
        self.color_bucket = Some(bucket);
        self
    }
}

/// Event stream variant with explicit group boundaries.
///
/// `Row` paths are relative to the innermost entered group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HierEvent {
    Enter(String),
    Exit,
    Row(HierRow),
}

/// One weighted edge row of a flow data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRow {
    pub source: String,
    pub target: String,
    pub weight: CellValue,
}

impl FlowRow {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        weight: impl Into<CellValue>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: weight.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum DataErrorKind {
    #[error("row has an empty name path")]
    EmptyPath,
    #[error("row has an empty name segment")]
    EmptyName,
    #[error("size `{0}` is not numeric")]
    NonNumericSize(String),
    #[error("size is not finite")]
    NonFiniteSize,
    #[error("size {0} is not positive")]
    NonPositiveSize(f64),
    #[error("group exit without a matching enter")]
    UnbalancedExit,
    #[error("flow `{0}` points at itself")]
    SelfLoop(String),
}

/// Non-fatal problem with one input row; the row was skipped.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("row {row}: {kind}")]
pub struct DataError {
    pub row: usize,
    pub kind: DataErrorKind,
}

/// Data errors collected during one build, kept for later display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataErrorLog {
    errors: Vec<DataError>,
}

impl DataErrorLog {
    pub fn record(&mut self, row: usize, kind: DataErrorKind) {
        self.errors.push(DataError { row, kind });
    }

    #[must_use]
    pub fn errors(&self) -> &[DataError] {
        &self.errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_size_defaults_to_one() {
        assert_eq!(CellValue::Missing.to_size(), Ok(1.0));
    }

    #[test]
    fn text_and_decimal_sizes_are_parsed() {
        assert_eq!(CellValue::from(" 2.5 ").to_size(), Ok(2.5));
        assert_eq!(CellValue::from(Decimal::new(125, 2)).to_size(), Ok(1.25));
        assert!(matches!(
            CellValue::from("abc").to_size(),
            Err(DataErrorKind::NonNumericSize(_))
        ));
        assert_eq!(
            CellValue::from(-1.0).to_size(),
            Err(DataErrorKind::NonPositiveSize(-1.0))
        );
    }
}
