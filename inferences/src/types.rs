use crate::error::{InferenceError, Result};

/// Small named-column table handed to classifiers.
///
/// Rows are stored as `f64`; integer features convert losslessly for the
/// magnitudes a loan application carries.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureFrame {
    /// Builds a frame, rejecting rows whose width differs from the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(InferenceError::invalid(format!(
                "row has {} values for {} columns",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// One-row frame from `(column, value)` pairs, in the given order.
    pub fn single_row<S: Into<String>>(values: impl IntoIterator<Item = (S, f64)>) -> Self {
        let (columns, row): (Vec<String>, Vec<f64>) = values
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        Self {
            columns,
            rows: vec![row],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows reordered to the given column names.
    pub fn select(&self, names: &[String]) -> Result<Vec<Vec<f64>>> {
        let indices = names
            .iter()
            .map(|name| {
                self.columns
                    .iter()
                    .position(|column| column == name)
                    .ok_or_else(|| InferenceError::MissingFeature(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_reorders_columns() {
        let frame = FeatureFrame::single_row([("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        let rows = frame
            .select(&["c".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(rows, vec![vec![3.0, 1.0]]);
    }

    #[test]
    fn select_reports_missing_column() {
        let frame = FeatureFrame::single_row([("a", 1.0)]);
        let err = frame.select(&["b".to_string()]).unwrap_err();
        assert!(matches!(err, InferenceError::MissingFeature(name) if name == "b"));
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let result = FeatureFrame::new(vec!["a".into(), "b".into()], vec![vec![1.0]]);
        assert!(result.is_err());
    }
}
