use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable identifier for a dataset (content hash of the decoded upload).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(pub String);

impl DatasetId {
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    /// Build a column from raw cells, typing it `Numeric` when every cell parses as a number.
    /// A column without cells is numeric.
    #[must_use]
    pub fn infer(name: String, cells: Vec<String>) -> Self {
        let parsed: Option<Vec<f64>> = cells
            .iter()
            .map(|c| c.trim().parse::<f64>().ok().filter(|v| !v.is_nan()))
            .collect();

        let values = match parsed {
            Some(numbers) => ColumnValues::Numeric(numbers),
            _ => ColumnValues::Text(cells),
        };
        Self { name, values }
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Text(_) => ColumnKind::Text,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values rendered as class labels. Numbers use their shortest form so `1` and `1.0` agree.
    #[must_use]
    pub fn as_labels(&self) -> Vec<String> {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().map(f64::to_string).collect(),
            ColumnValues::Text(v) => v.iter().map(|s| s.trim().to_string()).collect(),
        }
    }
}

/// A typed table decoded from an upload. One designated column holds the label.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: DatasetId,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Callers guarantee every column has `n_rows` values.
    #[must_use]
    pub fn new(id: DatasetId, columns: Vec<Column>, n_rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == n_rows));
        Self { id, columns, n_rows }
    }

    #[must_use]
    pub fn id(&self) -> &DatasetId {
        &self.id
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn schema(&self) -> Vec<(String, ColumnKind)> {
        self.columns.iter().map(|c| (c.name.clone(), c.kind())).collect()
    }

    /// Separate `label_column` from the numeric feature columns, keeping column order.
    pub fn split_label(&self, label_column: &str) -> Result<LabeledData, SplitError> {
        let label = self
            .column(label_column)
            .ok_or_else(|| SplitError::MissingLabel(label_column.to_string()))?;

        let features: Vec<&Column> = self.columns.iter().filter(|c| c.name != label_column).collect();
        let matrix = FeatureMatrix::from_columns(&features, self.n_rows)?;

        Ok(LabeledData { features: matrix, labels: label.as_labels() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    MissingLabel(String),
    NonNumeric(String),
}

/// Row-major numeric feature matrix with its column names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    fn from_columns(columns: &[&Column], n_rows: usize) -> Result<Self, SplitError> {
        let mut rows = vec![Vec::with_capacity(columns.len()); n_rows];
        let mut names = Vec::with_capacity(columns.len());

        for column in columns {
            let ColumnValues::Numeric(values) = &column.values else {
                return Err(SplitError::NonNumeric(column.name.clone()));
            };
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(*value);
            }
            names.push(column.name.clone());
        }

        Ok(Self { names, rows })
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Reorder columns to `order`. Returns `None` unless the name sets are identical.
    #[must_use]
    pub fn reordered(&self, order: &[String]) -> Option<Self> {
        if order.len() != self.names.len() {
            return None;
        }
        let positions: Option<Vec<usize>> =
            order.iter().map(|name| self.names.iter().position(|n| n == name)).collect();
        let positions = positions?;

        let rows = self.rows.iter().map(|row| positions.iter().map(|&p| row[p]).collect()).collect();
        Some(Self { names: order.to_vec(), rows })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledData {
    pub features: FeatureMatrix,
    pub labels: Vec<String>,
}

/// Distinct labels in class order: numeric when every label is a number, lexicographic otherwise.
#[must_use]
pub fn distinct_classes(labels: &[String]) -> Vec<String> {
    let mut classes: Vec<String> = labels.to_vec();
    classes.sort();
    classes.dedup();

    let numeric: Option<Vec<f64>> = classes.iter().map(|c| c.parse::<f64>().ok()).collect();
    if let Some(numbers) = numeric {
        let mut paired: Vec<(f64, String)> = numbers.into_iter().zip(classes).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));
        classes = paired.into_iter().map(|(_, c)| c).collect();
    }
    classes
}
