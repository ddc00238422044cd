use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::io::Read;

use crate::error::FetchError;

/// Attributes offered to the operator for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Attribute {
    Height,
    Dbh,
    Count,
}

impl Attribute {
    pub fn column_name(&self) -> &'static str {
        match self {
            Attribute::Height => "height",
            Attribute::Dbh => "dbh",
            Attribute::Count => "count",
        }
    }
}

/// The single column chosen for visualization. Fixed for a loop's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSelection(String);

impl AttributeSelection {
    pub fn new(column: impl Into<String>) -> Self {
        Self(column.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Attribute> for AttributeSelection {
    fn from(attribute: Attribute) -> Self {
        Self::new(attribute.column_name())
    }
}

impl fmt::Display for AttributeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// `None` marks an empty or non-numeric cell
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v).filter(|v| v.is_finite())
    }

    pub fn missing_count(&self) -> usize {
        self.values.len() - self.numeric_values().count()
    }
}

/// Immutable tabular snapshot produced by one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from named numeric columns. Shorter columns are padded
    /// with missing cells.
    pub fn from_columns<N, I>(columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<f64>)>,
    {
        let mut columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column {
                name: name.into().trim().to_string(),
                values: values.into_iter().map(Some).collect(),
            })
            .collect();

        let row_count = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for column in &mut columns {
            column.values.resize(row_count, None);
        }

        Self { columns, row_count }
    }

    /// Parse a CSV table with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, FetchError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(FetchError::NoHeader);
        }

        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();

        let mut row_count = 0;
        for record in rdr.records() {
            let record = record?;
            for (idx, column) in columns.iter_mut().enumerate() {
                let cell = record.get(idx).unwrap_or("");
                column.values.push(cell.parse::<f64>().ok());
            }
            row_count += 1;
        }

        Ok(Self { columns, row_count })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_reader() {
        let csv = "height, dbh ,count\n1.5,10,3\n2.0,,4\nn/a,30,5\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_names(), vec!["height", "dbh", "count"]);

        let height = dataset.column("height").unwrap();
        assert_eq!(height.numeric_values().collect::<Vec<_>>(), vec![1.5, 2.0]);
        assert_eq!(height.missing_count(), 1);

        let dbh = dataset.column("dbh").unwrap();
        assert_eq!(dbh.numeric_values().collect::<Vec<_>>(), vec![10.0, 30.0]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "height,dbh\n1,10\n2\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        let dbh = dataset.column("dbh").unwrap();
        assert_eq!(dbh.values, vec![Some(10.0), None]);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let result = Dataset::from_csv_reader("".as_bytes());
        assert!(matches!(result, Err(FetchError::NoHeader)));
    }

    #[test]
    fn test_from_columns() {
        let dataset = Dataset::from_columns([
            ("height", vec![1.0, 2.0, 3.0]),
            ("dbh", vec![10.0, 20.0]),
        ]);
        assert_eq!(dataset.row_count(), 3);
        assert!(dataset.has_column("height"));
        assert!(!dataset.has_column("count"));
        assert_eq!(dataset.column("dbh").unwrap().values[2], None);
    }

    #[test]
    fn test_attribute_selection() {
        let selection = AttributeSelection::from(Attribute::Dbh);
        assert_eq!(selection.as_str(), "dbh");
        assert_eq!(AttributeSelection::new(" height ").as_str(), "height");
    }
}
