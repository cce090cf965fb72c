use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

use super::error::DataError;

// ---------------------------------------------------------------------------
// CellRef – a borrowed view of one cell
// ---------------------------------------------------------------------------

/// A single cell, borrowed from its column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef<'a> {
    Number(f64),
    Text(&'a str),
}

impl fmt::Display for CellRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRef::Number(v) => write!(f, "{}", format_number(*v)),
            CellRef::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Whole numbers print without a fractional part so `age = 30` reads as `30`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// Parse a text cell as a finite number. `NaN`/`inf` spellings stay text.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// RawCell – loader output before column types are fixed
// ---------------------------------------------------------------------------

/// An untyped cell as produced by one of the readers.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Empty,
}

impl RawCell {
    fn as_number(&self) -> Option<f64> {
        match self {
            RawCell::Number(v) if v.is_finite() => Some(*v),
            RawCell::Text(s) => parse_number(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

/// A named, typed column. The type is fixed when the table is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Categorical(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self.data {
            ColumnData::Numeric(_) => ColumnType::Numeric,
            ColumnData::Categorical(_) => ColumnType::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Panics if `row` is out of bounds, like slice indexing.
    pub fn cell(&self, row: usize) -> CellRef<'_> {
        match &self.data {
            ColumnData::Numeric(v) => CellRef::Number(v[row]),
            ColumnData::Categorical(v) => CellRef::Text(&v[row]),
        }
    }

    /// The value as it is shown to the user and matched by categorical filters.
    pub fn label(&self, row: usize) -> Cow<'_, str> {
        match &self.data {
            ColumnData::Numeric(v) => Cow::Owned(format_number(v[row])),
            ColumnData::Categorical(v) => Cow::Borrowed(v[row].as_str()),
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Distinct labels in order of first appearance.
    pub fn unique_labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in 0..self.len() {
            let label = self.label(row);
            if seen.insert(label.clone()) {
                out.push(label.into_owned());
            }
        }
        out
    }

    /// Observed `(min, max)` of a numeric column; `None` for text or empty columns.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let values = self.as_numeric()?;
        let mut iter = values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    fn take(&self, indices: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }

    /// Fix the type of a column from its raw cells.
    fn infer(name: String, cells: Vec<RawCell>) -> Result<Column, DataError> {
        let numbers: Vec<Option<f64>> = cells.iter().map(RawCell::as_number).collect();
        let n_numeric = numbers.iter().filter(|v| v.is_some()).count();

        if n_numeric == 0 {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    RawCell::Text(s) => s,
                    RawCell::Number(v) => format_number(v),
                    RawCell::Empty => String::new(),
                })
                .collect();
            return Ok(Column {
                name,
                data: ColumnData::Categorical(values),
            });
        }
        if n_numeric != cells.len() {
            return Err(DataError::AmbiguousColumn { column: name });
        }
        Ok(Column {
            name,
            data: ColumnData::Numeric(numbers.into_iter().flatten().collect()),
        })
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Ordered, named, typed columns sharing one row count.
///
/// Rows are addressed positionally: a table always spans `0..len()`, and every
/// operation that drops rows builds a fresh table, so there are never gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from already-typed columns.
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut names = HashSet::new();
        for col in &columns {
            if !names.insert(col.name.as_str()) {
                return Err(DataError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != n_rows {
                return Err(DataError::Malformed(format!(
                    "column '{}' has {} rows, expected {n_rows}",
                    col.name,
                    col.len()
                )));
            }
        }
        Ok(Table { columns, n_rows })
    }

    /// Build a table from a header and row-major raw cells, inferring column types.
    /// Short rows are padded with empty cells.
    pub fn from_raw(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Result<Self, DataError> {
        let width = headers.len();
        let mut by_column: Vec<Vec<RawCell>> =
            (0..width).map(|_| Vec::with_capacity(rows.len())).collect();

        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(DataError::Malformed(format!(
                    "row {row_no} has {} cells but the header has {width}",
                    row.len()
                )));
            }
            let n = row.len();
            for (cells, cell) in by_column.iter_mut().zip(row) {
                cells.push(cell);
            }
            for cells in by_column.iter_mut().skip(n) {
                cells.push(RawCell::Empty);
            }
        }

        let columns = headers
            .into_iter()
            .zip(by_column)
            .map(|(name, cells)| Column::infer(name, cells))
            .collect::<Result<Vec<_>, _>>()?;
        Table::new(columns)
    }

    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Positional row index, always `0..len()`.
    pub fn index(&self) -> Range<usize> {
        0..self.n_rows
    }

    /// Names from `required` that this table lacks, in the order given.
    pub fn missing_columns<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        required
            .into_iter()
            .filter(|name| self.column(name).is_none())
            .map(str::to_string)
            .collect()
    }

    /// New table holding the given rows in the given order, re-indexed from zero.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let idx: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take(&idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    #[test]
    fn infers_numeric_and_categorical_columns() {
        let table = Table::from_raw(
            vec!["age".into(), "job".into()],
            vec![vec![text("30"), text("admin.")], vec![text(" 41 "), text("services")]],
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column("age").unwrap().as_numeric(), Some(&[30.0, 41.0][..]));
        assert_eq!(table.column("job").unwrap().column_type(), ColumnType::Categorical);
    }

    #[test]
    fn mixed_column_is_rejected() {
        let err = Table::from_raw(
            vec!["age".into()],
            vec![vec![text("30")], vec![text("unknown")]],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::AmbiguousColumn { column } if column == "age"));

        let err = Table::from_raw(vec!["age".into()], vec![vec![text("30")], vec![RawCell::Empty]])
            .unwrap_err();
        assert!(matches!(err, DataError::AmbiguousColumn { .. }));
    }

    #[test]
    fn nan_spelling_stays_categorical() {
        let table = Table::from_raw(vec!["x".into()], vec![vec![text("nan")], vec![text("inf")]]).unwrap();
        assert_eq!(table.column("x").unwrap().column_type(), ColumnType::Categorical);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = Table::from_raw(vec!["a".into(), "a".into()], vec![vec![text("1"), text("2")]])
            .unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn short_rows_are_padded() {
        let table = Table::from_raw(
            vec!["job".into(), "y".into()],
            vec![vec![text("admin."), text("no")], vec![text("services")]],
        )
        .unwrap();
        assert_eq!(table.column("y").unwrap().label(1), "");
    }

    #[test]
    fn zero_row_columns_are_categorical() {
        let table = Table::from_raw(vec!["age".into()], Vec::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column("age").unwrap().column_type(), ColumnType::Categorical);
    }

    #[test]
    fn take_reindexes_from_zero() {
        let table = Table::new(vec![
            Column::numeric("age", vec![20.0, 30.0, 40.0, 50.0]),
            Column::categorical("y", vec!["no", "yes", "no", "yes"]),
        ])
        .unwrap();

        let sub = table.take(&[1, 3]);
        assert_eq!(sub.index(), 0..2);
        assert_eq!(sub.column("age").unwrap().cell(0), CellRef::Number(30.0));
        assert_eq!(sub.column("y").unwrap().label(1), "yes");
        assert_eq!(table.head(10).len(), 4);
    }

    #[test]
    fn unique_labels_keep_first_appearance_order() {
        let col = Column::categorical("marital", vec!["married", "single", "married", "divorced"]);
        assert_eq!(col.unique_labels(), vec!["married", "single", "divorced"]);
        assert_eq!(Column::numeric("age", vec![33.0, 21.0, 57.0]).bounds(), Some((21.0, 57.0)));
    }

    #[test]
    fn whole_numbers_print_without_fraction() {
        assert_eq!(CellRef::Number(30.0).to_string(), "30");
        assert_eq!(CellRef::Number(1.25).to_string(), "1.25");
    }

    #[test]
    fn missing_columns_are_reported_in_order() {
        let table = Table::new(vec![Column::numeric("age", vec![1.0])]).unwrap();
        assert_eq!(table.missing_columns(["y", "age", "job"]), vec!["y", "job"]);
    }
}
