use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::error::DataError;
use super::model::{Column, Table};

/// Accepted-value entry that turns a categorical filter into a no-op.
pub const ALL_SENTINEL: &str = "all";

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Keep rows whose numeric `column` lies in `[min, max]`.
#[derive(Debug, Clone, Serialize)]
pub struct RangeFilter {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(column: impl Into<String>, min: f64, max: f64) -> Self {
        RangeFilter {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Pull both bounds into `[lo, hi]`.
    pub fn clamped(&self, lo: f64, hi: f64) -> Self {
        RangeFilter {
            column: self.column.clone(),
            min: self.min.clamp(lo, hi),
            max: self.max.clamp(lo, hi),
        }
    }

    fn resolve<'t>(&self, table: &'t Table) -> Result<&'t [f64], DataError> {
        if self.min.is_nan() || self.max.is_nan() {
            return Err(DataError::InvalidFilterSpec(format!(
                "range on '{}' has a NaN bound",
                self.column
            )));
        }
        if self.min > self.max {
            return Err(DataError::InvalidFilterSpec(format!(
                "range on '{}' is inverted ({} > {})",
                self.column, self.min, self.max
            )));
        }
        table
            .column(&self.column)
            .ok_or_else(|| unknown_column(&self.column))?
            .as_numeric()
            .ok_or_else(|| {
                DataError::InvalidFilterSpec(format!("column '{}' is not numeric", self.column))
            })
    }
}

// Bounds are compared by bit pattern so the filter can key a cache.
impl PartialEq for RangeFilter {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column
            && self.min.to_bits() == other.min.to_bits()
            && self.max.to_bits() == other.max.to_bits()
    }
}

impl Eq for RangeFilter {}

impl Hash for RangeFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column.hash(state);
        self.min.to_bits().hash(state);
        self.max.to_bits().hash(state);
    }
}

/// Keep rows whose `column` label is one of `accepted`.
///
/// If `accepted` holds [`ALL_SENTINEL`] every row passes, whatever else is in
/// the set. An empty set keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CategoricalFilter {
    pub column: String,
    pub accepted: BTreeSet<String>,
}

impl CategoricalFilter {
    pub fn new<S: Into<String>>(column: impl Into<String>, accepted: impl IntoIterator<Item = S>) -> Self {
        CategoricalFilter {
            column: column.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that accepts everything.
    pub fn all(column: impl Into<String>) -> Self {
        Self::new(column, [ALL_SENTINEL])
    }

    pub fn is_noop(&self) -> bool {
        self.accepted.contains(ALL_SENTINEL)
    }
}

/// The full predicate set of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSpec {
    pub range: RangeFilter,
    pub categorical: Vec<CategoricalFilter>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Apply `spec` to `table`, returning a new table re-indexed from zero.
///
/// A row survives when it passes the range filter and every categorical
/// filter. All predicates are evaluated in a single pass.
pub fn apply(table: &Table, spec: &FilterSpec) -> Result<Table, DataError> {
    let rows = matching_rows(table, spec)?;
    log::debug!(
        "filter kept {} of {} rows on '{}' and {} categorical column(s)",
        rows.len(),
        table.len(),
        spec.range.column,
        spec.categorical.len()
    );
    Ok(table.take(&rows))
}

/// Positions of the rows of `table` that pass every filter in `spec`.
pub fn matching_rows(table: &Table, spec: &FilterSpec) -> Result<Vec<usize>, DataError> {
    let range_values = spec.range.resolve(table)?;

    let mut active: Vec<(&Column, &BTreeSet<String>)> = Vec::new();
    for filter in &spec.categorical {
        let column = table
            .column(&filter.column)
            .ok_or_else(|| unknown_column(&filter.column))?;
        if !filter.is_noop() {
            active.push((column, &filter.accepted));
        }
    }

    Ok(table
        .index()
        .filter(|&row| {
            spec.range.contains(range_values[row])
                && active
                    .iter()
                    .all(|(column, accepted)| accepted.contains(column.label(row).as_ref()))
        })
        .collect())
}

fn unknown_column(name: &str) -> DataError {
    DataError::InvalidFilterSpec(format!("unknown column '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Table {
        Table::new(vec![
            Column::numeric("age", vec![22.0, 35.0, 41.0, 58.0, 30.0, 47.0]),
            Column::categorical(
                "job",
                vec!["student", "admin.", "technician", "retired", "admin.", "technician"],
            ),
            Column::categorical("loan", vec!["no", "yes", "no", "no", "unknown", "yes"]),
            Column::categorical("y", vec!["yes", "no", "no", "yes", "no", "yes"]),
        ])
        .unwrap()
    }

    fn spec(min: f64, max: f64, categorical: Vec<CategoricalFilter>) -> FilterSpec {
        FilterSpec {
            range: RangeFilter::new("age", min, max),
            categorical,
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let out = apply(&bank(), &spec(30.0, 41.0, vec![])).unwrap();
        assert_eq!(out.column("age").unwrap().as_numeric(), Some(&[35.0, 41.0, 30.0][..]));
    }

    #[test]
    fn filters_combine_by_conjunction() {
        let out = apply(
            &bank(),
            &spec(
                25.0,
                60.0,
                vec![
                    CategoricalFilter::new("job", ["admin.", "technician"]),
                    CategoricalFilter::new("loan", ["no", "unknown"]),
                ],
            ),
        )
        .unwrap();
        assert_eq!(out.column("age").unwrap().as_numeric(), Some(&[41.0, 30.0][..]));
        assert_eq!(out.index(), 0..2);
    }

    #[test]
    fn sentinel_overrides_other_entries() {
        let table = bank();
        let with_all = spec(0.0, 100.0, vec![CategoricalFilter::new("job", ["retired", ALL_SENTINEL])]);
        assert_eq!(apply(&table, &with_all).unwrap(), table);
    }

    #[test]
    fn empty_accepted_set_keeps_nothing() {
        let empty: [&str; 0] = [];
        let out = apply(&bank(), &spec(0.0, 100.0, vec![CategoricalFilter::new("job", empty)])).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.n_columns(), 4);
    }

    #[test]
    fn applying_twice_changes_nothing() {
        let f = spec(30.0, 50.0, vec![CategoricalFilter::new("loan", ["no", "yes"])]);
        let once = apply(&bank(), &f).unwrap();
        let twice = apply(&once, &f).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = apply(&bank(), &spec(50.0, 30.0, vec![])).unwrap_err();
        assert!(matches!(err, DataError::InvalidFilterSpec(_)));
    }

    #[test]
    fn unknown_or_text_columns_are_rejected() {
        let err = apply(&bank(), &spec(0.0, 100.0, vec![CategoricalFilter::all("education")])).unwrap_err();
        assert!(matches!(err, DataError::InvalidFilterSpec(msg) if msg.contains("education")));

        let on_text = FilterSpec {
            range: RangeFilter::new("job", 0.0, 1.0),
            categorical: vec![],
        };
        assert!(apply(&bank(), &on_text).is_err());
    }

    #[test]
    fn numeric_columns_match_by_label() {
        let table = Table::new(vec![
            Column::numeric("age", vec![30.0, 40.0]),
            Column::numeric("campaign", vec![1.0, 2.0]),
        ])
        .unwrap();
        let out = apply(&table, &spec(0.0, 100.0, vec![CategoricalFilter::new("campaign", ["2"])])).unwrap();
        assert_eq!(out.column("age").unwrap().as_numeric(), Some(&[40.0][..]));
    }

    #[test]
    fn clamped_pulls_bounds_inside() {
        let r = RangeFilter::new("age", 5.0, 200.0).clamped(18.0, 95.0);
        assert_eq!((r.min, r.max), (18.0, 95.0));
    }
}
