use std::collections::HashMap;

use serde::Serialize;

use super::error::DataError;
use super::model::Table;

/// One outcome value with its row count and share of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proportion {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Percentage breakdown of an outcome column.
///
/// Entries are ordered by descending count, ties by first appearance.
/// An empty table yields no entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProportionSummary {
    pub total: usize,
    pub entries: Vec<Proportion>,
}

impl ProportionSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Percentage for `label`, if that value occurs.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.percent)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.label.as_str())
    }

    pub fn percents(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|p| p.percent)
    }
}

/// Group the rows of `table` by `outcome_column` and compute each group's share.
pub fn summarize(table: &Table, outcome_column: &str) -> Result<ProportionSummary, DataError> {
    let column = table
        .column(outcome_column)
        .ok_or_else(|| DataError::MissingColumns(vec![outcome_column.to_string()]))?;

    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for row in table.index() {
        let label = column.label(row);
        match slots.get(label.as_ref()) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(label.to_string(), counts.len());
                counts.push((label.into_owned(), 1));
            }
        }
    }
    // Stable, so ties keep first-appearance order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = table.len();
    let entries = counts
        .into_iter()
        .map(|(label, count)| Proportion {
            label,
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect();

    Ok(ProportionSummary { total, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    #[test]
    fn percentages_sum_to_one_hundred() {
        let table = Table::new(vec![Column::categorical(
            "y",
            vec!["no", "no", "yes", "no", "unknown", "yes", "no"],
        )])
        .unwrap();
        let s = summarize(&table, "y").unwrap();

        assert_eq!(s.labels().collect::<Vec<_>>(), ["no", "yes", "unknown"]);
        assert_eq!(s.entries[0].count, 4);
        assert!((s.percents().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_first_appearance() {
        let table = Table::new(vec![Column::categorical("y", vec!["yes", "no"])]).unwrap();
        let s = summarize(&table, "y").unwrap();
        assert_eq!(s.labels().collect::<Vec<_>>(), ["yes", "no"]);
        assert_eq!(s.get("no"), Some(50.0));
    }

    #[test]
    fn empty_table_gives_empty_summary() {
        let table = Table::new(vec![Column::categorical("y", Vec::<String>::new())]).unwrap();
        let s = summarize(&table, "y").unwrap();
        assert!(s.is_empty());
        assert_eq!(s.total, 0);
    }

    #[test]
    fn numeric_outcome_uses_labels() {
        let table = Table::new(vec![Column::numeric("y", vec![1.0, 0.0, 0.0, 0.0])]).unwrap();
        let s = summarize(&table, "y").unwrap();
        assert_eq!(s.get("0"), Some(75.0));
        assert_eq!(s.get("1"), Some(25.0));
    }

    #[test]
    fn missing_outcome_column_is_an_error() {
        let table = Table::new(vec![Column::categorical("job", vec!["admin."])]).unwrap();
        assert!(matches!(
            summarize(&table, "y"),
            Err(DataError::MissingColumns(cols)) if cols == ["y"]
        ));
    }
}
