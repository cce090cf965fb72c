use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::cache::{FileKey, FilterCache, LoadCache};
use crate::data::error::DataError;
use crate::data::export;
use crate::data::filter::{ALL_SENTINEL, CategoricalFilter, FilterSpec, RangeFilter};
use crate::data::loader::{self, FormatHint};
use crate::data::model::Table;
use crate::data::summary::{ProportionSummary, summarize};

// ---------------------------------------------------------------------------
// Filter form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

/// Options and current selection of one multi-select filter.
#[derive(Debug, Clone)]
pub struct CategoricalChoice {
    pub column: String,
    /// Distinct values in first-appearance order, followed by the sentinel.
    pub options: Vec<String>,
    pub selected: BTreeSet<String>,
}

/// Draft predicates edited in the side panel. Nothing is applied until
/// [`Session::submit`].
#[derive(Debug, Clone)]
pub struct FilterForm {
    pub range_column: String,
    /// Observed `(min, max)` of the range column in the raw table.
    pub bounds: (f64, f64),
    /// Selected `(lo, hi)`, always inside `bounds`.
    pub range: (f64, f64),
    pub choices: Vec<CategoricalChoice>,
    pub chart_kind: ChartKind,
}

impl FilterForm {
    /// Build the form from the raw table. Fails if any required column is
    /// missing or the range column has no numeric values.
    pub fn build(raw: &Table, config: &DashboardConfig) -> Result<Self, DataError> {
        let missing = raw.missing_columns(config.required_columns());
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing));
        }

        let bounds = raw
            .column(&config.range_column)
            .and_then(|c| c.bounds())
            .ok_or_else(|| {
                DataError::InvalidFilterSpec(format!(
                    "column '{}' has no numeric values to filter on",
                    config.range_column
                ))
            })?;

        let choices = config
            .categorical_columns
            .iter()
            .filter_map(|name| raw.column(name))
            .map(|column| {
                let mut options = column.unique_labels();
                options.push(ALL_SENTINEL.to_string());
                CategoricalChoice {
                    column: column.name.clone(),
                    options,
                    selected: BTreeSet::from([ALL_SENTINEL.to_string()]),
                }
            })
            .collect();

        Ok(FilterForm {
            range_column: config.range_column.clone(),
            bounds,
            range: bounds,
            choices,
            chart_kind: ChartKind::default(),
        })
    }

    /// Set the selected range, ordered and clamped to the observed bounds.
    pub fn set_range(&mut self, lo: f64, hi: f64) {
        let (min, max) = self.bounds;
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.range = (lo.clamp(min, max), hi.clamp(min, max));
    }

    /// Flip `value` in or out of the selection of `column`.
    pub fn toggle(&mut self, column: &str, value: &str) {
        if let Some(choice) = self.choices.iter_mut().find(|c| c.column == column) {
            if !choice.selected.remove(value) {
                choice.selected.insert(value.to_string());
            }
        }
    }

    pub fn to_spec(&self) -> FilterSpec {
        let (min, max) = self.bounds;
        FilterSpec {
            range: RangeFilter::new(self.range_column.as_str(), self.range.0, self.range.1)
                .clamped(min, max),
            categorical: self
                .choices
                .iter()
                .map(|c| CategoricalFilter::new(c.column.as_str(), c.selected.iter().cloned()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Outcome proportions before and after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub raw: ProportionSummary,
    pub filtered: ProportionSummary,
}

/// Everything one user works with, independent of rendering.
///
/// The raw table is never modified. The working table is rebuilt from it on
/// every submission, so repeated submissions never compound.
#[derive(Debug, Default)]
pub struct Session {
    pub config: DashboardConfig,
    source: Option<FileKey>,
    raw: Option<Arc<Table>>,
    working: Option<Arc<Table>>,
    applied: Option<FilterSpec>,
    /// Side-panel draft; `None` until a valid file is loaded.
    pub form: Option<FilterForm>,
    /// Chart kind chosen at the last submission.
    pub chart_kind: ChartKind,
    load_cache: LoadCache,
    filter_cache: FilterCache,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Session {
    pub fn new(config: DashboardConfig) -> Self {
        Session {
            config,
            ..Default::default()
        }
    }

    /// Ingest an uploaded file.
    ///
    /// Re-uploading the file that is already loaded keeps the current filters.
    /// Any failure leaves the session empty.
    pub fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<(), DataError> {
        let key = FileKey::new(name, bytes);
        if self.source.as_ref() == Some(&key) {
            return Ok(());
        }

        self.reset();
        let raw = self
            .load_cache
            .get_or_load(&key, || loader::load(bytes, FormatHint::from_file_name(name)))?;
        let form = FilterForm::build(&raw, &self.config)?;

        log::info!("Session started on '{}' ({} rows)", name, raw.len());
        self.working = Some(Arc::clone(&raw));
        self.raw = Some(raw);
        self.form = Some(form);
        self.source = Some(key);
        Ok(())
    }

    /// Apply the current form.
    pub fn submit(&mut self) -> Result<(), DataError> {
        let form = self
            .form
            .as_ref()
            .ok_or_else(|| DataError::InvalidFilterSpec("no dataset loaded".to_string()))?;
        let spec = form.to_spec();
        self.chart_kind = form.chart_kind;
        self.submit_spec(spec)
    }

    /// Recompute the working table from the raw table and `spec`.
    pub fn submit_spec(&mut self, spec: FilterSpec) -> Result<(), DataError> {
        let (Some(source), Some(raw)) = (&self.source, &self.raw) else {
            return Err(DataError::InvalidFilterSpec("no dataset loaded".to_string()));
        };
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(json) = serde_json::to_string(&spec) {
                log::debug!("submitting {json}");
            }
        }

        let working = self.filter_cache.get_or_apply(source, raw, &spec)?;
        log::info!("Filters kept {} of {} rows", working.len(), raw.len());
        self.working = Some(working);
        self.applied = Some(spec);
        Ok(())
    }

    /// Drop all per-file state.
    pub fn reset(&mut self) {
        self.source = None;
        self.raw = None;
        self.working = None;
        self.applied = None;
        self.form = None;
        self.chart_kind = ChartKind::default();
        self.filter_cache.clear();
        self.status_message = None;
    }

    pub fn raw(&self) -> Option<&Table> {
        self.raw.as_deref()
    }

    pub fn working(&self) -> Option<&Table> {
        self.working.as_deref()
    }

    pub fn applied(&self) -> Option<&FilterSpec> {
        self.applied.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.source.as_ref().map(|k| k.name.as_str())
    }

    pub fn raw_preview(&self) -> Option<Table> {
        self.raw().map(|t| t.head(self.config.preview_rows))
    }

    pub fn working_preview(&self) -> Option<Table> {
        self.working().map(|t| t.head(self.config.preview_rows))
    }

    /// Outcome proportions of the raw and working tables, computed fresh.
    pub fn comparison(&self) -> Result<Option<Comparison>, DataError> {
        let (Some(raw), Some(working)) = (self.raw(), self.working()) else {
            return Ok(None);
        };
        let outcome = &self.config.outcome_column;
        Ok(Some(Comparison {
            raw: summarize(raw, outcome)?,
            filtered: summarize(working, outcome)?,
        }))
    }

    /// The working table as an xlsx workbook.
    pub fn export(&self) -> Result<Vec<u8>, DataError> {
        let working = self
            .working()
            .ok_or_else(|| DataError::Export("no dataset loaded".to_string()))?;
        export::to_xlsx(working)
    }

    pub fn export_to(&self, path: &Path) -> Result<(), DataError> {
        let working = self
            .working()
            .ok_or_else(|| DataError::Export("no dataset loaded".to_string()))?;
        export::write_xlsx(working, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "age;job;marital;default;housing;loan;contact;month;day_of_week;y";

    fn bank_csv(rows: &[(u32, &str, &str)]) -> String {
        let mut out = String::from(HEADER);
        for (age, job, y) in rows {
            out.push_str(&format!(
                "\n{age};{job};married;no;yes;no;cellular;may;mon;{y}"
            ));
        }
        out
    }

    fn loaded(rows: &[(u32, &str, &str)]) -> Session {
        let mut session = Session::default();
        session.upload("bank.csv", bank_csv(rows).as_bytes()).unwrap();
        session
    }

    #[test]
    fn form_defaults_to_everything() {
        let session = loaded(&[(25, "admin.", "no"), (61, "retired", "yes"), (40, "admin.", "no")]);
        let form = session.form.as_ref().unwrap();

        assert_eq!(form.bounds, (25.0, 61.0));
        assert_eq!(form.range, form.bounds);
        assert_eq!(form.choices.len(), 8);
        assert_eq!(form.choices[0].options, ["admin.", "retired", "all"]);
        assert!(form.to_spec().categorical.iter().all(CategoricalFilter::is_noop));
    }

    #[test]
    fn missing_columns_are_listed() {
        let mut session = Session::default();
        let err = session.upload("bank.csv", b"age;job\n30;admin.\n").unwrap_err();

        match err {
            DataError::MissingColumns(cols) => {
                assert_eq!(cols.first().map(String::as_str), Some("marital"));
                assert!(cols.contains(&"y".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(session.raw().is_none());
        assert!(session.form.is_none());
    }

    #[test]
    fn range_selection_is_clamped_and_ordered() {
        let mut session = loaded(&[(25, "admin.", "no"), (61, "retired", "yes")]);
        let form = session.form.as_mut().unwrap();
        form.set_range(90.0, 10.0);
        assert_eq!(form.range, (25.0, 61.0));
        form.set_range(30.0, 50.0);
        assert_eq!(form.to_spec().range, RangeFilter::new("age", 30.0, 50.0));
    }

    #[test]
    fn submissions_recompute_from_raw() {
        let mut session = loaded(&[
            (25, "admin.", "no"),
            (35, "services", "yes"),
            (45, "admin.", "yes"),
            (55, "retired", "no"),
        ]);

        let form = session.form.as_mut().unwrap();
        form.set_range(30.0, 60.0);
        session.submit().unwrap();
        assert_eq!(session.working().unwrap().len(), 3);

        // Widening again must bring rows back; filters never compound.
        session.form.as_mut().unwrap().set_range(25.0, 61.0);
        session.submit().unwrap();
        assert_eq!(session.working().unwrap().len(), 4);
        assert_eq!(session.raw().unwrap().len(), 4);
    }

    #[test]
    fn toggling_sentinel_off_applies_selection() {
        let mut session = loaded(&[(25, "admin.", "no"), (35, "services", "yes"), (45, "admin.", "yes")]);
        let form = session.form.as_mut().unwrap();
        form.toggle("job", "services");
        form.chart_kind = ChartKind::Pie;
        session.submit().unwrap();
        assert_eq!(session.working().unwrap().len(), 3);

        session.form.as_mut().unwrap().toggle("job", ALL_SENTINEL);
        session.submit().unwrap();
        assert_eq!(session.working().unwrap().len(), 1);
        assert_eq!(session.chart_kind, ChartKind::Pie);
    }

    #[test]
    fn reupload_of_same_file_keeps_filters() {
        let csv = bank_csv(&[(25, "admin.", "no"), (35, "services", "yes")]);
        let mut session = Session::default();
        session.upload("bank.csv", csv.as_bytes()).unwrap();
        session.form.as_mut().unwrap().set_range(30.0, 35.0);
        session.submit().unwrap();

        session.upload("bank.csv", csv.as_bytes()).unwrap();
        assert_eq!(session.working().unwrap().len(), 1);

        let other = bank_csv(&[(50, "admin.", "no")]);
        session.upload("other.csv", other.as_bytes()).unwrap();
        assert_eq!(session.working().unwrap().len(), 1);
        assert!(session.applied().is_none());
        assert_eq!(session.file_name(), Some("other.csv"));
    }

    #[test]
    fn previews_are_capped() {
        let rows: Vec<(u32, &str, &str)> = (0..8).map(|i| (20 + i, "admin.", "no")).collect();
        let session = loaded(&rows);
        assert_eq!(session.raw_preview().unwrap().len(), 5);
        assert_eq!(session.working_preview().unwrap().len(), 5);
    }

    #[test]
    fn submit_without_data_is_an_error() {
        let mut session = Session::default();
        assert!(session.submit().is_err());
        assert!(session.export().is_err());
        assert_eq!(session.comparison().unwrap(), None);
    }
}
