use crate::data::export::{EXPORT_FILE_NAME, EXPORT_MIME};

/// Column roles and presentation settings of the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Numeric column behind the range slider.
    pub range_column: String,
    /// Columns offered as multi-select filters, in form order.
    pub categorical_columns: Vec<String>,
    /// Binary outcome column summarised in the chart.
    pub outcome_column: String,
    /// Rows shown in the before/after previews.
    pub preview_rows: usize,
    pub export_file_name: String,
    pub export_mime: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            range_column: "age".to_string(),
            categorical_columns: [
                "job",
                "marital",
                "default",
                "housing",
                "loan",
                "contact",
                "month",
                "day_of_week",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            outcome_column: "y".to_string(),
            preview_rows: 5,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            export_mime: EXPORT_MIME.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Every column the filter form and chart refer to.
    pub fn required_columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.range_column.as_str())
            .chain(self.categorical_columns.iter().map(String::as_str))
            .chain(std::iter::once(self.outcome_column.as_str()))
    }
}
