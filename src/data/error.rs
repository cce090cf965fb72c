use thiserror::Error;

/// Errors produced by the data layer.
///
/// Parsing internals work with `anyhow` and are folded into these variants at
/// the module boundary, so the UI only ever has to match on one type.
#[derive(Debug, Error)]
pub enum DataError {
    /// Neither the delimited-text nor the spreadsheet reader accepted the input.
    #[error("could not parse input as delimited text ({delimited}) or as a spreadsheet ({spreadsheet})")]
    Unparseable {
        delimited: String,
        spreadsheet: String,
    },

    /// A reader was explicitly requested and rejected the input.
    #[error("could not parse input: {0}")]
    Malformed(String),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Column mixes numeric cells with text or blanks.
    #[error("column '{column}' mixes numeric and non-numeric values")]
    AmbiguousColumn { column: String },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("invalid filter: {0}")]
    InvalidFilterSpec(String),

    #[error("export failed: {0}")]
    Export(String),
}
