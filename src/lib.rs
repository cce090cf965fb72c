//! Telemarketing campaign dashboard: load a bank-marketing table, narrow it
//! with range and categorical filters, and compare outcome proportions before
//! and after filtering.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;

pub use config::DashboardConfig;
pub use data::error::DataError;
pub use data::filter::{ALL_SENTINEL, CategoricalFilter, FilterSpec, RangeFilter, apply};
pub use data::loader::{FormatHint, load};
pub use data::model::{Column, ColumnType, Table};
pub use data::summary::{ProportionSummary, summarize};
pub use state::Session;
