//! Data layer: typed tables, loading, filtering, summaries, export.
//!
//! Architecture:
//! ```text
//!  .csv (;) / .xlsx / .json bytes
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse bytes → Table (RawTable, cached per file)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  range ∧ categorical predicates → WorkingTable
//!   └──────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌──────────┐   ┌──────────┐
//!   │ summary   │   │  export   │  outcome % / xlsx blob
//!   └──────────┘   └──────────┘
//! ```

pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
