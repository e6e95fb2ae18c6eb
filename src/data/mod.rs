//! Data layer: core types, loading, filtering and export.
//!
//! Architecture:
//! ```text
//!  .xlsx / .ods / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  decode first sheet → Vec<Record>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────┐
//!   │ RecordStore │  records of the last load, header order
//!   └─────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  four-field criteria → filtered indices
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  filtered view → .csv / .json
//!   └──────────┘
//! ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
