//! report-tables-core - Interactive behaviour for static report tables
//!
//! This crate works on a structured snapshot of a report page and gives its
//! tables the behaviour a reader expects from a live page.
//!
//! # Features
//!
//! - Click-to-sort columns with currency-aware comparison
//! - Column toggling, choice filters and generated select filters
//! - Batched sparkline rendering and comparison charts behind a renderer trait
//! - Guarded bootstrap and event dispatch through [`Enhancer`]

pub mod chart;
pub mod compare;
pub mod comparison;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod markers;
pub mod options;
pub mod page;
pub mod parser;
pub mod sort;
pub mod sparkline;
pub mod toggle;

pub use chart::{ChartHandle, ChartOptions, ChartRenderer, RecordingRenderer, RenderTarget};
pub use compare::{compare_values, SortKey};
pub use comparison::ComparisonController;
pub use config::EnhanceConfig;
pub use enhancer::{Enhancer, Event};
pub use error::{Error, Result};
pub use page::{Page, RowId, Table};
pub use parser::{parse_float, precise_value, round2, to_number};
pub use sort::{Direction, SortEngine};
pub use sparkline::{SparklineRenderer, Tick};
