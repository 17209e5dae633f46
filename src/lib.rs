//! Spike removal for SFG intensity spectra.
//!
//! The library holds everything the desktop front end drives: loading
//! two-column tables, the windowed MAD despiking engine, writing the cleaned
//! table, rendering the comparison chart and the per-file batch loop.

pub mod batch;
pub mod data;
pub mod error;
pub mod render;

pub use batch::{BatchOptions, FileReport, FileStatus, ProcessedFile};
pub use data::model::{DespikeOutcome, DespikeParams, SampleSeries};
pub use error::{Result, SparkError};
