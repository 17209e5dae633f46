use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SparkError};

// ---------------------------------------------------------------------------
// SampleSeries – one two-column table
// ---------------------------------------------------------------------------

/// An ordered intensity trace. Position in the vectors is acquisition order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    /// Independent axis (wavelength / wavenumber).
    pub x: Vec<f64>,
    /// Intensity – same length as `x`.
    pub y: Vec<f64>,
}

impl SampleSeries {
    /// Build a series, rejecting empty or misaligned columns.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SparkError::MalformedTable(format!(
                "x has {} values but y has {}",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(SparkError::MalformedTable("table has no data rows".into()));
        }
        Ok(Self { x, y })
    }

    /// Same independent axis, new intensities.
    pub fn with_intensity(&self, y: Vec<f64>) -> Self {
        debug_assert_eq!(self.x.len(), y.len());
        Self {
            x: self.x.clone(),
            y,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Always false for a series built through [`SampleSeries::new`].
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Delimiter – table convention picked from the file extension
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Runs of spaces / tabs (`.asc` exports from the spectrometer software).
    Whitespace,
    Comma,
}

impl Delimiter {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "asc" => Delimiter::Whitespace,
            _ => Delimiter::Comma,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Whitespace => write!(f, "whitespace"),
            Delimiter::Comma => write!(f, "comma"),
        }
    }
}

// ---------------------------------------------------------------------------
// DespikeParams – the two user knobs
// ---------------------------------------------------------------------------

/// Smallest window that still leaves four neighbours per sample.
pub const MIN_WINDOW_SIZE: usize = 5;
pub const MIN_THRESHOLD: f64 = 1.0;

/// Parameters shared by every file of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DespikeParams {
    /// Full window width in samples; the radius is half of it.
    pub window_size: usize,
    /// Number of robust standard deviations above the local median.
    pub threshold_multiplier: f64,
}

impl Default for DespikeParams {
    fn default() -> Self {
        Self {
            window_size: 15,
            threshold_multiplier: 3.0,
        }
    }
}

impl DespikeParams {
    pub fn new(window_size: usize, threshold_multiplier: f64) -> Result<Self> {
        let params = Self {
            window_size,
            threshold_multiplier,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(SparkError::InvalidParameter(format!(
                "window size {} is below {MIN_WINDOW_SIZE}",
                self.window_size
            )));
        }
        // NaN fails the comparison, inf is caught explicitly.
        if !(self.threshold_multiplier.is_finite() && self.threshold_multiplier >= MIN_THRESHOLD) {
            return Err(SparkError::InvalidParameter(format!(
                "threshold multiplier {} must be a finite number >= {MIN_THRESHOLD}",
                self.threshold_multiplier
            )));
        }
        Ok(())
    }

    /// Half-width of the neighbourhood on each side of a sample.
    pub fn window_radius(&self) -> usize {
        self.window_size / 2
    }
}

// ---------------------------------------------------------------------------
// DespikeOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DespikeOutcome {
    /// `true` where the sample was classified as a spike.
    pub mask: Vec<bool>,
    /// Intensities with every flagged sample replaced.
    pub corrected: Vec<f64>,
}

impl DespikeOutcome {
    pub fn spike_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}
