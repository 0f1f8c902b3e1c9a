//! Location sources API

use crate::{RawPosition, Result};

/// Source of recorded positions, eg.: a location log to replay
pub trait LocationSource {
    /// Fetch the positions, oldest first
    fn fetch(&mut self) -> Result<Vec<RawPosition>>;
}

#[cfg(feature = "csv")]
mod csv_file;

#[cfg(feature = "csv")]
pub use csv_file::{CsvSource, FieldsConfiguration};
