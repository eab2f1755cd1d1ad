use std::io;

use thiserror::Error;

use crate::grid::GridKind;

/// Failures that abort a whole aggregation run.
///
/// A record that doesn't look like a geotag is not an error; it is dropped and
/// only shows up in [`crate::aggregate::Stats`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read dump")]
    Read(#[source] io::Error),

    #[error("failed to write cell counts")]
    Write(#[source] io::Error),

    #[error("level {level} is out of range for {grid} (max {max})")]
    InvalidLevel { grid: GridKind, level: u8, max: u8 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
