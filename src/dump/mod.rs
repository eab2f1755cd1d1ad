//! Reading geotags out of a `geo_tags` SQL dump.
//!
//! The dump is consumed as a stream: [`tokenize`] cuts it into tuple-sized
//! tokens over a bounded buffer and [`extract`] keeps the ones that look like
//! earth geotags. Everything else (comments, `CREATE TABLE`, `ALTER TABLE`,
//! the `INSERT INTO ... VALUES` prefixes) is silently dropped.

use std::io::Read;

use serde::Serialize;

use crate::error::Result;

pub mod extract;
pub mod tokenize;

use tokenize::Tokenizer;

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// The dump's way of saying "no location".
    // TODO: decide whether (0,0) rows that come from a real geocode should be kept
    pub const SENTINEL: GeoPoint = GeoPoint { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_sentinel(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }
}

/// How much of a dump turned into geotags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub tokens: u64,
    pub records: u64,
    pub bytes: u64,
}

/// Iterator over the geotags of a dump, sentinels included.
///
/// Yields at most one error, after which it is exhausted.
pub struct Geotags<R> {
    tokenizer: Tokenizer<R>,
    stats: ScanStats,
    done: bool,
}

impl<R: Read> Geotags<R> {
    pub fn new(reader: R, max_token_size: usize) -> Self {
        Self {
            tokenizer: Tokenizer::with_max_token_size(reader, max_token_size),
            stats: ScanStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> ScanStats {
        ScanStats {
            bytes: self.tokenizer.consumed(),
            ..self.stats
        }
    }
}

impl<R: Read> Iterator for Geotags<R> {
    type Item = Result<GeoPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.tokenizer.next_token() {
                Ok(Some(token)) => {
                    self.stats.tokens += 1;
                    if let Some(point) = extract::extract(token) {
                        self.stats.records += 1;
                        return Some(Ok(point));
                    }
                }
                Ok(None) => self.done = true,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
