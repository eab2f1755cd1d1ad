//! Dry run over a dump: how many tuples would turn into geotags.

use std::io::Read;

use serde::Serialize;

use crate::{dump::Geotags, error::Result};

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub bytes: u64,
    pub tokens: u64,
    pub records: u64,
    pub sentinels: u64,
    pub dropped: u64,
}

pub fn run<R: Read>(input: R, max_token_size: usize) -> Result<Report> {
    let mut geotags = Geotags::new(input, max_token_size);
    let mut sentinels = 0;
    for point in geotags.by_ref() {
        if point?.is_sentinel() {
            sentinels += 1;
        }
    }

    let stats = geotags.stats();
    Ok(Report {
        bytes: stats.bytes,
        tokens: stats.tokens,
        records: stats.records,
        sentinels,
        dropped: stats.tokens - stats.records,
    })
}
