use std::{
    collections::HashMap,
    hash::Hash,
    io::{Read, Write},
};

use serde::Serialize;

use crate::{
    dump::{Geotags, GeoPoint},
    error::Result,
    grid::Grid,
    output,
};

const PROGRESS_EVERY: u64 = 1_000_000;

/// Occurrences per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTable<C: Hash + Eq> {
    counts: HashMap<C, u64>,
}

impl<C: Copy + Ord + Hash> CountTable<C> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
        }
    }

    pub fn increment(&mut self, cell: C) {
        *self.counts.entry(cell).or_default() += 1;
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Adds every count of `other` to this table.
    pub fn merge(&mut self, other: CountTable<C>) {
        self.counts.reserve(other.counts.len());
        for (cell, count) in other.counts {
            *self.counts.entry(cell).or_default() += count;
        }
    }

    /// Sums counts by their ancestor at the coarser `level`.
    ///
    /// Cells that have no ancestor at that level are dropped.
    pub fn roll_up<G: Grid<Cell = C>>(&self, grid: &G, level: u8) -> CountTable<C> {
        let mut coarse = CountTable::new();
        for (&cell, &count) in &self.counts {
            if let Some(parent) = grid.parent(cell, level) {
                *coarse.counts.entry(parent).or_default() += count;
            }
        }
        coarse
    }

    /// Cells with a nonzero count in ascending cell order.
    pub fn into_sorted(self) -> Vec<(C, u64)> {
        let mut cells: Vec<_> = self.counts.into_iter().filter(|&(_, n)| n > 0).collect();
        cells.sort_unstable_by_key(|&(cell, _)| cell);
        cells
    }
}

impl<C: Copy + Ord + Hash> Default for CountTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to the input of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub bytes: u64,
    pub tokens: u64,
    pub records: u64,
    pub sentinels: u64,
    pub unmapped: u64,
    pub cells: u64,
}

/// Counts points on one grid for the length of a single run.
pub struct Aggregator<G: Grid> {
    grid: G,
    table: CountTable<G::Cell>,
    stats: Stats,
}

impl<G: Grid> Aggregator<G> {
    pub fn new(grid: G, capacity_hint: usize) -> Self {
        Self {
            grid,
            table: CountTable::with_capacity(capacity_hint),
            stats: Stats::default(),
        }
    }

    pub fn add(&mut self, point: GeoPoint) {
        self.stats.records += 1;
        if point.is_sentinel() {
            self.stats.sentinels += 1;
            return;
        }
        match self.grid.cell(point) {
            Some(cell) => self.table.increment(cell),
            None => {
                tracing::debug!(lat = point.lat, lon = point.lon, "point has no cell");
                self.stats.unmapped += 1;
            }
        }
    }

    pub fn finish(self) -> (G, CountTable<G::Cell>, Stats) {
        let stats = Stats {
            cells: self.table.len() as u64,
            ..self.stats
        };
        (self.grid, self.table, stats)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub capacity_hint: usize,
    pub max_token_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            capacity_hint: 0,
            max_token_size: crate::dump::tokenize::DEFAULT_MAX_TOKEN_SIZE,
        }
    }
}

/// Counts the geotags of `input` on `grid` and writes `<token>,<count>` lines
/// to `out`.
///
/// Nothing reaches `out` unless the whole input was read successfully.
pub fn aggregate<R, W, G>(input: R, grid: G, out: W, options: Options) -> Result<Stats>
where
    R: Read,
    W: Write,
    G: Grid,
{
    let (grid, table, stats) = count(input, grid, options)?;
    output::write_counts(&grid, table, out)?;

    tracing::info!(
        tokens = stats.tokens,
        records = stats.records,
        sentinels = stats.sentinels,
        unmapped = stats.unmapped,
        cells = stats.cells,
        "aggregation finished"
    );
    Ok(stats)
}

/// The counting half of [`aggregate`].
pub fn count<R: Read, G: Grid>(
    input: R,
    grid: G,
    options: Options,
) -> Result<(G, CountTable<G::Cell>, Stats)> {
    let mut geotags = Geotags::new(input, options.max_token_size);
    let mut aggregator = Aggregator::new(grid, options.capacity_hint);

    for point in geotags.by_ref() {
        aggregator.add(point?);
        let records = aggregator.stats.records;
        if records % PROGRESS_EVERY == 0 {
            tracing::info!(records, cells = aggregator.table.len(), "counting");
        }
    }

    let scan = geotags.stats();
    let (grid, table, stats) = aggregator.finish();
    let stats = Stats {
        bytes: scan.bytes,
        tokens: scan.tokens,
        ..stats
    };
    Ok((grid, table, stats))
}
