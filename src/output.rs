//! Cell counts as CSV lines, `<token>,<count>`, sorted by cell.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result as AnyResult};
use tempfile::NamedTempFile;

use crate::{
    aggregate::CountTable,
    error::{Error, Result},
    grid::Grid,
};

/// Streams the table to `out` in cell order.
///
/// A sink that fails halfway keeps what was already written; callers that need
/// all-or-nothing output go through [`persist`].
pub fn write_counts<G: Grid, W: Write>(grid: &G, table: CountTable<G::Cell>, out: W) -> Result<()> {
    let mut out = BufWriter::new(out);
    for (cell, count) in table.into_sorted() {
        writeln!(out, "{},{}", grid.token(cell), count).map_err(Error::Write)?;
    }
    out.flush().map_err(Error::Write)?;
    Ok(())
}

/// Runs `write` against a temporary file next to `path` and moves it into
/// place once `write` succeeded. On failure `path` is left untouched.
pub fn persist<T>(path: &Path, write: impl FnOnce(&mut fs::File) -> AnyResult<T>) -> AnyResult<T> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    let value = write(tmp.as_file_mut())?;
    tmp.as_file().sync_all().context("Failed to sync output")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dump::GeoPoint, grid::S2Grid};

    struct Full;

    impl Write for Full {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sorted_by_cell() {
        let grid = S2Grid::new(0).unwrap();
        let mut table = CountTable::new();
        for point in [(60.0, 10.0), (10.0, 10.0), (60.0, 11.0), (-60.0, 0.5)] {
            table.increment(grid.cell(GeoPoint::new(point.0, point.1)).unwrap());
        }

        let mut out = Vec::new();
        write_counts(&grid, table, &mut out).unwrap();
        // faces 0, 2 and 5
        assert_eq!(String::from_utf8(out).unwrap(), "1,1\n5,2\nb,1\n");
    }

    #[test]
    fn empty_table() {
        let mut out = Vec::new();
        write_counts(&S2Grid::new(3).unwrap(), CountTable::new(), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn sink_failure() {
        let grid = S2Grid::new(0).unwrap();
        let mut table = CountTable::new();
        table.increment(grid.cell(GeoPoint::new(1.0, 1.0)).unwrap());
        assert!(matches!(write_counts(&grid, table, Full), Err(Error::Write(_))));
    }

    /// Sink that takes `left` bytes and then fails.
    struct Short {
        left: usize,
    }

    impl Write for Short {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.left == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.left);
            self.left -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_while_streaming() {
        let grid = S2Grid::new(10).unwrap();
        let mut table = CountTable::new();
        for lat in -60..60 {
            for lon in 0..20 {
                table.increment(grid.cell(GeoPoint::new(lat as f64, lon as f64)).unwrap());
            }
        }
        assert_eq!(table.len(), 2400);

        let result = write_counts(&grid, table, Short { left: 100 });
        assert!(matches!(result, Err(Error::Write(_))));
    }

    #[test]
    fn persist_replaces_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        fs::write(&path, "old\n").unwrap();

        let failed = persist(&path, |_| -> AnyResult<()> { anyhow::bail!("read failed") });
        assert!(failed.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\n");

        persist(&path, |file| Ok(file.write_all(b"new\n")?)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
