//! Hierarchical grids that geotags are counted on.

use std::{fmt::Debug, hash::Hash};

use h3o::{CellIndex, LatLng, Resolution};
use s2::{cellid::CellID, latlng::LatLng as S2LatLng};
use serde::Deserialize;
use strum::{Display, EnumString};

use crate::{
    dump::GeoPoint,
    error::{Error, Result},
};

/// A recursively subdivided global grid at one fixed level.
///
/// `Cell`'s ordering must keep every cell's descendants contiguous, so that
/// sorting by it groups cells the way the hierarchy does.
pub trait Grid {
    type Cell: Copy + Ord + Hash + Debug;

    fn level(&self) -> u8;

    /// Cell containing `point` at this grid's level, if the point is usable.
    fn cell(&self, point: GeoPoint) -> Option<Self::Cell>;

    /// Ancestor of `cell` at a coarser `level`.
    fn parent(&self, cell: Self::Cell, level: u8) -> Option<Self::Cell>;

    /// Short string form used in the output.
    fn token(&self, cell: Self::Cell) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GridKind {
    #[default]
    S2,
    H3,
}

/// S2 cells, levels 0 to 30.
#[derive(Debug, Clone, Copy)]
pub struct S2Grid {
    level: u8,
}

impl S2Grid {
    pub const MAX_LEVEL: u8 = 30;

    pub fn new(level: u8) -> Result<Self> {
        if level > Self::MAX_LEVEL {
            return Err(Error::InvalidLevel {
                grid: GridKind::S2,
                level,
                max: Self::MAX_LEVEL,
            });
        }
        Ok(Self { level })
    }
}

impl Grid for S2Grid {
    type Cell = CellID;

    fn level(&self) -> u8 {
        self.level
    }

    fn cell(&self, point: GeoPoint) -> Option<CellID> {
        if !point.lat.is_finite() || !point.lon.is_finite() {
            return None;
        }
        let leaf = CellID::from(S2LatLng::from_degrees(point.lat, point.lon));
        Some(leaf.parent(self.level.into()))
    }

    fn parent(&self, cell: CellID, level: u8) -> Option<CellID> {
        (u64::from(level) <= cell.level()).then(|| cell.parent(level.into()))
    }

    fn token(&self, cell: CellID) -> String {
        cell.to_token()
    }
}

/// H3 cells, resolutions 0 to 15.
///
/// Points are indexed at the finest resolution and then walked up, so a cell's
/// count always equals the sum of its children's counts.
#[derive(Debug, Clone, Copy)]
pub struct H3Grid {
    resolution: Resolution,
}

impl H3Grid {
    pub const MAX_LEVEL: u8 = 15;

    pub fn new(level: u8) -> Result<Self> {
        let resolution = Resolution::try_from(level).map_err(|_| Error::InvalidLevel {
            grid: GridKind::H3,
            level,
            max: Self::MAX_LEVEL,
        })?;
        Ok(Self { resolution })
    }
}

impl Grid for H3Grid {
    type Cell = CellIndex;

    fn level(&self) -> u8 {
        self.resolution.into()
    }

    fn cell(&self, point: GeoPoint) -> Option<CellIndex> {
        let pos = LatLng::new(point.lat, point.lon).ok()?;
        pos.to_cell(Resolution::Fifteen).parent(self.resolution)
    }

    fn parent(&self, cell: CellIndex, level: u8) -> Option<CellIndex> {
        cell.parent(Resolution::try_from(level).ok()?)
    }

    fn token(&self, cell: CellIndex) -> String {
        cell.to_string()
    }
}
