use std::sync::LazyLock;

use regex::bytes::Regex;

use super::{tokenize::RawToken, GeoPoint};

// page id, tag id, globe, primary flag, lat, lon, then fields we don't need
static GEOTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+,[0-9]+,'earth',[0-9]+,([0-9\-.]+),([0-9\-.]+),")
        .expect("geotag pattern is valid")
});

/// Pulls the coordinates out of a `geo_tags` tuple.
///
/// Returns `None` for anything that isn't shaped like an earth geotag. A
/// coordinate that matches the shape but doesn't parse as a number becomes
/// `0.0`, which turns the point into [`GeoPoint::SENTINEL`] when both fail.
pub fn extract(token: RawToken<'_>) -> Option<GeoPoint> {
    let caps = GEOTAG.captures(token.0)?;
    Some(GeoPoint {
        lat: coordinate(&caps[1]),
        lon: coordinate(&caps[2]),
    })
}

fn coordinate(bytes: &[u8]) -> f64 {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}
