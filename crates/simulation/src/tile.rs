//! Numeric tile addressing.
//!
//! A tile is addressed by a single `u32`: the x coordinate in the high 16 bits
//! and the y coordinate in the low 16 bits. Older saves keyed tiles by the
//! string `"x,y"`; [`xy_to_tile`] converts those keys.

/// Numeric tile identifier, `(x << 16) | y`.
pub type TileId = u32;

/// Largest coordinate representable in a [`TileId`].
pub const MAX_COORD: u32 = 0xFFFF;

/// Pack a coordinate pair into a [`TileId`].
///
/// Returns `None` if either coordinate does not fit in 16 bits.
pub fn point_to_tile(x: u32, y: u32) -> Option<TileId> {
    if x > MAX_COORD || y > MAX_COORD {
        return None;
    }
    Some((x << 16) | y)
}

/// Unpack a [`TileId`] into `(x, y)`.
pub fn tile_to_point(tile: TileId) -> (u32, u32) {
    (tile >> 16, tile & MAX_COORD)
}

/// Parse a legacy `"x,y"` coordinate key.
///
/// Whitespace around either component is tolerated. Anything else (missing
/// comma, negative or non-numeric components, out-of-range values) yields
/// `None`.
pub fn xy_to_tile(xy: &str) -> Option<TileId> {
    let (x, y) = xy.split_once(',')?;
    let x = x.trim().parse::<u32>().ok()?;
    let y = y.trim().parse::<u32>().ok()?;
    point_to_tile(x, y)
}

/// Format a [`TileId`] as its legacy `"x,y"` key.
pub fn tile_to_xy(tile: TileId) -> String {
    let (x, y) = tile_to_point(tile);
    format!("{x},{y}")
}
