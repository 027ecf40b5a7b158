//! The tile-based world map. Immutable after load; every query is pure.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Water,
    Shallow,
    Land,
}

impl Tile {
    fn from_u8(v: u8) -> Tile {
        match v {
            0 => Tile::Water,
            1 => Tile::Shallow,
            _ => Tile::Land,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TerrainDoc {
    width: u32,
    height: u32,
    #[serde(rename = "tileSize")]
    tile_size: f64,
    tiles: Vec<Vec<u8>>,
}

#[derive(Debug, Error)]
pub enum TerrainLoadError {
    #[error("invalid terrain JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("terrain declares height {declared} but has {actual} tile rows")]
    RowCountMismatch { declared: u32, actual: usize },
}

/// Immutable tile grid loaded once from a JSON document
/// `{width, height, tileSize, tiles[row][col]}`.
#[derive(Debug, Clone)]
pub struct TerrainMap {
    width: u32,
    height: u32,
    tile_size: f64,
    tiles: Vec<Vec<Tile>>,
}

impl TerrainMap {
    pub fn from_json(data: &str) -> Result<Self, TerrainLoadError> {
        let doc: TerrainDoc = serde_json::from_str(data)?;
        if doc.tiles.len() != doc.height as usize {
            return Err(TerrainLoadError::RowCountMismatch {
                declared: doc.height,
                actual: doc.tiles.len(),
            });
        }
        let tiles = doc
            .tiles
            .into_iter()
            .map(|row| row.into_iter().map(Tile::from_u8).collect())
            .collect();
        Ok(Self {
            width: doc.width,
            height: doc.height,
            tile_size: doc.tile_size,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn world_width(&self) -> f64 {
        self.width as f64 * self.tile_size
    }

    pub fn world_height(&self) -> f64 {
        self.height as f64 * self.tile_size
    }

    /// Out-of-bounds grid reads return LAND.
    pub fn get_tile_by_grid(&self, row: i64, col: i64) -> Tile {
        if row < 0 || col < 0 || row as u32 >= self.height || col as u32 >= self.width {
            return Tile::Land;
        }
        self.tiles[row as usize][col as usize]
    }

    pub fn get_tile(&self, world_x: f64, world_y: f64) -> Tile {
        let col = (world_x / self.tile_size).floor() as i64;
        let row = (world_y / self.tile_size).floor() as i64;
        self.get_tile_by_grid(row, col)
    }

    pub fn is_water(&self, world_x: f64, world_y: f64) -> bool {
        self.get_tile(world_x, world_y) == Tile::Water
    }

    pub fn is_shallow(&self, world_x: f64, world_y: f64) -> bool {
        self.get_tile(world_x, world_y) == Tile::Shallow
    }

    pub fn is_land(&self, world_x: f64, world_y: f64) -> bool {
        self.get_tile(world_x, world_y) == Tile::Land
    }

    pub fn is_passable(&self, world_x: f64, world_y: f64) -> bool {
        self.get_tile(world_x, world_y) != Tile::Land
    }

    /// Wrap a world coordinate into `[0, world_width)` / `[0, world_height)`.
    pub fn wrap(&self, x: f64, y: f64) -> (f64, f64) {
        (wrap_coord(x, self.world_width()), wrap_coord(y, self.world_height()))
    }
}

fn wrap_coord(v: f64, max: f64) -> f64 {
    let m = v % max;
    if m < 0.0 {
        m + max
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TerrainMap {
        let json = r#"{"width":3,"height":2,"tileSize":32,"tiles":[[0,1,2],[2,0,0]]}"#;
        TerrainMap::from_json(json).unwrap()
    }

    #[test]
    fn reads_tiles_by_world_position() {
        let map = sample();
        assert_eq!(map.get_tile(0.0, 0.0), Tile::Water);
        assert_eq!(map.get_tile(33.0, 0.0), Tile::Shallow);
        assert_eq!(map.get_tile(65.0, 0.0), Tile::Land);
    }

    #[test]
    fn out_of_bounds_is_land() {
        let map = sample();
        assert_eq!(map.get_tile_by_grid(-1, 0), Tile::Land);
        assert_eq!(map.get_tile_by_grid(0, 99), Tile::Land);
        assert!(!map.is_passable(-50.0, -50.0));
    }

    #[test]
    fn row_count_mismatch_is_rejected() {
        let json = r#"{"width":3,"height":5,"tileSize":32,"tiles":[[0,1,2]]}"#;
        assert!(TerrainMap::from_json(json).is_err());
    }
}
