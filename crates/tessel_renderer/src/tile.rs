//! Image tiles, the unit of work handed to render workers.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tessel_math::Color;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::hittable::Hittable;
use crate::random::tile_seed;
use crate::renderer::render_pixel;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position of this tile in the render order
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Order in which tiles are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileOrder {
    /// Row by row from the top-left corner
    #[default]
    Scanline,
    /// Nearest to the image center first
    Spiral,
}

/// Split a `width × height` image into tiles of at most `tile_size` pixels
/// per side. Remainder tiles cover the right and bottom edges, so every
/// pixel belongs to exactly one tile.
pub fn create_tiles(width: u32, height: u32, tile_size: u32, order: TileOrder) -> Vec<Tile> {
    if tile_size == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let tiles_x = width.div_ceil(tile_size);
    let tiles_y = height.div_ceil(tile_size);
    let mut tiles = Vec::with_capacity((tiles_x * tiles_y) as usize);

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            let th = tile_size.min(height - y);
            tiles.push(Tile::new(x, y, tw, th, tiles.len()));
            x += tile_size;
        }
        y += tile_size;
    }

    if order == TileOrder::Spiral {
        sort_spiral(&mut tiles, width, height);
        for (i, tile) in tiles.iter_mut().enumerate() {
            tile.index = i;
        }
    }

    tiles
}

/// Sort tiles by distance of their centers from the image center.
fn sort_spiral(tiles: &mut [Tile], width: u32, height: u32) {
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;
    let dist = |t: &Tile| {
        let cx = t.x as f64 + t.width as f64 / 2.0;
        let cy = t.y as f64 + t.height as f64 / 2.0;
        (cx - center_x).powi(2) + (cy - center_y).powi(2)
    };

    // Stable, so equidistant tiles keep scanline order
    tiles.sort_by(|a, b| {
        dist(a)
            .partial_cmp(&dist(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Result of rendering a tile.
#[derive(Debug, Clone)]
pub struct TileResult {
    pub tile: Tile,
    /// Pixel colors in row-major order within the tile
    pub pixels: Vec<Color>,
    /// Camera samples actually traced
    pub samples: u64,
}

/// Render every pixel of `tile`.
///
/// The random stream depends only on the render seed and the tile index, so
/// the result does not depend on which thread renders the tile.
pub fn render_tile(
    tile: &Tile,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> TileResult {
    let mut rng = StdRng::seed_from_u64(tile_seed(config.seed, tile.index));
    let mut pixels = Vec::with_capacity(tile.pixel_count() as usize);
    let mut samples = 0;

    for local_y in 0..tile.height {
        for local_x in 0..tile.width {
            let estimate = render_pixel(
                camera,
                world,
                tile.x + local_x,
                tile.y + local_y,
                config,
                &mut rng,
            );
            samples += estimate.sample_count() as u64;
            pixels.push(estimate.mean());
        }
    }

    TileResult {
        tile: *tile,
        pixels,
        samples,
    }
}
