//! Framebuffer shared between render workers and readers.

use std::sync::atomic::{AtomicU64, Ordering};

use tessel_math::Color;

use crate::renderer::ImageBuffer;
use crate::tile::TileResult;

/// Linear color buffer written concurrently by render workers.
///
/// Each channel is an `f64` stored as bits in an `AtomicU64`. Tiles are
/// disjoint, so a pixel only ever has one writer; relaxed ordering is
/// enough because completion is published through the scheduler's
/// counters. Readers may observe a mix of old and new pixels mid-render.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    channels: Vec<AtomicU64>,
}

impl FrameBuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        let zero = 0.0f64.to_bits();
        Self {
            width,
            height,
            channels: (0..len).map(|_| AtomicU64::new(zero)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        let i = self.offset(x, y);
        Color::new(
            f64::from_bits(self.channels[i].load(Ordering::Relaxed)),
            f64::from_bits(self.channels[i + 1].load(Ordering::Relaxed)),
            f64::from_bits(self.channels[i + 2].load(Ordering::Relaxed)),
        )
    }

    /// Set the pixel at (x, y).
    pub fn set(&self, x: u32, y: u32, color: Color) {
        let i = self.offset(x, y);
        self.channels[i].store(color.x.to_bits(), Ordering::Relaxed);
        self.channels[i + 1].store(color.y.to_bits(), Ordering::Relaxed);
        self.channels[i + 2].store(color.z.to_bits(), Ordering::Relaxed);
    }

    /// Copy a rendered tile into place.
    pub fn write_tile(&self, result: &TileResult) {
        let tile = &result.tile;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % tile.width;
            let local_y = i as u32 / tile.width;
            self.set(tile.x + local_x, tile.y + local_y, *color);
        }
    }

    /// Scale every pixel by `factor`, dimming the previous frame.
    ///
    /// Only call while no worker is writing.
    pub fn fade(&self, factor: f64) {
        for channel in &self.channels {
            let value = f64::from_bits(channel.load(Ordering::Relaxed));
            channel.store((value * factor).to_bits(), Ordering::Relaxed);
        }
    }

    pub fn clear(&self) {
        self.fade(0.0);
    }

    /// Copy the current contents into an image.
    pub fn snapshot(&self) -> ImageBuffer {
        let mut image = ImageBuffer::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                image.set(x, y, self.get(x, y));
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;

    #[test]
    fn test_set_and_get() {
        let fb = FrameBuffer::new(4, 3);
        assert_eq!(fb.get(3, 2), Color::ZERO);

        let c = Color::new(0.25, 1.5, -0.0);
        fb.set(3, 2, c);
        assert_eq!(fb.get(3, 2), c);
        assert_eq!(fb.get(2, 2), Color::ZERO);
    }

    #[test]
    fn test_write_tile_places_pixels() {
        let fb = FrameBuffer::new(8, 8);
        let tile = Tile::new(4, 2, 2, 3, 0);
        let pixels = (0..6).map(|i| Color::splat(i as f64)).collect();
        fb.write_tile(&TileResult {
            tile,
            pixels,
            samples: 6,
        });

        assert_eq!(fb.get(4, 2), Color::splat(0.0));
        assert_eq!(fb.get(5, 2), Color::splat(1.0));
        assert_eq!(fb.get(4, 3), Color::splat(2.0));
        assert_eq!(fb.get(5, 4), Color::splat(5.0));
    }

    #[test]
    fn test_fade_and_snapshot() {
        let fb = FrameBuffer::new(2, 2);
        fb.set(1, 0, Color::splat(0.8));
        fb.fade(0.5);

        let image = fb.snapshot();
        assert_eq!(image.get(1, 0), Color::splat(0.4));
        assert_eq!(image.get(0, 1), Color::ZERO);

        fb.clear();
        assert_eq!(fb.get(1, 0), Color::ZERO);
    }

    #[test]
    fn test_concurrent_disjoint_writes() {
        let fb = FrameBuffer::new(16, 16);
        std::thread::scope(|s| {
            for row in 0..16u32 {
                let fb = &fb;
                s.spawn(move || {
                    for x in 0..16 {
                        fb.set(x, row, Color::new(x as f64, row as f64, 1.0));
                    }
                });
            }
        });

        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(fb.get(x, y), Color::new(x as f64, y as f64, 1.0));
            }
        }
    }
}
