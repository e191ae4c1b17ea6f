//! Shared fixtures for the codec tests.

#![allow(dead_code)]

use imgbridge::alpha::pack;
use imgbridge::{AlphaMode, PixelBuffer};

pub const RED: u32 = pack(255, 0, 0, 255);
pub const GREEN: u32 = pack(0, 255, 0, 255);
pub const BLUE: u32 = pack(0, 0, 255, 255);
pub const WHITE: u32 = pack(255, 255, 255, 255);

/// 2x2 image: red, green / blue, white.
pub fn quad() -> PixelBuffer {
    PixelBuffer::new(2, 2, vec![RED, GREEN, BLUE, WHITE], AlphaMode::Straight).unwrap()
}

/// Opaque `size` x `size` color gradient.
pub fn gradient(size: u32) -> PixelBuffer {
    let mut pixels = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let r = (x * 255 / (size - 1)) as u8;
            let g = (y * 255 / (size - 1)) as u8;
            let b = ((x + y) * 255 / (2 * (size - 1))) as u8;
            pixels.push(pack(r, g, b, 255));
        }
    }
    PixelBuffer::new(size, size, pixels, AlphaMode::Straight).unwrap()
}

/// 3x1 straight-alpha image with partial transparency.
pub fn translucent() -> PixelBuffer {
    PixelBuffer::new(
        3,
        1,
        vec![
            pack(200, 100, 50, 128),
            pack(10, 250, 90, 200),
            pack(0, 0, 0, 0),
        ],
        AlphaMode::Straight,
    )
    .unwrap()
}

/// Install a test subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
