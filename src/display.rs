use std::path::Path;

use image::{
    GrayImage,
    ImageResult,
    Luma,
};

use crate::constants::{
    SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

/// 64x32 monochrome framebuffer. `true` is a lit pixel.
///
/// Cloning is the supported way to hand a frame to a renderer that runs
/// outside the emulation loop.
#[derive(Clone, PartialEq, Eq)]
pub struct Display {
    pixels: [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT],
}

impl Display {
    pub const WIDTH: usize = SCREEN_WIDTH;
    pub const HEIGHT: usize = SCREEN_HEIGHT;

    pub fn new() -> Self {
        Self {
            pixels: [[false; SCREEN_WIDTH]; SCREEN_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; SCREEN_WIDTH]; SCREEN_HEIGHT];
    }

    /// Out of range coordinates read as unlit.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// XORs a single sprite bit into the frame. Returns true when a lit pixel was turned off.
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        match self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
            Some(pixel) => {
                let collided = *pixel;
                *pixel = !*pixel;
                collided
            }
            None => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool; SCREEN_WIDTH]> {
        self.pixels.iter()
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().flatten().filter(|&&lit| lit).count()
    }

    pub fn to_image(&self, scale: u32) -> GrayImage {
        let scale = scale.max(1);
        GrayImage::from_fn(
            SCREEN_WIDTH as u32 * scale,
            SCREEN_HEIGHT as u32 * scale,
            |x, y| {
                let lit = self.pixel((x / scale) as usize, (y / scale) as usize);
                Luma([if lit { 0xFF } else { 0x00 }])
            },
        )
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P, scale: u32) -> ImageResult<()> {
        self.to_image(scale).save(path)
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.pixels {
            let line: String = row.iter().map(|&lit| if lit { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_reports_collision() {
        let mut display = Display::new();
        assert!(!display.flip(3, 4));
        assert!(display.pixel(3, 4));
        assert!(display.flip(3, 4));
        assert!(!display.pixel(3, 4));
    }

    #[test]
    fn off_screen_flip_is_ignored() {
        let mut display = Display::new();
        assert!(!display.flip(Display::WIDTH, 0));
        assert!(!display.flip(0, Display::HEIGHT));
        assert_eq!(display.lit_count(), 0);
    }

    #[test]
    fn image_is_scaled() {
        let mut display = Display::new();
        display.flip(1, 0);
        let img = display.to_image(2);
        assert_eq!(img.dimensions(), (128, 64));
        assert_eq!(img.get_pixel(2, 0).0, [0xFF]);
        assert_eq!(img.get_pixel(3, 1).0, [0xFF]);
        assert_eq!(img.get_pixel(0, 0).0, [0x00]);
    }
}
