//! Observation surface: screen and RAM views of the live state.
//!
//! Everything here is a pure read. RGB and grayscale output are recomputed
//! from the indexed frame on every call through the fixed palette tables.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ale_core::palette;

use crate::error::{Error, Result};

/// Borrowed indexed frame: one palette index per pixel, row-major.
#[derive(Clone, Copy, Debug)]
pub struct ScreenView<'a> {
    width: usize,
    height: usize,
    pixels: &'a [u8],
}

impl<'a> ScreenView<'a> {
    pub(crate) fn new(width: usize, height: usize, pixels: &'a [u8]) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.pixels
    }

    /// Palette index at (x, y), or `None` off-screen.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        (y < self.height).then(|| &self.pixels[y * self.width..(y + 1) * self.width])
    }

    /// Copy the indices into `out`. Returns the number of bytes written.
    pub fn indexed_into(&self, out: &mut [u8]) -> Result<usize> {
        let needed = self.pixels.len();
        check_len(needed, out)?;
        out[..needed].copy_from_slice(self.pixels);
        Ok(needed)
    }

    /// Expand to packed RGB, 3 bytes per pixel.
    pub fn rgb_into(&self, out: &mut [u8]) -> Result<usize> {
        let needed = self.pixels.len() * 3;
        check_len(needed, out)?;
        for (dst, &index) in out.chunks_exact_mut(3).zip(self.pixels) {
            dst.copy_from_slice(&palette::rgb(index));
        }
        Ok(needed)
    }

    /// Luminance, 1 byte per pixel.
    pub fn grayscale_into(&self, out: &mut [u8]) -> Result<usize> {
        let needed = self.pixels.len();
        check_len(needed, out)?;
        for (dst, &index) in out.iter_mut().zip(self.pixels) {
            *dst = palette::luminance(index);
        }
        Ok(needed)
    }

    pub fn to_rgb(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.pixels.len() * 3)?;
        out.resize(self.pixels.len() * 3, 0);
        self.rgb_into(&mut out)?;
        Ok(out)
    }

    /// Write the frame as an 8-bit RGB PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let rgb = self.to_rgb()?;
        let writer = BufWriter::new(File::create(path.as_ref())?);
        let mut encoder = png::Encoder::new(writer, self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgb)?;
        log::info!("saved screen to {}", path.as_ref().display());
        Ok(())
    }
}

/// Copy `data` into `out`, failing if `out` is too short.
pub(crate) fn copy_into(data: &[u8], out: &mut [u8]) -> Result<usize> {
    check_len(data.len(), out)?;
    out[..data.len()].copy_from_slice(data);
    Ok(data.len())
}

fn check_len(needed: usize, out: &[u8]) -> Result<()> {
    if out.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXELS: [u8; 6] = [0x00, 0x0E, 0x44, 0x1E, 0x0F, 0x00];

    fn view() -> ScreenView<'static> {
        ScreenView::new(3, 2, &PIXELS)
    }

    #[test]
    fn indexing_is_row_major() {
        let v = view();
        assert_eq!(v.get(1, 1), Some(0x0F));
        assert_eq!(v.get(3, 0), None);
        assert_eq!(v.row(1), Some(&PIXELS[3..6]));
        assert_eq!(v.row(2), None);
    }

    #[test]
    fn rgb_and_gray_derive_from_palette() {
        let v = view();
        let mut rgb = [0u8; 18];
        assert_eq!(v.rgb_into(&mut rgb).unwrap(), 18);
        assert_eq!(&rgb[3..6], &palette::rgb(0x0E));
        // Odd indices alias the even entry below.
        assert_eq!(&rgb[12..15], &rgb[3..6]);

        let mut gray = [0u8; 6];
        v.grayscale_into(&mut gray).unwrap();
        assert_eq!(gray[0], 0);
        assert_eq!(gray[1], palette::luminance(0x0E));
    }

    #[test]
    fn short_buffers_are_rejected() {
        let v = view();
        let mut rgb = [0u8; 17];
        assert!(matches!(
            v.rgb_into(&mut rgb),
            Err(Error::BufferTooSmall {
                needed: 18,
                available: 17
            })
        ));
        let mut out = [0u8; 2];
        assert!(matches!(
            copy_into(&[1, 2, 3], &mut out),
            Err(Error::BufferTooSmall { needed: 3, .. })
        ));
    }

    #[test]
    fn larger_buffers_are_filled_from_the_start() {
        let v = view();
        let mut out = [0xAAu8; 8];
        assert_eq!(v.indexed_into(&mut out).unwrap(), 6);
        assert_eq!(&out[..6], &PIXELS);
        assert_eq!(out[6], 0xAA);
    }
}
