use std::path::Path;

use thiserror::Error;

use crate::math::{Point, Rect};

/// RGBA, straight alpha.
pub type Color = [u8; 4];

#[derive(Debug, Error)]
pub enum PixmapError {
    #[error("failed to open image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("pixel buffer does not match {width}x{height}")]
    BufferSizeMismatch { width: u32, height: u32 },
}

/// A CPU-side RGBA image: sprite sheets, cell sheets, and the frame
/// the renderer paints into. All drawing ops clip to the bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Pixmap {
    /// A fully transparent pixmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, PixmapError> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(PixmapError::BufferSizeMismatch { width, height });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn load_png(path: &Path) -> Result<Self, PixmapError> {
        let decoded = image::ImageReader::open(path)?.decode()?.to_rgba8();
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            rgba: decoded.into_raw(),
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), PixmapError> {
        let buffer = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or(PixmapError::BufferSizeMismatch {
                width: self.width,
                height: self.height,
            })?;
        buffer.save(path)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let index = self.index(x, y)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[index..index + 4]);
        Some(color)
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(index) = self.index(x, y) {
            self.rgba[index..index + 4].copy_from_slice(&color);
        }
    }

    /// Alpha-blends one pixel onto the target.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        let index = match self.index(x, y) {
            Some(index) => index,
            None => return,
        };
        let alpha = color[3] as u32;
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.rgba[index..index + 4].copy_from_slice(&color);
            return;
        }
        for channel in 0..3 {
            let src = color[channel] as u32;
            let dst = self.rgba[index + channel] as u32;
            self.rgba[index + channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        let dst_alpha = self.rgba[index + 3] as u32;
        self.rgba[index + 3] = (alpha + dst_alpha * (255 - alpha) / 255) as u8;
    }

    pub fn fill(&mut self, color: Color) {
        for pixel in self.rgba.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.put_pixel(x, y, color);
            }
        }
    }

    pub fn draw_rect_outline(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        for x in rect.x..rect.right() {
            self.put_pixel(x, rect.y, color);
            self.put_pixel(x, rect.bottom() - 1, color);
        }
        for y in rect.y..rect.bottom() {
            self.put_pixel(rect.x, y, color);
            self.put_pixel(rect.right() - 1, y, color);
        }
    }

    /// Copies `src_rect` of `src` to `dst`, skipping fully
    /// transparent source pixels.
    pub fn blit(&mut self, src: &Pixmap, src_rect: Rect, dst: Point) {
        for sy in 0..src_rect.h {
            for sx in 0..src_rect.w {
                let color = match src.pixel(src_rect.x + sx, src_rect.y + sy) {
                    Some(color) if color[3] != 0 => color,
                    _ => continue,
                };
                self.put_pixel(dst.x + sx, dst.y + sy, color);
            }
        }
    }

    /// Like `blit`, but every source pixel is modulated by `tint`
    /// (per channel, including alpha) and alpha-blended. Used for
    /// translucent cells and actor shadows.
    pub fn blit_tinted(&mut self, src: &Pixmap, src_rect: Rect, dst: Point, tint: Color) {
        for sy in 0..src_rect.h {
            for sx in 0..src_rect.w {
                let color = match src.pixel(src_rect.x + sx, src_rect.y + sy) {
                    Some(color) if color[3] != 0 => color,
                    _ => continue,
                };
                let tinted = [
                    ((color[0] as u32 * tint[0] as u32) / 255) as u8,
                    ((color[1] as u32 * tint[1] as u32) / 255) as u8,
                    ((color[2] as u32 * tint[2] as u32) / 255) as u8,
                    ((color[3] as u32 * tint[3] as u32) / 255) as u8,
                ];
                self.blend_pixel(dst.x + sx, dst.y + sy, tinted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];
    const BLUE: Color = [0, 0, 255, 255];
    const CLEAR: Color = [0, 0, 0, 0];

    #[test]
    fn out_of_bounds_writes_are_clipped() {
        let mut pixmap = Pixmap::new(4, 4);
        pixmap.put_pixel(-1, 0, RED);
        pixmap.put_pixel(0, -1, RED);
        pixmap.put_pixel(4, 0, RED);
        pixmap.put_pixel(0, 4, RED);
        assert!(pixmap.rgba().iter().all(|&byte| byte == 0));

        pixmap.fill_rect(Rect::new(2, 2, 10, 10), BLUE);
        assert_eq!(pixmap.pixel(3, 3), Some(BLUE));
        assert_eq!(pixmap.pixel(1, 1), Some(CLEAR));
    }

    #[test]
    fn blit_skips_transparent_source_pixels() {
        let mut src = Pixmap::new(2, 1);
        src.put_pixel(0, 0, RED);
        // (1, 0) stays transparent.

        let mut dst = Pixmap::new(2, 1);
        dst.fill(BLUE);
        dst.blit(&src, Rect::new(0, 0, 2, 1), Point::ZERO);
        assert_eq!(dst.pixel(0, 0), Some(RED));
        assert_eq!(dst.pixel(1, 0), Some(BLUE));
    }

    #[test]
    fn tinted_blit_blends_toward_the_tint() {
        let mut src = Pixmap::new(1, 1);
        src.put_pixel(0, 0, [255, 255, 255, 255]);

        let mut dst = Pixmap::new(1, 1);
        dst.fill([0, 0, 0, 255]);
        // Half-strength black tint: a shadow wash.
        dst.blit_tinted(&src, Rect::new(0, 0, 1, 1), Point::ZERO, [0, 0, 0, 128]);
        let result = dst.pixel(0, 0).expect("pixel");
        assert_eq!(&result[0..3], &[0, 0, 0]);

        dst.fill([200, 200, 200, 255]);
        dst.blit_tinted(&src, Rect::new(0, 0, 1, 1), Point::ZERO, [255, 255, 255, 128]);
        let result = dst.pixel(0, 0).expect("pixel");
        // Halfway between the white source and the grey background.
        assert!(result[0] > 200 && result[0] < 255, "got {result:?}");
    }

    #[test]
    fn from_rgba_validates_buffer_length() {
        assert!(Pixmap::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            Pixmap::from_rgba(2, 2, vec![0; 15]),
            Err(PixmapError::BufferSizeMismatch { width: 2, height: 2 })
        ));
    }

    #[test]
    fn png_round_trips_through_a_temp_file() {
        let mut pixmap = Pixmap::new(3, 2);
        pixmap.put_pixel(0, 0, RED);
        pixmap.put_pixel(2, 1, BLUE);
        pixmap.put_pixel(1, 0, [10, 20, 30, 255]);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roundtrip.png");
        pixmap.save_png(&path).expect("save");
        let loaded = Pixmap::load_png(&path).expect("load");
        assert_eq!(loaded, pixmap);
    }

    #[test]
    fn outline_touches_only_the_border() {
        let mut pixmap = Pixmap::new(5, 5);
        pixmap.draw_rect_outline(Rect::new(1, 1, 3, 3), RED);
        assert_eq!(pixmap.pixel(1, 1), Some(RED));
        assert_eq!(pixmap.pixel(3, 3), Some(RED));
        assert_eq!(pixmap.pixel(2, 1), Some(RED));
        assert_eq!(pixmap.pixel(2, 2), Some(CLEAR));
        assert_eq!(pixmap.pixel(0, 0), Some(CLEAR));
    }
}
