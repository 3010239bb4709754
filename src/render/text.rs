use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};

use super::color::Rgba;
use super::surface::Surface;

/// Rasterizes label text onto a surface. The player ships no embedded font;
/// the binary supplies one via `--font` or `--font-url`.
pub struct TextOverlay {
    font: Font,
    font_size: f32,
}

impl TextOverlay {
    pub fn from_bytes(bytes: &[u8], font_size: f32) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("failed to parse font: {}", e))?;
        Ok(Self { font, font_size })
    }

    pub fn from_file(path: &std::path::Path, font_size: f32) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font file: {}", path.display()))?;
        Self::from_bytes(&bytes, font_size)
    }

    /// Composite text onto the surface at the given position.
    pub fn composite(&self, surface: &mut Surface, text: &str, x: i32, y: i32, color: Rgba) {
        let mut cursor_x = x;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.font_size);
            let glyph_y = y + self.font_size as i32 - metrics.height as i32 - metrics.ymin;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = bitmap[gy * metrics.width + gx];
                    if alpha == 0 {
                        continue;
                    }
                    let px = cursor_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px < 0
                        || py < 0
                        || px >= surface.width() as i32
                        || py >= surface.height() as i32
                    {
                        continue;
                    }

                    let under = surface.pixel(px as u32, py as u32);
                    let a = alpha as f32 / 255.0 * (color.a as f32 / 255.0);
                    let inv_a = 1.0 - a;
                    surface.set_pixel(
                        px,
                        py,
                        Rgba {
                            r: (color.r as f32 * a + under.r as f32 * inv_a) as u8,
                            g: (color.g as f32 * a + under.g as f32 * inv_a) as u8,
                            b: (color.b as f32 * a + under.b as f32 * inv_a) as u8,
                            a: 255,
                        },
                    );
                }
            }

            cursor_x += metrics.advance_width as i32;
        }
    }

    /// Measure the width of rendered text in pixels.
    pub fn measure_width(&self, text: &str) -> u32 {
        let mut width = 0.0f32;
        for ch in text.chars() {
            let (metrics, _) = self.font.rasterize(ch, self.font_size);
            width += metrics.advance_width;
        }
        width.ceil() as u32
    }
}

/// Download font bytes (TTF/OTF) from a URL.
pub fn load_font_from_url(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading font from {}", url);
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("failed to download font from {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("font download returned HTTP {}", response.status());
    }
    let bytes = response
        .bytes()
        .context("failed to read font response body")?;
    Ok(bytes.to_vec())
}
