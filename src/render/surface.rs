use super::color::Rgba;

/// An owned RGBA pixel surface. Drawing is clipped to the surface bounds;
/// coordinate origin is top-left.
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        let mut surface = Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        };
        surface.clear(background);
        surface
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = ((y * self.width + x) * 4) as usize;
        Rgba {
            r: self.pixels[i],
            g: self.pixels[i + 1],
            b: self.pixels[i + 2],
            a: self.pixels[i + 3],
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = color.a;
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
        self.pixels[i + 3] = color.a;
    }

    /// Fill a rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as i32).min(self.width as i32);
        let y1 = (y + h as i32).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw a line segment with the given stroke thickness. Thickness is
    /// applied vertically, which is what the polyline renderers need.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: u32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            for t in 0..thickness as i32 {
                self.set_pixel(x, y + t, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Shift the entire pixel content down by one row. Row 0 is left as-is
    /// and must be repainted by the caller; the bottom row falls off. The
    /// previous content is read before anything is overwritten.
    pub fn shift_down_one_row(&mut self) {
        if self.height < 2 {
            return;
        }
        let stride = (self.width * 4) as usize;
        let len = self.pixels.len();
        self.pixels.copy_within(0..len - stride, stride);
    }

    /// Copy this surface into `frame` (an RGBA buffer of width `frame_width`)
    /// starting at pixel row `y_offset`. Used to stack the four views into
    /// one recorded frame.
    pub fn blit_into(&self, frame: &mut [u8], frame_width: u32, y_offset: u32) {
        debug_assert_eq!(self.width, frame_width);
        let stride = (frame_width * 4) as usize;
        let start = y_offset as usize * stride;
        frame[start..start + self.pixels.len()].copy_from_slice(&self.pixels);
    }
}
