use serde::Deserialize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_CELLS: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// What happens to sprite pixels that land past the right or bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// off-screen pixels are dropped
    #[default]
    Clip,
    /// off-screen pixels reappear on the opposite edge
    Wrap,
}

/// 64x32 monochrome screen, one byte per pixel valued 0 or 1, row-major from
/// the top-left corner.
pub struct Framebuffer {
    cells: Box<[u8]>,
    edges: EdgePolicy,
}

impl Framebuffer {
    pub fn new(edges: EdgePolicy) -> Self {
        Framebuffer {
            cells: vec![0u8; DISPLAY_CELLS].into_boxed_slice(),
            edges,
        }
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.cells[y * DISPLAY_WIDTH + x]
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    fn cell_index(&self, x: usize, y: usize) -> Option<usize> {
        match self.edges {
            EdgePolicy::Clip if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT => None,
            EdgePolicy::Clip => Some(y * DISPLAY_WIDTH + x),
            EdgePolicy::Wrap => Some((y % DISPLAY_HEIGHT) * DISPLAY_WIDTH + x % DISPLAY_WIDTH),
        }
    }

    /// XOR an 8-pixel-wide sprite onto the screen, one source byte per row
    /// (MSB leftmost). Returns true if any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collided = false;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let Some(idx) = self.cell_index(x as usize + col, y as usize + row) else {
                    continue;
                };
                collided |= self.cells[idx] == 1;
                self.cells[idx] ^= 1;
            }
        }
        collided
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLYPH_0: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    fn lit(fb: &Framebuffer) -> usize {
        fb.cells().iter().filter(|&&c| c == 1).count()
    }

    #[test]
    fn test_new_is_blank() {
        let fb = Framebuffer::new(EdgePolicy::Clip);
        assert_eq!(fb.cells().len(), 2048);
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn test_draw_glyph_zero_pattern() {
        let mut fb = Framebuffer::new(EdgePolicy::Clip);
        assert!(!fb.draw_sprite(0, 0, &GLYPH_0));
        #[rustfmt::skip]
        let expected: [[u8; 8]; 5] = [
            [1, 1, 1, 1, 0, 0, 0, 0],
            [1, 0, 0, 1, 0, 0, 0, 0],
            [1, 0, 0, 1, 0, 0, 0, 0],
            [1, 0, 0, 1, 0, 0, 0, 0],
            [1, 1, 1, 1, 0, 0, 0, 0],
        ];
        for (y, row) in expected.iter().enumerate() {
            for (x, &px) in row.iter().enumerate() {
                assert_eq!(fb.pixel(x, y), px, "pixel ({}, {})", x, y);
            }
        }
        assert_eq!(lit(&fb), 14);
    }

    #[test]
    fn test_draw_twice_erases_and_collides() {
        let mut fb = Framebuffer::new(EdgePolicy::Clip);
        assert!(!fb.draw_sprite(10, 7, &GLYPH_0));
        assert!(fb.draw_sprite(10, 7, &GLYPH_0));
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn test_overlap_without_erasing_lit_pixel_is_no_collision() {
        let mut fb = Framebuffer::new(EdgePolicy::Clip);
        fb.draw_sprite(0, 0, &[0xF0]);
        // only unlit pixels are touched
        assert!(!fb.draw_sprite(0, 0, &[0x0F]));
        assert_eq!(lit(&fb), 8);
    }

    #[test]
    fn test_clip_drops_offscreen_pixels() {
        let mut fb = Framebuffer::new(EdgePolicy::Clip);
        fb.draw_sprite(60, 30, &[0xFF, 0xFF, 0xFF]);
        assert_eq!(lit(&fb), 8);
        assert_eq!(fb.pixel(63, 31), 1);
        assert_eq!(fb.pixel(0, 0), 0);
    }

    #[test]
    fn test_wrap_reappears_on_far_edge() {
        let mut fb = Framebuffer::new(EdgePolicy::Wrap);
        fb.draw_sprite(60, 31, &[0xFF, 0x80]);
        assert_eq!(lit(&fb), 9);
        assert_eq!(fb.pixel(63, 31), 1);
        assert_eq!(fb.pixel(0, 31), 1);
        assert_eq!(fb.pixel(3, 31), 1);
        assert_eq!(fb.pixel(60, 0), 1);
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(EdgePolicy::Clip);
        fb.draw_sprite(3, 3, &GLYPH_0);
        fb.clear();
        assert_eq!(lit(&fb), 0);
    }
}
