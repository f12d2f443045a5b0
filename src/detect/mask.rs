// Text occupancy mask: page text-block rectangles rasterized to a binary
// buffer at page resolution.

use crate::page::{PdfRect, PixelRect, RenderedPage, TextBlock};

/// Binary occupancy buffer matching a page's raster dimensions. One byte per
/// pixel, 1 = covered by a text block.
pub struct TextMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl TextMask {
    /// Rasterize `blocks` into a mask for `page`, expanding every rectangle
    /// by `margin_pts` on each side. A zero margin gives the exact
    /// occupancy used for overlap measurement; the generator uses an
    /// expanded mask so glyph anti-aliasing does not leak edges.
    pub fn build(page: &RenderedPage, blocks: &[TextBlock], margin_pts: f32) -> TextMask {
        let mut mask = TextMask {
            width: page.width(),
            height: page.height(),
            data: vec![0; page.width() as usize * page.height() as usize],
        };

        for block in blocks {
            let r = &block.rect;
            let expanded = PdfRect::new(
                r.x0 - margin_pts,
                r.y0 - margin_pts,
                r.x1 + margin_pts,
                r.y1 + margin_pts,
            );
            mask.fill(&page.to_pixel_rect(&expanded));
        }

        mask
    }

    fn fill(&mut self, rect: &PixelRect) {
        let x1 = rect.right().min(self.width);
        let y1 = rect.bottom().min(self.height);
        for y in rect.y..y1 {
            let row = y as usize * self.width as usize;
            for x in rect.x..x1 {
                self.data[row + x as usize] = 1;
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize] != 0
    }

    /// Fraction of `rect` covered by the mask. Exact even when blocks
    /// overlap, unlike summing per-rectangle intersections.
    pub fn coverage_in(&self, rect: &PixelRect) -> f32 {
        if rect.area() == 0 {
            return 0.0;
        }
        let x1 = rect.right().min(self.width);
        let y1 = rect.bottom().min(self.height);
        let mut covered = 0u64;
        for y in rect.y..y1 {
            let row = y as usize * self.width as usize;
            for x in rect.x..x1 {
                covered += self.data[row + x as usize] as u64;
            }
        }
        covered as f32 / rect.area() as f32
    }
}
