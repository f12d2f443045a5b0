// Sobel gradients, binary thresholding, and box dilation over grayscale
// buffers. Pure Rust over `image` types; no external vision library.

use image::GrayImage;

use crate::detect::mask::TextMask;

/// Per-pixel Sobel gradient components for one rendered page.
///
/// `horizontal` is the absolute y-gradient (energy of horizontally oriented
/// edges, strong across text lines); `vertical` the absolute x-gradient.
pub struct GradientField {
    pub width: u32,
    pub height: u32,
    pub magnitude: Vec<u8>,
    pub horizontal: Vec<u16>,
    pub vertical: Vec<u16>,
}

impl GradientField {
    pub fn magnitude_at(&self, x: u32, y: u32) -> u8 {
        self.magnitude[y as usize * self.width as usize + x as usize]
    }
}

/// Binary pixel grid, one byte per pixel.
#[derive(Clone)]
pub struct BitMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl BitMap {
    pub fn new(width: u32, height: u32) -> Self {
        BitMap {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize] != 0
    }

    pub fn set(&mut self, x: u32, y: u32) {
        self.data[y as usize * self.width as usize + x as usize] = 1;
    }
}

/// Compute the Sobel gradient field of `gray`.
///
/// Magnitude is `(|gx| + |gy|) / 8`, clamped to 255 — the same scale for
/// every page, so thresholds in [`crate::config::detector::DetectorConfig`]
/// are comparable across documents.
pub fn sobel(gray: &GrayImage) -> GradientField {
    let (w, h) = (gray.width(), gray.height());
    let mut field = GradientField {
        width: w,
        height: h,
        magnitude: vec![0; w as usize * h as usize],
        horizontal: vec![0; w as usize * h as usize],
        vertical: vec![0; w as usize * h as usize],
    };
    if w < 3 || h < 3 {
        return field;
    }

    let px = |x: u32, y: u32| -> i32 { gray.get_pixel(x, y).0[0] as i32 };

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            let gy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));

            let idx = y as usize * w as usize + x as usize;
            field.vertical[idx] = gx.unsigned_abs().min(u16::MAX as u32) as u16;
            field.horizontal[idx] = gy.unsigned_abs().min(u16::MAX as u32) as u16;
            field.magnitude[idx] = ((gx.abs() + gy.abs()) / 8).min(255) as u8;
        }
    }

    field
}

/// Zero the gradient response wherever the text mask is set, so glyph
/// outlines never seed candidate contours.
pub fn suppress_masked(field: &mut GradientField, mask: &TextMask) {
    debug_assert_eq!(field.width, mask.width());
    debug_assert_eq!(field.height, mask.height());
    for y in 0..field.height {
        for x in 0..field.width {
            if mask.is_set(x, y) {
                let idx = y as usize * field.width as usize + x as usize;
                field.magnitude[idx] = 0;
                field.horizontal[idx] = 0;
                field.vertical[idx] = 0;
            }
        }
    }
}

/// Binarize the gradient magnitude at `threshold`. A zero threshold is
/// clamped to 1 so flat regions never binarize to all-on.
pub fn threshold(field: &GradientField, threshold: u8) -> BitMap {
    let cutoff = threshold.max(1);
    let mut map = BitMap::new(field.width, field.height);
    for (i, &m) in field.magnitude.iter().enumerate() {
        if m >= cutoff {
            map.data[i] = 1;
        }
    }
    map
}

/// Box dilation by `radius`, as two separable passes. Connects nearby edge
/// fragments into closed contours before component extraction.
pub fn dilate(map: &BitMap, radius: u32) -> BitMap {
    if radius == 0 {
        return map.clone();
    }
    let (w, h) = (map.width, map.height);
    let r = radius as i64;

    // Horizontal pass
    let mut horiz = BitMap::new(w, h);
    for y in 0..h {
        let row = y as usize * w as usize;
        let mut run_until: i64 = -1;
        for x in 0..w as i64 {
            if map.data[row + x as usize] != 0 {
                run_until = x + r;
                let start = (x - r).max(0);
                for fx in start..x {
                    horiz.data[row + fx as usize] = 1;
                }
            }
            if x <= run_until {
                horiz.data[row + x as usize] = 1;
            }
        }
    }

    // Vertical pass
    let mut out = BitMap::new(w, h);
    for x in 0..w as usize {
        let mut run_until: i64 = -1;
        for y in 0..h as i64 {
            if horiz.data[y as usize * w as usize + x] != 0 {
                run_until = y + r;
                let start = (y - r).max(0);
                for fy in start..y {
                    out.data[fy as usize * w as usize + x] = 1;
                }
            }
            if y <= run_until {
                out.data[y as usize * w as usize + x] = 1;
            }
        }
    }

    out
}
