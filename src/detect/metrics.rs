// Scalar statistics over a candidate rectangle. Every gate consumes these
// precomputed numbers, never the pixels, so gates stay unit-testable with
// synthetic inputs.

use image::GrayImage;

use crate::detect::contours;
use crate::detect::edges::{BitMap, GradientField};
use crate::detect::mask::TextMask;
use crate::page::PixelRect;

/// Statistics the role/quality gates and the scorer consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    /// Standard deviation of luma inside the box.
    pub luma_stddev: f32,
    /// Fraction of pixels that are edge pixels (fine pass).
    pub edge_density: f32,
    /// Fraction of pixels within the configured window of the median luma.
    pub uniformity: f32,
    /// Connected edge components per pixel; high for glyph clusters.
    pub component_density: f32,
    /// Horizontally- vs vertically-oriented edge energy; high for text rows.
    pub hv_energy_ratio: f32,
    /// Fraction of the box covered by text-block rectangles.
    pub text_overlap: f32,
}

/// Compute the full statistics bundle for one candidate box.
pub fn region_stats(
    gray: &GrayImage,
    field: &GradientField,
    fine_edges: &BitMap,
    overlap_mask: &TextMask,
    rect: &PixelRect,
    uniformity_window: u8,
) -> RegionStats {
    RegionStats {
        luma_stddev: luma_stddev(gray, rect),
        edge_density: edge_density(fine_edges, rect),
        uniformity: uniformity(gray, rect, uniformity_window),
        component_density: component_density(fine_edges, rect),
        hv_energy_ratio: hv_energy_ratio(field, rect),
        text_overlap: overlap_mask.coverage_in(rect),
    }
}

/// Standard deviation of luma values inside `rect`.
pub fn luma_stddev(gray: &GrayImage, rect: &PixelRect) -> f32 {
    let x_end = rect.right().min(gray.width());
    let y_end = rect.bottom().min(gray.height());
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in rect.y..y_end {
        for x in rect.x..x_end {
            let v = gray.get_pixel(x, y).0[0] as f64;
            sum += v;
            sum_sq += v * v;
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64) - (mean * mean);
    variance.max(0.0).sqrt() as f32
}

/// Fraction of pixels in `rect` that are set in the edge map.
pub fn edge_density(edges: &BitMap, rect: &PixelRect) -> f32 {
    let x_end = rect.right().min(edges.width);
    let y_end = rect.bottom().min(edges.height);
    let mut on = 0u64;
    let mut total = 0u64;
    for y in rect.y..y_end {
        let row = y as usize * edges.width as usize;
        for x in rect.x..x_end {
            on += edges.data[row + x as usize] as u64;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    on as f32 / total as f32
}

/// Fraction of pixels whose luma lies within `window` of the median luma.
/// Near 1.0 for background texture and solid fills.
pub fn uniformity(gray: &GrayImage, rect: &PixelRect, window: u8) -> f32 {
    let x_end = rect.right().min(gray.width());
    let y_end = rect.bottom().min(gray.height());

    let mut histogram = [0u64; 256];
    let mut total = 0u64;
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }

    // Median from the histogram
    let mut seen = 0u64;
    let mut median = 0usize;
    for (value, &n) in histogram.iter().enumerate() {
        seen += n;
        if seen * 2 >= total {
            median = value;
            break;
        }
    }

    let lo = median.saturating_sub(window as usize);
    let hi = (median + window as usize).min(255);
    let near: u64 = histogram[lo..=hi].iter().sum();
    near as f32 / total as f32
}

/// Connected edge components per pixel of `rect`.
pub fn component_density(edges: &BitMap, rect: &PixelRect) -> f32 {
    if rect.area() == 0 {
        return 0.0;
    }
    let n = contours::components_in(edges, rect).len();
    n as f32 / rect.area() as f32
}

/// Horizontal-to-vertical edge-energy ratio inside `rect`.
///
/// Rows of text produce strong horizontally oriented structure, so the
/// ratio runs well above 1 on caption panels. Returns 1.0 when the box has
/// no measurable energy at all.
pub fn hv_energy_ratio(field: &GradientField, rect: &PixelRect) -> f32 {
    let x_end = rect.right().min(field.width);
    let y_end = rect.bottom().min(field.height);
    let mut horizontal = 0u64;
    let mut vertical = 0u64;
    for y in rect.y..y_end {
        let row = y as usize * field.width as usize;
        for x in rect.x..x_end {
            horizontal += field.horizontal[row + x as usize] as u64;
            vertical += field.vertical[row + x as usize] as u64;
        }
    }
    if horizontal == 0 && vertical == 0 {
        return 1.0;
    }
    horizontal as f32 / vertical.max(1) as f32
}
