// Upstream boundary: rendered pages and text-block geometry.
//
// The core never parses a PDF. A PageSource supplies rendered pixel buffers
// and text-block rectangles; the pdfium-backed implementation lives behind
// the `render` feature.

#[cfg(feature = "render")]
pub mod pdfium;

use image::DynamicImage;

/// PDF default user unit: 1 point = 1/72 inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Axis-aligned rectangle in PDF points, top-left origin.
///
/// Providers working in bottom-left PDF coordinates must flip the y axis
/// before handing rectangles to the core (see `page::pdfium`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PdfRect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        PdfRect { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// Axis-aligned rectangle in raster pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        PixelRect { x, y, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Area of the intersection with `other`, 0 when disjoint.
    pub fn intersection_area(&self, other: &PixelRect) -> u64 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        (x1 - x0) as u64 * (y1 - y0) as u64
    }

    /// Intersection-over-Union against `other`. 0.0 when either is empty.
    pub fn iou(&self, other: &PixelRect) -> f32 {
        let inter = self.intersection_area(other);
        if inter == 0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        inter as f32 / union as f32
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        PixelRect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// One rectangle of page text, in PDF points (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBlock {
    pub rect: PdfRect,
}

/// One rendered page plus the geometry needed to map pixels back to points.
///
/// Created once per page, read-only afterwards, dropped when that page's
/// candidates have been processed.
pub struct RenderedPage {
    /// 0-indexed page number.
    pub index: u32,
    pub image: DynamicImage,
    pub dpi: u32,
    /// Physical page size in PDF points.
    pub page_width_pts: f32,
    pub page_height_pts: f32,
}

impl RenderedPage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixels per PDF point at this page's DPI.
    pub fn pixels_per_point(&self) -> f32 {
        self.dpi as f32 / POINTS_PER_INCH
    }

    /// Map a pixel rectangle into PDF points.
    pub fn to_pdf_rect(&self, r: &PixelRect) -> PdfRect {
        let s = self.pixels_per_point();
        PdfRect::new(
            r.x as f32 / s,
            r.y as f32 / s,
            r.right() as f32 / s,
            r.bottom() as f32 / s,
        )
    }

    /// Map a PDF-point rectangle into pixels, clamped to the raster bounds.
    pub fn to_pixel_rect(&self, r: &PdfRect) -> PixelRect {
        let s = self.pixels_per_point();
        let x0 = ((r.x0 * s).floor().max(0.0) as u32).min(self.width());
        let y0 = ((r.y0 * s).floor().max(0.0) as u32).min(self.height());
        let x1 = ((r.x1 * s).ceil().max(0.0) as u32).min(self.width());
        let y1 = ((r.y1 * s).ceil().max(0.0) as u32).min(self.height());
        PixelRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// Upstream page/text provider.
///
/// Supplies, per page, a rendered pixel buffer with its physical size in PDF
/// points and the page's text-block rectangles. `render_region` re-renders a
/// sub-rectangle at a caller-chosen DPI for the fidelity upgrader.
pub trait PageSource {
    fn page_count(&self) -> u32;

    fn render_page(&self, page_index: u32, dpi: u32) -> crate::error::Result<RenderedPage>;

    fn render_region(
        &self,
        page_index: u32,
        region: &PdfRect,
        dpi: u32,
    ) -> crate::error::Result<DynamicImage>;

    fn text_blocks(&self, page_index: u32) -> crate::error::Result<Vec<TextBlock>>;
}
