// Shared test fixtures: an in-memory PageSource over synthetic pages.
#![allow(dead_code)] // each test binary uses a different subset

use component_extract::page::{PageSource, PdfRect, RenderedPage, TextBlock};
use image::{imageops, DynamicImage, Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([245, 245, 240]);
pub const DARK: Rgb<u8> = Rgb([60, 50, 45]);

/// One synthetic page: a base raster at `base_dpi` plus its text blocks.
pub struct SyntheticPage {
    pub image: RgbImage,
    pub blocks: Vec<TextBlock>,
}

/// PageSource over prebuilt rasters. Re-renders at other DPIs are
/// simulated by resampling the base raster, which also makes every page
/// behave like raster-sourced art for the upscale probe.
pub struct SyntheticSource {
    pub pages: Vec<SyntheticPage>,
    pub base_dpi: u32,
}

impl SyntheticSource {
    pub fn single(image: RgbImage, base_dpi: u32) -> Self {
        SyntheticSource {
            pages: vec![SyntheticPage {
                image,
                blocks: Vec::new(),
            }],
            base_dpi,
        }
    }

    fn scaled(&self, page_index: u32, dpi: u32) -> RgbImage {
        let base = &self.pages[page_index as usize].image;
        if dpi == self.base_dpi {
            return base.clone();
        }
        let scale = dpi as f32 / self.base_dpi as f32;
        let w = ((base.width() as f32 * scale).round() as u32).max(1);
        let h = ((base.height() as f32 * scale).round() as u32).max(1);
        imageops::resize(base, w, h, imageops::FilterType::Nearest)
    }
}

impl PageSource for SyntheticSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn render_page(
        &self,
        page_index: u32,
        dpi: u32,
    ) -> component_extract::error::Result<RenderedPage> {
        let base = &self.pages[page_index as usize].image;
        let width_pts = base.width() as f32 * 72.0 / self.base_dpi as f32;
        let height_pts = base.height() as f32 * 72.0 / self.base_dpi as f32;
        Ok(RenderedPage {
            index: page_index,
            image: DynamicImage::ImageRgb8(self.scaled(page_index, dpi)),
            dpi,
            page_width_pts: width_pts,
            page_height_pts: height_pts,
        })
    }

    fn render_region(
        &self,
        page_index: u32,
        region: &PdfRect,
        dpi: u32,
    ) -> component_extract::error::Result<DynamicImage> {
        let full = self.scaled(page_index, dpi);
        let s = dpi as f32 / 72.0;
        let x = ((region.x0 * s).floor().max(0.0) as u32).min(full.width() - 1);
        let y = ((region.y0 * s).floor().max(0.0) as u32).min(full.height() - 1);
        let w = ((region.width() * s).ceil() as u32).clamp(1, full.width() - x);
        let h = ((region.height() * s).ceil() as u32).clamp(1, full.height() - y);
        Ok(DynamicImage::ImageRgb8(
            imageops::crop_imm(&full, x, y, w, h).to_image(),
        ))
    }

    fn text_blocks(&self, page_index: u32) -> component_extract::error::Result<Vec<TextBlock>> {
        Ok(self.pages[page_index as usize].blocks.clone())
    }
}

/// A light page background at the given pixel size.
pub fn blank_page(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, WHITE)
}

/// Draw a filled dark square with its top-left corner at (x, y).
pub fn draw_square(image: &mut RgbImage, x: u32, y: u32, side: u32) {
    for dy in 0..side.min(image.height().saturating_sub(y)) {
        for dx in 0..side.min(image.width().saturating_sub(x)) {
            image.put_pixel(x + dx, y + dy, DARK);
        }
    }
}

/// Render `page` once at the source's base DPI.
pub fn base_render(source: &SyntheticSource, page_index: u32) -> RenderedPage {
    source
        .render_page(page_index, source.base_dpi)
        .expect("synthetic render cannot fail")
}
