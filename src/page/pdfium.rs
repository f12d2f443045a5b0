// pdfium-render backed PageSource: page/clip rasterization + text bounds.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;

use crate::page::{PageSource, PdfRect, RenderedPage, TextBlock};

/// Resolves the path to the pdfium shared library.
///
/// Search order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` environment variable
/// 2. `vendor/pdfium/lib/` relative to the project root (for development)
fn resolve_pdfium_lib_path() -> crate::error::Result<PathBuf> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let p = PathBuf::from(&path);
        if p.exists() {
            return Ok(p);
        }
        return Err(crate::error::ExtractError::render(format!(
            "PDFIUM_DYNAMIC_LIB_PATH is set to '{}' but the path does not exist",
            path
        )));
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let vendor_path = PathBuf::from(&manifest_dir).join("vendor/pdfium/lib");
        if vendor_path.exists() {
            return Ok(vendor_path);
        }
    }

    Err(crate::error::ExtractError::render(
        "pdfium library not found: set PDFIUM_DYNAMIC_LIB_PATH or place libpdfium.so in vendor/pdfium/lib/",
    ))
}

/// Creates a new Pdfium instance by dynamically loading the shared library.
fn create_pdfium() -> crate::error::Result<Pdfium> {
    let lib_path = resolve_pdfium_lib_path()?;
    let lib_path_str = lib_path.to_str().ok_or_else(|| {
        crate::error::ExtractError::render("pdfium library path contains non-UTF-8 characters")
    })?;
    let bindings =
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(lib_path_str))
            .map_err(|e| crate::error::ExtractError::render(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

/// PageSource over a PDF file via pdfium.
///
/// The document is re-opened per call so the source stays `'static`; pdfium
/// keeps its own page cache, and the pipeline touches each page once anyway.
pub struct PdfiumSource {
    pdf_path: PathBuf,
    pdfium: Pdfium,
    page_count: u32,
}

impl PdfiumSource {
    pub fn open(pdf_path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let pdfium = create_pdfium()?;
        let pdf_path = pdf_path.as_ref().to_path_buf();
        let page_count = {
            let document = pdfium
                .load_pdf_from_file(&pdf_path, None)
                .map_err(|e| crate::error::ExtractError::render(e.to_string()))?;
            document.pages().len() as u32
        };
        Ok(PdfiumSource {
            pdf_path,
            pdfium,
            page_count,
        })
    }

    fn with_page<T>(
        &self,
        page_index: u32,
        f: impl FnOnce(&PdfPage) -> crate::error::Result<T>,
    ) -> crate::error::Result<T> {
        let document = self
            .pdfium
            .load_pdf_from_file(&self.pdf_path, None)
            .map_err(|e| crate::error::ExtractError::render(e.to_string()))?;
        let page_index_u16 = u16::try_from(page_index)
            .map_err(|_| crate::error::ExtractError::render("page index exceeds u16 range"))?;
        let page = document
            .pages()
            .get(page_index_u16)
            .map_err(|e| crate::error::ExtractError::render(e.to_string()))?;
        f(&page)
    }

    fn render_bitmap(page: &PdfPage, dpi: u32) -> crate::error::Result<DynamicImage> {
        // 1 point = 1/72 inch; each point maps to (dpi / 72) pixels.
        let width_pts = page.width().value;
        let height_pts = page.height().value;
        let width_px = (width_pts * dpi as f32 / 72.0).round() as i32;
        let height_px = (height_pts * dpi as f32 / 72.0).round() as i32;

        let config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_target_height(height_px);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| crate::error::ExtractError::render(e.to_string()))?;

        Ok(bitmap.as_image())
    }
}

impl PageSource for PdfiumSource {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn render_page(&self, page_index: u32, dpi: u32) -> crate::error::Result<RenderedPage> {
        self.with_page(page_index, |page| {
            let width_pts = page.width().value;
            let height_pts = page.height().value;
            let image = Self::render_bitmap(page, dpi)?;
            Ok(RenderedPage {
                index: page_index,
                image,
                dpi,
                page_width_pts: width_pts,
                page_height_pts: height_pts,
            })
        })
    }

    fn render_region(
        &self,
        page_index: u32,
        region: &PdfRect,
        dpi: u32,
    ) -> crate::error::Result<DynamicImage> {
        self.with_page(page_index, |page| {
            let full = Self::render_bitmap(page, dpi)?;
            let s = dpi as f32 / 72.0;
            let x = ((region.x0 * s).floor().max(0.0) as u32).min(full.width());
            let y = ((region.y0 * s).floor().max(0.0) as u32).min(full.height());
            let w = ((region.width() * s).ceil() as u32).min(full.width() - x);
            let h = ((region.height() * s).ceil() as u32).min(full.height() - y);
            if w == 0 || h == 0 {
                return Err(crate::error::ExtractError::render(format!(
                    "clip region ({:.1},{:.1})-({:.1},{:.1}) is empty at {} dpi",
                    region.x0, region.y0, region.x1, region.y1, dpi
                )));
            }
            Ok(full.crop_imm(x, y, w, h))
        })
    }

    fn text_blocks(&self, page_index: u32) -> crate::error::Result<Vec<TextBlock>> {
        self.with_page(page_index, |page| {
            let page_height = page.height().value;
            let mut blocks = Vec::new();
            for object in page.objects().iter() {
                if object.object_type() != PdfPageObjectType::Text {
                    continue;
                }
                let Ok(bounds) = object.bounds() else {
                    continue;
                };
                // pdfium uses bottom-left origin; the core wants top-left.
                blocks.push(TextBlock {
                    rect: PdfRect::new(
                        bounds.left().value,
                        page_height - bounds.top().value,
                        bounds.right().value,
                        page_height - bounds.bottom().value,
                    ),
                });
            }
            Ok(blocks)
        })
    }
}
