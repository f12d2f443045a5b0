// Colorspace normalization: arbitrary declared source colorspace to
// canonical RGB/RGBA, or a typed failure. No branch returns silently empty.

pub mod convert;

use image::DynamicImage;

/// Declared colorspace of a raw pixel buffer, as reported by the upstream
/// provider. The normalizer trusts the declaration only as a starting point;
/// every family has fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceColorspace {
    Rgb { alpha: bool },
    Gray { alpha: bool },
    Cmyk,
    Icc { components: u8, profile: Vec<u8> },
    Indexed { palette: Vec<[u8; 3]>, bits: u8 },
    Unknown(String),
}

impl SourceColorspace {
    /// Family name used in logs and the colorspace histogram.
    pub fn family(&self) -> &'static str {
        match self {
            SourceColorspace::Rgb { .. } => "rgb",
            SourceColorspace::Gray { .. } => "gray",
            SourceColorspace::Cmyk => "cmyk",
            SourceColorspace::Icc { .. } => "icc",
            SourceColorspace::Indexed { .. } => "indexed",
            SourceColorspace::Unknown(_) => "unknown",
        }
    }
}

/// Page- or crop-scoped pixel data plus its declared interpretation.
#[derive(Debug, Clone)]
pub struct RawPixelBuffer {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub colorspace: SourceColorspace,
    pub data: Vec<u8>,
}

impl RawPixelBuffer {
    /// Wrap an already-decoded raster (the rasterizer path). RGBA sources
    /// keep their alpha declaration so it survives normalization.
    pub fn from_dynamic(image: &DynamicImage) -> RawPixelBuffer {
        match image {
            DynamicImage::ImageRgb8(rgb) => RawPixelBuffer {
                width: rgb.width(),
                height: rgb.height(),
                bits_per_component: 8,
                colorspace: SourceColorspace::Rgb { alpha: false },
                data: rgb.as_raw().clone(),
            },
            DynamicImage::ImageLuma8(gray) => RawPixelBuffer {
                width: gray.width(),
                height: gray.height(),
                bits_per_component: 8,
                colorspace: SourceColorspace::Gray { alpha: false },
                data: gray.as_raw().clone(),
            },
            other => {
                let rgba = other.to_rgba8();
                RawPixelBuffer {
                    width: rgba.width(),
                    height: rgba.height(),
                    bits_per_component: 8,
                    colorspace: SourceColorspace::Rgb { alpha: true },
                    data: rgba.into_raw(),
                }
            }
        }
    }
}

/// Canonical output pixel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Rgb,
    Rgba,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Rgb => "rgb",
            OutputMode::Rgba => "rgba",
        }
    }
}

/// Terminal failure reason codes. These classify outcomes; they are not
/// error types and never abort sibling candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Malformed or zero-area source, aborted before conversion.
    PixmapInvalid,
    /// No strategy produced a usable buffer.
    ColorspaceUnsupported,
    /// Alpha channel could not be applied to the color samples.
    AlphaApplyFailed,
    /// A conversion step itself failed.
    ConversionError,
    /// Write/verify/rename failed during persistence.
    SaveError,
}

impl FailureReason {
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::PixmapInvalid => "pixmap_invalid",
            FailureReason::ColorspaceUnsupported => "colorspace_unsupported",
            FailureReason::AlphaApplyFailed => "alpha_apply_failed",
            FailureReason::ConversionError => "conversion_error",
            FailureReason::SaveError => "save_error",
        }
    }
}

/// Warning code for a profile-aware conversion that fell back but succeeded.
pub const WARN_ICC_FALLBACK: &str = "icc_profile_invalid_fallback";
/// Warning code for palette decode falling back to gray interpretation.
pub const WARN_INDEXED_GRAY: &str = "indexed_gray_fallback";
/// Warning code for palette decode falling back to raw-sample reconstruction.
pub const WARN_INDEXED_RAW: &str = "indexed_raw_reconstruction";

/// A usable canonical buffer plus the operations and warnings that produced
/// it.
#[derive(Debug)]
pub struct NormalizedPixels {
    pub image: DynamicImage,
    pub mode: OutputMode,
    /// Conversion operations applied, for the health histogram.
    pub ops: Vec<&'static str>,
    pub warnings: Vec<String>,
}

/// A classified normalization failure.
#[derive(Debug, Clone)]
pub struct NormalizeFailure {
    pub reason: FailureReason,
    pub detail: String,
}

impl NormalizeFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        NormalizeFailure {
            reason,
            detail: detail.into(),
        }
    }
}

/// One dispatch entry: a predicate on the declared colorspace and the
/// strategy that handles it. Tried strictly in order.
struct Strategy {
    name: &'static str,
    applies: fn(&SourceColorspace) -> bool,
    convert: fn(&RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure>,
}

fn is_rgb(cs: &SourceColorspace) -> bool {
    matches!(cs, SourceColorspace::Rgb { .. })
}
fn is_gray(cs: &SourceColorspace) -> bool {
    matches!(cs, SourceColorspace::Gray { .. })
}
fn is_cmyk(cs: &SourceColorspace) -> bool {
    matches!(cs, SourceColorspace::Cmyk)
}
fn is_icc(cs: &SourceColorspace) -> bool {
    matches!(cs, SourceColorspace::Icc { .. })
}
fn is_indexed(cs: &SourceColorspace) -> bool {
    matches!(cs, SourceColorspace::Indexed { .. })
}
fn is_unknown(cs: &SourceColorspace) -> bool {
    matches!(cs, SourceColorspace::Unknown(_))
}

static STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "rgb",
        applies: is_rgb,
        convert: convert::rgb_family,
    },
    Strategy {
        name: "gray",
        applies: is_gray,
        convert: convert::gray_family,
    },
    Strategy {
        name: "cmyk",
        applies: is_cmyk,
        convert: convert::cmyk_family,
    },
    Strategy {
        name: "icc",
        applies: is_icc,
        convert: convert::icc_family,
    },
    Strategy {
        name: "indexed",
        applies: is_indexed,
        convert: convert::indexed_family,
    },
    Strategy {
        name: "unknown",
        applies: is_unknown,
        convert: convert::unknown_family,
    },
];

/// Normalize `buf` to canonical RGB/RGBA.
///
/// Validation failures abort before conversion with `pixmap_invalid`; every
/// other outcome comes from the first strategy whose predicate matches the
/// declared colorspace.
pub fn normalize(buf: &RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure> {
    if buf.width == 0 || buf.height == 0 {
        return Err(NormalizeFailure::new(
            FailureReason::PixmapInvalid,
            format!("zero-area source ({}x{})", buf.width, buf.height),
        ));
    }
    if buf.data.is_empty() {
        return Err(NormalizeFailure::new(
            FailureReason::PixmapInvalid,
            "empty sample buffer",
        ));
    }
    if let Some(expected) = convert::expected_len(buf) {
        if buf.data.len() < expected {
            return Err(NormalizeFailure::new(
                FailureReason::PixmapInvalid,
                format!(
                    "sample buffer too small: {} bytes, expected {} for {} {}x{}",
                    buf.data.len(),
                    expected,
                    buf.colorspace.family(),
                    buf.width,
                    buf.height
                ),
            ));
        }
    }

    for strategy in STRATEGIES {
        if (strategy.applies)(&buf.colorspace) {
            tracing::debug!(
                family = strategy.name,
                width = buf.width,
                height = buf.height,
                "normalizing pixel buffer"
            );
            return (strategy.convert)(buf);
        }
    }

    // Every variant has a strategy; this is a guard, not a code path.
    Err(NormalizeFailure::new(
        FailureReason::ColorspaceUnsupported,
        "no strategy matched declared colorspace",
    ))
}
