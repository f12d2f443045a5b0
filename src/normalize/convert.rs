// Per-family conversion strategies. Each family's fallbacks are an ordered
// list of steps tried in sequence; a step either yields a finished buffer,
// defers to the next step with a warning, or fails with a reason code.

use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::{debug, warn};

use crate::normalize::{
    FailureReason, NormalizeFailure, NormalizedPixels, OutputMode, RawPixelBuffer,
    SourceColorspace, WARN_ICC_FALLBACK, WARN_INDEXED_GRAY, WARN_INDEXED_RAW,
};

/// Expected minimum sample-buffer length for the declared colorspace, or
/// `None` when the family carries no expectation (unknown sources).
pub fn expected_len(buf: &RawPixelBuffer) -> Option<usize> {
    let pixels = buf.width as usize * buf.height as usize;
    let component_bytes = if buf.bits_per_component == 16 { 2 } else { 1 };
    match &buf.colorspace {
        SourceColorspace::Rgb { alpha } => Some(pixels * (3 + *alpha as usize) * component_bytes),
        SourceColorspace::Gray { alpha } => Some(pixels * (1 + *alpha as usize) * component_bytes),
        SourceColorspace::Cmyk => Some(pixels * 4 * component_bytes),
        SourceColorspace::Icc { components, .. } => {
            Some(pixels * *components as usize * component_bytes)
        }
        SourceColorspace::Indexed { bits, .. } => {
            let row_bytes = (buf.width as usize * *bits as usize).div_ceil(8);
            Some(row_bytes * buf.height as usize)
        }
        SourceColorspace::Unknown(_) => None,
    }
}

/// Collapse 16-bit samples to 8-bit by taking the high byte; pass 8-bit
/// samples through untouched.
fn samples_as_u8(buf: &RawPixelBuffer, count: usize) -> Result<Vec<u8>, NormalizeFailure> {
    match buf.bits_per_component {
        8 => Ok(buf.data[..count].to_vec()),
        16 => Ok(buf.data[..count * 2].iter().step_by(2).copied().collect()),
        other => Err(NormalizeFailure::new(
            FailureReason::ConversionError,
            format!("unsupported bits-per-component: {other}"),
        )),
    }
}

fn finish_rgb(
    width: u32,
    height: u32,
    samples: Vec<u8>,
    ops: Vec<&'static str>,
    warnings: Vec<String>,
) -> Result<NormalizedPixels, NormalizeFailure> {
    let image = RgbImage::from_raw(width, height, samples).ok_or_else(|| {
        NormalizeFailure::new(FailureReason::ConversionError, "RGB buffer assembly failed")
    })?;
    Ok(NormalizedPixels {
        image: DynamicImage::ImageRgb8(image),
        mode: OutputMode::Rgb,
        ops,
        warnings,
    })
}

fn finish_rgba(
    width: u32,
    height: u32,
    samples: Vec<u8>,
    ops: Vec<&'static str>,
    warnings: Vec<String>,
) -> Result<NormalizedPixels, NormalizeFailure> {
    let image = RgbaImage::from_raw(width, height, samples).ok_or_else(|| {
        NormalizeFailure::new(
            FailureReason::AlphaApplyFailed,
            "RGBA buffer assembly failed",
        )
    })?;
    Ok(NormalizedPixels {
        image: DynamicImage::ImageRgba8(image),
        mode: OutputMode::Rgba,
        ops,
        warnings,
    })
}

/// RGB family: pass-through, alpha preserved.
pub fn rgb_family(buf: &RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure> {
    let alpha = matches!(buf.colorspace, SourceColorspace::Rgb { alpha: true });
    rgb_from_samples(buf, alpha, vec!["rgb_passthrough"], Vec::new())
}

fn rgb_from_samples(
    buf: &RawPixelBuffer,
    alpha: bool,
    ops: Vec<&'static str>,
    warnings: Vec<String>,
) -> Result<NormalizedPixels, NormalizeFailure> {
    let pixels = buf.width as usize * buf.height as usize;
    let channels = if alpha { 4 } else { 3 };
    let samples = samples_as_u8(buf, pixels * channels)?;
    if alpha {
        finish_rgba(buf.width, buf.height, samples, ops, warnings)
    } else {
        finish_rgb(buf.width, buf.height, samples, ops, warnings)
    }
}

/// Gray family: direct expansion to RGB; alpha preserved as RGBA.
pub fn gray_family(buf: &RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure> {
    let alpha = matches!(buf.colorspace, SourceColorspace::Gray { alpha: true });
    gray_from_samples(buf, alpha, vec!["gray_to_rgb"], Vec::new())
}

fn gray_from_samples(
    buf: &RawPixelBuffer,
    alpha: bool,
    ops: Vec<&'static str>,
    warnings: Vec<String>,
) -> Result<NormalizedPixels, NormalizeFailure> {
    let pixels = buf.width as usize * buf.height as usize;
    let channels = if alpha { 2 } else { 1 };
    let samples = samples_as_u8(buf, pixels * channels)?;

    if alpha {
        let mut rgba = Vec::with_capacity(pixels * 4);
        for pair in samples.chunks_exact(2) {
            rgba.extend_from_slice(&[pair[0], pair[0], pair[0], pair[1]]);
        }
        finish_rgba(buf.width, buf.height, rgba, ops, warnings)
    } else {
        let mut rgb = Vec::with_capacity(pixels * 3);
        for &v in &samples {
            rgb.extend_from_slice(&[v, v, v]);
        }
        finish_rgb(buf.width, buf.height, rgb, ops, warnings)
    }
}

/// CMYK family: direct conversion to RGB. Logged distinctly so the
/// colorspace-distribution report can break CMYK sources out.
pub fn cmyk_family(buf: &RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure> {
    cmyk_from_samples(buf, vec!["cmyk_to_rgb"], Vec::new())
}

fn cmyk_from_samples(
    buf: &RawPixelBuffer,
    ops: Vec<&'static str>,
    warnings: Vec<String>,
) -> Result<NormalizedPixels, NormalizeFailure> {
    let pixels = buf.width as usize * buf.height as usize;
    let samples = samples_as_u8(buf, pixels * 4)?;

    let mut rgb = Vec::with_capacity(pixels * 3);
    for q in samples.chunks_exact(4) {
        let (c, m, y, k) = (q[0] as u32, q[1] as u32, q[2] as u32, q[3] as u32);
        rgb.push(((255 - c) * (255 - k) / 255) as u8);
        rgb.push(((255 - m) * (255 - k) / 255) as u8);
        rgb.push(((255 - y) * (255 - k) / 255) as u8);
    }
    debug!(
        width = buf.width,
        height = buf.height,
        "CMYK source converted to RGB"
    );
    finish_rgb(buf.width, buf.height, rgb, ops, warnings)
}

/// ICC profile families recognized by the header probe.
enum IccClass {
    Gray,
    Rgb,
    Cmyk,
}

/// Minimal ICC header validation: profiles carry the `acsp` signature at
/// byte 36 and the data colorspace fourcc at byte 16. Anything else is an
/// unusable profile and routes to the component-count fallback.
fn probe_icc_profile(profile: &[u8], components: u8) -> Option<IccClass> {
    if profile.len() < 128 || &profile[36..40] != b"acsp" {
        return None;
    }
    match (&profile[16..20], components) {
        (b"GRAY", 1) => Some(IccClass::Gray),
        (b"RGB ", 3) => Some(IccClass::Rgb),
        (b"CMYK", 4) => Some(IccClass::Cmyk),
        _ => None,
    }
}

/// ICC family: profile-aware conversion first, then the component-count
/// fallback (1/3/4 → gray/RGB/CMYK) with a warning. An unusable profile is
/// never, by itself, a hard failure.
pub fn icc_family(buf: &RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure> {
    let SourceColorspace::Icc {
        components,
        ref profile,
    } = buf.colorspace
    else {
        return Err(NormalizeFailure::new(
            FailureReason::ConversionError,
            "icc strategy dispatched on non-icc buffer",
        ));
    };

    if let Some(class) = probe_icc_profile(profile, components) {
        let ops = vec!["icc_profile"];
        return match class {
            IccClass::Gray => gray_from_samples(buf, false, ops, Vec::new()),
            IccClass::Rgb => rgb_from_samples(buf, false, ops, Vec::new()),
            IccClass::Cmyk => cmyk_from_samples(buf, ops, Vec::new()),
        };
    }

    warn!(
        components,
        profile_bytes = profile.len(),
        "unusable ICC profile; falling back to component-count conversion"
    );
    let warnings = vec![WARN_ICC_FALLBACK.to_string()];
    let ops = vec!["icc_component_fallback"];
    match components {
        1 => gray_from_samples(buf, false, ops, warnings),
        3 => rgb_from_samples(buf, false, ops, warnings),
        4 => cmyk_from_samples(buf, ops, warnings),
        n => Err(NormalizeFailure::new(
            FailureReason::ColorspaceUnsupported,
            format!("ICC source with {n} components has no conversion path"),
        )),
    }
}

/// Unpack bit-packed palette indices (1/2/4/8 bits, rows padded to byte
/// boundaries) into one index byte per pixel.
fn unpack_indices(buf: &RawPixelBuffer, bits: u8) -> Result<Vec<u8>, NormalizeFailure> {
    if !matches!(bits, 1 | 2 | 4 | 8) {
        return Err(NormalizeFailure::new(
            FailureReason::ConversionError,
            format!("unsupported palette index depth: {bits} bits"),
        ));
    }
    let row_bytes = (buf.width as usize * bits as usize).div_ceil(8);
    let mut indices = Vec::with_capacity(buf.width as usize * buf.height as usize);
    let per_byte = 8 / bits as usize;
    let mask = (1u16 << bits) - 1;

    for row in 0..buf.height as usize {
        let row_data = &buf.data[row * row_bytes..(row + 1) * row_bytes];
        for x in 0..buf.width as usize {
            let byte = row_data[x / per_byte];
            let shift = 8 - bits as usize * (x % per_byte + 1);
            indices.push(((byte as u16 >> shift) & mask) as u8);
        }
    }
    Ok(indices)
}

/// Indexed family fallback chain: palette decode, then gray interpretation,
/// then raw-sample reconstruction. Palette trouble alone never hard-fails.
pub fn indexed_family(buf: &RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure> {
    let SourceColorspace::Indexed { ref palette, bits } = buf.colorspace else {
        return Err(NormalizeFailure::new(
            FailureReason::ConversionError,
            "indexed strategy dispatched on non-indexed buffer",
        ));
    };

    let indices = unpack_indices(buf, bits)?;

    // Step 1: direct palette lookup.
    if indices.iter().all(|&i| (i as usize) < palette.len()) && !palette.is_empty() {
        let mut rgb = Vec::with_capacity(indices.len() * 3);
        for &i in &indices {
            rgb.extend_from_slice(&palette[i as usize]);
        }
        return finish_rgb(buf.width, buf.height, rgb, vec!["palette_decode"], Vec::new());
    }

    // Step 2: treat indices as gray samples, scaled to full range.
    warn!(
        palette_len = palette.len(),
        bits, "palette decode failed; interpreting indices as gray"
    );
    let max_index = ((1u16 << bits) - 1).max(1);
    let mut rgb = Vec::with_capacity(indices.len() * 3);
    for &i in &indices {
        let v = (i as u16 * 255 / max_index) as u8;
        rgb.extend_from_slice(&[v, v, v]);
    }
    if let Ok(out) = finish_rgb(
        buf.width,
        buf.height,
        rgb,
        vec!["indexed_gray_fallback"],
        vec![WARN_INDEXED_GRAY.to_string()],
    ) {
        return Ok(out);
    }

    // Step 3: raw-sample reconstruction from whatever the buffer holds.
    let pixels = buf.width as usize * buf.height as usize;
    if buf.data.len() >= pixels * 3 {
        return finish_rgb(
            buf.width,
            buf.height,
            buf.data[..pixels * 3].to_vec(),
            vec!["indexed_raw_reconstruction"],
            vec![WARN_INDEXED_RAW.to_string()],
        );
    }
    if buf.data.len() >= pixels {
        let mut gray_rgb = Vec::with_capacity(pixels * 3);
        for &v in &buf.data[..pixels] {
            gray_rgb.extend_from_slice(&[v, v, v]);
        }
        return finish_rgb(
            buf.width,
            buf.height,
            gray_rgb,
            vec!["indexed_raw_reconstruction"],
            vec![WARN_INDEXED_RAW.to_string()],
        );
    }

    Err(NormalizeFailure::new(
        FailureReason::ColorspaceUnsupported,
        "indexed source exhausted every decode fallback",
    ))
}

/// Unknown family: generic RGB attempt driven by the sample count per pixel.
/// Fails with `colorspace_unsupported` only when that attempt itself fails.
pub fn unknown_family(buf: &RawPixelBuffer) -> Result<NormalizedPixels, NormalizeFailure> {
    let pixels = buf.width as usize * buf.height as usize;
    let ops = vec!["generic_rgb"];
    match buf.data.len() / pixels {
        n if n >= 4 => {
            let samples = buf.data[..pixels * 4].to_vec();
            finish_rgba(buf.width, buf.height, samples, ops, Vec::new())
        }
        3 => finish_rgb(buf.width, buf.height, buf.data[..pixels * 3].to_vec(), ops, Vec::new()),
        1 | 2 => {
            let mut rgb = Vec::with_capacity(pixels * 3);
            for &v in &buf.data[..pixels] {
                rgb.extend_from_slice(&[v, v, v]);
            }
            finish_rgb(buf.width, buf.height, rgb, ops, Vec::new())
        }
        n => Err(NormalizeFailure::new(
            FailureReason::ColorspaceUnsupported,
            format!("unknown colorspace with {n} samples per pixel"),
        )),
    }
}
