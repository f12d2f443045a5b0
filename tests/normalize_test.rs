use component_extract::normalize::{
    normalize, FailureReason, OutputMode, RawPixelBuffer, SourceColorspace, WARN_ICC_FALLBACK,
    WARN_INDEXED_GRAY,
};

fn buffer(colorspace: SourceColorspace, width: u32, height: u32, data: Vec<u8>) -> RawPixelBuffer {
    RawPixelBuffer {
        width,
        height,
        bits_per_component: 8,
        colorspace,
        data,
    }
}

/// A minimal structurally valid ICC header: `acsp` signature at byte 36 and
/// the data colorspace fourcc at byte 16.
fn icc_profile(colorspace: &[u8; 4]) -> Vec<u8> {
    let mut profile = vec![0u8; 128];
    profile[16..20].copy_from_slice(colorspace);
    profile[36..40].copy_from_slice(b"acsp");
    profile
}

#[test]
fn test_rgb_passes_through() {
    let data = vec![10, 20, 30, 40, 50, 60];
    let out = normalize(&buffer(SourceColorspace::Rgb { alpha: false }, 2, 1, data))
        .expect("rgb must pass through");
    assert_eq!(out.mode, OutputMode::Rgb);
    assert_eq!(out.ops, vec!["rgb_passthrough"]);
    assert_eq!(out.image.to_rgb8().get_pixel(0, 0).0, [10, 20, 30]);
}

#[test]
fn test_rgba_preserves_alpha() {
    let data = vec![10, 20, 30, 128, 40, 50, 60, 255];
    let out = normalize(&buffer(SourceColorspace::Rgb { alpha: true }, 2, 1, data))
        .expect("rgba must pass through");
    assert_eq!(out.mode, OutputMode::Rgba);
    assert_eq!(out.image.to_rgba8().get_pixel(0, 0).0[3], 128);
}

#[test]
fn test_gray_expands_to_rgb() {
    let out = normalize(&buffer(SourceColorspace::Gray { alpha: false }, 2, 2, vec![0, 85, 170, 255]))
        .expect("gray must convert");
    assert_eq!(out.mode, OutputMode::Rgb);
    assert_eq!(out.ops, vec!["gray_to_rgb"]);
    assert_eq!(out.image.to_rgb8().get_pixel(1, 0).0, [85, 85, 85]);
}

#[test]
fn test_cmyk_converts_to_rgb() {
    // Pure cyan ink: (255, 0, 0, 0) -> (0, 255, 255).
    let out = normalize(&buffer(SourceColorspace::Cmyk, 1, 1, vec![255, 0, 0, 0]))
        .expect("cmyk must convert");
    assert_eq!(out.ops, vec!["cmyk_to_rgb"]);
    assert_eq!(out.image.to_rgb8().get_pixel(0, 0).0, [0, 255, 255]);
}

#[test]
fn test_icc_with_valid_profile_uses_profile_path() {
    let cs = SourceColorspace::Icc {
        components: 3,
        profile: icc_profile(b"RGB "),
    };
    let out = normalize(&buffer(cs, 1, 1, vec![1, 2, 3])).expect("icc rgb must convert");
    assert_eq!(out.ops, vec!["icc_profile"]);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_icc_with_garbage_profile_falls_back_with_warning() {
    let cs = SourceColorspace::Icc {
        components: 4,
        profile: vec![0xde, 0xad, 0xbe, 0xef],
    };
    let out = normalize(&buffer(cs, 1, 1, vec![0, 0, 0, 0]))
        .expect("profile trouble alone must not fail");
    assert_eq!(out.ops, vec!["icc_component_fallback"]);
    assert_eq!(out.warnings, vec![WARN_ICC_FALLBACK.to_string()]);
    // 4 components route through the CMYK path: zero ink is white.
    assert_eq!(out.image.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
}

#[test]
fn test_icc_with_unsupported_component_count_is_classified() {
    let cs = SourceColorspace::Icc {
        components: 2,
        profile: Vec::new(),
    };
    let failure = normalize(&buffer(cs, 1, 1, vec![0, 0])).expect_err("2 components unsupported");
    assert_eq!(failure.reason, FailureReason::ColorspaceUnsupported);
}

#[test]
fn test_indexed_palette_decodes() {
    let cs = SourceColorspace::Indexed {
        palette: vec![[255, 0, 0], [0, 255, 0]],
        bits: 8,
    };
    let out = normalize(&buffer(cs, 2, 1, vec![0, 1])).expect("palette decode");
    assert_eq!(out.ops, vec!["palette_decode"]);
    assert_eq!(out.image.to_rgb8().get_pixel(1, 0).0, [0, 255, 0]);
}

#[test]
fn test_indexed_one_bit_unpacks_row_padded_indices() {
    // 0b1010_0000: four 1-bit indices per row byte, row padded to a byte.
    let cs = SourceColorspace::Indexed {
        palette: vec![[0, 0, 0], [255, 255, 255]],
        bits: 1,
    };
    let out = normalize(&buffer(cs, 4, 1, vec![0b1010_0000])).expect("1-bit decode");
    let rgb = out.image.to_rgb8();
    assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 0]);
}

#[test]
fn test_indexed_out_of_range_index_falls_back_to_gray() {
    let cs = SourceColorspace::Indexed {
        palette: vec![[255, 0, 0]],
        bits: 8,
    };
    // Index 200 exceeds the 1-entry palette.
    let out = normalize(&buffer(cs, 2, 1, vec![0, 200]))
        .expect("palette trouble alone must not fail");
    assert_eq!(out.ops, vec!["indexed_gray_fallback"]);
    assert_eq!(out.warnings, vec![WARN_INDEXED_GRAY.to_string()]);
}

#[test]
fn test_unknown_with_three_samples_converts_generically() {
    let cs = SourceColorspace::Unknown("DeviceN".to_string());
    let out = normalize(&buffer(cs, 2, 1, vec![1, 2, 3, 4, 5, 6])).expect("generic rgb attempt");
    assert_eq!(out.ops, vec!["generic_rgb"]);
    assert_eq!(out.mode, OutputMode::Rgb);
}

#[test]
fn test_unknown_without_usable_stride_is_unsupported() {
    let cs = SourceColorspace::Unknown("Separation".to_string());
    // 2 bytes for 4 pixels: no generic interpretation fits.
    let failure = normalize(&buffer(cs, 2, 2, vec![9, 9])).expect_err("nothing fits");
    assert_eq!(failure.reason, FailureReason::ColorspaceUnsupported);
}

#[test]
fn test_zero_area_source_is_pixmap_invalid() {
    let failure = normalize(&buffer(SourceColorspace::Rgb { alpha: false }, 0, 4, vec![1]))
        .expect_err("zero-area source");
    assert_eq!(failure.reason, FailureReason::PixmapInvalid);
}

#[test]
fn test_short_buffer_is_pixmap_invalid() {
    let failure = normalize(&buffer(SourceColorspace::Cmyk, 2, 2, vec![0, 0, 0]))
        .expect_err("short buffer");
    assert_eq!(failure.reason, FailureReason::PixmapInvalid);
}

#[test]
fn test_sixteen_bit_samples_collapse_to_high_byte() {
    let raw = RawPixelBuffer {
        width: 1,
        height: 1,
        bits_per_component: 16,
        colorspace: SourceColorspace::Gray { alpha: false },
        data: vec![0xAB, 0xCD],
    };
    let out = normalize(&raw).expect("16-bit gray");
    assert_eq!(out.image.to_rgb8().get_pixel(0, 0).0, [0xAB, 0xAB, 0xAB]);
}

#[test]
fn test_every_family_yields_buffer_or_reason() {
    // The §8 coverage matrix: no family may panic or return empty.
    let cases: Vec<RawPixelBuffer> = vec![
        buffer(SourceColorspace::Rgb { alpha: false }, 1, 1, vec![0; 3]),
        buffer(SourceColorspace::Gray { alpha: true }, 1, 1, vec![0; 2]),
        buffer(SourceColorspace::Cmyk, 1, 1, vec![0; 4]),
        buffer(
            SourceColorspace::Icc {
                components: 1,
                profile: icc_profile(b"GRAY"),
            },
            1,
            1,
            vec![0],
        ),
        buffer(
            SourceColorspace::Indexed {
                palette: vec![[1, 2, 3]],
                bits: 8,
            },
            1,
            1,
            vec![0],
        ),
        buffer(SourceColorspace::Unknown("?".to_string()), 1, 1, vec![0]),
    ];

    for case in cases {
        match normalize(&case) {
            Ok(out) => {
                assert!(out.image.width() > 0 && out.image.height() > 0);
                assert!(!out.ops.is_empty(), "conversion must name its operations");
            }
            Err(failure) => {
                assert!(!failure.reason.code().is_empty());
            }
        }
    }
}
