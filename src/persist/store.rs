// 保存プロトコル: 一時ファイルへ書き込み → 検証 → rename → 再検証
//
// The target path is only ever touched by the final rename, so the
// filesystem ends in exactly one of {absent, fully written} per attempt and
// a crash leaves at worst an orphaned temp file.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::warn;

/// Sibling temp path: `<target>.tmp` in the same directory, so the final
/// rename never crosses a filesystem boundary.
fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Best-effort removal of a partial artifact. Failures are logged and
/// swallowed; cleanup must never override the outcome already decided.
fn cleanup(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to clean up partial artifact");
        }
    }
}

/// Persist `image` as PNG at `target` using the atomic protocol.
///
/// Returns the verified byte count. On any error the temp file and any
/// partially renamed target are removed best-effort and the step's detail
/// is returned; the caller classifies it as `save_error`.
pub fn persist_png(image: &DynamicImage, target: &Path) -> Result<u64, String> {
    let tmp = temp_path(target);

    if let Err(e) = image.save_with_format(&tmp, image::ImageFormat::Png) {
        cleanup(&tmp);
        return Err(format!("PNG encode to temp file failed: {e}"));
    }

    // Verify the temp file before it can become the target.
    let tmp_len = match fs::metadata(&tmp) {
        Ok(meta) if meta.len() > 0 => meta.len(),
        Ok(_) => {
            cleanup(&tmp);
            return Err("temp file was written empty".to_string());
        }
        Err(e) => {
            cleanup(&tmp);
            return Err(format!("temp file vanished before rename: {e}"));
        }
    };

    if let Err(e) = fs::rename(&tmp, target) {
        cleanup(&tmp);
        return Err(format!("atomic rename failed: {e}"));
    }

    // Re-verify the final artifact; a mismatch means a partial write that
    // must not be mistaken for a persisted result.
    match fs::metadata(target) {
        Ok(meta) if meta.len() == tmp_len && meta.len() > 0 => Ok(meta.len()),
        Ok(meta) => {
            cleanup(target);
            Err(format!(
                "size mismatch after rename: expected {tmp_len}, found {}",
                meta.len()
            ))
        }
        Err(e) => Err(format!("final file missing after rename: {e}")),
    }
}
