//! CPU-side PNG rendering of a [`Frame`].
//!
//! This module is feature-gated behind `png` (default on) so that hosts that
//! only want raw pixels can depend on the `engines` crate without pulling in
//! the `image` crate. The rasterization itself lives in [`crate::pixel`].

use particle_sphere_core::color::Srgb;
use particle_sphere_core::error::EngineError;
use particle_sphere_core::Frame;
use std::path::Path;
use tracing::debug;

use crate::pixel::frame_to_rgba;

/// Rasterizes `frame` at `width`×`height` and writes it as a PNG image.
///
/// Returns `EngineError::InvalidExtent` if the size is zero or overflows
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(
    frame: &Frame<'_>,
    width: usize,
    height: usize,
    background: Srgb,
    path: &Path,
) -> Result<(), EngineError> {
    let too_large = || EngineError::InvalidExtent(format!("{width}x{height} exceeds u32"));
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    let rgba = frame_to_rgba(frame, width, height, background)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    debug!(path = %path.display(), width, height, "snapshot written");
    Ok(())
}
