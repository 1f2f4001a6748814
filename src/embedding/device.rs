use candle_core::Device;
use tracing::{info, warn};

use super::error::EmbeddingError;

/// Picks the compute device for CLIP inference.
///
/// GPU backends are only attempted when the corresponding cargo feature is
/// compiled in; anything else lands on CPU. CPU is always a valid fallback,
/// so this only errors if candle itself misbehaves.
pub fn select_device() -> Result<Device, EmbeddingError> {
    if cfg!(feature = "metal") {
        match metal_device() {
            Ok(device) => {
                info!("Running CLIP on Metal");
                return Ok(device);
            }
            Err(reason) => warn!(reason = %reason, "Metal requested but unavailable"),
        }
    }

    if cfg!(feature = "cuda") {
        match cuda_device() {
            Ok(device) => {
                info!("Running CLIP on CUDA");
                return Ok(device);
            }
            Err(reason) => warn!(reason = %reason, "CUDA requested but unavailable"),
        }
    }

    info!("Running CLIP on CPU");
    Ok(Device::Cpu)
}

#[cfg(feature = "metal")]
fn metal_device() -> Result<Device, String> {
    Device::new_metal(0).map_err(|e| e.to_string())
}

#[cfg(not(feature = "metal"))]
fn metal_device() -> Result<Device, String> {
    Err("metal backend not compiled".to_string())
}

#[cfg(feature = "cuda")]
fn cuda_device() -> Result<Device, String> {
    Device::new_cuda(0).map_err(|e| e.to_string())
}

#[cfg(not(feature = "cuda"))]
fn cuda_device() -> Result<Device, String> {
    Err("cuda backend not compiled".to_string())
}
