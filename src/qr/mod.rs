//! QR code emission for physical hyperlinks.
//!
//! Each emitted code encodes `{base_url}/note/{id}` for a freshly generated
//! identifier and is written to `{out_dir}/{id}.png`.

use std::fs;
use std::path::PathBuf;

use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};

use crate::entity::generate_id;
use crate::error::{PhyslinkError, Result};

/// Subdirectory of the static root that holds generated codes.
pub const QRCODES_DIR: &str = "qrcodes";

/// Pixel size of one QR module.
pub const MODULE_SIZE: u32 = 10;

/// Build the payload URL for a note identifier.
pub fn note_url(base_url: &str, id: &str) -> String {
    format!("{}/note/{}", base_url.trim_end_matches('/'), id)
}

/// Render a payload as a QR image (error correction L, 4-module quiet zone).
pub fn render(payload: &str) -> Result<GrayImage> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)
        .map_err(|e| PhyslinkError::Qr(e.to_string()))?;

    Ok(code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .quiet_zone(true)
        .dark_color(Luma([0u8]))
        .light_color(Luma([255u8]))
        .build())
}

pub struct QrEmitter {
    out_dir: PathBuf,
}

impl QrEmitter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Path of the image written for an identifier.
    pub fn image_path(&self, id: &str) -> PathBuf {
        self.out_dir.join(format!("{}.png", id))
    }

    /// Generate `count` identifiers and write one QR image per identifier.
    ///
    /// The whole batch fails on the first error.
    pub fn emit(&self, count: usize, base_url: &str) -> Result<Vec<String>> {
        fs::create_dir_all(&self.out_dir)?;

        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = generate_id();
            let payload = note_url(base_url, &id);
            render(&payload)?.save(self.image_path(&id))?;
            tracing::debug!(%id, %payload, "wrote QR code");
            ids.push(id);
        }

        tracing::info!(count = ids.len(), dir = %self.out_dir.display(), "generated QR codes");
        Ok(ids)
    }
}
