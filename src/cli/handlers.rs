use std::path::PathBuf;

use crate::config::{self, Config, DEFAULT_STATIC_DIR};
use crate::error::Result;
use crate::qr::{QrEmitter, QRCODES_DIR};

pub fn handle_generate(count: u32, base_url: Option<String>, out_dir: Option<PathBuf>) -> Result<()> {
    let base_url = config::resolve_base_url(base_url.as_deref(), |key| std::env::var(key).ok());
    let out_dir = out_dir.unwrap_or_else(|| {
        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());
        PathBuf::from(static_dir).join(QRCODES_DIR)
    });

    let ids = QrEmitter::new(out_dir).emit(count as usize, &base_url)?;

    println!("Generated {} QR codes:", ids.len());
    for id in &ids {
        println!("- {}", id);
    }

    Ok(())
}

pub fn handle_serve() -> Result<()> {
    let config = Config::from_env()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(crate::web::serve(config))
}
