use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "physlink")]
#[command(version, about = "Physical hyperlinks: QR codes that resolve to attachable notes")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate QR codes for fresh note identifiers
    Generate {
        /// Number of QR codes to generate
        #[arg(value_name = "COUNT", value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,

        /// Base URL encoded into each code (defaults to VERCEL_URL, BASE_URL, then localhost)
        #[arg(long)]
        base_url: Option<String>,

        /// Output directory for the PNG files (defaults to <STATIC_DIR>/qrcodes)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Run the HTTP server
    Serve,
}
