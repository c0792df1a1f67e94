use clap::Parser;
use physlink::cli::{handle_generate, handle_serve, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    // Usage errors exit with 1, like runtime errors; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("physlink=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate {
            count,
            base_url,
            out_dir,
        } => handle_generate(count, base_url, out_dir),
        Commands::Serve => handle_serve(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
