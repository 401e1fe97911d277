//! Brim - reactive state core for a Hyprland desktop shell.
//!
//! This binary serves both roles:
//! - with no arguments it runs the shell core (store runtime, event
//!   bridge, theme watcher, request socket);
//! - with arguments it sends them as one request to the running instance
//!   and prints the response, e.g. `brim toggle-launcher`.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = if args.is_empty() {
        brim_lib::run().await
    } else {
        match brim_lib::ipc::client::send_request(&args).await {
            Ok(response) => {
                println!("{response}");
                Ok(())
            }
            Err(err) => Err(err),
        }
    };

    if let Err(err) = result {
        eprintln!("brim: {err}");
        std::process::exit(1);
    }
}
