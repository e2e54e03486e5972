//! The `sprout` binary.

mod app;
mod cli;

use clap::Parser;

use crate::app::SproutApp;
use crate::cli::CliArgs;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let app = match SproutApp::from_args(&args) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("sprout: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = app.run(args).await {
        eprintln!("sprout: {err}");
        std::process::exit(1);
    }
}
