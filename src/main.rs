mod app;
mod export;
mod io;
mod tree;
mod ui;

use app::{AppConfig, GitLineApp};
use clap::Parser;

fn main() {
    let _ = env_logger::builder().format_timestamp(None).try_init();

    let config = AppConfig::parse();
    if let Err(err) = GitLineApp::run(&config) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
