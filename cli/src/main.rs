use clap::Parser;
use cmpbench_cli::{cmd::GlobalArgs, util};

#[tokio::main]
async fn main() {
    let app = GlobalArgs::parse();
    util::init_logger(app.verbose);
    app.exec().await.unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        std::process::exit(util::exit_code_for(&e));
    });
}
