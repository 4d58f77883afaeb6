// CLI modules
mod cli;
mod database;
mod repo;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Init, Version};

command_enum! {
    (Init, Init),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    cli::register_tracing();

    let ctx = cli::op::OpContext::new(args.repo_root);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
