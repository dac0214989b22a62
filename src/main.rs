use std::{io, process};

use clap::Parser;
use nl_sql_engine::{
    app::{apply_cli, build_engine, create_output_options, run_command},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult
};
use tokio::main;
use tracing_subscriber::EnvFilter;

#[main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "nl_sql_engine=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> AppResult<i32> {
    let mut config = Config::load()?;
    apply_cli(&mut config, &cli);
    if cli.no_color {
        colored::control::set_override(false);
    }
    let opts = create_output_options(cli.output_format, cli.no_color, config.display.max_rows);

    let command = cli.command.unwrap_or(Commands::Interactive);
    let require_ai = matches!(command, Commands::Ask { .. });
    let engine = build_engine(&config, require_ai).await?;

    let output = run_command(&engine, &command, &opts, config.display.preview_limit).await?;
    for line in &output.stdout {
        println!("{}", line);
    }
    Ok(output.exit_code)
}
