use std::process;

use blogdesk::{config, infra::telemetry};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

mod cli;

use cli::{CliError, Ctx};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_cli_error(&error);
        process::exit(1);
    }
}

fn report_cli_error(error: &CliError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "command failed");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "command failed");
    });
}

async fn run() -> Result<(), CliError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let ctx = Ctx::new(&settings)?;
    let result = cli::dispatch(&ctx, cli_args.command).await;
    if result.is_err() {
        cli::print_lines(&ctx.banner());
    }
    result
}
