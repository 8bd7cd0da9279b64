mod cli;
mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use rip::about;
use rip::error::RipError;

use cli::{Cli, ResolvedCommand};

/// Install a stderr subscriber when `RIP_LOG` (or `RUST_LOG`) is set.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let directives = std::env::var("RIP_LOG").or_else(|_| std::env::var("RUST_LOG"));
    if let Ok(directives) = directives {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::new(directives))
            .init();
    }
}

fn report(error: &anyhow::Error) {
    if error
        .downcast_ref::<RipError>()
        .is_some_and(RipError::is_internal)
    {
        eprintln!("Unknown exception has occurred. Please open an issue report at github.com/rip-lang/rip/issues");
    }
    eprintln!("{error:#}");
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.resolve_command() {
        ResolvedCommand::Execute { file } => pipeline::execute(file.as_deref()),
        ResolvedCommand::Debug { tree, file } => pipeline::debug(tree, file.as_deref()),
        ResolvedCommand::Version { verbose: false } => {
            println!("{}", about::version(false));
            Ok(())
        }
        ResolvedCommand::Version { verbose: true } => {
            println!("{}\n\n{}", about::LOGO, about::summary(true));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}
