mod commands;

use clap::Parser;
use simverify_core::VerifyError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let verify_error = error.as_verify_error();
            eprintln!("{}", verify_error.diagnostic_line());
            verify_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("simverify".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    match Cli::try_parse_from(&full_args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "simverify", about = "Simulation-output verification metric engine")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate a job's test specifications and write its results artifact
    Run(commands::RunArgs),
    /// List the channels recorded in a run archive, grouped by step
    Channels(commands::ChannelsArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Run(args) => commands::run_job_command(args),
        CliCommand::Channels(args) => commands::run_channels_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Evaluate(VerifyError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_verify_error(&self) -> VerifyError {
        match self {
            Self::Usage(message) => VerifyError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Evaluate(error) => error.clone(),
            Self::Internal(error) => VerifyError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
