use super::CliError;
use simverify_core::engine::{history_file_name, run_job_from_files};
use simverify_core::InMemoryHistoryStore;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Job name; expects <job>.history.json and <job>.job.json in the job
    /// directory
    #[arg(long = "job")]
    job_name: String,

    /// Directory holding the job inputs and receiving the artifacts
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

pub(super) fn run_job_command(args: RunArgs) -> Result<i32, CliError> {
    tracing::info!(job = %args.job_name, dir = %args.dir.display(), "evaluating job");
    let results_path =
        run_job_from_files(&args.job_name, &args.dir).map_err(CliError::Evaluate)?;
    println!("results: {}", results_path.display());
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct ChannelsArgs {
    /// Run archive path (<job>.history.json)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Job name to derive the archive path from, with --dir
    #[arg(long = "job", conflicts_with = "history")]
    job_name: Option<String>,

    /// Directory holding the run archive when --job is used
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

pub(super) fn run_channels_command(args: ChannelsArgs) -> Result<i32, CliError> {
    let path = match (&args.history, &args.job_name) {
        (Some(path), _) => path.clone(),
        (None, Some(job_name)) => args.dir.join(history_file_name(job_name)),
        (None, None) => {
            return Err(CliError::Usage(
                "either --history or --job must be given".to_string(),
            ));
        }
    };

    let store = InMemoryHistoryStore::from_path(&path).map_err(CliError::Evaluate)?;
    for step in &store.archive().steps {
        println!("{}", step.name);
        for region in &step.regions {
            for output in &region.outputs {
                println!("  {}", output.name);
            }
        }
    }
    Ok(0)
}
