use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twig::areas::repository::Repository;
use twig::config::{Config, LOG_FILTER_VAR};
use twig::errors::TwigError;

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A small content-addressed version control engine",
    long_about = "twig keeps snapshots of a working directory in a content-addressed object \
    store under .twig, with a staging index, branches, checkout and three-way merges.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short = 'C',
        long = "work-dir",
        global = true,
        help = "Run as if started in this directory"
    )]
    work_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Create an empty repository")]
    Init,
    #[command(
        name = "add",
        about = "Stage file contents",
        long_about = "This command stages the current content of the given files. \
        Directories are added recursively; tracked files missing from disk have their deletion staged."
    )]
    Add {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    #[command(
        name = "rm",
        about = "Unstage files, keeping them on disk",
        long_about = "This command removes paths from the index. Committed files have their \
        deletion staged; the files themselves are left in the working directory."
    )]
    Rm {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(name = "commit", about = "Record the staged snapshot")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "log",
        about = "Show commit history",
        long_about = "This command lists every commit reachable from the given revision \
        (HEAD by default), breadth-first over all parents."
    )]
    Log {
        #[arg(index = 1, help = "Revision to start from")]
        revision: Option<String>,
    },
    #[command(
        name = "reset",
        about = "Move HEAD to a revision and discard local changes to tracked files"
    )]
    Reset {
        #[arg(index = 1)]
        revision: String,
    },
    #[command(
        name = "checkout",
        about = "Switch branches or restore files",
        long_about = "This command switches to a branch or commit (`checkout <revision>`), \
        or restores files from the index (`checkout -- <paths>`)."
    )]
    Checkout {
        revision: Option<String>,
        #[arg(last = true)]
        paths: Vec<String>,
    },
    #[command(name = "branch-create", about = "Create a branch at HEAD and switch to it")]
    BranchCreate {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "branch-remove", about = "Delete a branch")]
    BranchRemove {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "show-branches", about = "List branches")]
    ShowBranches,
    #[command(name = "merge", about = "Merge a branch into the current one")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let work_dir = match cli.work_dir {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let config = Config::load_from_env()?;
    let mut repository = Repository::new(&work_dir, Box::new(std::io::stdout()), config)?;

    match &cli.command {
        Commands::Init => repository.init().await?,
        Commands::Add { paths } => repository.add(paths).await?,
        Commands::Rm { paths } => repository.rm(paths).await?,
        Commands::Status => repository.status().await?,
        Commands::Commit { message } => repository.commit(message).await?,
        Commands::Log { revision } => repository.log(revision.as_deref()).await?,
        Commands::Reset { revision } => repository.reset(revision).await?,
        Commands::Checkout { revision, paths } => match (revision, paths.is_empty()) {
            (Some(revision), true) => repository.checkout(revision).await?,
            (None, false) => repository.checkout_files(paths).await?,
            _ => anyhow::bail!(TwigError::UnknownCommand(
                "checkout takes either a revision or `-- <paths>`".to_string()
            )),
        },
        Commands::BranchCreate { name } => repository.branch_create(name).await?,
        Commands::BranchRemove { name } => repository.branch_remove(name).await?,
        Commands::ShowBranches => repository.show_branches().await?,
        Commands::Merge { branch } => repository.merge(branch).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn checkout_accepts_a_revision_or_paths() {
        let cli = Cli::try_parse_from(["twig", "checkout", "master"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Checkout { revision: Some(ref rev), ref paths } if rev == "master" && paths.is_empty()
        ));

        let cli = Cli::try_parse_from(["twig", "checkout", "--", "a.txt", "b.txt"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Checkout { revision: None, ref paths } if paths.len() == 2
        ));
    }
}
