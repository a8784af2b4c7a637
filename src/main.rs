use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plumbit::areas::repository::Repository;
use plumbit::artifacts::objects::object_type::ObjectType;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PLUMBIT_LOG";

#[derive(Parser)]
#[command(
    name = "plumbit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Git-compatible object store and index plumbing",
    long_about = "Stores content-addressed blobs, trees and commits in a .git \
    directory and keeps a binary staging index compatible with git's version 2 format.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(short = 'C', global = true, help = "Run as if started in <PATH>")]
    directory: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Log debug details to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as an object and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(short = 't', long = "type", default_value = "blob", help = "Object type")]
        object_type: ObjectType,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints, for each given prefix (at least 2 hex \
        characters), the first object of the given type whose id starts with it."
    )]
    CatFile {
        #[arg(short = 't', long = "type", default_value = "blob", help = "Object type")]
        object_type: ObjectType,
        #[arg(index = 1, required = true, num_args = 1.., help = "Object ids or prefixes")]
        prefixes: Vec<String>,
    },
    #[command(name = "ls-tree", about = "List the entries of a tree or commit")]
    LsTree {
        #[arg(index = 1, help = "Tree or commit id or prefix")]
        prefix: String,
    },
    #[command(name = "ls-files", about = "List the staged files")]
    LsFiles {
        #[arg(short, long, help = "Show mode, object id and stage")]
        stage: bool,
    },
    #[command(name = "add", about = "Stage files for the next commit")]
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    #[command(name = "write-tree", about = "Write a tree object from the staging list")]
    WriteTree,
    #[command(name = "commit-tree", about = "Create a commit object for a tree")]
    CommitTree {
        #[arg(index = 1, help = "Tree id or prefix")]
        tree: String,
        #[arg(short, long, help = "Parent commit id or prefix")]
        parent: Option<String>,
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(worktree: &Path) -> Result<Repository> {
    Repository::new(worktree, Box::new(std::io::stdout()))
        .with_context(|| format!("unable to open repository at {}", worktree.display()))
}

fn discover(pwd: &Path) -> Result<Repository> {
    let worktree = Repository::discover(pwd).context("not a git repository")?;
    open(&worktree)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(directory) = &cli.directory {
        std::env::set_current_dir(directory)
            .with_context(|| format!("cannot change to {}", directory.display()))?;
    }
    let pwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Init { path } => {
            let worktree = match path {
                Some(path) => pwd.join(path),
                None => pwd.clone(),
            };

            open(&worktree)?.init()?
        }
        Commands::HashObject {
            write,
            object_type,
            file,
        } => {
            let repository = match write {
                true => discover(&pwd)?,
                // hashing alone needs no repository
                false => Repository::discover(&pwd)
                    .map_or_else(|_| open(&pwd), |worktree| open(&worktree))?,
            };

            repository.hash_object(&pwd.join(file), *object_type, *write)?
        }
        Commands::CatFile {
            object_type,
            prefixes,
        } => discover(&pwd)?.cat_file(prefixes, *object_type)?,
        Commands::LsTree { prefix } => discover(&pwd)?.ls_tree(prefix)?,
        Commands::LsFiles { stage } => discover(&pwd)?.ls_files(*stage)?,
        Commands::Add { paths } => discover(&pwd)?.add(&pwd, paths)?,
        Commands::WriteTree => discover(&pwd)?.write_tree()?,
        Commands::CommitTree {
            tree,
            parent,
            message,
        } => discover(&pwd)?.commit_tree(tree, parent.as_deref(), message)?,
        Commands::Commit { message } => discover(&pwd)?.commit(message)?,
    }

    Ok(())
}
