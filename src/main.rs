#![allow(dead_code)]

use crate::areas::repository::Repository;
use crate::artifacts::core::{Fatal, exit_code_for};
use crate::commands::plumbing::cat_object::CatObjectMode;
use anyhow::Result;
use clap::{Parser, Subcommand};

mod areas;
mod artifacts;
mod commands;

#[derive(Parser)]
#[command(
    name = "nit",
    version = "0.1.0",
    about = "A small content-addressed version control engine",
    long_about = "nit keeps snapshots of a directory in a local, content-addressed \
    object store and supports branching, checkout and three-way merges. \
    It is a study of how version control works under the hood, not a git replacement.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Add files or directories to the index")]
    Add {
        #[arg(index = 1, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(name = "rm", about = "Remove files from the index")]
    Rm {
        #[arg(long, help = "Only remove from the index, keep the file")]
        cached: bool,
        #[arg(index = 1, help = "The files to remove")]
        paths: Vec<String>,
    },
    #[command(name = "commit", about = "Record the staged snapshot as a commit")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(name = "log", about = "Show commit history")]
    Log {
        #[arg(index = 1, help = "Revision to start from (defaults to HEAD)")]
        start: Option<String>,
        #[arg(long, help = "Emit the history as a DOT graph")]
        graph: bool,
    },
    #[command(name = "branch", about = "List branches or create a new one")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(index = 2, help = "Revision the branch starts at (defaults to HEAD)")]
        start_point: Option<String>,
    },
    #[command(name = "tag", about = "List tags or create a new one")]
    Tag {
        #[arg(short = 'a', help = "Create an annotated tag object")]
        annotate: bool,
        #[arg(short = 'm', help = "Message for the annotated tag")]
        message: Option<String>,
        #[arg(index = 1, help = "Name of the tag to create")]
        name: Option<String>,
        #[arg(index = 2, help = "Object the tag points at (defaults to HEAD)")]
        target: Option<String>,
    },
    #[command(name = "checkout", about = "Switch to another branch or commit")]
    Checkout {
        #[arg(index = 1, help = "Branch, tag or commit to check out")]
        target: String,
    },
    #[command(name = "merge", about = "Merge another branch into HEAD")]
    Merge {
        #[arg(index = 1, help = "Branch or commit to merge")]
        target: String,
    },
    #[command(name = "cat-object", about = "Print the kind, size or content of an object")]
    CatObject {
        #[arg(short = 't', help = "Print the object kind")]
        kind: bool,
        #[arg(short = 's', help = "Print the payload size")]
        size: bool,
        #[arg(short = 'p', help = "Pretty-print the payload")]
        pretty: bool,
        #[arg(index = 1, help = "Name or id prefix of the object")]
        object: String,
    },
    #[command(name = "hash-object", about = "Hash a file, optionally storing the object")]
    HashObject {
        #[arg(short, long, help = "Write the object to the database")]
        write: bool,
        #[arg(short = 't', long = "type", default_value = "blob", help = "Object kind")]
        kind: String,
        #[arg(index = 1, help = "The file to hash")]
        file: String,
    },
    #[command(name = "write-tree", about = "Store the index as a tree and print its id")]
    WriteTree,
    #[command(name = "read-tree", about = "Reset the index to a stored tree")]
    ReadTree {
        #[arg(short = 'u', long = "update-workdir", help = "Also update the working tree")]
        update_workdir: bool,
        #[arg(short = 'm', help = "Merge mode (handled by the merge command)")]
        merge: bool,
        #[arg(index = 1, help = "Tree-ish to read")]
        tree: String,
    },
    #[command(name = "rev-parse", about = "Resolve names to full object ids")]
    RevParse {
        #[arg(index = 1, help = "Names to resolve")]
        names: Vec<String>,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(short = 'r', help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1, help = "Tree-ish to list")]
        tree: String,
    },
}

fn repository_at(path: Option<&str>) -> Result<Repository> {
    let root = match path {
        Some(path) => std::path::PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    Repository::new(root, Box::new(std::io::stdout()))
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => repository_at(path.as_deref())?.init(),
        Commands::Add { paths } => repository_at(None)?.add(paths).await,
        Commands::Rm { cached, paths } => repository_at(None)?.rm(paths, *cached).await,
        Commands::Commit { message } => repository_at(None)?.commit(message).await,
        Commands::Status => repository_at(None)?.status().await,
        Commands::Log { start, graph } => repository_at(None)?.log(start.as_deref(), *graph),
        Commands::Branch { name, start_point } => {
            repository_at(None)?.branch(name.as_deref(), start_point.as_deref())
        }
        Commands::Tag {
            annotate,
            message,
            name,
            target,
        } => repository_at(None)?.tag(
            name.as_deref(),
            target.as_deref(),
            *annotate,
            message.as_deref(),
        ),
        Commands::Checkout { target } => repository_at(None)?.checkout(target).await,
        Commands::Merge { target } => repository_at(None)?.merge(target).await,
        Commands::CatObject {
            kind,
            size,
            pretty,
            object,
        } => {
            let mode = match (*kind, *size, *pretty) {
                (true, false, false) => CatObjectMode::Kind,
                (false, true, false) => CatObjectMode::Size,
                (false, false, true) => CatObjectMode::Pretty,
                _ => {
                    return Err(Fatal::Usage(
                        "cat-object requires exactly one of -t, -s or -p".to_string(),
                    )
                    .into());
                }
            };
            repository_at(None)?.cat_object(mode, object)
        }
        Commands::HashObject { write, kind, file } => {
            repository_at(None)?.hash_object(file, kind, *write)
        }
        Commands::WriteTree => repository_at(None)?.write_tree().await,
        Commands::ReadTree {
            update_workdir,
            merge,
            tree,
        } => {
            repository_at(None)?
                .read_tree(tree, *update_workdir, *merge)
                .await
        }
        Commands::RevParse { names } => repository_at(None)?.rev_parse(names),
        Commands::LsTree { recursive, tree } => repository_at(None)?.ls_tree(tree, *recursive),
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("{error:#}");
        std::process::exit(exit_code_for(&error));
    }
}
