use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use sg::areas::repository::Repository;
use sg::commands::plumbing::cat_file::CatFileMode;
use sg::commands::plumbing::hash_object::hash_object;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sg",
    version = "0.1.0",
    about = "A minimal git object store and staging index",
    long_about = "sg implements the plumbing layer of git: loose objects, \
    the version 2 index file, flat trees, commits and refs.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the metadata directory in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "hash-object",
        about = "Compute object ids and optionally store the objects",
        long_about = "This command hashes each file as an object of the given type \
        and prints one id per line. With -w the objects are written to the object database."
    )]
    HashObject {
        #[arg(short = 't', default_value = "blob", help = "The object type")]
        object_type: String,
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(required = true, help = "Files to hash")]
        files: Vec<PathBuf>,
    },
    #[command(
        name = "cat-file",
        about = "Print the type or content of an object",
        group(ArgGroup::new("mode").required(true).args(["show_type", "pretty"]))
    )]
    CatFile {
        #[arg(short = 't', help = "Show the object type")]
        show_type: bool,
        #[arg(short = 'p', help = "Print the raw object content")]
        pretty: bool,
        #[arg(index = 1, help = "The object id")]
        object: String,
    },
    #[command(
        name = "commit-tree",
        about = "Create a commit object from a tree",
        long_about = "This command creates a commit for the given tree with optional parents. \
        The commit message is read from standard input."
    )]
    CommitTree {
        #[arg(index = 1, help = "The tree id")]
        tree: String,
        #[arg(short = 'p', help = "A parent commit id, may be repeated")]
        parents: Vec<String>,
    },
    #[command(
        name = "update-index",
        about = "Stage files in the index",
        long_about = "This command records the current content of the given files in the index. \
        Files not yet in the index are only staged with --add."
    )]
    UpdateIndex {
        #[arg(long, help = "Allow staging files not yet in the index")]
        add: bool,
        #[arg(required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "write-tree", about = "Create a tree object from the index")]
    WriteTree,
    #[command(
        name = "update-ref",
        about = "Point a reference at an object",
        long_about = "This command writes an object id into a reference, following symbolic references."
    )]
    UpdateRef {
        #[arg(index = 1, help = "The reference name, e.g. HEAD or refs/heads/master")]
        reference: String,
        #[arg(index = 2, help = "The full object id")]
        value: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = || Box::new(std::io::stdout());

    match &cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => path.clone(),
                None => std::env::current_dir()?,
            };

            Repository::init_at(&path, stdout())?.init()?
        }
        Commands::HashObject {
            object_type,
            write,
            files,
        } => {
            if *write {
                let repository = Repository::from_env(stdout())?;
                hash_object(files, object_type, Some(repository.database()), &mut *repository.writer())?;
            } else {
                hash_object(files, object_type, None, std::io::stdout())?;
            }
        }
        Commands::CatFile {
            show_type, object, ..
        } => {
            let mode = if *show_type {
                CatFileMode::Type
            } else {
                CatFileMode::Pretty
            };

            Repository::from_env(stdout())?.cat_file(object, mode)?
        }
        Commands::CommitTree { tree, parents } => {
            let repository = Repository::from_env(stdout())?;

            let mut message = Vec::new();
            std::io::stdin().read_to_end(&mut message)?;

            repository.commit_tree(tree, parents, message.into())?;
        }
        Commands::UpdateIndex { add, paths } => {
            Repository::from_env(stdout())?.update_index(paths, *add)?;
        }
        Commands::WriteTree => {
            Repository::from_env(stdout())?.write_tree()?;
        }
        Commands::UpdateRef { reference, value } => {
            Repository::from_env(stdout())?.update_ref(reference, value)?
        }
    }

    Ok(())
}
