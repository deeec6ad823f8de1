use std::{path::PathBuf, rc::Rc};

use aiet_client::{
    api::{SubmissionStatus, SubmissionType, Uuid},
    Client, ClientConfig, Directory, SupabaseClient,
};
use anyhow::Context;

mod commands;
mod file_storage;

use file_storage::FileStorage;

const SCHEMA: &str = include_str!("../schema.sql");

#[derive(structopt::StructOpt)]
struct Opt {
    /// Directory holding the session and the offline copies
    #[structopt(long, env = "AIET_DATA_DIR", default_value = ".aiet")]
    data_dir: PathBuf,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
pub enum Command {
    /// Sign in as a registered member, with the shared password
    Login {
        email: String,

        #[structopt(long, env = "AIET_PASSWORD", hide_env_values = true)]
        password: String,
    },

    Logout,

    /// Show who is signed in, and until when
    Whoami,

    /// List the registered members
    Members,

    Comments(CommentsCommand),

    Submissions(SubmissionsCommand),

    /// Print the SQL setting up the hosted tables and bucket
    Schema,
}

#[derive(structopt::StructOpt)]
pub enum CommentsCommand {
    /// Show the discussion below a post
    List { post: String },

    Add { post: String, content: String },

    Reply {
        post: String,
        comment: Uuid,
        content: String,
    },

    /// Delete one of your comments or replies
    Delete { post: String, comment: Uuid },
}

#[derive(structopt::StructOpt)]
pub enum SubmissionsCommand {
    /// Submit a contribution for review
    Submit {
        /// One of essay, research or discussion
        #[structopt(long = "type")]
        kind: String,

        #[structopt(long)]
        title: String,

        #[structopt(long)]
        content: String,

        /// Comma-separated
        #[structopt(long, default_value = "")]
        tags: String,

        /// File to upload along with the submission
        #[structopt(long)]
        attachment: Option<PathBuf>,
    },

    /// Every submission, for the administrator
    List {
        #[structopt(long)]
        status: Option<SubmissionStatus>,
    },

    /// Your own submissions
    Mine,

    /// The approved submissions everyone can read
    Approved {
        #[structopt(long = "type")]
        kind: Option<SubmissionType>,
    },

    SetStatus { id: Uuid, status: SubmissionStatus },

    Delete { id: Uuid },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    if let Command::Schema = opt.cmd {
        print!("{SCHEMA}");
        return Ok(());
    }

    let config = ClientConfig::from_env().context("reading configuration")?;
    let storage = FileStorage::open(&opt.data_dir)?;
    let backend = Rc::new(SupabaseClient::new(&config));
    let client = Client::new(backend, storage, Directory::conference(), &config);
    commands::run(&client, opt.cmd, &mut std::io::stdout().lock()).await
}
