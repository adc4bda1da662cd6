use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "engage")]
#[command(about = "Engage CLI - inspect and drive the local conversation state", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the data directory from the config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current conversation state
    Status,
    /// Refresh app release, SDK and device facts from the environment
    Check,
    /// Register an event without counting it
    Warm {
        key: String,
        /// Treat the key as an interaction id instead of a code point
        #[arg(long)]
        interaction: bool,
    },
    /// Record one invocation of an event
    Engage {
        key: String,
        #[arg(long)]
        interaction: bool,
    },
    /// Update the person
    Person {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Custom data entry as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Custom data key to remove
        #[arg(long = "unset", value_name = "KEY")]
        unset: Vec<String>,
    },
    /// Update device custom data
    Device {
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        #[arg(long = "unset", value_name = "KEY")]
        unset: Vec<String>,
    },
    /// Record the identity returned by the server
    SetToken {
        token: String,
        conversation_id: String,
        person_id: String,
        device_id: String,
    },
    /// Manage auxiliary user info
    UserInfo {
        #[command(subcommand)]
        action: UserInfoAction,
    },
    /// Print a request payload
    Payload {
        #[command(subcommand)]
        kind: PayloadKind,
    },
    /// List stored conversations
    List,
}

#[derive(Subcommand)]
enum UserInfoAction {
    Set { key: String, value: String },
    Remove { key: String },
}

#[derive(Subcommand)]
enum PayloadKind {
    /// Body for creating the conversation on the server
    Creation,
    /// Body for updating an identified conversation
    Update,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_env("ENGAGE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut session = commands::Session::open(cli.config, cli.data_dir).await?;
    let output = run(&mut session, cli.command).await?;
    session.finish().await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn run(session: &mut commands::Session, command: Commands) -> Result<serde_json::Value> {
    let output = match command {
        Commands::Status => commands::state::status(session),
        Commands::Check => commands::state::check(session),
        Commands::Warm { key, interaction } => commands::engagement::warm(session, &key, interaction),
        Commands::Engage { key, interaction } => {
            commands::engagement::engage(session, &key, interaction)
        }
        Commands::Person {
            name,
            email,
            set,
            unset,
        } => commands::profile::person(session, name, email, &set, &unset)?,
        Commands::Device { set, unset } => commands::profile::device(session, &set, &unset)?,
        Commands::SetToken {
            token,
            conversation_id,
            person_id,
            device_id,
        } => commands::identity::set_token(session, &token, &conversation_id, &person_id, &device_id)?,
        Commands::UserInfo { action } => match action {
            UserInfoAction::Set { key, value } => commands::profile::set_user_info(session, key, &value),
            UserInfoAction::Remove { key } => commands::profile::remove_user_info(session, &key),
        },
        Commands::Payload { kind } => match kind {
            PayloadKind::Creation => commands::state::creation_payload(session),
            PayloadKind::Update => commands::state::update_payload(session),
        },
        Commands::List => commands::state::list(session).await?,
    };

    Ok(output)
}
