use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use discogs_sync::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in with a Discogs personal access token
    Login(LoginOptions),

    /// Forget the stored session
    Logout,

    /// Show the Discogs profile of the logged-in user
    Whoami,

    /// Sync collection, wantlist and folders into the local cache
    Sync,

    /// Show the progress of a running sync
    Status,

    /// Show what is cached locally
    Info,

    /// List the cached collection or wantlist
    List(ListOptions),

    /// Show collection releases that share a master release
    Duplicates,

    /// Delete all cached data of the logged-in user
    Clear,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// Personal access token (defaults to DISCOGS_TOKEN)
    #[clap(long)]
    pub token: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListOptions {
    /// What to list
    #[clap(value_enum, default_value = "collection")]
    pub resource: cli::ListResource,

    /// Only show releases whose title or artist contains this
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Login(opt) => cli::login(opt.token).await,
        Command::Logout => cli::logout().await,
        Command::Whoami => cli::whoami().await,
        Command::Sync => cli::sync().await,
        Command::Status => cli::status().await,
        Command::Info => cli::info().await,
        Command::List(opt) => cli::list(opt.resource, opt.search).await,
        Command::Duplicates => cli::duplicates().await,
        Command::Clear => cli::clear().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
