mod indexer;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gateway::Gateway;
use gateway::clock::{Clock, SystemClock, timestamp};
use gateway::config::{ConfigError, GatewayConfig, Mode};
use gateway::error::GatewayError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "tileboard", about = "Tile-map editor index generator and gateway CLI")]
struct Cli {
    /// Talk to static index files instead of the REST server.
    #[arg(long, global = true)]
    static_mode: bool,

    #[arg(long, global = true, env = "TILEBOARD_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Directory or URL holding the static indexes.
    #[arg(long, global = true, env = "TILEBOARD_STATIC_ROOT")]
    static_root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server's health endpoint.
    Ping,
    /// Write `packs-index.json` from an assets directory.
    IndexPacks(IndexPacksArgs),
    /// Write `maps-index.json` and copy map files for static hosting.
    IndexMaps(IndexMapsArgs),
    Maps(MapsCommand),
    Packs(PacksCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct IndexPacksArgs {
    #[arg(long, env = "TILEBOARD_ASSETS_DIR", default_value = "assets")]
    assets_dir: PathBuf,

    #[arg(long, default_value = "packs-index.json")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct IndexMapsArgs {
    #[arg(long, env = "TILEBOARD_DATA_DIR", default_value = "data/users")]
    data_dir: PathBuf,

    #[arg(long, default_value = "maps-index.json")]
    out: PathBuf,

    #[arg(long, default_value = "maps")]
    maps_out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct MapsCommand {
    #[command(subcommand)]
    command: MapsSubcommand,
}

#[derive(Subcommand, Debug)]
enum MapsSubcommand {
    List {
        #[arg(long, default_value = "temp")]
        user: String,
    },
    /// List every user's maps.
    Public,
    Show {
        id: String,
        #[arg(long, default_value = "temp")]
        user: String,
    },
    Delete {
        id: String,
        #[arg(long, default_value = "temp")]
        user: String,
    },
}

#[derive(Args, Debug)]
struct PacksCommand {
    #[command(subcommand)]
    command: PacksSubcommand,
}

#[derive(Subcommand, Debug)]
enum PacksSubcommand {
    List,
    Show { id: String },
    Assets { id: String },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    Create { name: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let overrides = Overrides { static_mode: cli.static_mode, api_base_url: cli.api_base_url, static_root: cli.static_root };

    match cli.command {
        Command::IndexPacks(args) => run_index_packs(&args),
        Command::IndexMaps(args) => run_index_maps(&args),
        Command::Ping => run_ping(&overrides.apply(GatewayConfig::from_env()?)).await,
        Command::Maps(maps) => run_maps(&connect(&overrides)?, maps).await,
        Command::Packs(packs) => run_packs(&connect(&overrides)?, packs).await,
        Command::Users(users) => run_users(&connect(&overrides)?, users).await,
    }
}

/// Command-line flags layered over the environment config.
#[derive(Debug, Default)]
struct Overrides {
    static_mode: bool,
    api_base_url: Option<String>,
    static_root: Option<String>,
}

impl Overrides {
    fn apply(&self, mut config: GatewayConfig) -> GatewayConfig {
        if self.static_mode {
            config.mode = Mode::Static;
        }
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(root) = &self.static_root {
            config.static_root.clone_from(root);
        }
        config
    }
}

fn connect(overrides: &Overrides) -> Result<Gateway, CliError> {
    let config = overrides.apply(GatewayConfig::from_env()?);
    Ok(Gateway::from_config(&config)?)
}

fn run_index_packs(args: &IndexPacksArgs) -> Result<(), CliError> {
    let index = indexer::build_packs_index(&args.assets_dir, timestamp(SystemClock.now()))?;
    indexer::write_index(&args.out, &index)?;
    eprintln!("wrote {} packs to {}", index.packs.len(), args.out.display());
    Ok(())
}

fn run_index_maps(args: &IndexMapsArgs) -> Result<(), CliError> {
    let index = indexer::build_maps_index(&args.data_dir, &args.maps_out_dir, timestamp(SystemClock.now()))?;
    indexer::write_index(&args.out, &index)?;
    eprintln!("wrote {} maps to {}", index.maps.len(), args.out.display());
    Ok(())
}

async fn run_ping(config: &GatewayConfig) -> Result<(), CliError> {
    let base = reqwest::Url::parse(&config.api_base_url)
        .map_err(|e| CliError::InvalidBaseUrl(format!("{}: {e}", config.api_base_url)))?;
    let url = base.join("/healthz").map_err(|e| CliError::InvalidBaseUrl(e.to_string()))?;
    let response = reqwest::Client::new().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_maps(gateway: &Gateway, maps: MapsCommand) -> Result<(), CliError> {
    match maps.command {
        MapsSubcommand::List { user } => print_json(&gateway.list_maps(&user).await?),
        MapsSubcommand::Public => print_json(&gateway.public_maps().await?),
        MapsSubcommand::Show { id, user } => {
            let doc = gateway.load_map(&user, &id).await?.ok_or(CliError::NotFound { kind: "map", id })?;
            print_json(&doc)
        }
        MapsSubcommand::Delete { id, user } => {
            if !gateway.delete_map(&user, &id).await? {
                return Err(CliError::NotFound { kind: "map", id });
            }
            eprintln!("deleted map {id}");
            Ok(())
        }
    }
}

async fn run_packs(gateway: &Gateway, packs: PacksCommand) -> Result<(), CliError> {
    match packs.command {
        PacksSubcommand::List => print_json(&gateway.list_packs().await?),
        PacksSubcommand::Show { id } => {
            let detail = gateway.get_pack(&id).await?.ok_or(CliError::NotFound { kind: "pack", id })?;
            print_json(&detail)
        }
        PacksSubcommand::Assets { id } => print_json(&gateway.get_pack_assets(&id).await?),
    }
}

async fn run_users(gateway: &Gateway, users: UsersCommand) -> Result<(), CliError> {
    match users.command {
        UsersSubcommand::List => print_json(&gateway.list_users().await?),
        UsersSubcommand::Create { name } => {
            gateway.create_user(&name).await?;
            eprintln!("created user {name}");
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
