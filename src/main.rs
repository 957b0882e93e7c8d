use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotseed::{
    cli::{self, SeedSource},
    config, error, utils,
};

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
    /// Build a candidate pool from a seed
    Recommend(RecommendOptions),

    /// Most frequent primary artists of a seed
    Artists(ArtistsOptions),

    /// Serve recommendations over HTTP
    Serve(ServeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SeedArgs {
    /// Playlist id, spotify:playlist URI or open.spotify.com URL
    #[clap(long, value_parser = utils::parse_playlist_ref)]
    pub playlist: Option<String>,

    /// Comma-separated track ids, URIs or URLs
    #[clap(long, value_delimiter = ',', value_parser = utils::parse_track_ref)]
    pub tracks: Vec<String>,

    /// Seed from the track currently playing
    #[clap(long)]
    pub now_playing: bool,
}

impl SeedArgs {
    fn source(self) -> SeedSource {
        if let Some(playlist) = self.playlist {
            SeedSource::Playlist(playlist)
        } else if !self.tracks.is_empty() {
            SeedSource::Tracks(self.tracks)
        } else {
            SeedSource::NowPlaying
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct RecommendOptions {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// Two-letter market code (defaults to SPOTIFY_MARKET)
    #[clap(long, value_parser = utils::parse_market_arg)]
    pub market: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ArtistsOptions {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// Two-letter market code (defaults to SPOTIFY_MARKET)
    #[clap(long, value_parser = utils::parse_market_arg)]
    pub market: Option<String>,

    /// Number of artists to show
    #[clap(long, default_value_t = 10)]
    pub limit: usize,

    /// Fetch genres and popularity for the listed artists
    #[clap(long)]
    pub details: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Two-letter market code used for every run (defaults to SPOTIFY_MARKET)
    #[clap(long, value_parser = utils::parse_market_arg)]
    pub market: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Recommend(opt) => {
            init_tracing("warn");
            cli::recommend(opt.seed.source(), opt.market).await
        }
        Command::Artists(opt) => {
            init_tracing("warn");
            cli::artists(opt.seed.source(), opt.market, opt.limit, opt.details).await
        }
        Command::Serve(opt) => {
            init_tracing("info");
            cli::serve(opt.market).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
