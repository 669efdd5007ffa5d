use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use slink::{
  AuthClient, CacheStore, Config, Fetcher, HttpTransport, Location, ResourceBrowser, RoleHint,
  Transport,
};

#[derive(Parser, Debug)]
#[command(name = "slink")]
#[command(about = "Headless client for the ServiceLink marketplace API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/slink/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override the server URL from the config file
  #[arg(long)]
  server: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sign in and print the session with its routed destination
  Login {
    /// Username or email; the password comes from SLINK_PASSWORD
    identifier: String,

    /// Role hint: auto, admin, or provider
    #[arg(long, default_value = "auto")]
    role: RoleHint,
  },

  /// Fetch one page of a resource family and print it as JSON
  Browse {
    /// Family tag: listings, admin-users, admin-categories, bookings
    family: Option<String>,

    /// Filter fields as name=value pairs, e.g. -f q=plumbing
    #[arg(short, long = "filter", value_name = "NAME=VALUE")]
    filters: Vec<String>,

    /// Zero-based page to fetch
    #[arg(long)]
    page: Option<u32>,

    /// Page size (defaults to the family's configured size)
    #[arg(long)]
    size: Option<u32>,

    /// Full address to reload instead of building one from flags,
    /// e.g. "/api/listings?page=2&q=plumbing&size=12"
    #[arg(long)]
    address: Option<String>,
  },

  /// Print the admin stats snapshot
  Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = init_tracing()?;

  let args = Args::parse();

  // Load configuration, applying the command-line server override.
  let config = Config::load(args.config.as_deref())?;
  let config = if let Some(server) = args.server {
    Config {
      server: slink::config::ServerConfig {
        url: server,
        ..config.server
      },
      ..config
    }
  } else {
    config
  };

  let transport = Arc::new(HttpTransport::new(&config.server)?);
  transport.set_token(Config::get_token());

  match args.command {
    Command::Login { identifier, role } => {
      let auth = AuthClient::new(Arc::clone(&transport) as Arc<dyn Transport>);
      let password = Config::get_password()?;
      let session = auth.sign_in(&identifier, &password, role).await?;
      let output = serde_json::json!({
        "user": {
          "name": session.user.name,
          "email": session.user.email,
          "roles": session.user.roles,
        },
        "destination": session.user.destination(),
        "token": session.token,
      });
      println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Command::Browse {
      family,
      filters,
      page,
      size,
      address,
    } => {
      let name = family
        .or_else(|| config.default_family.clone())
        .ok_or_else(|| eyre!("No family given and no default_family configured"))?;
      let family = config
        .family(&name)
        .ok_or_else(|| eyre!("Unknown resource family: {}", name))?;

      let store = Arc::new(CacheStore::new());
      let fetcher = Arc::new(Fetcher::new(store, Arc::clone(&transport) as Arc<dyn Transport>));

      let browser = if let Some(address) = address {
        ResourceBrowser::at_location(family, fetcher, Location::parse(&address))
      } else {
        let mut state = slink::FilterState::new(size.unwrap_or(family.default_size()));
        if let Some(page) = page {
          state = state.with_page(page);
        }
        for pair in &filters {
          let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("Filter must be NAME=VALUE: {}", pair))?;
          state = state.with_field(name, value);
        }
        let location = Location::with_query(family.collection(), &state.canonical_query());
        ResourceBrowser::at_location(family, fetcher, location)
      };

      let page = browser.load().await?;
      eprintln!(
        "{} · page {} of {} · {} total",
        browser.location(),
        browser.filter().page() + 1,
        page.total_pages(browser.filter().size()),
        page.total_elements
      );
      println!("{}", serde_json::to_string_pretty(&page.content)?);
    }

    Command::Stats => {
      let store = Arc::new(CacheStore::new());
      let fetcher = Fetcher::new(store, Arc::clone(&transport) as Arc<dyn Transport>);
      let stats = fetcher.fetch_value("/api/admin/stats").await?;
      println!("{}", serde_json::to_string_pretty(&stats)?);
    }
  }

  Ok(())
}

/// Route logs to a file so stdout stays parseable JSON.
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("slink");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory: {}", e))?;

  let appender = tracing_appender::rolling::never(log_dir, "slink.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
