use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tiny_cdn::logging::init_logging;
use tiny_cdn::{CdnSettings, HostContext, RewritePass, SiteOrigins, TinyCdn, UploadDir, UrlHook};

#[derive(Parser)]
#[command(name = "tiny-cdn")]
#[command(about = "Rewrite CMS asset URLs to an origin pull CDN", long_about = None)]
struct Cli {
  /// Settings file (JSON, or YAML by extension). Defaults to ./tiny-cdn.json when present.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Public site URL the local origins are derived from.
  #[arg(long, default_value = "http://localhost")]
  site_url: String,

  /// Override the local includes origin.
  #[arg(long)]
  includes_origin: Option<String>,

  /// Override the local content origin.
  #[arg(long)]
  content_origin: Option<String>,

  /// Capability held by the simulated principal (repeatable).
  #[arg(long = "capability")]
  capabilities: Vec<String>,

  /// Simulate an administrative request.
  #[arg(long)]
  admin: bool,

  /// Simulate the host's script-debug mode.
  #[arg(long)]
  script_debug: bool,

  /// Increase log verbosity.
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Filter a single URL through a URL hook
  Url {
    /// Hook name, e.g. script_loader_src or plugins_url.
    #[arg(long, default_value = "script_loader_src")]
    hook: UrlHook,
    url: String,
  },
  /// Filter an HTML fragment read from FILE or stdin
  Content { file: Option<PathBuf> },
  /// Filter an upload directory JSON record read from FILE or stdin
  UploadDir { file: Option<PathBuf> },
}

struct CliHost {
  admin: bool,
  script_debug: bool,
  capabilities: Vec<String>,
}

impl HostContext for CliHost {
  fn is_admin(&self) -> bool {
    self.admin
  }

  fn script_debug(&self) -> bool {
    self.script_debug
  }

  fn has_capability(&self, capability: &str) -> bool {
    self.capabilities.iter().any(|held| held == capability)
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let settings = load_settings(cli.config.as_deref())?.apply_env_overrides();
  let mut origins = SiteOrigins::from_site_url(&cli.site_url);
  if let Some(includes) = cli.includes_origin {
    origins.includes_url = includes;
  }
  if let Some(content) = cli.content_origin {
    origins.content_url = content;
  }

  let host = CliHost {
    admin: cli.admin,
    script_debug: cli.script_debug,
    capabilities: cli.capabilities,
  };
  let cdn = TinyCdn::new(settings, origins);
  let pass = cdn
    .try_begin_pass(&host)
    .context("invalid tiny-cdn settings")?;

  let output = match cli.command {
    Commands::Url { hook, url } => {
      let filtered = match &pass {
        Some(pass) => pass.filter_url(hook, &url),
        None => url,
      };
      format!("{filtered}\n")
    }
    Commands::Content { file } => {
      let html = read_input(file.as_deref())?;
      match &pass {
        Some(pass) => pass.filter_content(&html),
        None => html,
      }
    }
    Commands::UploadDir { file } => {
      let raw = read_input(file.as_deref())?;
      let upload: UploadDir =
        serde_json::from_str(&raw).context("failed to parse upload directory record")?;
      let upload = filter_upload(pass.as_ref(), upload);
      let mut json = serde_json::to_string_pretty(&upload)?;
      json.push('\n');
      json
    }
  };

  io::stdout()
    .lock()
    .write_all(output.as_bytes())
    .context("failed to write output")?;
  Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<CdnSettings> {
  match path {
    Some(path) => Ok(CdnSettings::from_path(path)?),
    None => {
      let cwd = std::env::current_dir().context("failed to resolve current directory")?;
      Ok(CdnSettings::discover(&cwd))
    }
  }
}

fn filter_upload(pass: Option<&RewritePass>, upload: UploadDir) -> UploadDir {
  match pass {
    Some(pass) => pass.filter_upload_dir(upload),
    None => upload,
  }
}

fn read_input(path: Option<&Path>) -> Result<String> {
  match path {
    Some(path) => {
      fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
    None => {
      let mut buffer = String::new();
      io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
      Ok(buffer)
    }
  }
}
