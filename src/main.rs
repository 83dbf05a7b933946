use std::fs::OpenOptions;
use std::sync::Arc;

use chatrelay::Surface;
use chatrelay::core::config::{
    self, CliOverrides, ConfigSource, LoadedConfig, RelayConfig, ResolvedConfig,
};
use chatrelay::inference::{CompletionProvider, OpenAiProvider};
use chatrelay::{http, mcp};
use clap::Parser;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

#[derive(Parser)]
#[command(name = "chatrelay", about = "Relay chat and text analysis requests to OpenAI")]
struct Args {
    /// Transport surface to serve
    #[arg(short, long, default_value_t, value_enum)]
    mode: Surface,

    /// Address for the HTTP server (e.g. 0.0.0.0:8080)
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,
}

/// Logs go to stderr, plus the configured file. Stdout is reserved for the stdio protocol.
fn init_logging(resolved: &ResolvedConfig) {
    let level = resolved
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    if let Some(path) = &resolved.log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, log_config, file)),
            Err(e) => eprintln!("chatrelay: cannot open log file {}: {e}", path.display()),
        }
    }

    let _ = CombinedLogger::init(loggers);
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logging is configured from the resolved config, so the outcome of
    // loading is held and logged after init_logging.
    let loaded = config::load_config();
    let defaults = RelayConfig::default();
    let file_config = match &loaded {
        Ok(LoadedConfig { config, .. }) => config,
        Err(_) => &defaults,
    };
    let resolved = config::resolve(
        file_config,
        &CliOverrides {
            bind: args.bind,
            log_level: args.log_level,
        },
    );

    init_logging(&resolved);
    match &loaded {
        Ok(LoadedConfig { config, source }) => {
            match source {
                ConfigSource::File(_) | ConfigSource::Generated(_) => log::info!("{source}"),
                ConfigSource::NotWritten { .. } | ConfigSource::NoHomeDir => {
                    log::warn!("{source}")
                }
            }
            // api_key deliberately left out of the log line
            log::debug!(
                "Config: bind={:?}, base_url={:?}, logging={:?}",
                config.server.bind,
                config.openai.base_url,
                config.logging
            );
        }
        Err(e) => log::warn!("{e}; continuing with defaults"),
    }

    log::info!("chatrelay starting with surface: {:?}", args.mode);
    if resolved.openai_api_key.is_none() {
        log::warn!("OPENAI_API_KEY is not set; every provider call will fail");
    }

    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(
        resolved.openai_api_key.clone(),
        Some(resolved.openai_base_url.clone()),
    ));

    match args.mode {
        Surface::Http => http::serve(&resolved.bind, provider).await,
        Surface::Stdio => mcp::serve_stdio(provider).await,
    }
}
