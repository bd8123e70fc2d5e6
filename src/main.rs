//! `token-refresher` binary: keeps an exchanged access token fresh for its pod neighbors.

// std
use std::io;
// crates.io
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;
// self
use token_refresher::{
	CancellationToken,
	config::{DEFAULT_REFRESH_INTERVAL, Settings},
	error::ConfigError,
	http::ReqwestExchanger,
	refresh::Refresher,
};

/// Exchanges a projected identity token for an access token and keeps it fresh on disk.
#[derive(Debug, Parser)]
#[command(name = "token-refresher", version, about)]
struct Cli {
	/// File holding the subject (identity) token.
	#[arg(long, env = "SA_TOKEN_PATH")]
	sa_token_path: Option<String>,
	/// File that receives the exchanged access token.
	#[arg(long, env = "OUTPUT_TOKEN_PATH")]
	output_token_path: Option<String>,
	/// Token exchange endpoint.
	#[arg(long, env = "EXCHANGE_URL")]
	exchange_url: Option<String>,
	/// Longest time between refreshes, e.g. `30m` or `1h`.
	#[arg(long, env = "REFRESH_INTERVAL", default_value = DEFAULT_REFRESH_INTERVAL)]
	refresh_interval: String,
	/// Audience requested for the access token.
	#[arg(long, env = "AUDIENCE")]
	audience: Option<String>,
	/// Emit logs as JSON lines.
	#[arg(long, env = "LOG_JSON")]
	log_json: bool,
}
impl Cli {
	fn settings(&self) -> Result<Settings, ConfigError> {
		let mut builder = Settings::builder().refresh_interval(&self.refresh_interval);

		if let Some(path) = &self.sa_token_path {
			builder = builder.source_token_path(path);
		}
		if let Some(path) = &self.output_token_path {
			builder = builder.output_token_path(path);
		}
		if let Some(url) = &self.exchange_url {
			builder = builder.exchange_url(url);
		}
		if let Some(audience) = &self.audience {
			builder = builder.audience(audience);
		}

		builder.build()
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	init_tracing(cli.log_json);

	let settings = cli.settings().wrap_err("Failed to load configuration.")?;

	tracing::info!(
		source_token_path = %settings.source_token_path.display(),
		output_token_path = %settings.output_token_path.display(),
		exchange_url = %settings.exchange_url,
		refresh_interval_secs = settings.refresh_interval.as_secs(),
		audience = settings.audience.as_deref().unwrap_or_default(),
		"Starting token refresher."
	);

	let exchanger = ReqwestExchanger::new().wrap_err("Failed to build the HTTP client.")?;
	let refresher: Refresher<ReqwestExchanger> = Refresher::new(settings, exchanger);
	let cancel = CancellationToken::new();

	watch_shutdown(cancel.clone()).wrap_err("Failed to install signal handlers.")?;
	refresher.run(&cancel).await;
	tracing::info!("Token refresher stopped.");

	Ok(())
}

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

	if json {
		subscriber.json().init();
	} else {
		subscriber.init();
	}
}

/// Cancels `cancel` on the first SIGTERM or SIGINT.
#[cfg(unix)]
fn watch_shutdown(cancel: CancellationToken) -> io::Result<()> {
	// crates.io
	use tokio::signal::unix::{SignalKind, signal};

	let mut terminate = signal(SignalKind::terminate())?;
	let mut interrupt = signal(SignalKind::interrupt())?;

	tokio::spawn(async move {
		let name = tokio::select! {
			_ = terminate.recv() => "SIGTERM",
			_ = interrupt.recv() => "SIGINT",
		};

		tracing::info!(signal = name, "Received termination signal.");
		cancel.cancel();
	});

	Ok(())
}

/// Cancels `cancel` on Ctrl-C.
#[cfg(not(unix))]
fn watch_shutdown(cancel: CancellationToken) -> io::Result<()> {
	tokio::spawn(async move {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "Failed to listen for Ctrl-C.");

			return;
		}

		tracing::info!(signal = "ctrl-c", "Received termination signal.");
		cancel.cancel();
	});

	Ok(())
}
