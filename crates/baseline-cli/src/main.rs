// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use baseline_client::{App, DemoApi, HttpApi, LoginOutcome, RemoteApi, View};
use baseline_client_config::{load_config_with_cli, CliOverrides, ClientConfig, LogFormat, LogLevel, LoggingConfig};
use baseline_client_storage::FileTokenStore;
use baseline_common_secret::SecretString;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "baseline", version, about = "Baseline Manager client", long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Base URL of the Baseline API
	#[arg(long)]
	api_url: Option<String>,

	/// Use the bundled demo data instead of a live API
	#[arg(long)]
	demo: bool,

	/// Where the session is persisted
	#[arg(long)]
	state_file: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Sign in with the shared password
	Login {
		/// Read the password from stdin instead of prompting
		#[arg(long)]
		password_stdin: bool,
	},
	/// Sign out and wipe the persisted client state
	Logout,
	/// Show the session state
	Status,
	/// List things; each filter is applied as a separate request, in order
	Things {
		/// Case-insensitive filters, matched against display name or key
		filters: Vec<String>,
	},
	/// Resolve a path the way the web client would and render the view
	Open {
		/// Path such as `/`, `/login` or `/dashboard`
		path: String,
	},
	/// Show version information
	Version,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			api_url: args.api_url.clone(),
			demo: args.demo.then_some(true),
			state_file: args.state_file.clone(),
			log_level: args.log_level.clone(),
			log_format: if args.json_logs {
				Some("json".to_string())
			} else {
				None
			},
			config_file: args.config.clone(),
		}
	}
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!("baseline={}", log_level_to_tracing(logging.level)))
	});

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

fn build_app(config: &ClientConfig) -> Result<App> {
	let api: Arc<dyn RemoteApi> = if config.api.demo {
		Arc::new(DemoApi::new())
	} else {
		Arc::new(HttpApi::new(&config.api.base_url).context("failed to create HTTP client")?)
	};
	let storage = Arc::new(FileTokenStore::new(&config.session.state_file));

	Ok(App::builder(api, storage)
		.min_latency(config.auth.min_latency())
		.build())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!(
			"baseline {} ({}-{})",
			env!("CARGO_PKG_VERSION"),
			std::env::consts::OS,
			std::env::consts::ARCH
		);
		return Ok(ExitCode::SUCCESS);
	}

	let config = load_config_with_cli(CliOverrides::from(&args)).context("failed to load configuration")?;
	init_tracing(&config.logging);

	info!(
		base_url = %config.api.base_url,
		demo = config.api.demo,
		"starting baseline"
	);

	let app = build_app(&config)?;
	app.start().await;

	let code = match &args.command {
		Command::Login { password_stdin } => login(&app, *password_stdin).await?,
		Command::Logout => {
			app.logout().await;
			println!("Signed out.");
			ExitCode::SUCCESS
		}
		Command::Status => status(&app, &config).await,
		Command::Things { filters } => things(&app, filters).await,
		Command::Open { path } => open(&app, path).await?,
		Command::Version => ExitCode::SUCCESS,
	};

	app.shutdown();
	Ok(code)
}

async fn login(app: &App, password_stdin: bool) -> Result<ExitCode> {
	let settled = app.navigate("/login")?;
	if settled.view != View::Login {
		println!("Already signed in.");
		return Ok(show(app, settled.view).await);
	}

	println!("{}", render::nav_bar(app.nav_action(View::Login)));
	let password = read_password(app.is_demo(), password_stdin).await?;

	eprintln!("Signing in...");
	match app.login().submit(password).await {
		LoginOutcome::Success(session) => {
			println!("Signed in. Session valid until {}.", session.expires_at());
			Ok(show(app, View::Dashboard).await)
		}
		LoginOutcome::Rejected(details) => {
			eprint!("{}", render::error(&details));
			Ok(ExitCode::FAILURE)
		}
		LoginOutcome::Busy => {
			eprintln!("A login is already in progress.");
			Ok(ExitCode::FAILURE)
		}
		LoginOutcome::Failed(_) => {
			present_error(app).await;
			Ok(ExitCode::FAILURE)
		}
	}
}

async fn read_password(demo: bool, from_stdin: bool) -> Result<SecretString> {
	let mut stdin = tokio::io::stdin();

	if from_stdin {
		let mut buf = String::new();
		stdin
			.read_to_string(&mut buf)
			.await
			.context("failed to read password from stdin")?;
		let trimmed = buf.trim_end_matches(['\r', '\n']).to_string();
		return Ok(SecretString::new(trimmed));
	}

	eprint!("{}", render::login_prompt(demo));
	let mut line = String::new();
	BufReader::new(stdin)
		.read_line(&mut line)
		.await
		.context("failed to read password")?;
	Ok(SecretString::new(
		line.trim_end_matches(['\r', '\n']).to_string(),
	))
}

async fn status(app: &App, config: &ClientConfig) -> ExitCode {
	let view = app.navigate("/").map(|s| s.view).unwrap_or(View::Welcome);
	println!("{}", render::nav_bar(app.nav_action(view)));

	match app.sessions().session().await {
		Some(session) => println!("Signed in until {}.", session.expires_at()),
		None => println!("Signed out."),
	}
	if config.api.demo {
		println!("API: demo mode");
	} else {
		println!("API: {}", config.api.base_url);
	}
	println!("State file: {}", config.session.state_file.display());
	ExitCode::SUCCESS
}

async fn things(app: &App, filters: &[String]) -> ExitCode {
	let settled = match app.navigate("/dashboard") {
		Ok(settled) => settled,
		Err(e) => {
			eprintln!("{e}");
			return ExitCode::FAILURE;
		}
	};
	if settled.view != View::Dashboard {
		eprintln!("Not signed in. Run `baseline login` first.");
		show(app, settled.view).await;
		return ExitCode::FAILURE;
	}

	println!("{}", render::nav_bar(app.nav_action(View::Dashboard)));

	let mut shown = app.things().list(None).await;
	if present_error(app).await {
		return ExitCode::FAILURE;
	}

	let mut last_filter = None;
	for filter in filters {
		debug!(filter = %filter, "applying filter");
		shown = app.things().list(Some(filter)).await;
		if present_error(app).await {
			return ExitCode::FAILURE;
		}
		last_filter = Some(filter.as_str());
	}

	print!("{}", render::dashboard(&shown, last_filter, app.is_demo()));
	ExitCode::SUCCESS
}

async fn open(app: &App, path: &str) -> Result<ExitCode> {
	let settled = app.navigate(path)?;
	for hop in &settled.redirects {
		eprintln!("Redirected to {hop}");
	}
	println!("{}", render::nav_bar(app.nav_action(settled.view)));
	Ok(show(app, settled.view).await)
}

/// Render a settled view. The dashboard loads the collection.
async fn show(app: &App, view: View) -> ExitCode {
	match view {
		View::Welcome => {
			print!("{}", render::welcome(app.is_demo()));
			ExitCode::SUCCESS
		}
		View::Login => {
			print!("{}", render::view_hint(View::Login));
			ExitCode::SUCCESS
		}
		View::Dashboard => {
			let things = app.things().list(None).await;
			if present_error(app).await {
				return ExitCode::FAILURE;
			}
			print!("{}", render::dashboard(&things, None, app.is_demo()));
			ExitCode::SUCCESS
		}
		View::NotFound => {
			print!("{}", render::not_found());
			ExitCode::FAILURE
		}
	}
}

/// Show and acknowledge the pending error, if any.
async fn present_error(app: &App) -> bool {
	let Some(details) = app.errors().pending() else {
		return false;
	};

	eprint!("{}", render::error(&details));
	app.acknowledge_error().await;
	if details.forces_logout {
		eprintln!("Signed out.");
	}
	true
}
