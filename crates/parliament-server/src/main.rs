//! parliament-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API over HTTP.
//!
//! # Bootstrapping the first admin
//!
//! ```sh
//! echo 'secret' | cargo run -p parliament-server --bin server -- create-user \
//!   --username admin --first-name Ada --last-name Admin --role admin
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use parliament_api::password::hash_password;
use parliament_core::{
  store::ParliamentStore as _,
  user::{NewUser, Role},
};
use parliament_server::ServerConfig;
use parliament_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Parliament records server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,

  /// Create a user; the password is read from stdin.
  CreateUser(CreateUserArgs),

  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
}

#[derive(Args)]
struct CreateUserArgs {
  #[arg(long)]
  username:   String,
  #[arg(long)]
  first_name: String,
  #[arg(long)]
  last_name:  String,
  /// One of admin, teacher, student, kiosk.
  #[arg(long)]
  role:       Role,
  #[arg(long)]
  class_id:   Option<String>,
  /// Calendar date, `YYYY-MM-DD`.
  #[arg(long)]
  birthday:   Option<NaiveDate>,
  #[arg(long)]
  email:      Option<String>,
  /// External auth identity.
  #[arg(long)]
  uid:        Option<String>,
}

impl CreateUserArgs {
  fn into_new_user(self, password_hash: String) -> NewUser {
    let mut input = NewUser::new(
      self.username,
      self.first_name,
      self.last_name,
      self.role,
      password_hash,
    );
    input.class_id = self.class_id;
    input.birthday = self.birthday;
    input.email = self.email;
    input.uid = self.uid;
    input
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => {
      let password = read_password()?;
      println!("{}", hash_password(&password)?);
      Ok(())
    }
    Command::CreateUser(args) => {
      let store = open_store(&load_config(&cli.config)?).await?;
      let password = read_password()?;
      let input = args.into_new_user(hash_password(&password)?);

      let user = store
        .create_user(input)
        .await
        .context("failed to create user")?;
      tracing::info!(user_id = %user.id, name = %user.full_name(), role = %user.role, "created user");
      println!("{}", user.id);
      Ok(())
    }
    Command::Serve => serve(load_config(&cli.config)?).await,
  }
}

async fn serve(server_cfg: ServerConfig) -> anyhow::Result<()> {
  let store = open_store(&server_cfg).await?;
  let app = parliament_server::router(Arc::new(store));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}/api");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn load_config(path: &std::path::Path) -> anyhow::Result<ServerConfig> {
  ServerConfig::load(path).context("failed to read configuration")
}

async fn open_store(server_cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = server_cfg.resolved_store_path();
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

/// Read one password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
