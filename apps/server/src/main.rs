use clap::{Parser, Subcommand};
use savetrack_server::{
    api::app_router, auth::provision_user, build_state, config::Config, init_tracing,
};
use tower_http::services::{ServeDir, ServeFile};

#[derive(Parser)]
#[command(name = "savetrack-server", version, about = "Savings goal tracker HTTP API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Provision an API user and print its key once
    CreateUser {
        /// 3-50 characters: letters, digits, '_' or '-'
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::CreateUser { username } => {
            let (user, key) = provision_user(&state, &username).await?;
            println!("Created user {}", user.username);
            println!("API key (shown only once): {key}");
            Ok(())
        }
        Command::Serve => {
            let static_dir = std::path::PathBuf::from(&config.static_dir);
            let index_file = static_dir.join("index.html");
            let static_service = ServeDir::new(static_dir).fallback(ServeFile::new(index_file));
            let router = app_router(state, &config).fallback_service(static_service);
            tracing::info!("Listening on {}", config.listen_addr);
            let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
            axum::serve(listener, router).await?;
            Ok(())
        }
    }
}
