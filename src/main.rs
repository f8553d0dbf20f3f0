use tracing::info;

use campus::db::WhitelistRepository;
use campus::{Config, Database, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = campus::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        campus::logging::init_console_only(&config.logging.level);
    }

    info!("Campus - school back-office server");

    if config.session.secret.is_empty() {
        eprintln!("session.secret is not set; refusing to start");
        std::process::exit(1);
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    // Seed the admin whitelist from configuration (add-only)
    let whitelist = WhitelistRepository::new(db.pool());
    if let Err(e) = whitelist.seed(&config.admin.whitelist).await {
        eprintln!("Failed to seed admin whitelist: {e}");
        std::process::exit(1);
    }

    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let server = WebServer::new(&config, db);
    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
