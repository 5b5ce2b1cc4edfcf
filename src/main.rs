use dotenvy::dotenv;
use jukebot::audio::lavalink::LavalinkNode;
use jukebot::audio::voice::SongbirdVoice;
use jukebot::bot;
use jukebot::config;
use jukebot::config::database;
use jukebot::core::coordinator::Coordinator;
use jukebot::core::node::{AudioNode, VoiceConnector};
use jukebot::core::registry::PlayerRegistry;
use jukebot::errors::{Error, Result};
use songbird::Songbird;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::settings::load_app_configuration();
    info!("Successfully processed application configuration.");

    // 4. Initialize database
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Wire the audio collaborators and the coordinator
    let node = Arc::new(LavalinkNode::new(&app_config.lavalink));
    let songbird = Songbird::serenity();
    let voice = Arc::new(SongbirdVoice::new(Arc::clone(&songbird)));
    let registry = Arc::new(PlayerRegistry::new(
        Arc::clone(&node) as Arc<dyn AudioNode>,
        voice as Arc<dyn VoiceConnector>,
    ));
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&registry),
        Arc::clone(&node) as Arc<dyn AudioNode>,
        db.clone(),
    ));

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use, not stored in AppConfig
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, app_config, db, coordinator, node, registry, songbird).await?;

    Ok(())
}
