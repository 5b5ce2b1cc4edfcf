//! Bot layer - Discord-specific interface and command handlers.
//!
//! Commands are registered as an explicit list on the framework builder;
//! context restrictions (guild-only) are declared on each command and checked
//! by the framework before the coordinator is ever invoked.

/// Discord command implementations
pub mod commands;

use crate::api;
use crate::audio::events;
use crate::audio::lavalink::LavalinkNode;
use crate::config::settings::AppConfig;
use crate::core::coordinator::Coordinator;
use crate::core::registry::PlayerRegistry;
use crate::errors;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use songbird::SerenityInit;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// The coordinator behind every music command
    pub coordinator: Arc<Coordinator>,
}

pub(crate) type Error = errors::Error;
pub(crate) type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            panic!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {}", error)).await {
                tracing::error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e)
            }
        }
    }
}

/// Connects the gateway client, spawns the REST API and the audio node event
/// socket, and runs until the process exits.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    config: AppConfig,
    db: DatabaseConnection,
    coordinator: Arc<Coordinator>,
    node: Arc<LavalinkNode>,
    registry: Arc<PlayerRegistry>,
    songbird: Arc<songbird::Songbird>,
) -> errors::Result<()> {
    let lavalink_config = config.lavalink.clone();
    let setup_coordinator = Arc::clone(&coordinator);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::play(),
                commands::stop(),
                commands::skip(),
                commands::queue(),
                commands::disconnect(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // The node handshake needs the bot's user id, so the event
                // socket starts only once the gateway session is ready.
                tokio::spawn(events::run(
                    lavalink_config,
                    ready.user.id.get(),
                    node,
                    registry,
                ));

                Ok(BotData {
                    coordinator: setup_coordinator,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .register_songbird_with(songbird)
        .await?;

    // The REST API shares the gateway cache for its connected-server count
    let api_state = api::AppState {
        db,
        coordinator,
        cache: Arc::clone(&client.cache),
    };
    let bind = config.api_bind.clone();
    tokio::spawn(async move {
        if let Err(err) = api::serve(api_state, bind).await {
            error!("REST API server exited: {}", err);
        }
    });

    info!("Starting bot client...");
    client.start().await.map_err(Into::into)
}
