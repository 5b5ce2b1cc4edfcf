//! Music Discord commands - play, stop, skip, queue, disconnect.
//!
//! Each command is a thin translation layer: it extracts the guild and the
//! requesting member's voice channel, defers the interaction, and forwards to
//! the coordinator. The coordinator decides the reply audience; failures come
//! back as ephemeral messages visible only to the requester.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::bot::Context;
    use crate::core::coordinator::Reply;
    use crate::errors::Result;
    use poise::CreateReply;

    /// Sends a coordinator reply, honoring its audience tag.
    async fn send_reply(ctx: Context<'_>, reply: Reply) -> Result<()> {
        let (text, ephemeral) = match reply {
            Reply::Public(text) => (text, false),
            Reply::Ephemeral(text) => (text, true),
        };
        ctx.send(CreateReply::default().content(text).ephemeral(ephemeral))
            .await?;
        Ok(())
    }

    /// The requesting member's current voice channel, if any.
    fn member_voice_channel(ctx: &Context<'_>) -> Option<u64> {
        let guild = ctx.guild()?;
        guild
            .voice_states
            .get(&ctx.author().id)
            .and_then(|state| state.channel_id)
            .map(|channel| channel.get())
    }

    /// Plays music
    #[poise::command(slash_command, guild_only)]
    pub async fn play(
        ctx: Context<'_>,
        #[description = "Track to play"] query: String,
    ) -> Result<()> {
        // Resolving and starting a track can take a moment; defer so Discord
        // shows the pending state instead of timing the interaction out.
        ctx.defer().await?;
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let channel = member_voice_channel(&ctx);

        let reply = ctx
            .data()
            .coordinator
            .play(guild_id.get(), channel, &query)
            .await?;
        send_reply(ctx, reply).await
    }

    /// Stops the current playback
    #[poise::command(slash_command, guild_only)]
    pub async fn stop(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let reply = ctx.data().coordinator.stop(guild_id.get()).await?;
        send_reply(ctx, reply).await
    }

    /// Skips the current track
    #[poise::command(slash_command, guild_only)]
    pub async fn skip(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let reply = ctx.data().coordinator.skip(guild_id.get()).await?;
        send_reply(ctx, reply).await
    }

    /// Displays the current queue
    #[poise::command(slash_command, guild_only)]
    pub async fn queue(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let reply = ctx.data().coordinator.show_queue(guild_id.get()).await?;
        send_reply(ctx, reply).await
    }

    /// Disconnects the bot from the voice channel
    #[poise::command(slash_command, guild_only)]
    pub async fn disconnect(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let reply = ctx.data().coordinator.disconnect(guild_id.get()).await?;
        send_reply(ctx, reply).await
    }
}

// Re-export all commands
pub use inner::*;
