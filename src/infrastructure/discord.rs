//! # Discord Service Adapter
//!
//! Implements the `ChatProvider` trait for Discord using serenity's HTTP client (via poise).
//! Also renders platform-neutral [`Notice`]s into embeds.

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

use crate::domain::traits::ChatProvider;
use crate::domain::types::{ChannelId, Notice, Tone, UserId};

/// Embed description limit enforced by Discord.
const MAX_DESCRIPTION_LEN: usize = 4096;
/// Embed field value limit enforced by Discord.
const MAX_FIELD_LEN: usize = 1024;

#[derive(Clone)]
pub struct DiscordService {
    http: Arc<serenity::Http>,
}

impl DiscordService {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

/// Cuts `text` to at most `max` bytes on a char boundary, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max.saturating_sub('…'.len_utf8());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

fn colour(tone: Tone) -> serenity::Colour {
    match tone {
        Tone::Success => serenity::Colour::DARK_GREEN,
        Tone::Error => serenity::Colour::RED,
        Tone::Warning => serenity::Colour::ORANGE,
    }
}

/// Presenter: one embed per notice, coloured by tone.
pub fn render(notice: &Notice) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&notice.title)
        .colour(colour(notice.tone));
    if !notice.body.is_empty() {
        embed = embed.description(truncate(&notice.body, MAX_DESCRIPTION_LEN));
    }
    for (name, value) in &notice.fields {
        embed = embed.field(name, truncate(value, MAX_FIELD_LEN), true);
    }
    embed
}

#[async_trait]
impl ChatProvider for DiscordService {
    async fn send_direct(&self, user: UserId, notice: &Notice) -> Result<(), String> {
        let channel = serenity::UserId::new(user.0)
            .create_dm_channel(&*self.http)
            .await
            .map_err(|e| e.to_string())?;
        channel
            .send_message(&*self.http, serenity::CreateMessage::new().embed(render(notice)))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn send_to_channel(&self, channel: ChannelId, notice: &Notice) -> Result<(), String> {
        serenity::ChannelId::new(channel.0)
            .send_message(&*self.http, serenity::CreateMessage::new().embed(render(notice)))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
