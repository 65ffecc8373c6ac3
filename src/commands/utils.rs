use std::time::Duration;

use anyhow::{Context, Result};
use serenity::{
    builder::{CreateActionRow, CreateButton},
    model::{
        permissions::Permissions,
        prelude::{
            component::ButtonStyle,
            interaction::{
                application_command::ApplicationCommandInteraction, InteractionResponseType,
            },
        },
    },
};

use crate::config::Config;

/// Build a button opening the given url
pub fn link_button(url: &str, display_name: &str) -> CreateButton {
    let mut b = CreateButton::default();
    b.url(url);
    b.label(display_name);
    b.style(ButtonStyle::Link);
    b
}

/// Build the row of buttons leading to the bot invite, its code and the website
pub fn link_buttons(config: &Config) -> CreateActionRow {
    let mut row = CreateActionRow::default();
    row.add_button(link_button(&config.invite_url, "Invite Bot"));
    row.add_button(link_button(&config.repository_url, "Code Repository"));
    row.add_button(link_button(&config.website_url, "Website"));
    row
}

/// Answer an interaction with a message only the user can see
pub async fn reply_ephemeral(
    ctx: &serenity::prelude::Context,
    command: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    command
        .create_interaction_response(ctx, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|d| d.ephemeral(true).content(content))
        })
        .await
        .context("Failed to write message")
}

/// The permissions from `required` that are not in `granted`
pub fn missing_permissions(granted: Permissions, required: Permissions) -> Permissions {
    required - granted
}

const SECOND: u128 = 1000;
const MINUTE: u128 = SECOND * 60;
const HOUR: u128 = MINUTE * 60;
const DAY: u128 = HOUR * 24;

/// Render a duration in its largest unit, e.g. "3 hours" or "1 day"
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    let units = [
        (DAY, "day"),
        (HOUR, "hour"),
        (MINUTE, "minute"),
        (SECOND, "second"),
    ];
    match units.iter().find(|(unit, _)| ms >= *unit) {
        Some(&(unit, name)) => plural(ms, unit, name),
        None => format!("{ms} ms"),
    }
}

fn plural(ms: u128, unit: u128, name: &str) -> String {
    // Round half up
    let count = (ms + unit / 2) / unit;
    let is_plural = ms * 2 >= unit * 3;
    format!("{count} {name}{}", if is_plural { "s" } else { "" })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serenity::model::permissions::Permissions;

    use super::{format_duration, link_buttons, missing_permissions};
    use crate::config::Config;

    #[test]
    fn format_below_a_second() {
        assert_eq!(format_duration(Duration::ZERO), "0 ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999 ms");
    }

    #[test]
    fn format_singular_units() {
        assert_eq!(format_duration(Duration::from_secs(1)), "1 second");
        assert_eq!(format_duration(Duration::from_secs(60)), "1 minute");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1 hour");
        assert_eq!(format_duration(Duration::from_secs(86400)), "1 day");
    }

    #[test]
    fn format_rounds_and_pluralizes() {
        assert_eq!(format_duration(Duration::from_millis(1499)), "1 second");
        assert_eq!(format_duration(Duration::from_millis(1500)), "2 seconds");
        assert_eq!(format_duration(Duration::from_secs(100)), "2 minutes");
        assert_eq!(format_duration(Duration::from_secs(90 * 60)), "2 hours");
        assert_eq!(format_duration(Duration::from_secs(10 * 86400)), "10 days");
    }

    #[test]
    fn missing_permissions_only_lists_absent_ones() {
        let required = Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS;
        assert_eq!(
            missing_permissions(Permissions::SEND_MESSAGES, required),
            Permissions::EMBED_LINKS
        );
        assert!(missing_permissions(Permissions::all(), required).is_empty());
    }

    #[test]
    fn link_buttons_in_order() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "invite_url": "https://invite",
            "repository_url": "https://repo",
            "website_url": "https://site",
            "primary_color": 0,
            "company_bio": "",
            "bot_bio": "",
        }))
        .unwrap();
        let row = link_buttons(&config);
        let components = row.0.get("components").unwrap().as_array().unwrap();
        let labels: Vec<&str> = components
            .iter()
            .map(|b| b["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["Invite Bot", "Code Repository", "Website"]);
        assert_eq!(components[1]["url"], "https://repo");
        assert_eq!(components[0]["style"], 5);
    }
}
