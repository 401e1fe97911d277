//! System status integration.
//!
//! Volume, brightness, battery, media, and the Wi-Fi toggle all go through
//! short external commands (`wpctl`, `brightnessctl`, `upower`,
//! `playerctl`, `nmcli`). Refreshes publish fallback values when a command
//! fails; setters publish optimistically and fire the command without
//! waiting for it.

use std::sync::Arc;

use crate::constants::fallback;
use crate::notifications::NotificationCenter;
use crate::store::ShellStore;
use crate::utils::command::{capture, run_detached};

/// Extracts a 0..=100 percentage from command output by keeping only its
/// digits. `"Volume: 0.45"` parses as 45, `"55%"` as 55.
#[must_use]
pub fn parse_percent(raw: &str, fallback: u8) -> u8 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u32>().map_or(fallback, |value| u8::try_from(value.min(100)).unwrap_or(100))
}

/// Refreshes the media line from `playerctl`.
pub async fn refresh_media(store: &ShellStore) {
    let line = match capture("playerctl", &["metadata", "--format", "{{artist}} - {{title}}"]).await
    {
        Ok(out) => {
            let trimmed = out.trim();
            if trimmed.is_empty() {
                fallback::MEDIA_INFO.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(err) => {
            tracing::debug!(error = %err, "media query failed");
            fallback::MEDIA_INFO.to_string()
        }
    };
    store.media_info.set(line);
}

/// Refreshes volume, brightness, and battery text. Volume and brightness
/// keep their previous values on failure; battery degrades to its
/// placeholder.
pub async fn refresh_system(store: &ShellStore) {
    match capture("wpctl", &["get-volume", "@DEFAULT_AUDIO_SINK@"]).await {
        Ok(out) => store.volume.set(parse_percent(&out, store.volume.get())),
        Err(err) => tracing::debug!(error = %err, "volume query failed"),
    }

    match capture("brightnessctl", &["-m"]).await {
        Ok(out) => {
            if let Some(percent_field) = out.split(',').nth(3) {
                store.brightness.set(parse_percent(percent_field, store.brightness.get()));
            }
        }
        Err(err) => tracing::debug!(error = %err, "brightness query failed"),
    }

    store.battery_text.set(query_battery_text().await);
}

/// Battery percentage text via `upower`, or the placeholder.
async fn query_battery_text() -> String {
    let Ok(devices) = capture("upower", &["-e"]).await else {
        return fallback::BATTERY_TEXT.to_string();
    };
    let Some(battery_path) = devices.lines().find(|line| line.contains("BAT")) else {
        return fallback::BATTERY_TEXT.to_string();
    };

    match capture("upower", &["-i", battery_path.trim()]).await {
        Ok(info) => info
            .lines()
            .find(|line| line.contains("percentage"))
            .and_then(|line| line.split_whitespace().last())
            .map_or_else(|| fallback::BATTERY_TEXT.to_string(), ToString::to_string),
        Err(err) => {
            tracing::debug!(error = %err, "battery query failed");
            fallback::BATTERY_TEXT.to_string()
        }
    }
}

/// Publishes a clamped volume and pushes it to the audio server.
pub fn set_volume(store: &ShellStore, percent: u8) {
    let clamped = percent.min(100);
    store.volume.set(clamped);
    run_detached(
        "wpctl",
        vec![
            "set-volume".to_string(),
            "@DEFAULT_AUDIO_SINK@".to_string(),
            format!("{:.2}", f32::from(clamped) / 100.0),
        ],
    );
}

/// Publishes a clamped brightness and pushes it to the backlight. The lower
/// bound keeps the panel from going fully dark.
pub fn set_brightness(store: &ShellStore, percent: u8) {
    let clamped = percent.clamp(5, 100);
    store.brightness.set(clamped);
    run_detached("brightnessctl", vec!["set".to_string(), format!("{clamped}%")]);
}

/// Flips the Wi-Fi flag, applies it through `nmcli`, and announces the
/// change with a short notification.
pub fn toggle_wifi(store: &ShellStore, notifications: &Arc<NotificationCenter>) {
    store.wifi_enabled.update(|enabled| !enabled);
    let enabled = store.wifi_enabled.get();

    let radio_state = if enabled { "on" } else { "off" };
    run_detached("nmcli", vec!["radio".to_string(), "wifi".to_string(), radio_state.to_string()]);

    let body = if enabled { "Wi-Fi enabled" } else { "Wi-Fi disabled" };
    notifications.push_with_timeout("Quick Toggle", body, std::time::Duration::from_millis(1800));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_percent_strips_non_digits() {
        assert_eq!(parse_percent("Volume: 0.45", 0), 45);
        assert_eq!(parse_percent("55%", 0), 55);
        assert_eq!(parse_percent("1.00", 0), 100);
    }

    #[test]
    fn parse_percent_clamps_to_one_hundred() {
        assert_eq!(parse_percent("250", 0), 100);
    }

    #[test]
    fn parse_percent_uses_fallback_for_garbage() {
        assert_eq!(parse_percent("", 37), 37);
        assert_eq!(parse_percent("no digits here", 12), 12);
    }

    #[tokio::test]
    async fn set_volume_clamps_and_publishes() {
        let store = ShellStore::new();
        set_volume(&store, 130);
        assert_eq!(store.volume.get(), 100);
    }

    #[tokio::test]
    async fn set_brightness_keeps_a_floor() {
        let store = ShellStore::new();
        set_brightness(&store, 0);
        assert_eq!(store.brightness.get(), 5);
    }

    #[tokio::test]
    async fn toggle_wifi_flips_the_flag_and_notifies() {
        let store = Arc::new(ShellStore::new());
        let notifications = NotificationCenter::new(Arc::clone(&store));
        assert!(store.wifi_enabled.get());

        toggle_wifi(&store, &notifications);
        assert!(!store.wifi_enabled.get());
        assert_eq!(store.notifications.get().len(), 1);

        toggle_wifi(&store, &notifications);
        assert!(store.wifi_enabled.get());
    }
}
