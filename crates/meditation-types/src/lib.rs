use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A guided-meditation session from the catalog.
///
/// Items are seeded server-side and are read-only to clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MeditationItem {
    /// Catalog id.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Short description shown on the card.
    pub description: String,
    /// Category label, e.g. `Sleep Journey`.
    pub category: String,
    /// Declared length in whole minutes.
    pub duration: u32,
    /// Audio source URI.
    pub audio_url: String,
}

/// Preferred session length label.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PreferredDuration {
    #[serde(rename = "5 minutes")]
    Five,
    #[default]
    #[serde(rename = "10 minutes")]
    Ten,
    #[serde(rename = "15 minutes")]
    Fifteen,
    #[serde(rename = "20 minutes")]
    Twenty,
    #[serde(rename = "30 minutes")]
    Thirty,
}

impl PreferredDuration {
    pub const ALL: [PreferredDuration; 5] = [
        PreferredDuration::Five,
        PreferredDuration::Ten,
        PreferredDuration::Fifteen,
        PreferredDuration::Twenty,
        PreferredDuration::Thirty,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PreferredDuration::Five => "5 minutes",
            PreferredDuration::Ten => "10 minutes",
            PreferredDuration::Fifteen => "15 minutes",
            PreferredDuration::Twenty => "20 minutes",
            PreferredDuration::Thirty => "30 minutes",
        }
    }
}

/// Time of day the user prefers to meditate.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TimeOfDay {
    #[default]
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }
}

/// UI color theme.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UiTheme {
    #[default]
    Light,
    Dark,
}

impl UiTheme {
    pub const ALL: [UiTheme; 2] = [UiTheme::Light, UiTheme::Dark];

    pub fn label(self) -> &'static str {
        match self {
            UiTheme::Light => "light",
            UiTheme::Dark => "dark",
        }
    }
}

/// Error returned when a label does not name a known variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabel {}

macro_rules! label_enum_traits {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownLabel {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

label_enum_traits!(PreferredDuration, "preferred duration");
label_enum_traits!(TimeOfDay, "time of day");
label_enum_traits!(UiTheme, "theme");

/// Stored per-user preferences document.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Owning user id.
    pub user_id: String,
    /// Favorite theme tags, no duplicates, insertion order kept.
    pub favorite_themes: Vec<String>,
    pub preferred_duration: PreferredDuration,
    pub best_time_of_day: TimeOfDay,
    pub notifications: bool,
    pub theme: UiTheme,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    /// Fresh defaults for a user that has never saved preferences.
    pub fn defaults_for(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            favorite_themes: Vec::new(),
            preferred_duration: PreferredDuration::default(),
            best_time_of_day: TimeOfDay::default(),
            notifications: true,
            theme: UiTheme::default(),
            updated_at: now,
        }
    }

    /// Apply a partial update; absent fields keep their stored value.
    pub fn apply(&mut self, update: &PreferencesUpdate) {
        if let Some(themes) = update.favorite_themes.as_ref() {
            self.favorite_themes = dedup_themes(themes);
        }
        if let Some(duration) = update.preferred_duration {
            self.preferred_duration = duration;
        }
        if let Some(time) = update.best_time_of_day {
            self.best_time_of_day = time;
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
    }
}

fn dedup_themes(themes: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(themes.len());
    for theme in themes {
        let theme = theme.trim();
        if theme.is_empty() || out.iter().any(|t| t == theme) {
            continue;
        }
        out.push(theme.to_string());
    }
    out
}

/// Partial preferences payload for `PUT /api/preferences`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_themes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_duration: Option<PreferredDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_of_day: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<UiTheme>,
}

impl PreferencesUpdate {
    pub fn is_empty(&self) -> bool {
        self == &PreferencesUpdate::default()
    }
}

/// Registration payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user account.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Successful register/login response.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthResponse {
    /// Bearer token for authenticated endpoints.
    pub token: String,
    pub user: UserSummary,
    pub message: String,
}

/// Plain message body, used for confirmations and every error response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_use_camel_case_and_labels_on_the_wire() {
        let prefs = UserPreferences::defaults_for("u1", DateTime::<Utc>::UNIX_EPOCH);
        let value = serde_json::to_value(&prefs).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["preferredDuration"], "10 minutes");
        assert_eq!(value["bestTimeOfDay"], "Morning");
        assert_eq!(value["theme"], "light");
        assert_eq!(value["notifications"], true);
        assert!(value["favoriteThemes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn partial_update_only_touches_present_fields() {
        let mut prefs = UserPreferences::defaults_for("u1", DateTime::<Utc>::UNIX_EPOCH);
        prefs.favorite_themes = vec!["Sleep".to_string()];
        prefs.best_time_of_day = TimeOfDay::Evening;
        prefs.notifications = false;

        let update: PreferencesUpdate = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        prefs.apply(&update);

        assert_eq!(prefs.theme, UiTheme::Dark);
        assert_eq!(prefs.favorite_themes, vec!["Sleep".to_string()]);
        assert_eq!(prefs.preferred_duration, PreferredDuration::Ten);
        assert_eq!(prefs.best_time_of_day, TimeOfDay::Evening);
        assert!(!prefs.notifications);
    }

    #[test]
    fn favorite_themes_are_deduplicated() {
        let mut prefs = UserPreferences::defaults_for("u1", DateTime::<Utc>::UNIX_EPOCH);
        prefs.apply(&PreferencesUpdate {
            favorite_themes: Some(vec![
                "Sleep".to_string(),
                " Focus ".to_string(),
                "Sleep".to_string(),
                "".to_string(),
            ]),
            ..PreferencesUpdate::default()
        });
        assert_eq!(prefs.favorite_themes, vec!["Sleep".to_string(), "Focus".to_string()]);
    }

    #[test]
    fn unknown_duration_label_is_rejected() {
        let err = serde_json::from_str::<PreferencesUpdate>(r#"{"preferredDuration":"7 minutes"}"#);
        assert!(err.is_err());
        assert!("7 minutes".parse::<PreferredDuration>().is_err());
        assert_eq!("15 MINUTES".parse::<PreferredDuration>(), Ok(PreferredDuration::Fifteen));
        assert_eq!("night".parse::<TimeOfDay>(), Ok(TimeOfDay::Night));
    }

    #[test]
    fn duration_labels_match_the_wire_names() {
        for duration in PreferredDuration::ALL {
            let wire = serde_json::to_value(duration).unwrap();
            assert_eq!(wire, serde_json::Value::String(duration.to_string()));
            assert_eq!(duration.label().parse::<PreferredDuration>(), Ok(duration));
        }
    }

    #[test]
    fn meditation_item_uses_audio_url_field() {
        let item: MeditationItem = serde_json::from_str(
            r#"{"id":3,"title":"Sleep Journey","description":"d","category":"Sleep Journey","duration":20,"audioUrl":"https://example.com/a.wav"}"#,
        )
        .unwrap();
        assert_eq!(item.duration, 20);
        assert_eq!(item.audio_url, "https://example.com/a.wav");
    }
}
