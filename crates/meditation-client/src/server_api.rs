use std::time::Duration;

use meditation_types::{
    AuthResponse, LoginRequest, MeditationItem, MessageResponse, PreferencesUpdate,
    RegisterRequest, UserPreferences,
};
use serde::de::DeserializeOwned;

use crate::catalog::FilterState;
use crate::error::ClientError;

/// REST boundary the controllers consume.
pub trait MeditationApi {
    fn list_meditations(&self, filter: &FilterState) -> Result<Vec<MeditationItem>, ClientError>;
    fn get_meditation(&self, id: i64) -> Result<MeditationItem, ClientError>;
    fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError>;
    fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError>;
    fn get_preferences(&self, token: &str) -> Result<UserPreferences, ClientError>;
    fn update_preferences(
        &self,
        token: &str,
        update: &PreferencesUpdate,
    ) -> Result<UserPreferences, ClientError>;
    fn reset_preferences(&self, token: &str) -> Result<MessageResponse, ClientError>;
}

/// Blocking HTTP client for the meditation server.
pub struct ApiClient {
    base: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(15)))
            .build()
            .into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

impl MeditationApi for ApiClient {
    fn list_meditations(&self, filter: &FilterState) -> Result<Vec<MeditationItem>, ClientError> {
        let url = self.url(&format!("/api/meditation{}", filter_query(filter)));
        read_json(self.agent.get(&url).call(), "api/meditation")
    }

    fn get_meditation(&self, id: i64) -> Result<MeditationItem, ClientError> {
        let url = self.url(&format!("/api/meditation/{id}"));
        read_json(self.agent.get(&url).call(), "api/meditation/:id")
    }

    fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let url = self.url("/api/auth/register");
        read_json(self.agent.post(&url).send_json(req), "api/auth/register")
    }

    fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let url = self.url("/api/auth/login");
        read_json(self.agent.post(&url).send_json(req), "api/auth/login")
    }

    fn get_preferences(&self, token: &str) -> Result<UserPreferences, ClientError> {
        let url = self.url("/api/preferences");
        read_json(
            self.agent
                .get(&url)
                .header("Authorization", bearer(token))
                .call(),
            "api/preferences",
        )
    }

    fn update_preferences(
        &self,
        token: &str,
        update: &PreferencesUpdate,
    ) -> Result<UserPreferences, ClientError> {
        let url = self.url("/api/preferences");
        read_json(
            self.agent
                .put(&url)
                .header("Authorization", bearer(token))
                .send_json(update),
            "api/preferences",
        )
    }

    fn reset_preferences(&self, token: &str) -> Result<MessageResponse, ClientError> {
        let url = self.url("/api/preferences/reset");
        read_json(
            self.agent
                .post(&url)
                .header("Authorization", bearer(token))
                .send_empty(),
            "api/preferences/reset",
        )
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn filter_query(filter: &FilterState) -> String {
    let mut params = Vec::new();
    if let Some(category) = filter.category.as_deref() {
        params.push(format!("category={}", urlencoding::encode(category)));
    }
    if let Some(minutes) = filter.duration {
        params.push(format!("duration={minutes}"));
    }
    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", params.join("&"))
    }
}

fn read_json<T: DeserializeOwned>(
    result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    label: &str,
) -> Result<T, ClientError> {
    let mut resp =
        result.map_err(|err| ClientError::Network(format!("request /{label}: {err}")))?;
    let status = resp.status().as_u16();
    let body = resp
        .body_mut()
        .read_to_string()
        .map_err(|err| ClientError::Network(format!("read /{label} response body: {err}")))?;
    decode_body(status, &body, label)
}

fn decode_body<T: DeserializeOwned>(status: u16, body: &str, label: &str) -> Result<T, ClientError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<MessageResponse>(body)
            .ok()
            .map(|resp| resp.message);
        return Err(ClientError::from_status(status, message));
    }
    serde_json::from_str(body)
        .map_err(|err| ClientError::Network(format!("decode /{label} response: {err}")))
}
