//! Preferences controller: load, save, reset.

use meditation_types::{PreferencesUpdate, UserPreferences};

use crate::error::ClientError;
use crate::server_api::MeditationApi;
use crate::session::SessionContext;
use crate::view::{Notifier, Page, PreferencesView};

const SAVED_MESSAGE: &str = "Preferences saved successfully!";
const LOGIN_REQUIRED: &str = "Please login to view preferences";

pub struct PreferencesController<V> {
    view: V,
}

impl<V: PreferencesView> PreferencesController<V> {
    pub fn new(view: V) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Fetch the stored preferences and populate the form.
    pub fn load(
        &mut self,
        session: &mut SessionContext,
        api: &dyn MeditationApi,
        notifier: &mut dyn Notifier,
    ) -> Result<UserPreferences, ClientError> {
        let token = require_token(session, notifier)?;
        notifier.set_loading(true);
        let result = api.get_preferences(&token);
        notifier.set_loading(false);
        let prefs = settle(session, notifier, result)?;
        self.view.populate(&prefs);
        Ok(prefs)
    }

    /// Send a partial update; fields left `None` keep their stored value.
    pub fn save(
        &mut self,
        session: &mut SessionContext,
        api: &dyn MeditationApi,
        notifier: &mut dyn Notifier,
        update: &PreferencesUpdate,
    ) -> Result<UserPreferences, ClientError> {
        let token = require_token(session, notifier)?;
        notifier.set_loading(true);
        let result = api.update_preferences(&token, update);
        notifier.set_loading(false);
        let prefs = settle(session, notifier, result)?;
        self.view.populate(&prefs);
        notifier.show_message(SAVED_MESSAGE);
        Ok(prefs)
    }

    /// Restore defaults, then reload the form.
    pub fn reset(
        &mut self,
        session: &mut SessionContext,
        api: &dyn MeditationApi,
        notifier: &mut dyn Notifier,
    ) -> Result<UserPreferences, ClientError> {
        let token = require_token(session, notifier)?;
        notifier.set_loading(true);
        let result = api.reset_preferences(&token);
        notifier.set_loading(false);
        let confirmation = settle(session, notifier, result)?;
        let prefs = self.load(session, api, notifier)?;
        notifier.show_message(&confirmation.message);
        Ok(prefs)
    }
}

fn require_token(
    session: &SessionContext,
    notifier: &mut dyn Notifier,
) -> Result<String, ClientError> {
    match session.token() {
        Some(token) => Ok(token.to_string()),
        None => {
            notifier.show_error(LOGIN_REQUIRED);
            notifier.navigate(Page::Login);
            Err(ClientError::Auth)
        }
    }
}

fn settle<T>(
    session: &mut SessionContext,
    notifier: &mut dyn Notifier,
    result: Result<T, ClientError>,
) -> Result<T, ClientError> {
    result.inspect_err(|err| session.report_failure(notifier, err))
}
