//! Register, login, logout, and the navigation guard.

use meditation_types::{AuthResponse, LoginRequest, RegisterRequest, UserSummary};

use crate::error::ClientError;
use crate::server_api::MeditationApi;
use crate::session::SessionContext;
use crate::view::{Notifier, Page};

pub fn register(
    session: &mut SessionContext,
    api: &dyn MeditationApi,
    notifier: &mut dyn Notifier,
    req: &RegisterRequest,
) -> Result<UserSummary, ClientError> {
    notifier.set_loading(true);
    let result = api.register(req);
    notifier.set_loading(false);
    finish_auth(session, notifier, result)
}

pub fn login(
    session: &mut SessionContext,
    api: &dyn MeditationApi,
    notifier: &mut dyn Notifier,
    req: &LoginRequest,
) -> Result<UserSummary, ClientError> {
    notifier.set_loading(true);
    let result = api.login(req);
    notifier.set_loading(false);
    finish_auth(session, notifier, result)
}

/// Drop the session and return to the login view.
pub fn logout(session: &mut SessionContext, notifier: &mut dyn Notifier) {
    session.clear_auth();
    notifier.navigate(Page::Login);
}

/// Returns true when `page` may be shown; otherwise redirects to login.
pub fn guard(session: &SessionContext, notifier: &mut dyn Notifier, page: Page) -> bool {
    if !page.requires_auth() || session.is_authenticated() {
        return true;
    }
    notifier.navigate(Page::Login);
    false
}

fn finish_auth(
    session: &mut SessionContext,
    notifier: &mut dyn Notifier,
    result: Result<AuthResponse, ClientError>,
) -> Result<UserSummary, ClientError> {
    match result {
        Ok(resp) => {
            tracing::info!(user = %resp.user.username, "signed in");
            let user = resp.user.clone();
            session.set_auth(resp.token, Some(resp.user));
            notifier.show_message(&resp.message);
            notifier.navigate(Page::Meditation);
            Ok(user)
        }
        Err(err) => {
            notifier.show_error(&err.user_message());
            Err(err)
        }
    }
}
