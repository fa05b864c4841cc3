use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health,
        api::meditation::list_meditations,
        api::meditation::get_meditation,
        api::auth::register,
        api::auth::login,
        api::preferences::get_preferences,
        api::preferences::update_preferences,
        api::preferences::reset_preferences,
    ),
    components(
        schemas(
            meditation_types::MeditationItem,
            meditation_types::UserPreferences,
            meditation_types::PreferencesUpdate,
            meditation_types::PreferredDuration,
            meditation_types::TimeOfDay,
            meditation_types::UiTheme,
            meditation_types::RegisterRequest,
            meditation_types::LoginRequest,
            meditation_types::UserSummary,
            meditation_types::AuthResponse,
            meditation_types::MessageResponse,
            api::health::HealthResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "meditation-server", description = "Meditation catalog, accounts, and preferences API")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by the preferences routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
