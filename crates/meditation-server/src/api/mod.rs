//! HTTP API handlers.
//!
//! Defines the Actix routes for the catalog, accounts, and preferences.

pub mod auth;
pub mod health;
pub mod meditation;
pub mod preferences;

use actix_web::web;

pub use auth::{login, register};
pub use meditation::{get_meditation, list_meditations};
pub use preferences::{get_preferences, reset_preferences, update_preferences};

/// Register every `/api` route plus the JSON error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(crate::error::json_error_handler))
        .service(health::health)
        .service(list_meditations)
        .service(get_meditation)
        .service(register)
        .service(login)
        .service(get_preferences)
        .service(update_preferences)
        .service(reset_preferences);
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use meditation_types::{
        AuthResponse, MeditationItem, MessageResponse, PreferredDuration, TimeOfDay, UiTheme,
        UserPreferences,
    };
    use serde_json::json;

    use crate::state::AppState;

    fn make_state(label: &str) -> actix_web::web::Data<AppState> {
        let store = crate::store::tests::temp_store(label);
        store
            .seed_catalog_if_empty(&crate::catalog::default_catalog())
            .expect("seed catalog");
        actix_web::web::Data::new(AppState::new(store, chrono::Duration::hours(1)))
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(super::configure)).await
        };
    }

    macro_rules! register_user {
        ($app:expr, $username:expr, $email:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({ "username": $username, "email": $email, "password": "secret1" }))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let auth: AuthResponse = test::read_body_json(resp).await;
            auth
        }};
    }

    #[actix_web::test]
    async fn catalog_lists_in_server_order_and_filters() {
        let state = make_state("api-catalog");
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/api/meditation").to_request();
        let all: Vec<MeditationItem> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);

        let req = test::TestRequest::get()
            .uri("/api/meditation?category=Sleep%20Journey")
            .to_request();
        let sleep: Vec<MeditationItem> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(sleep.len(), 1);
        assert_eq!(sleep[0].title, "Sleep Journey");

        let req = test::TestRequest::get()
            .uri("/api/meditation?duration=10")
            .to_request();
        let ten: Vec<MeditationItem> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ten.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 5]);

        let req = test::TestRequest::get()
            .uri("/api/meditation?duration=abc")
            .to_request();
        let none: Vec<MeditationItem> = test::call_and_read_body_json(&app, req).await;
        assert!(none.is_empty());
    }

    #[actix_web::test]
    async fn unknown_meditation_returns_404() {
        let state = make_state("api-404");
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/api/meditation/3").to_request();
        let item: MeditationItem = test::call_and_read_body_json(&app, req).await;
        assert_eq!(item.category, "Sleep Journey");

        for uri in ["/api/meditation/99", "/api/meditation/not-a-number"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body: MessageResponse = test::read_body_json(resp).await;
            assert_eq!(body.message, "Meditation not found");
        }
    }

    #[actix_web::test]
    async fn duplicate_registration_and_bad_login_are_rejected() {
        let state = make_state("api-auth");
        let app = init_app!(state);

        let created = register_user!(app, "calm", "calm@example.com");
        assert!(!created.token.is_empty());
        assert_eq!(created.user.email, "calm@example.com");

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": "calm2", "email": "CALM@example.com", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: MessageResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "User already exists");

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "calm@example.com", "password": "wrong-pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let wrong_password: MessageResponse = test::read_body_json(resp).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "nobody@example.com", "password": "wrong-pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let unknown_email: MessageResponse = test::read_body_json(resp).await;
        assert_eq!(unknown_email.message, wrong_password.message);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "calm@example.com", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let login: AuthResponse = test::read_body_json(resp).await;
        assert_eq!(login.user.id, created.user.id);
        assert_ne!(login.token, created.token);
    }

    #[actix_web::test]
    async fn malformed_json_is_a_validation_error() {
        let state = make_state("api-json");
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: MessageResponse = test::read_body_json(resp).await;
        assert!(body.message.starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn preferences_require_a_valid_token() {
        let state = make_state("api-prefs-auth");
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/api/preferences").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::put()
            .uri("/api/preferences")
            .insert_header((header::AUTHORIZATION, "Bearer forged"))
            .set_json(json!({ "theme": "dark" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/preferences/reset")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn preferences_partial_update_and_reset() {
        let state = make_state("api-prefs");
        let app = init_app!(state);
        let auth = register_user!(app, "calm", "calm@example.com");
        let bearer = format!("Bearer {}", auth.token);

        let req = test::TestRequest::get()
            .uri("/api/preferences")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .to_request();
        let defaults: UserPreferences = test::call_and_read_body_json(&app, req).await;
        assert_eq!(defaults.user_id, auth.user.id);
        assert_eq!(defaults.preferred_duration, PreferredDuration::Ten);
        assert_eq!(defaults.theme, UiTheme::Light);

        let req = test::TestRequest::put()
            .uri("/api/preferences")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({
                "favoriteThemes": ["Sleep", "Focus"],
                "preferredDuration": "20 minutes",
                "bestTimeOfDay": "Evening",
                "notifications": false
            }))
            .to_request();
        let _: UserPreferences = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/preferences")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "theme": "dark" }))
            .to_request();
        let updated: UserPreferences = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.theme, UiTheme::Dark);
        assert_eq!(updated.favorite_themes, vec!["Sleep".to_string(), "Focus".to_string()]);
        assert_eq!(updated.preferred_duration, PreferredDuration::Twenty);
        assert_eq!(updated.best_time_of_day, TimeOfDay::Evening);
        assert!(!updated.notifications);

        let req = test::TestRequest::put()
            .uri("/api/preferences")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "preferredDuration": "7 minutes" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/preferences/reset")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .to_request();
        let body: MessageResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.message, "Preferences reset to default");

        let req = test::TestRequest::get()
            .uri("/api/preferences")
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();
        let reset: UserPreferences = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reset.theme, UiTheme::Light);
        assert!(reset.favorite_themes.is_empty());
        assert!(reset.notifications);
    }
}
