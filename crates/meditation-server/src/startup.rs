//! Actix server startup + app wiring.
//!
//! Builds the shared state, routes, middleware, and OpenAPI endpoints.

use std::path::{Path, PathBuf};
use std::task::{Context, Poll};

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, HttpServer, web};
use anyhow::Result;
use futures_util::future::{ok, LocalBoxFuture, Ready};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::catalog::default_catalog;
use crate::config;
use crate::openapi;
use crate::state::AppState;
use crate::store::Store;

/// HTML pages served at fixed routes when a static directory is configured.
const PAGE_ROUTES: [(&str, &str); 4] = [
    ("/", "index.html"),
    ("/login", "login.html"),
    ("/meditation", "meditation.html"),
    ("/preferences", "preferences.html"),
];

/// Build server state and start the Actix HTTP server.
pub(crate) async fn run(args: crate::Args) -> Result<()> {
    let cfg = load_config(args.config.as_ref())?;
    let env_port = std::env::var("PORT").ok();
    let port = config::resolve_port(args.port, env_port.as_deref(), &cfg)?;
    let bind = match args.bind {
        Some(addr) => addr,
        None => config::resolve_bind(&cfg, port)?,
    };
    let db_path = args.db.unwrap_or_else(|| config::db_path_from_config(&cfg));
    let static_dir = args
        .static_dir
        .or_else(|| config::static_dir_from_config(&cfg))
        .filter(|dir| {
            let exists = dir.is_dir();
            if !exists {
                tracing::warn!(path = %dir.display(), "static directory not found; pages disabled");
            }
            exists
        });
    let cors_origins = config::cors_origins_from_config(&cfg);
    let token_ttl = config::token_ttl_from_config(&cfg);
    tracing::info!(
        bind = %bind,
        db_path = %db_path.display(),
        token_ttl_hours = token_ttl.num_hours(),
        "starting meditation-server"
    );

    let store = Store::open(&db_path)?;
    let seeded = store.seed_catalog_if_empty(&default_catalog())?;
    if seeded > 0 {
        tracing::info!(count = seeded, "seeded meditation catalog");
    }
    let pruned = store.prune_expired_sessions(chrono::Utc::now())?;
    if pruned > 0 {
        tracing::info!(count = pruned, "pruned expired sessions");
    }
    if let Some(dir) = static_dir.as_ref() {
        tracing::info!(path = %dir.display(), "static pages enabled");
    }

    let state = web::Data::new(AppState::new(store, token_ttl));
    HttpServer::new(move || {
        let cors = build_cors(cors_origins.as_deref());
        let mut app = App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(FilteredLogger)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", openapi::ApiDoc::openapi()),
            )
            .configure(api::configure);

        if let Some(dir) = static_dir.clone() {
            for (route, file) in PAGE_ROUTES {
                let page = dir.join(file);
                if page.exists() {
                    app = app.service(
                        web::resource(route).route(web::get().to(move || serve_page(page.clone()))),
                    );
                }
            }
            app = app.service(Files::new("/", dir));
        }

        app
    })
    .bind(bind)?
    .run()
    .await?;

    tracing::info!("meditation-server stopped");
    Ok(())
}

fn build_cors(origins: Option<&[String]>) -> Cors {
    let cors = match origins {
        None => Cors::default().allow_any_origin(),
        Some(origins) => origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin)),
    };
    cors.allowed_methods(vec!["GET", "POST", "PUT", "HEAD"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .max_age(3600)
}

/// Return true when the request path should be logged.
fn should_log_path(path: &str) -> bool {
    if path == "/api/health" || path.starts_with("/swagger-ui/") {
        return false;
    }
    let is_asset = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "css" | "js" | "png" | "jpg" | "svg" | "ico" | "woff" | "woff2"));
    !is_asset
}

/// Actix middleware that filters noisy paths from logging.
struct FilteredLogger;

impl<S, B> actix_web::dev::Transform<S, ServiceRequest> for FilteredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = FilteredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(FilteredLoggerMiddleware { service })
    }
}

/// Service wrapper that applies the logging filter.
struct FilteredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for FilteredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();
        let should_log = should_log_path(&path);
        let method = req.method().clone();
        let peer = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("-")
            .to_string();
        let start = std::time::Instant::now();
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            if should_log {
                tracing::info!(
                    method = %method,
                    path = %path,
                    status = %res.status().as_u16(),
                    peer = %peer,
                    elapsed_ms = %start.elapsed().as_millis(),
                    "http request"
                );
            }
            Ok(res)
        })
    }
}

/// Load server config from disk, or fall back to defaults.
///
/// Without `--config`, a `config.toml` next to the executable is used when present.
fn load_config(path: Option<&PathBuf>) -> Result<config::ServerConfig> {
    if let Some(path) = path {
        return config::ServerConfig::load(path);
    }
    let auto_path = std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join("config.toml")))
        .filter(|path| path.exists());
    match auto_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using config next to executable");
            config::ServerConfig::load(&path)
        }
        None => Ok(config::ServerConfig::default()),
    }
}

async fn serve_page(page: PathBuf) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(page)?)
}
