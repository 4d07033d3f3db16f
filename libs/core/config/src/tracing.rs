use crate::{AppInfo, Environment};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, prelude::*};

const PRODUCTION_FILTER: &str = "info,tower_http=info,sea_orm=warn,sqlx=warn";
const DEVELOPMENT_FILTER: &str = "debug,tower_http=debug,sea_orm=info,sqlx=warn,hyper=info";

/// Install color-eyre with the project configuration.
///
/// Call this first in `main`. Later calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize the global subscriber.
///
/// - Production (`APP_ENV=production`): flattened JSON events without targets.
/// - Development: pretty, multi-line output.
///
/// Both include an [`tracing_error::ErrorLayer`] so eyre reports carry span traces.
/// `RUST_LOG` overrides the default filter. Calling this twice is a no-op.
pub fn init_tracing(app: &AppInfo, environment: &Environment) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if is_production {
            PRODUCTION_FILTER
        } else {
            DEVELOPMENT_FILTER
        })
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(
            service = app.name,
            version = app.version,
            environment = ?environment,
            "Tracing initialized"
        ),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
