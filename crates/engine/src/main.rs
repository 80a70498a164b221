//! Gamebook Engine - record maintenance entry point.
//!
//! Opens the configured character store, brings every record up to the
//! current schema and prints the report as JSON. Exits non-zero when some
//! records could not be migrated or validated.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamebook_engine::infrastructure::settings::Settings;
use gamebook_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamebook_engine=debug,gamebook_domain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env();
    tracing::info!(
        data_dir = %settings.data_dir.display(),
        storage = ?settings.storage,
        dry_run = settings.dry_run,
        "Starting Gamebook Engine"
    );

    let app = App::open(&settings).await?;
    let report = app.use_cases.maintenance.execute().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_clean() {
        anyhow::bail!(
            "{} record(s) could not be upgraded: {}",
            report.invalid.len(),
            report.invalid.join(", ")
        );
    }
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
