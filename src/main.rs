// Keepsake server binary: config from env, SQLite memory store, background
// ingestion worker, axum HTTP surface.

use std::sync::Arc;

use log::{error, info};

use keepsake::engine::config::Config;
use keepsake::engine::generate::GeminiClient;
use keepsake::engine::images::ImageStore;
use keepsake::engine::ingest;
use keepsake::engine::orchestrator::Orchestrator;
use keepsake::engine::store::MemoryStore;
use keepsake::engine::vector::MoorchehClient;
use keepsake::server::{router, AppState};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("[main] {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!("[main] {e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> keepsake::atoms::error::KeepsakeResult<()> {
    std::fs::create_dir_all(&config.data_dir)?;

    let store = Arc::new(MemoryStore::open(&config.data_dir.join("keepsake.db"))?);
    let images = ImageStore::open(config.data_dir.join("images"))?;

    let vector = Arc::new(MoorchehClient::new(
        &config.moorcheh_base_url,
        &config.moorcheh_api_key,
        &config.namespace,
    ));

    let generator = if config.generative_enabled {
        Some(Arc::new(GeminiClient::new(
            &config.gemini_base_url,
            &config.google_api_key,
            &config.gemini_model,
        )) as Arc<dyn keepsake::atoms::traits::AnswerGenerator>)
    } else {
        info!("[main] generative augmentation disabled, answering from context directly");
        None
    };

    let orchestrator = Orchestrator::new(vector.clone(), generator);

    let _ingest_worker = if config.ingest_enabled {
        Some(ingest::spawn(store.clone(), vector, &config))
    } else {
        None
    };

    let state = Arc::new(AppState {
        orchestrator,
        store,
        images,
    });

    let addr = format!("{}:{}", config.bind_address, config.port);
    info!("[main] listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
