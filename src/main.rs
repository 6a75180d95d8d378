#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::sync::Arc;

mod config;
mod gemini;
mod logger;
mod orchestrator;
mod prompt;
mod ui;

fn main() -> anyhow::Result<()> {
    // Init logger first
    logger::init();
    tracing::info!("App starting");

    let cfg = config::Config::load();
    tracing::info!(
        "Config loaded from {} (model {})",
        config::Config::path().display(),
        cfg.gemini_model
    );
    if !cfg.has_api_key() {
        tracing::warn!("No Gemini API key; requests will be rejected by the service");
    }

    // Generation calls run here; the UI owns the main thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let client = Arc::new(gemini::GeminiClient::new(cfg.endpoint()));
    let orch = orchestrator::Orchestrator::new(client, cfg.policy);

    ui::run(orch, runtime.handle().clone(), cfg.has_api_key())
}
