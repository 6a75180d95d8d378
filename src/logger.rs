use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "credgen=info,eframe=warn,egui=warn,wgpu=warn,reqwest=warn";

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Routes `tracing` output to `credgen.log` next to the executable, or to
/// stderr when the file can't be opened. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    let path = exe_dir().join("credgen.log");
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let installed = builder
                .with_writer(move || match file.try_clone() {
                    Ok(f) => Box::new(f) as Box<dyn std::io::Write>,
                    Err(_) => Box::new(std::io::stderr()),
                })
                .try_init();
            if installed.is_ok() {
                tracing::info!("===== credgen start ===== (log: {})", path.display());
            }
        }
        Err(e) => {
            if builder.with_writer(std::io::stderr).try_init().is_ok() {
                tracing::warn!("Cannot open {}: {}; logging to stderr", path.display(), e);
            }
        }
    }
}
