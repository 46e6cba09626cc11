use snaplab_common::config::Config;
use snaplab_processor::capture::Camera;
use snaplab_processor::detector::ConfiguredDetector;
use snaplab_processor::params::{ControlPanel, ParameterSource};
use snaplab_processor::pipeline::{EffectSettings, Layout, Session};
use snaplab_processor::sink::SlotBoard;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("snaplab.toml"));
    // Optional region-mode key presses applied after the first render, e.g. "24".
    let keys = args.next().unwrap_or_default();

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        source = config.capture.source,
        width = config.capture.width,
        height = config.capture.height,
        region_mode = config.effects.region_mode,
        min_confidence = config.detector.min_confidence,
        "starting snaplab"
    );

    let camera = match Camera::from_config(&config.capture) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to set up capture");
            std::process::exit(1);
        }
    };
    let settings = match EffectSettings::from_config(&config.effects) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "invalid effect settings");
            std::process::exit(1);
        }
    };
    let mut panel = match ControlPanel::from_config(&config.thresholds, &config.effects) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "invalid control settings");
            std::process::exit(1);
        }
    };
    let detector = ConfiguredDetector::from_config(&config.detector);
    let mut session = Session::new(Layout::reference(), settings, SlotBoard::new());

    let frame = match camera.capture().await {
        Ok(f) => f,
        Err(e) => {
            error!(error = %e, "capture failed, nothing to render");
            std::process::exit(1);
        }
    };
    session.process(frame, &detector, &panel).await;

    for key in keys.chars() {
        match session.press_mode_key(key, &mut panel) {
            Some(mode) => info!(key = %key, mode = %mode, "region mode changed"),
            None => warn!(key = %key, "mode key ignored"),
        }
    }

    for summary in session.sink().summaries() {
        let json = serde_json::to_string(&summary).unwrap_or_default();
        info!(slot = summary.slot, "{json}");
    }
    info!(
        seq = session.current_seq(),
        writes = session.sink().writes(),
        region_mode = %panel.region_mode(),
        "done"
    );
}
