use anyhow::Result;
use deskchat::config::AppConfig;
use deskchat::ui::DeskchatApp;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deskchat=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Deskchat workspace assistant");

    let config = AppConfig::default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title(config.brand.clone()),
        ..Default::default()
    };

    eframe::run_native(
        "deskchat",
        options,
        Box::new(move |cc| Ok(Box::new(DeskchatApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start UI: {e}"))?;

    Ok(())
}
