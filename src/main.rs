mod ui;

use anyhow::{Context, Result};
use autoclave_calc::{import::load_detections, store, Profile};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;
use tracing::{info, warn};
use ui::AutoclaveApp;

#[derive(Parser)]
#[command(name = "autoclave_calc")]
#[command(version, about = "Autoclave conversion and value calculator", long_about = None)]
struct Cli {
    /// SQLite file holding quantities, prices and per-item settings
    #[arg(long, default_value = "autoclave.db")]
    db: PathBuf,

    /// JSON detections ({"Sponge": 120, ...}) merged into quantities on startup
    #[arg(long)]
    import: Option<PathBuf>,

    /// Print the calculation report as JSON instead of opening a window
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let conn = store::open_store(&cli.db)
        .with_context(|| format!("opening store {}", cli.db.display()))?;
    let mut profile = store::load_profile(&conn)?;

    if let Some(path) = &cli.import {
        let detected = load_detections(path)
            .with_context(|| format!("importing detections from {}", path.display()))?;
        info!(items = detected.len(), "merged detected quantities");
        profile.merge_detected(&detected);
    }

    if cli.headless {
        return print_report(&profile);
    }
    drop(conn);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 650.0]),
        ..Default::default()
    };

    let db_path = cli.db;
    eframe::run_native(
        "Autoclave Calculator",
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();

            if let Ok(segoe_data) = std::fs::read("C:\\Windows\\Fonts\\segoeui.ttf") {
                fonts.font_data.insert(
                    "SegoeUI".to_owned(),
                    egui::FontData::from_owned(segoe_data).into(),
                );
                if let Some(family) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
                    family.insert(0, "SegoeUI".to_owned());
                }
            }

            cc.egui_ctx.set_fonts(fonts);
            ui::set_custom_style(&cc.egui_ctx);
            Ok(Box::new(AutoclaveApp::new(db_path, profile)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}

fn print_report(profile: &Profile) -> Result<()> {
    let report = profile.calculate();
    if report.capped {
        warn!("iteration cap reached, report shows the state at the cap");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
