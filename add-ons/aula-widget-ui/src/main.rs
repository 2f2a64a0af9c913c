//! Demo host: a plain eframe app with the assistant widget overlaid. Stands
//! in for whatever application the widget ships embedded into.

use aula_core::WidgetConfig;
use aula_widget_ui::ChatWidget;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[aula-widget] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WidgetConfig::load().expect("load widget config");
    tracing::info!(endpoint = %config.endpoint, "assistant widget configured");
    let widget = ChatWidget::new(config).expect("build chat widget");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_title("AULA Widget Demo"),
        ..Default::default()
    };

    eframe::run_native(
        "AULA Widget Demo",
        options,
        Box::new(move |_cc| Ok(Box::new(DemoApp { widget }))),
    )
}

struct DemoApp {
    widget: ChatWidget,
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Host application");
            ui.add_space(8.0);
            ui.label("This page stands in for whatever the assistant ships embedded into.");
            ui.label("Open the launcher in the bottom-right corner to chat.");
        });
        self.widget.ui(ctx);
    }
}
