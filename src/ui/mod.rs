//! egui/eframe command console

mod app;
pub mod components;
mod state;
mod theme;

pub use app::SumyApp;
pub use components::LinkIntent;
pub use state::UiSnapshot;
pub use theme::Theme;

use crate::session::Session;

/// Open the console window and block until it closes
pub fn run(session: Session) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 780.0])
            .with_min_inner_size([800.0, 520.0])
            .with_title("sumY Tactical Command"),
        ..Default::default()
    };

    eframe::run_native(
        "sumY Tactical Command",
        options,
        Box::new(|cc| Ok(Box::new(SumyApp::new(cc, session)))),
    )
}
