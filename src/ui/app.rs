//! Main application struct and eframe integration

use crate::session::Session;
use crate::ui::components::{GridMap, LinkIntent, LinkToggle, StatusBar, Terminal, Visualizer};
use crate::ui::state::UiSnapshot;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use std::time::Duration;
use tracing::{info, warn};

/// Repaint cadence while the link is up, so meters and logs stay live
const ACTIVE_REPAINT: Duration = Duration::from_millis(33);

pub struct SumyApp {
    session: Session,
    theme: Theme,
}

impl SumyApp {
    pub fn new(cc: &eframe::CreationContext<'_>, session: Session) -> Self {
        let theme = Theme::tactical();
        theme.apply(&cc.egui_ctx);
        Self::with_theme(session, theme)
    }

    /// Build without a native window, e.g. under a test harness
    pub fn with_theme(session: Session, theme: Theme) -> Self {
        Self { session, theme }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Render one frame and apply the operator's input
    pub fn show(&mut self, ctx: &egui::Context) {
        self.session.poll();
        let snapshot = UiSnapshot::capture(self.session.state());

        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| {
                StatusBar::new(&snapshot, &self.theme).show(ui);
            });

        SidePanel::left("communication_log")
            .resizable(true)
            .default_width(340.0)
            .min_width(260.0)
            .frame(egui::Frame::none().fill(self.theme.bg_primary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| {
                Terminal::new(&snapshot.logs, &self.theme).show(ui);
            });

        let intent = TopBottomPanel::bottom("control_deck")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| self.show_deck(ui, &snapshot))
            .inner;

        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_map))
            .show(ctx, |ui| {
                GridMap::new(&snapshot.unit, &self.theme).show(ui);
            });

        if let Some(intent) = intent {
            self.apply(intent);
        }

        if snapshot.connection.is_active() {
            ctx.request_repaint_after(ACTIVE_REPAINT);
        }
    }

    fn show_deck(&self, ui: &mut egui::Ui, snapshot: &UiSnapshot) -> Option<LinkIntent> {
        ui.horizontal(|ui| {
            Visualizer::new(snapshot.volume, snapshot.is_online(), &self.theme)
                .size(90.0)
                .show(ui);

            ui.add_space(self.theme.spacing_lg);

            ui.vertical(|ui| {
                let intent = LinkToggle::new(snapshot.connection, &self.theme).show(ui);

                ui.label(
                    RichText::new(format!("LINK: {}", snapshot.connection))
                        .size(11.0)
                        .color(self.theme.text_secondary),
                );

                if let Some(error) = snapshot.visible_error() {
                    ui.label(RichText::new(error).size(11.0).color(self.theme.error));
                }
                intent
            })
            .inner
        })
        .inner
    }

    fn apply(&mut self, intent: LinkIntent) {
        match intent {
            LinkIntent::Connect => {
                info!("Operator initialized link");
                if let Err(e) = self.session.connect() {
                    warn!("Link initialization failed: {}", e);
                }
            }
            LinkIntent::Disconnect => {
                info!("Operator aborted link");
                self.session.disconnect();
            }
        }
    }
}

impl eframe::App for SumyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.disconnect();
    }
}
