use eframe::egui::{self, Align, Color32, Context, Layout, RichText, Sense, Ui, vec2};

use crate::traffic::FeedStatus;
use crate::util::{format_clock, format_countdown, format_route, format_weight};

use super::super::TrafficMapApp;
use super::super::render_utils::{HIGH_CONGESTION, LOW_CONGESTION, ROUTE_COLOR};

fn status_color(status: FeedStatus) -> Color32 {
    match status {
        FeedStatus::Loading => Color32::from_gray(170),
        FeedStatus::Ready => ROUTE_COLOR,
        FeedStatus::Error => HIGH_CONGESTION,
    }
}

fn legend_row(ui: &mut Ui, color: Color32, text: &str) {
    ui.horizontal(|ui| {
        let (swatch, _) = ui.allocate_exact_size(vec2(18.0, 12.0), Sense::hover());
        ui.painter().rect_filled(swatch, 2.0, color);
        ui.label(text);
    });
}

impl TrafficMapApp {
    pub(in crate::app) fn show_dashboard(
        &mut self,
        ctx: &Context,
        stale_error: Option<&str>,
        refresh_requested: &mut bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui, refresh_requested));

        if let Some(error) = stale_error {
            egui::TopBottomPanel::top("stale_banner")
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(HIGH_CONGESTION, "Latest refresh failed:");
                        ui.label(error);
                        ui.label(RichText::new("(showing last good snapshot)").weak());
                    });
                });
        }

        egui::SidePanel::left("route_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                self.draw_route_summary(ui);
                ui.separator();
                self.draw_controls(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.renderer.draw(ui));
    }

    fn draw_top_bar(&self, ui: &mut Ui, refresh_requested: &mut bool) {
        let state = self.feed.state();

        ui.horizontal(|ui| {
            ui.heading("Traffic congestion map");
            ui.separator();
            ui.colored_label(status_color(state.status), state.status.label());
            ui.label(format!("source: {}", self.feed.endpoint()));

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let refresh =
                    ui.add_enabled(!self.feed.is_fetching(), egui::Button::new("Refresh"));
                if refresh.clicked() {
                    *refresh_requested = true;
                }
                if self.feed.is_fetching() {
                    ui.spinner();
                }

                if let Some(next_update) = state
                    .snapshot
                    .as_ref()
                    .and_then(|snapshot| snapshot.next_update_secs)
                {
                    ui.label(format!("next image update: {}", format_countdown(next_update)));
                }
                if let Some(last_update) = state.last_update {
                    ui.label(format!("last updated: {}", format_clock(last_update)));
                }
            });
        });
    }

    fn draw_route_summary(&self, ui: &mut Ui) {
        let state = self.feed.state();

        ui.heading("Best route");
        ui.label(RichText::new("least congested").weak());
        ui.add_space(4.0);
        match state.snapshot.as_ref() {
            Some(snapshot) if snapshot.has_route() => {
                ui.label(RichText::new(format_route(&snapshot.best_route)).strong());
            }
            _ => {
                ui.label("No route in the latest snapshot.");
            }
        }

        ui.separator();
        ui.label(RichText::new("Traffic density").strong());
        legend_row(ui, LOW_CONGESTION, "Low traffic");
        legend_row(ui, HIGH_CONGESTION, "High traffic");
        legend_row(ui, ROUTE_COLOR, "Best route");

        if let Some(diagram) = self.renderer.diagram() {
            let data = diagram.data();
            ui.small(format!(
                "range: {} – {} vehicles",
                format_weight(data.min_weight),
                format_weight(data.max_weight)
            ));
            if let Some(busiest) = data
                .edges
                .iter()
                .max_by(|a, b| a.weight.total_cmp(&b.weight))
            {
                ui.small(format!(
                    "busiest: {} – {} ({})",
                    data.nodes[busiest.from].id, data.nodes[busiest.to].id, busiest.label
                ));
            }
            let orphans = data.nodes.iter().filter(|node| node.orphan).count();
            ui.small(format!(
                "{} intersections, {} road segments",
                data.nodes.len() - orphans,
                data.edges.len()
            ));
            if orphans > 0 {
                ui.small(format!("{orphans} unlisted intersections referenced by roads"));
            }
        }

        ui.separator();
        ui.small(format!(
            "snapshot #{}  |  polling every {} ms",
            state.revision,
            self.feed.interval().as_millis()
        ));
        if self.feed.skipped_ticks() > 0 {
            ui.small(format!(
                "{} ticks skipped while a request was pending",
                self.feed.skipped_ticks()
            ));
        }
    }
}
