use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Context};

use crate::layout::NodeLayout;
use crate::traffic::{FeedState, FeedStatus, SnapshotFeed, SnapshotSource};

mod graph;
mod highlight;
mod render_utils;
mod ui;

use self::graph::GraphRenderer;

const MAX_REPAINT_DELAY: Duration = Duration::from_millis(500);

pub struct TrafficMapApp {
    feed: SnapshotFeed,
    renderer: GraphRenderer,
    focus_query: String,
}

/// What the central area shows for a given feed state.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Screen {
    Loading,
    Failed(String),
    /// A snapshot is on hand; `stale_error` is set when the latest fetch failed.
    Diagram { stale_error: Option<String> },
}

impl Screen {
    fn for_state(state: &FeedState) -> Self {
        match (&state.snapshot, state.status) {
            (None, FeedStatus::Error) => Self::Failed(
                state
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_owned()),
            ),
            (None, _) => Self::Loading,
            (Some(_), FeedStatus::Error) => Self::Diagram {
                stale_error: state.error.clone(),
            },
            (Some(_), _) => Self::Diagram { stale_error: None },
        }
    }
}

impl TrafficMapApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        source: Arc<dyn SnapshotSource>,
        interval: Duration,
        layout: NodeLayout,
    ) -> Self {
        let repaint_ctx = cc.egui_ctx.clone();
        let mut feed =
            SnapshotFeed::new(source, interval).with_waker(move || repaint_ctx.request_repaint());
        feed.start(Instant::now());

        Self {
            feed,
            renderer: GraphRenderer::new(layout),
            focus_query: String::new(),
        }
    }
}

impl eframe::App for TrafficMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.feed.poll(now);
        self.renderer.sync(self.feed.state());

        let mut refresh_requested = false;
        match Screen::for_state(self.feed.state()) {
            Screen::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading traffic data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            Screen::Failed(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load traffic data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    let retry = ui.add_enabled(!self.feed.is_fetching(), egui::Button::new("Retry"));
                    if retry.clicked() {
                        refresh_requested = true;
                    }
                });
            }
            Screen::Diagram { stale_error } => {
                self.show_dashboard(ctx, stale_error.as_deref(), &mut refresh_requested);
            }
        }

        if refresh_requested {
            self.feed.refresh_now();
        }

        let next_tick = self
            .feed
            .time_until_next_tick(Instant::now())
            .unwrap_or(MAX_REPAINT_DELAY);
        ctx.request_repaint_after(next_tick.min(MAX_REPAINT_DELAY));
    }
}

impl Drop for TrafficMapApp {
    fn drop(&mut self) {
        self.feed.stop();
        self.renderer.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::GraphSnapshot;

    fn empty_snapshot() -> Arc<GraphSnapshot> {
        Arc::new(GraphSnapshot {
            nodes: Vec::new(),
            edges: Vec::new(),
            best_route: Vec::new(),
            min_weight: 0.0,
            max_weight: 1.0,
            next_update_secs: None,
            server_timestamp: None,
        })
    }

    #[test]
    fn loading_until_first_outcome() {
        assert_eq!(Screen::for_state(&FeedState::default()), Screen::Loading);
    }

    #[test]
    fn failure_without_data_shows_error_view() {
        let state = FeedState {
            status: FeedStatus::Error,
            error: Some("HTTP 502".into()),
            ..FeedState::default()
        };
        assert_eq!(Screen::for_state(&state), Screen::Failed("HTTP 502".into()));
    }

    #[test]
    fn failure_after_success_keeps_diagram_with_banner() {
        let state = FeedState {
            status: FeedStatus::Error,
            snapshot: Some(empty_snapshot()),
            error: Some("request timed out".into()),
            revision: 4,
            ..FeedState::default()
        };
        assert_eq!(
            Screen::for_state(&state),
            Screen::Diagram {
                stale_error: Some("request timed out".into())
            }
        );
    }

    #[test]
    fn ready_state_has_no_banner() {
        let state = FeedState {
            status: FeedStatus::Ready,
            snapshot: Some(empty_snapshot()),
            revision: 1,
            ..FeedState::default()
        };
        assert_eq!(
            Screen::for_state(&state),
            Screen::Diagram { stale_error: None }
        );
    }
}
