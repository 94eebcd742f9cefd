use std::collections::HashMap;

use eframe::egui::{Color32, Rect, Vec2, vec2};

use crate::layout::NodeLayout;
use crate::traffic::{FeedState, GraphSnapshot};

mod build;
mod interaction;
mod view;

use self::build::build_diagram_data;
pub(super) use self::interaction::HoverTarget;

pub(super) const MIN_ZOOM: f32 = 0.05;
pub(super) const MAX_ZOOM: f32 = 6.0;
const FIT_MARGIN: f32 = 60.0;

#[derive(Clone, Debug, PartialEq)]
pub(super) struct DiagramNode {
    pub(super) id: String,
    pub(super) label: String,
    pub(super) world_pos: Vec2,
    pub(super) on_route: bool,
    pub(super) orphan: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct DiagramEdge {
    pub(super) from: usize,
    pub(super) to: usize,
    pub(super) weight: f64,
    pub(super) label: String,
    pub(super) color: Color32,
    pub(super) width: f32,
    pub(super) on_route: bool,
    /// Ordinal among edges joining the same two nodes.
    pub(super) lane: u16,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct DiagramData {
    pub(super) nodes: Vec<DiagramNode>,
    pub(super) edges: Vec<DiagramEdge>,
    pub(super) index_by_id: HashMap<String, usize>,
    pub(super) min_weight: f64,
    pub(super) max_weight: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Viewport {
    pub(super) pan: Vec2,
    pub(super) zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Zoom and pan that frame every node inside `rect`.
    pub(super) fn fit(nodes: &[DiagramNode], rect: Rect) -> Self {
        let Some(first) = nodes.first() else {
            return Self::default();
        };

        let (mut min, mut max) = (first.world_pos, first.world_pos);
        for node in nodes {
            min = min.min(node.world_pos);
            max = max.max(node.world_pos);
        }

        let extent = max - min;
        let available = (rect.size() - vec2(FIT_MARGIN, FIT_MARGIN) * 2.0).max(vec2(1.0, 1.0));
        let mut zoom = f32::INFINITY;
        if extent.x > 1.0 {
            zoom = zoom.min(available.x / extent.x);
        }
        if extent.y > 1.0 {
            zoom = zoom.min(available.y / extent.y);
        }
        if !zoom.is_finite() {
            zoom = 1.0;
        }
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);

        let center = (min + max) * 0.5;
        Self {
            pan: -center * zoom,
            zoom,
        }
    }
}

/// Live diagram instance. Owns the rendered dataset and the user's viewport.
pub(super) struct Diagram {
    data: DiagramData,
    viewport: Viewport,
    needs_fit: bool,
    hovered: Option<HoverTarget>,
}

impl Diagram {
    pub(super) fn create(data: DiagramData) -> Self {
        Self {
            data,
            viewport: Viewport::default(),
            needs_fit: true,
            hovered: None,
        }
    }

    pub(super) fn data(&self) -> &DiagramData {
        &self.data
    }

    pub(super) fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Full dataset swap. The view is flagged for re-fitting until `move_to` runs.
    pub(super) fn set_data(&mut self, data: DiagramData) {
        self.data = data;
        self.needs_fit = true;
        self.hovered = None;
    }

    /// Jumps straight to `viewport`, no animation.
    pub(super) fn move_to(&mut self, viewport: Viewport) {
        self.viewport = Viewport {
            pan: viewport.pan,
            zoom: viewport.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
        self.needs_fit = false;
    }

    pub(super) fn needs_fit(&self) -> bool {
        self.needs_fit
    }

    pub(super) fn fit(&mut self, rect: Rect) {
        self.move_to(Viewport::fit(&self.data.nodes, rect));
    }

    pub(super) fn request_fit(&mut self) {
        self.needs_fit = true;
    }

    pub(super) fn focus_node(&mut self, id: &str) -> bool {
        let Some(&index) = self.data.index_by_id.get(id) else {
            return false;
        };

        let zoom = self.viewport.zoom;
        let world = self.data.nodes[index].world_pos;
        self.move_to(Viewport {
            pan: -world * zoom,
            zoom,
        });
        true
    }

    pub(super) fn hovered(&self) -> Option<HoverTarget> {
        self.hovered
    }
}

pub(super) struct GraphRenderer {
    layout: NodeLayout,
    diagram: Option<Diagram>,
    rendered_revision: Option<u64>,
}

impl GraphRenderer {
    pub(super) fn new(layout: NodeLayout) -> Self {
        Self {
            layout,
            diagram: None,
            rendered_revision: None,
        }
    }

    pub(super) fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    pub(super) fn diagram_mut(&mut self) -> Option<&mut Diagram> {
        self.diagram.as_mut()
    }

    /// Renders the feed's snapshot once per revision.
    pub(super) fn sync(&mut self, state: &FeedState) -> bool {
        let Some(snapshot) = &state.snapshot else {
            return false;
        };
        if self.rendered_revision == Some(state.revision) {
            return false;
        }

        self.render(snapshot);
        self.rendered_revision = Some(state.revision);
        true
    }

    pub(super) fn render(&mut self, snapshot: &GraphSnapshot) {
        let data = build_diagram_data(snapshot, &self.layout);

        match self.diagram.as_mut() {
            Some(diagram) => {
                let viewport = diagram.viewport();
                let needs_fit = diagram.needs_fit();
                diagram.set_data(data);
                if !needs_fit {
                    diagram.move_to(viewport);
                }
                log::debug!(
                    "diagram updated in place: {} nodes, {} edges",
                    diagram.data.nodes.len(),
                    diagram.data.edges.len()
                );
            }
            None => {
                log::info!(
                    "diagram created: {} nodes, {} edges",
                    data.nodes.len(),
                    data.edges.len()
                );
                self.diagram = Some(Diagram::create(data));
            }
        }
    }

    pub(super) fn teardown(&mut self) {
        if self.diagram.take().is_some() {
            log::debug!("diagram torn down");
        }
        self.rendered_revision = None;
    }
}
