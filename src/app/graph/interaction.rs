use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::{distance_to_segment, screen_to_world};
use super::{Diagram, MAX_ZOOM, MIN_ZOOM, Viewport};

const EDGE_HIT_SLOP: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum HoverTarget {
    Node(usize),
    Edge(usize),
}

impl Diagram {
    pub(in crate::app) fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom_at(rect, pointer, zoom_factor);
    }

    /// Nodes are pinned, so any drag pans the view.
    pub(in crate::app) fn handle_pan(&mut self, response: &egui::Response) {
        if response.dragged() {
            self.pan_by(response.drag_delta());
        }
    }

    /// Scales around `pointer`, keeping the world point under it fixed.
    pub(in crate::app) fn zoom_at(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let Viewport { pan, zoom } = self.viewport;
        let world_before = screen_to_world(rect, pan, zoom, pointer);

        let zoom = (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.move_to(Viewport {
            pan: pointer - rect.center() - (world_before * zoom),
            zoom,
        });
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }

        let viewport = self.viewport;
        self.move_to(Viewport {
            pan: viewport.pan + delta,
            ..viewport
        });
    }

    /// Nodes win over edges; the closest candidate wins within each kind.
    pub(in crate::app) fn hit_test(
        pointer: Pos2,
        node_positions: &[Pos2],
        node_radius: f32,
        edge_segments: &[(Pos2, Pos2, f32)],
    ) -> Option<HoverTarget> {
        let node = node_positions
            .iter()
            .enumerate()
            .map(|(index, position)| (index, position.distance(pointer)))
            .filter(|(_, distance)| *distance <= node_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = node {
            return Some(HoverTarget::Node(index));
        }

        edge_segments
            .iter()
            .enumerate()
            .map(|(index, (start, end, width))| {
                let distance = distance_to_segment(pointer, *start, *end);
                (index, distance, (width * 0.5).max(EDGE_HIT_SLOP))
            })
            .filter(|(_, distance, reach)| distance <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _, _)| HoverTarget::Edge(index))
    }

    pub(in crate::app) fn set_hovered(&mut self, hovered: Option<HoverTarget>) {
        self.hovered = hovered;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::super::DiagramData;
    use super::*;

    fn screen() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    #[test]
    fn zoom_keeps_point_under_pointer() {
        let mut diagram = Diagram::create(DiagramData::default());
        diagram.move_to(Viewport {
            pan: vec2(40.0, -10.0),
            zoom: 1.2,
        });

        let pointer = pos2(610.0, 140.0);
        let before = screen_to_world(screen(), diagram.viewport.pan, diagram.viewport.zoom, pointer);
        diagram.zoom_at(screen(), pointer, 1.15);
        let after = screen_to_world(screen(), diagram.viewport.pan, diagram.viewport.zoom, pointer);

        assert!((before - after).length() < 1e-3);
        assert!((diagram.viewport.zoom - 1.38).abs() < 1e-5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut diagram = Diagram::create(DiagramData::default());
        for _ in 0..200 {
            diagram.zoom_at(screen(), pos2(400.0, 300.0), 1.15);
        }
        assert_eq!(diagram.viewport.zoom, MAX_ZOOM);

        for _ in 0..400 {
            diagram.zoom_at(screen(), pos2(400.0, 300.0), 0.85);
        }
        assert_eq!(diagram.viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn panning_accumulates_and_cancels_pending_fit() {
        let mut diagram = Diagram::create(DiagramData::default());
        assert!(diagram.needs_fit());

        diagram.pan_by(vec2(15.0, -5.0));
        diagram.pan_by(vec2(5.0, 5.0));
        assert_eq!(diagram.viewport.pan, vec2(20.0, 0.0));
        assert!(!diagram.needs_fit());
    }

    #[test]
    fn nodes_take_priority_over_edges() {
        let nodes = [pos2(100.0, 100.0), pos2(300.0, 100.0)];
        let edges = [(nodes[0], nodes[1], 3.0)];

        assert_eq!(
            Diagram::hit_test(pos2(104.0, 102.0), &nodes, 15.0, &edges),
            Some(HoverTarget::Node(0))
        );
        assert_eq!(
            Diagram::hit_test(pos2(200.0, 104.0), &nodes, 15.0, &edges),
            Some(HoverTarget::Edge(0))
        );
        assert_eq!(Diagram::hit_test(pos2(200.0, 140.0), &nodes, 15.0, &edges), None);
    }
}
