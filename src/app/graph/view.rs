use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, Vec2, vec2};

use super::super::render_utils::{
    HOVER_BORDER, HOVER_FILL, NODE_BORDER, NODE_FILL, ROUTE_COLOR, draw_background, edge_visible,
    world_to_screen,
};
use super::{GraphRenderer, HoverTarget};

const LANE_SPACING: f32 = 9.0;
const EDGE_OPACITY: u8 = 204;

/// Perpendicular offset for the n-th edge between the same two nodes: 0, +1, -1, +2, ...
fn lane_offset(lane: u16) -> f32 {
    if lane == 0 {
        return 0.0;
    }
    let step = lane.div_ceil(2) as f32;
    if lane % 2 == 1 { step } else { -step }
}

fn edge_opacity(color: Color32) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), EDGE_OPACITY)
}

impl GraphRenderer {
    pub(in crate::app) fn draw(&mut self, ui: &mut Ui) {
        let Some(diagram) = self.diagram.as_mut() else {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.label("Waiting for the first snapshot...");
            });
            return;
        };

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if diagram.needs_fit() {
            diagram.fit(rect);
        }
        diagram.handle_zoom(ui, rect, &response);
        diagram.handle_pan(&response);

        let viewport = diagram.viewport();
        let (pan, zoom) = (viewport.pan, viewport.zoom);
        draw_background(&painter, rect, pan, zoom);

        let data = &diagram.data;
        let zoom_sqrt = zoom.sqrt().clamp(0.55, 1.8);
        let node_radius = (15.0 * zoom.powf(0.4)).clamp(4.0, 30.0);
        let node_positions = data
            .nodes
            .iter()
            .map(|node| world_to_screen(rect, pan, zoom, node.world_pos))
            .collect::<Vec<_>>();

        let edge_segments = data
            .edges
            .iter()
            .map(|edge| {
                let start = node_positions[edge.from];
                let end = node_positions[edge.to];
                let direction = end - start;
                let normal = if direction.length_sq() > f32::EPSILON {
                    direction.normalized().rot90()
                } else {
                    Vec2::ZERO
                };
                // Keep lanes on the same side regardless of the edge's own direction.
                let normal = if edge.from <= edge.to { normal } else { -normal };
                let offset = normal * lane_offset(edge.lane) * LANE_SPACING * zoom_sqrt;
                (start + offset, end + offset, edge.width * zoom_sqrt)
            })
            .collect::<Vec<_>>();

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|position| rect.contains(*position));
        let hovered = if response.dragged() {
            None
        } else {
            pointer.and_then(|pointer| {
                super::Diagram::hit_test(pointer, &node_positions, node_radius, &edge_segments)
            })
        };

        let cursor = if response.dragged() {
            egui::CursorIcon::Grabbing
        } else if hovered.is_some() {
            egui::CursorIcon::PointingHand
        } else {
            egui::CursorIcon::Grab
        };
        if response.hovered() {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }

        let show_edge_labels = zoom >= 0.55;
        for (index, (edge, &(start, end, width))) in
            data.edges.iter().zip(edge_segments.iter()).enumerate()
        {
            if !edge_visible(rect, start, end, width + 2.0) {
                continue;
            }

            let color = if hovered == Some(HoverTarget::Edge(index)) {
                HOVER_FILL
            } else {
                edge_opacity(edge.color)
            };
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        if show_edge_labels {
            for (edge, &(start, end, width)) in data.edges.iter().zip(edge_segments.iter()) {
                if !edge_visible(rect, start, end, width + 2.0) {
                    continue;
                }
                let mid = start + (end - start) * 0.5;
                Self::draw_tag(
                    &painter,
                    mid,
                    &edge.label,
                    Color32::WHITE,
                    Color32::from_rgb(26, 32, 44),
                );
            }
        }

        for (index, (node, &position)) in data.nodes.iter().zip(node_positions.iter()).enumerate() {
            if !rect.expand(node_radius).contains(position) {
                continue;
            }

            let is_hovered = hovered == Some(HoverTarget::Node(index));
            let (fill, border) = if is_hovered {
                (HOVER_FILL, HOVER_BORDER)
            } else if node.orphan {
                (Color32::from_gray(90), Color32::from_gray(140))
            } else {
                (NODE_FILL, NODE_BORDER)
            };

            if node.on_route {
                painter.circle_stroke(
                    position,
                    node_radius + 3.0,
                    Stroke::new(2.0, ROUTE_COLOR),
                );
            }
            painter.circle_filled(position, node_radius, fill);
            painter.circle_stroke(position, node_radius, Stroke::new(2.0, border));

            if !node.label.is_empty() {
                painter.text(
                    position + vec2(0.0, node_radius + 4.0),
                    Align2::CENTER_TOP,
                    &node.label,
                    FontId::proportional((16.0 * zoom_sqrt).clamp(10.0, 22.0)),
                    Color32::from_gray(238),
                );
            }
        }

        if let (Some(target), Some(pointer)) = (hovered, pointer) {
            let text = match target {
                HoverTarget::Node(index) => {
                    let node = &data.nodes[index];
                    if node.orphan {
                        format!("{} (not listed in snapshot)", node.id)
                    } else if node.label != node.id {
                        format!("{} ({})", node.label, node.id)
                    } else {
                        node.label.clone()
                    }
                }
                HoverTarget::Edge(index) => {
                    let edge = &data.edges[index];
                    let route_note = if edge.on_route { "  |  best route" } else { "" };
                    format!(
                        "{} – {}: {}{route_note}",
                        data.nodes[edge.from].id, data.nodes[edge.to].id, edge.label
                    )
                }
            };
            Self::draw_tag(
                &painter,
                pointer + vec2(14.0, 18.0),
                &text,
                Color32::from_rgba_unmultiplied(30, 36, 46, 235),
                Color32::from_gray(240),
            );
        }

        if diagram.hovered() != hovered {
            diagram.set_hovered(hovered);
            ui.ctx().request_repaint();
        }
    }

    fn draw_tag(painter: &egui::Painter, anchor: Pos2, text: &str, background: Color32, color: Color32) {
        let galley = painter.layout_no_wrap(text.to_owned(), FontId::proportional(12.0), color);
        let size = galley.size();
        let top_left = anchor - size * 0.5;
        let frame = egui::Rect::from_min_size(top_left, size).expand(3.0);
        painter.rect_filled(frame, 3.0, background);
        painter.galley(top_left, galley, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_alternate_sides() {
        let offsets = (0..5).map(lane_offset).collect::<Vec<_>>();
        assert_eq!(offsets, vec![0.0, 1.0, -1.0, 2.0, -2.0]);
    }
}
