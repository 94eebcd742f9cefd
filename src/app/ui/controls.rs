use eframe::egui::{RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::TrafficMapApp;
use super::super::graph::DiagramNode;

const FOCUS_RESULT_LIMIT: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Indices of nodes whose id or label matches `query`, best first.
fn rank_node_matches(nodes: &[DiagramNode], query: &str, limit: usize) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let by_id = fuzzy_match_score(&matcher, &node.id, query);
            let by_label = fuzzy_match_score(&matcher, &node.label, query);
            by_id.max(by_label).map(|score| (index, score))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(limit);
    scored.into_iter().map(|(index, _)| index).collect()
}

impl TrafficMapApp {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("View").strong());
        ui.horizontal(|ui| {
            if ui.button("Fit view").clicked()
                && let Some(diagram) = self.renderer.diagram_mut()
            {
                diagram.request_fit();
            }
        });

        ui.add_space(6.0);
        ui.label("Find intersection")
            .on_hover_text("Fuzzy-match an intersection id or label, then click to center on it.");
        ui.text_edit_singleline(&mut self.focus_query);

        let Some(diagram) = self.renderer.diagram() else {
            return;
        };
        let nodes = &diagram.data().nodes;
        let matches = rank_node_matches(nodes, &self.focus_query, FOCUS_RESULT_LIMIT)
            .into_iter()
            .map(|index| {
                let node = &nodes[index];
                let text = if node.label.is_empty() || node.label == node.id {
                    node.id.clone()
                } else {
                    format!("{} ({})", node.label, node.id)
                };
                (node.id.clone(), text)
            })
            .collect::<Vec<_>>();

        if matches.is_empty() && !self.focus_query.trim().is_empty() {
            ui.label(RichText::new("No matching intersections.").weak());
        }

        let mut focus = None;
        for (id, text) in matches {
            if ui.button(text).clicked() {
                focus = Some(id);
            }
        }

        if let Some(id) = focus
            && let Some(diagram) = self.renderer.diagram_mut()
        {
            diagram.focus_node(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use super::*;

    fn node(id: &str, label: &str) -> DiagramNode {
        DiagramNode {
            id: id.to_owned(),
            label: label.to_owned(),
            world_pos: Vec2::ZERO,
            on_route: false,
            orphan: false,
        }
    }

    #[test]
    fn blank_query_matches_nothing() {
        let nodes = vec![node("Start", "Start")];
        assert!(rank_node_matches(&nodes, "   ", 5).is_empty());
    }

    #[test]
    fn matches_ids_and_labels_case_insensitively() {
        let nodes = vec![
            node("Start", "Start"),
            node("U1", "Upper ramp"),
            node("End", "End"),
        ];
        assert_eq!(rank_node_matches(&nodes, "end", 5), vec![2]);
        assert_eq!(rank_node_matches(&nodes, "upper", 5), vec![1]);
        assert!(rank_node_matches(&nodes, "zzz", 5).is_empty());
    }

    #[test]
    fn results_are_limited() {
        let nodes = (1..=6)
            .map(|i| node(&format!("R{i}"), &format!("R{i}")))
            .collect::<Vec<_>>();
        assert_eq!(rank_node_matches(&nodes, "R", 3).len(), 3);
    }
}
