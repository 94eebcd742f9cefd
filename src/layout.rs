use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Vec2, vec2};

/// Fixed world coordinates per node id. Ids missing from the map sit at the origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeLayout {
    positions: HashMap<String, Vec2>,
}

impl NodeLayout {
    pub fn road_network() -> Self {
        [
            ("Start", 0.0, 0.0),
            ("R1", 250.0, 0.0),
            ("R2", 500.0, 0.0),
            ("R3", 750.0, 0.0),
            ("R4", 1000.0, 0.0),
            ("End", 1250.0, 0.0),
            ("U1", 500.0, -200.0),
            ("U2", 750.0, -200.0),
            ("L1", 500.0, 200.0),
            ("L2", 750.0, 200.0),
        ]
        .into_iter()
        .map(|(id, x, y)| (id.to_owned(), vec2(x, y)))
        .collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout file {}", path.display()))?;
        let layout = Self::from_json(&raw)
            .with_context(|| format!("invalid layout file {}", path.display()))?;
        log::info!(
            "loaded {} node positions from {}",
            layout.len(),
            path.display()
        );
        Ok(layout)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: HashMap<String, [f32; 2]> =
            serde_json::from_str(raw).context("layout must map node ids to [x, y] pairs")?;
        Ok(entries
            .into_iter()
            .map(|(id, [x, y])| (id, vec2(x, y)))
            .collect())
    }

    pub fn position(&self, id: &str) -> Vec2 {
        self.positions.get(id).copied().unwrap_or(Vec2::ZERO)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

impl FromIterator<(String, Vec2)> for NodeLayout {
    fn from_iter<I: IntoIterator<Item = (String, Vec2)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}
