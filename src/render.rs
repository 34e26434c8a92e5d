use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::{EnvError, Result};

/// What one node produced when the tree was rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedNode {
    pub label: String,
    pub depth: usize,
    pub lines: Vec<String>,
}

/// Indented outline: each node's label followed by its lines.
pub fn format_text(nodes: &[RenderedNode], indent: usize) -> String {
    nodes
        .iter()
        .flat_map(|node| {
            let pad = " ".repeat(node.depth * indent);
            let body = " ".repeat((node.depth + 1) * indent);
            std::iter::once(format!("{pad}{}", node.label))
                .chain(node.lines.iter().map(move |line| format!("{body}{line}")))
        })
        .join("\n")
}

pub fn format_json(nodes: &[RenderedNode]) -> Result<String> {
    serde_json::to_string_pretty(nodes).map_err(|e| EnvError::Config(e.to_string()))
}
