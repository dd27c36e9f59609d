use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

use crate::types::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub base_rate_hz: f64,
    pub clamp: Option<u8>,
    pub hidden: bool,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub delay_ms: f64,
    pub weight: f64,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synergy {
    pub id: String,
    pub a: String,
    pub b: String,
    pub to: String,
    pub delay_ms: f64,
    pub prob: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub synergies: Vec<Synergy>,
}

impl Graph {
    pub fn node_index_map(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect()
    }

    pub fn observable_indexes(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.hidden)
            .map(|(i, _)| i)
            .collect()
    }
}

pub fn validate_graph(graph: &Graph) -> Result<(), SimpleError> {
    let mut seen_ids = HashSet::default();

    for node in &graph.nodes {
        if !seen_ids.insert(node.id.as_str()) {
            return Err(SimpleError::new(format!(
                "duplicate node id: {}",
                node.id
            )));
        }

        if node.base_rate_hz < 0.0 {
            return Err(SimpleError::new(format!(
                "base rate of node {} must not be negative",
                node.id
            )));
        }

        if let Some(clamp) = node.clamp {
            if clamp > 1 {
                return Err(SimpleError::new(format!(
                    "clamp value of node {} must be 0 or 1",
                    node.id
                )));
            }
        }
    }

    for edge in &graph.edges {
        validate_endpoint(&seen_ids, &edge.from, &edge.id)?;
        validate_endpoint(&seen_ids, &edge.to, &edge.id)?;

        if edge.weight < 0.0 || edge.weight > 1.0 {
            return Err(SimpleError::new(format!(
                "weight of edge {} must be in [0, 1]",
                edge.id
            )));
        }

        if edge.delay_ms < 0.0 {
            return Err(SimpleError::new(format!(
                "delay of edge {} must not be negative",
                edge.id
            )));
        }
    }

    for synergy in &graph.synergies {
        validate_endpoint(&seen_ids, &synergy.a, &synergy.id)?;
        validate_endpoint(&seen_ids, &synergy.b, &synergy.id)?;
        validate_endpoint(&seen_ids, &synergy.to, &synergy.id)?;

        if synergy.prob < 0.0 || synergy.prob > 1.0 {
            return Err(SimpleError::new(format!(
                "probability of synergy {} must be in [0, 1]",
                synergy.id
            )));
        }

        if synergy.delay_ms < 0.0 {
            return Err(SimpleError::new(format!(
                "delay of synergy {} must not be negative",
                synergy.id
            )));
        }
    }

    Ok(())
}

fn validate_endpoint(
    node_ids: &HashSet<&str>,
    endpoint: &str,
    element_id: &str,
) -> Result<(), SimpleError> {
    if !node_ids.contains(endpoint) {
        return Err(SimpleError::new(format!(
            "element {} references unknown node id: {}",
            element_id, endpoint
        )));
    }

    Ok(())
}
