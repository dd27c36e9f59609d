use std::str::FromStr;

use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

use crate::graph::{Edge, Graph, Node, Synergy};

/// Built-in scenario graphs. Parsing a name outside this set fails loudly,
/// there is no fallback template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Maier3,
    Chain4,
    Confounder3,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Maier3 => "maier3",
            Template::Chain4 => "chain4",
            Template::Confounder3 => "confounder3",
        }
    }

    pub fn build(&self) -> Graph {
        match self {
            Template::Maier3 => build_maier3(),
            Template::Chain4 => build_chain4(),
            Template::Confounder3 => build_confounder3(),
        }
    }
}

impl FromStr for Template {
    type Err = SimpleError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "maier3" => Ok(Template::Maier3),
            "chain4" => Ok(Template::Chain4),
            "confounder3" => Ok(Template::Confounder3),
            _ => Err(SimpleError::new(format!("unknown template: {}", name))),
        }
    }
}

fn node(id: &str, base_rate_hz: f64, hidden: bool, x: f64, y: f64) -> Node {
    Node {
        id: id.to_string(),
        label: id.to_string(),
        base_rate_hz,
        clamp: None,
        hidden,
        x,
        y,
    }
}

fn edge(id: &str, from: &str, to: &str, delay_ms: f64, weight: f64) -> Edge {
    Edge {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        delay_ms,
        weight,
    }
}

fn build_maier3() -> Graph {
    Graph {
        nodes: vec![
            node("N0", 12.0, false, 150.0, 220.0),
            node("N1", 14.0, false, 150.0, 90.0),
            node("N2", 11.0, false, 520.0, 155.0),
        ],
        edges: vec![
            edge("e0", "N0", "N2", 8.0, 0.08),
            edge("e1", "N1", "N2", 8.0, 0.12),
            edge("e2", "N0", "N0", 8.0, 0.10),
        ],
        synergies: vec![Synergy {
            id: "s0".to_string(),
            a: "N0".to_string(),
            b: "N1".to_string(),
            to: "N2".to_string(),
            delay_ms: 8.0,
            prob: 0.5,
        }],
    }
}

fn build_chain4() -> Graph {
    Graph {
        nodes: vec![
            node("A", 8.0, false, 120.0, 170.0),
            node("B", 10.0, false, 320.0, 80.0),
            node("C", 10.0, false, 320.0, 260.0),
            node("D", 12.0, false, 560.0, 170.0),
        ],
        edges: vec![
            edge("e0", "A", "B", 10.0, 0.12),
            edge("e1", "A", "C", 10.0, 0.10),
            edge("e2", "B", "D", 10.0, 0.12),
            edge("e3", "C", "D", 10.0, 0.12),
        ],
        synergies: vec![Synergy {
            id: "s0".to_string(),
            a: "B".to_string(),
            b: "C".to_string(),
            to: "D".to_string(),
            delay_ms: 10.0,
            prob: 0.35,
        }],
    }
}

/// Hidden common cause U drives X and Y with staggered delays, so that X
/// leads Y by the default 8 ms analysis lag while do(X) has no effect on Y.
fn build_confounder3() -> Graph {
    Graph {
        nodes: vec![
            node("U", 30.0, true, 120.0, 155.0),
            node("X", 10.0, false, 360.0, 80.0),
            node("Y", 10.0, false, 360.0, 230.0),
        ],
        edges: vec![
            edge("e0", "U", "X", 4.0, 0.5),
            edge("e1", "U", "Y", 12.0, 0.5),
        ],
        synergies: Vec::new(),
    }
}
