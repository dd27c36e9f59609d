use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use simple_error::SimpleError;

use crate::graph::Graph;
use crate::params::SimConfig;
use crate::types::HashMap;
use crate::util::clamp01;

/// Interventional runs derive their seed from the natural run's seed plus
/// this offset, so the two runs are reproducible but not spike-correlated.
pub const DO_SEED_OFFSET: u64 = 999;

#[derive(Debug, Clone, PartialEq)]
pub struct SimResult {
    pub times: Vec<f64>,
    pub spikes: Vec<Vec<u8>>,
}

impl SimResult {
    pub fn num_ticks(&self) -> usize {
        self.times.len()
    }
}

struct IncomingEdge {
    src_idx: usize,
    delay_ticks: usize,
    weight: f64,
}

struct IncomingSynergy {
    a_idx: usize,
    b_idx: usize,
    delay_ticks: usize,
    prob: f64,
}

/// Advances every node's binary spike state tick by tick. Contributions of
/// incoming edges accumulate additively into one per-tick probability,
/// clamped to [0, 1] and sampled with a single Bernoulli draw; an active
/// synergy raises the probability to at least its trigger probability.
/// Clamped nodes emit the clamped value unconditionally (do-operator).
pub fn simulate(
    graph: &Graph,
    cfg: &SimConfig,
    clamp_override: &HashMap<String, u8>,
) -> Result<SimResult, SimpleError> {
    let idx_by_id = graph.node_index_map();

    for (id, value) in clamp_override {
        if !idx_by_id.contains_key(id.as_str()) {
            return Err(SimpleError::new(format!("invalid clamp target: {}", id)));
        }

        if *value > 1 {
            return Err(SimpleError::new(format!(
                "invalid clamp value for node {}: {}",
                id, value
            )));
        }
    }

    let n = graph.nodes.len();
    let steps = cfg.num_ticks();
    let dt_sec = cfg.tick_ms / 1000.0;

    let base_prob: Vec<f64> = graph
        .nodes
        .iter()
        .map(|node| clamp01(node.base_rate_hz * dt_sec))
        .collect();

    let clamp: Vec<Option<u8>> = graph
        .nodes
        .iter()
        .map(|node| clamp_override.get(&node.id).copied().or(node.clamp))
        .collect();

    let mut edges_by_target: Vec<Vec<IncomingEdge>> = (0..n).map(|_| Vec::new()).collect();
    for edge in &graph.edges {
        edges_by_target[idx_by_id[edge.to.as_str()]].push(IncomingEdge {
            src_idx: idx_by_id[edge.from.as_str()],
            delay_ticks: (edge.delay_ms / cfg.tick_ms) as usize,
            weight: edge.weight,
        });
    }

    let mut synergies_by_target: Vec<Vec<IncomingSynergy>> = (0..n).map(|_| Vec::new()).collect();
    for synergy in &graph.synergies {
        synergies_by_target[idx_by_id[synergy.to.as_str()]].push(IncomingSynergy {
            a_idx: idx_by_id[synergy.a.as_str()],
            b_idx: idx_by_id[synergy.b.as_str()],
            delay_ticks: (synergy.delay_ms / cfg.tick_ms) as usize,
            prob: synergy.prob,
        });
    }

    debug!(
        "simulating {} nodes over {} ticks (seed {}, {} clamp overrides)",
        n,
        steps,
        cfg.seed,
        clamp_override.len()
    );

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut spikes = vec![vec![0u8; steps]; n];

    for t in 0..steps {
        for j in 0..n {
            if let Some(value) = clamp[j] {
                spikes[j][t] = value;
                continue;
            }

            let mut p = base_prob[j];

            for incoming in &edges_by_target[j] {
                if t >= incoming.delay_ticks
                    && spikes[incoming.src_idx][t - incoming.delay_ticks] == 1
                {
                    p += incoming.weight;
                }
            }

            for incoming in &synergies_by_target[j] {
                if t >= incoming.delay_ticks
                    && spikes[incoming.a_idx][t - incoming.delay_ticks] == 1
                    && spikes[incoming.b_idx][t - incoming.delay_ticks] == 1
                {
                    p = p.max(incoming.prob);
                }
            }

            p = clamp01(p);
            spikes[j][t] = if rng.gen::<f64>() < p { 1 } else { 0 };
        }
    }

    let times = (0..steps).map(|t| t as f64 * cfg.tick_ms).collect();

    Ok(SimResult { times, spikes })
}
