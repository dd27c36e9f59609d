use causim::analysis::compute_granger_and_te;
use causim::effects::{compute_effects, EffectRow};
use causim::emd::emd_hamming;
use causim::graph::Graph;
use causim::params::{validate_simulation_params, SimulationParams};
use causim::simulation::{simulate, SimResult};
use causim::tpm::build_tpm;
use rustc_hash::FxHashMap;
use serde::Serialize;

#[path = "../scenario_params.rs"]
mod scenario_params;

#[derive(Serialize)]
struct Report {
    params: SimulationParams,
    effects: Vec<EffectRow>,
    granger: Vec<EffectRow>,
    te: Vec<EffectRow>,
    do_tpm_shift: Option<f64>,
}

fn main() {
    let params = scenario_params::get_scenario_params();
    validate_simulation_params(&params).unwrap();

    let graph = params.template.build();
    let delay_steps = params.analysis_delay_steps();

    let natural = simulate(&graph, &params.sim, &FxHashMap::default()).unwrap();
    let effects = compute_effects(&natural, &graph, delay_steps, &params.sim).unwrap();
    let analysis = compute_granger_and_te(&natural, &graph, delay_steps, params.sim.seed).unwrap();

    let do_tpm_shift = params.clamp_node_id.as_ref().map(|clamp_id| {
        let clamp: FxHashMap<String, u8> = [(clamp_id.clone(), params.clamp_value)]
            .into_iter()
            .collect();
        let clamped = simulate(&graph, &params.sim, &clamp).unwrap();
        tpm_shift(&graph, &natural, &clamped, delay_steps)
    });

    let report = Report {
        params,
        effects,
        granger: analysis.granger,
        te: analysis.te,
        do_tpm_shift,
    };

    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}

fn observable_series(graph: &Graph, result: &SimResult) -> Vec<Vec<u8>> {
    graph
        .observable_indexes()
        .into_iter()
        .map(|idx| result.spikes[idx].clone())
        .collect()
}

/// Row-count weighted earth mover's distance between the natural and the
/// clamped transition matrices, a summary of how far the intervention moved
/// the network's dynamics.
fn tpm_shift(graph: &Graph, natural: &SimResult, clamped: &SimResult, delay_steps: usize) -> f64 {
    let natural_tpm = build_tpm(&observable_series(graph, natural), delay_steps).unwrap();
    let clamped_tpm = build_tpm(&observable_series(graph, clamped), delay_steps).unwrap();

    let total: usize = natural_tpm.row_counts.iter().sum();

    natural_tpm
        .mat
        .iter()
        .zip(&clamped_tpm.mat)
        .zip(&natural_tpm.row_counts)
        .map(|((p, q), count)| emd_hamming(p, q) * *count as f64)
        .sum::<f64>()
        / total as f64
}
