use std::time::Instant;

use causim::analysis::compute_granger_and_te;
use causim::effects::compute_effects;
use causim::params::validate_simulation_params;
use causim::simulation::simulate;
use rustc_hash::FxHashMap;

#[path = "../scenario_params.rs"]
mod scenario_params;

fn main() {
    let params = scenario_params::get_scenario_params();
    validate_simulation_params(&params).unwrap();

    let graph = params.template.build();
    let delay_steps = params.analysis_delay_steps();

    let wall_start = Instant::now();

    let natural = simulate(&graph, &params.sim, &FxHashMap::default()).unwrap();
    let effect_rows = compute_effects(&natural, &graph, delay_steps, &params.sim).unwrap();
    let analysis = compute_granger_and_te(&natural, &graph, delay_steps, params.sim.seed).unwrap();

    let wall_time = wall_start.elapsed();

    let num_ticks = natural.num_ticks();
    let spike_count: usize = natural
        .spikes
        .iter()
        .flatten()
        .map(|spike| *spike as usize)
        .sum();

    let mut checksum = 0usize;
    for (node_idx, series) in natural.spikes.iter().enumerate() {
        for (t, spike) in series.iter().enumerate() {
            if *spike == 1 {
                checksum += node_idx + t;
            }
        }
    }

    let node_ticks = num_ticks * graph.nodes.len();
    let node_tick_throughput = node_ticks as f64 / wall_time.as_secs_f64();

    eprintln!("Spikes per tick: {}", spike_count as f64 / num_ticks as f64);
    eprintln!(
        "Node-tick throughput: {:.3e} ({:.3} ns per node-tick)",
        node_tick_throughput,
        1e9 / node_tick_throughput
    );
    eprintln!(
        "Rows: {} effect, {} granger, {} te",
        effect_rows.len(),
        analysis.granger.len(),
        analysis.te.len()
    );
    eprintln!("Checksum: {}", checksum);
}
