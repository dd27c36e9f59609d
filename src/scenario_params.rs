use causim::params::SimulationParams;

pub fn get_scenario_params() -> SimulationParams {
    let params_yaml_str = r#"
template: maier3
sim:
  tick_ms: 1.0
  duration_ms: 12000.0
  seed: 42
analysis_delay_ms: 8.0
clamp_node_id: N0
clamp_value: 1
"#;

    serde_yaml::from_str(params_yaml_str).unwrap()
}
