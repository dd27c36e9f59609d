pub mod analysis;
pub mod effects;
pub mod emd;
pub mod graph;
pub mod granger;
pub mod params;
pub mod simulation;
pub mod template;
pub mod tpm;
pub mod transfer_entropy;

mod types;
mod util;
