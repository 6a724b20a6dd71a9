pub mod models;
pub mod verifier;
pub mod generator;
pub mod trainer;
pub mod experience;
pub mod metrics;
pub mod minimal_server;
pub mod advanced_experiments;

#[cfg(test)]
mod tests;

pub use models::*;
pub use verifier::*;
pub use generator::*;
pub use trainer::*;
pub use experience::*;
pub use metrics::*;
pub use minimal_server::*;
