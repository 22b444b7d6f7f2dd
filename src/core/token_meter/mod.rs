//! Usage aggregation and cost accounting (§4.6).

mod cost;
mod meter;

pub use cost::{compute_cost, ModelPricing};
pub use meter::{MeterSummary, TokenMeter};
