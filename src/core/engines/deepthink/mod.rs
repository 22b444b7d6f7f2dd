mod engine;

pub use engine::{DeepThink, DeepThinkParams};
