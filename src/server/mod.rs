//! The HTTP surface: out of scope for the core's tested properties (§1),
//! this module only resolves a request into the core's constructor
//! parameters, runs an engine, and serializes the result back out in the
//! §6 wire shape.

pub mod builder;
pub mod errors;
pub mod routes;
pub mod state;

pub use builder::run;
pub use state::AppState;
