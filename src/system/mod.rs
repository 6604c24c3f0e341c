pub mod counters;
pub mod cpu;
pub mod error;
pub mod platform;
pub mod sampler;
pub mod snapshot;
