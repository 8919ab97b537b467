pub mod catalog;
pub mod dataset_loader;
mod synth_trace;
