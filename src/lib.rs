// Core infrastructure modules
pub mod core;

// Batch runner
pub mod batch;
pub mod config;
pub mod results_grid;
pub mod splitter;

#[cfg(test)]
mod test_utils;
