pub mod admission;
pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod intake;
pub mod model;
pub mod normalize;
pub mod policy;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod sanitize;
pub mod service;
pub mod util;
