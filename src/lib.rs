pub mod analyzer;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod notifier;
pub mod parser;
pub mod provider;
pub mod session;
pub mod storage;
pub mod utils;
