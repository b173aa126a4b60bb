// src/lib.rs

//! dev-scan: developer community search and enrichment library

pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod services;
pub mod utils;
