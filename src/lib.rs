pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod kegg;
pub mod output;
pub mod selector;
pub mod store;
