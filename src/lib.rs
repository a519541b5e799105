pub mod app;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod fetcher;
pub mod filters;
pub mod model;
pub mod output;
pub mod session;
pub mod table;
pub mod utils;

#[cfg(test)]
mod tests;
