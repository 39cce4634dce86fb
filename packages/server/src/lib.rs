// Shoppin' crawler - API core
//
// HTTP front end for the crawl engine: submit crawl jobs, poll their status.

pub mod config;
pub mod server;

pub use config::*;
