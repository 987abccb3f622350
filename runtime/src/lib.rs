//! statscrawl: pull the data table out of statistics result pages, follow
//! their pagination, and group the tables by category and season.
//!
//! The pipeline is resolver → fetcher → selector → normalizer → consolidator,
//! driven one task at a time by [`driver::Driver`].

pub mod acquisition;
pub mod audit;
pub mod cartography;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod driver;
pub mod extraction;
pub mod types;
