//! Almanac - league-leader statistics acquisition and loading.
//!
//! Crawls the per-year league-leader pages, writes the extracted
//! observations to flat files, and loads cleaned observations into a
//! normalised SQLite store that dashboards query.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod services;
pub mod storage;
pub mod utils;
