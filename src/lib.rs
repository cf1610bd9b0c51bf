//! Folio - A personal portfolio, blog and CV site
//!
//! This library provides the admin API, the content services and the
//! key-value snapshot store behind them.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
