//! Data models for extracted resources, crawl reports and configuration.

pub mod config;
pub mod report;
pub mod resource;
