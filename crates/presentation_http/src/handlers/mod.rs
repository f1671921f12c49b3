//! HTTP request handlers

pub mod metrics;
pub mod todos;
