//! HTTP layer: middleware and endpoint handlers

pub mod middleware;
pub mod services;
