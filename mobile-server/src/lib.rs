//! Back-end of the Grenoble transit web client.
//!
//! Plans trips through the regional planner, decodes leg geometries into map
//! features, resolves place names and lists the next passages at a stop.

pub mod cache;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod planner;
pub mod render;
pub mod schedules;
pub mod web;
