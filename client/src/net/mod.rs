//! Networking modules for the floor-plan REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the wire schema, `api` performs the HTTP calls, and
//! `convert` turns a backend plan into a `canvas::doc::FloorPlan`.

pub mod api;
pub mod convert;
pub mod types;
