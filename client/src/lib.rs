//! Native client for the floor-plan processing service.
//!
//! `net` speaks the backend's REST contract and converts its plan shape into
//! the `canvas` data model. `state` holds the single editor state container
//! and the asynchronous actions that drive it. `config` reads the
//! environment.

pub mod config;
pub mod net;
pub mod state;
