//! Floor-plan geometry, viewport, and rendering engine for the plan editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser, but
//! everything except [`bindings`], [`engine::Engine`] and [`render`] is plain
//! Rust with no browser dependency. A [`doc::FloorPlan`] flows one way through
//! the crate: the [`scene`] selector maps it to shape descriptors using the
//! [`geometry`] kernel, the [`fit`] module positions those shapes on screen
//! through the [`camera`], and [`render`] (or [`svg`]) draws them.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`bindings`] | `#[wasm_bindgen]` controller the host page drives |
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Floor-plan data model and the bundled sample plan |
//! | [`geometry`] | Wall offsetting and bounding boxes |
//! | [`units`] | Data-unit / display-unit conversion and size presets |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`fit`] | Fit-to-content transform and its animated transition |
//! | [`scene`] | Rich/fallback render selection into shape descriptors |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against scene shapes |
//! | [`render`] | Draws a scene onto a 2D canvas context |
//! | [`svg`] | Draws a scene into a standalone SVG document |
//! | [`consts`] | Shared numeric constants (zoom limits, paddings, etc.) |

pub mod bindings;
pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod fit;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod render;
pub mod scene;
pub mod svg;
pub mod units;
