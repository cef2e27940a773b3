//! Interactive transform engine and layered filter compositor for a 2D scene editor.
//!
//! The crate compiles to WebAssembly for the browser and to a plain library
//! for tests and headless use. It lets a user select elements and move, rotate
//! and scale them through on-canvas handles, and renders every element through
//! its chain of visual filters (shadows, glows, color correction) on CPU
//! raster surfaces. The host forwards DOM events to the [`engine::Engine`] and
//! reacts to the [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Elements, groups and the in-memory document store |
//! | [`geom`] | Points, sizes and rotation helpers |
//! | [`bounds`] | Rotation-aware bounding boxes |
//! | [`transform_box`] | The manipulation box around the selection |
//! | [`tools`] | Grab, rotate and scale pointer behaviour |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Handles, element picking and marquee selection |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`surface`] | Premultiplied RGBA raster surfaces and colors |
//! | [`blend`] | Canvas2D composite operations |
//! | [`filter`] | Filter kinds, their parameters and the registry |
//! | [`compositor`] | Layers an element's filters onto a destination |
//! | [`render`] | Scene and selection overlay drawing |
//! | [`config`] | Engine configuration |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants |

pub mod blend;
pub mod bounds;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod filter;
pub mod geom;
pub mod hit;
pub mod input;
pub mod render;
pub mod surface;
pub mod tools;
pub mod transform_box;
