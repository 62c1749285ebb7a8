//! Scene aggregation for the LPT entity layer: mesh instances, scenes and the
//! [`Context`] that creates entities and reclaims them at frame boundaries.

pub mod context;
pub mod instance;
pub mod scene;

pub use context::{Context, EntityCounts, FrameStats};
pub use instance::MeshInstance;
pub use scene::{DEFAULT_RENDER_FLAGS, Scene};
