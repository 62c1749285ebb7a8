//! Core building blocks of the LPT entity layer: dual reference counting,
//! dirty tracking, flag sets, texture formats and global settings.

pub mod entity;
pub mod errors;
pub mod flags;
pub mod format;
pub mod refcount;
pub mod settings;

pub use entity::{Entity, EntityBase};
pub use errors::{LptError, Result};
pub use flags::{DebugFlags, DirtyFlags, GlobalFlags, InstanceFlags, RenderFlags};
pub use format::{TextureFormat, texel_size};
pub use refcount::{EntityHandle, ExternalRef, InternalRef, RefCounts, Shared};
pub use settings::{ContextSettings, GlobalSettings};

/// Hard cap on lights per scene, fixed by the GPU scene record layout.
pub const MAX_LIGHTS: usize = 32;
