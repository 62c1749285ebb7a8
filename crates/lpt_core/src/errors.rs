//! Error Types
//!
//! The entity layer performs no I/O, so almost every failure is a caller
//! contract violation that is reported through `debug_assert!` and a log line.
//! [`LptError`] covers the few boundaries where rejecting a request is cheap
//! and leaves state well-defined.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lpt_core::errors::{LptError, Result};
//!
//! fn attach(scene: &mut Scene, light: &ExternalRef<Light>) -> Result<()> {
//!     scene.add_light(light)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the LPT entity layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LptError {
    /// A scene already holds the maximum number of lights.
    #[error("Scene light capacity exceeded (max {capacity} lights)")]
    LightCapacityExceeded {
        /// The fixed light capacity of a scene.
        capacity: usize,
    },

    /// Uploaded pixel data does not match the declared texture size.
    #[error("Texture size mismatch: expected {expected} bytes, got {actual}")]
    TextureSizeMismatch {
        /// Byte size implied by format, width and height.
        expected: usize,
        /// Byte size of the supplied buffer.
        actual: usize,
    },

    /// A raw value does not name a known texture format.
    #[error("Unknown texture format: {0}")]
    UnknownTextureFormat(u32),

    /// A raw value does not name a known light type.
    #[error("Unknown light type: {0}")]
    UnknownLightType(u32),

    /// The entity's last internal reference is gone; it cannot be referenced again.
    #[error("Entity has been destroyed")]
    EntityDestroyed,
}

/// Alias for `Result<T, LptError>`.
pub type Result<T> = std::result::Result<T, LptError>;
