//! Settings
//!
//! [`GlobalSettings`] holds two atomic bitmasks that both entities and the
//! backend query from any thread. It is constructed explicitly and shared as
//! `Arc<GlobalSettings>` by whoever owns the rendering context, so its lifetime
//! is bounded by that context.
//!
//! [`ContextSettings`] is the plain configuration consumed once when a context
//! is created.
//!
//! # Example
//!
//! ```rust
//! use lpt_core::{ContextSettings, DebugFlags, GlobalSettings};
//!
//! let settings = ContextSettings {
//!     debug_flags: DebugFlags::TIMESTAMP,
//!     ..Default::default()
//! };
//! let globals = GlobalSettings::from_settings(&settings);
//! assert!(globals.has_debug_flag(DebugFlags::TIMESTAMP));
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use crate::flags::{DebugFlags, GlobalFlags};

/// Process-wide switches with lock-free updates.
#[derive(Debug, Default)]
pub struct GlobalSettings {
    debug_flags: AtomicU32,
    flags: AtomicU32,
}

impl GlobalSettings {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            debug_flags: AtomicU32::new(0),
            flags: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ContextSettings) -> Self {
        Self {
            debug_flags: AtomicU32::new(settings.debug_flags.bits()),
            flags: AtomicU32::new(settings.flags.bits()),
        }
    }

    pub fn enable_debug_flag(&self, flag: DebugFlags) {
        self.debug_flags.fetch_or(flag.bits(), Ordering::Relaxed);
    }

    pub fn disable_debug_flag(&self, flag: DebugFlags) {
        self.debug_flags.fetch_and(!flag.bits(), Ordering::Relaxed);
    }

    #[must_use]
    pub fn has_debug_flag(&self, flag: DebugFlags) -> bool {
        self.debug_flags().intersects(flag)
    }

    #[must_use]
    pub fn debug_flags(&self) -> DebugFlags {
        DebugFlags::from_bits_retain(self.debug_flags.load(Ordering::Relaxed))
    }

    pub fn enable_flag(&self, flag: GlobalFlags) {
        self.flags.fetch_or(flag.bits(), Ordering::Relaxed);
    }

    pub fn disable_flag(&self, flag: GlobalFlags) {
        self.flags.fetch_and(!flag.bits(), Ordering::Relaxed);
    }

    #[must_use]
    pub fn has_flag(&self, flag: GlobalFlags) -> bool {
        GlobalFlags::from_bits_retain(self.flags.load(Ordering::Relaxed)).intersects(flag)
    }
}

/// Configuration for a rendering context.
///
/// | Field                    | Description                                        | Default |
/// |--------------------------|----------------------------------------------------|---------|
/// | `debug_flags`            | Initial diagnostic toggles                         | empty   |
/// | `flags`                  | Initial general switches                           | empty   |
/// | `reclaim_on_frame_begin` | Release unreferenced entities at frame begin       | `true`  |
#[derive(Debug, Clone)]
pub struct ContextSettings {
    pub debug_flags: DebugFlags,
    pub flags: GlobalFlags,
    /// When `false` the context keeps every entity it created until it is dropped.
    pub reclaim_on_frame_begin: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            debug_flags: DebugFlags::empty(),
            flags: GlobalFlags::empty(),
            reclaim_on_frame_begin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn enable_disable_query() {
        let globals = GlobalSettings::new();
        assert!(!globals.has_debug_flag(DebugFlags::FORCE_UPDATE_AS));

        globals.enable_debug_flag(DebugFlags::FORCE_UPDATE_AS);
        globals.enable_debug_flag(DebugFlags::TIMESTAMP);
        assert!(globals.has_debug_flag(DebugFlags::FORCE_UPDATE_AS));

        globals.disable_debug_flag(DebugFlags::FORCE_UPDATE_AS);
        assert!(!globals.has_debug_flag(DebugFlags::FORCE_UPDATE_AS));
        assert_eq!(globals.debug_flags(), DebugFlags::TIMESTAMP);
    }

    #[test]
    fn toggles_from_many_threads() {
        let globals = Arc::new(GlobalSettings::new());
        std::thread::scope(|s| {
            for flag in [DebugFlags::TIMESTAMP, DebugFlags::FORCE_UPDATE_AS, DebugFlags::POWER_STABLE_STATE] {
                let globals = &globals;
                s.spawn(move || globals.enable_debug_flag(flag));
            }
        });
        assert_eq!(globals.debug_flags(), DebugFlags::all());
    }

    #[test]
    fn global_flags_start_empty() {
        let globals = GlobalSettings::from_settings(&ContextSettings::default());
        assert!(!globals.has_flag(GlobalFlags::all()));
        assert!(globals.debug_flags().is_empty());
    }
}
