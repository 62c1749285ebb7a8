//! Dual Reference Counting
//!
//! Every entity is shared between two owners that release it on different
//! schedules:
//!
//! - **Client code** holds [`ExternalRef`] handles. Dropping the last one only
//!   records that the client lost interest; the backend may still be reading
//!   the entity from an in-flight frame.
//! - **The backend** (and entities referencing other entities) holds
//!   [`InternalRef`] handles. The internal count reaching zero destroys the
//!   entity.
//!
//! Both counts live in [`RefCounts`] next to the entity state inside
//! [`Shared`]. The handle types make the two release paths distinct at
//! compile time.
//!
//! # Example
//!
//! ```rust
//! use lpt_core::{ExternalRef, InternalRef, Shared};
//!
//! let shared = Shared::new(5_u32);
//! let client = ExternalRef::acquire(&shared);
//! let backend = InternalRef::acquire(&client);
//!
//! drop(client);
//! assert_eq!(backend.external_count(), 0);
//! assert_eq!(*backend.read(), 5);
//! assert!(!backend.is_destroyed());
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Independent external/internal reference counters.
///
/// All operations are lock-free and return the count after the update.
#[derive(Debug, Default)]
pub struct RefCounts {
    external: AtomicI32,
    internal: AtomicI32,
}

impl RefCounts {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            external: AtomicI32::new(0),
            internal: AtomicI32::new(0),
        }
    }

    pub fn acquire_external(&self) -> i32 {
        self.external.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Never destroys anything; see the module docs.
    pub fn release_external(&self) -> i32 {
        let prev = self.external.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "external reference released more often than acquired");
        prev - 1
    }

    pub fn acquire_internal(&self) -> i32 {
        self.internal.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// A return value of `0` means the caller performed the final release.
    pub fn release_internal(&self) -> i32 {
        let prev = self.internal.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "internal reference released more often than acquired");
        prev - 1
    }

    #[must_use]
    pub fn external(&self) -> i32 {
        self.external.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn internal(&self) -> i32 {
        self.internal.load(Ordering::Acquire)
    }
}

/// Heap cell shared by all handles to one entity.
pub struct Shared<T> {
    counts: RefCounts,
    destroyed: AtomicBool,
    data: RwLock<T>,
}

impl<T> Shared<T> {
    /// Wraps `value` with both counts at zero. Hand it to
    /// [`ExternalRef::acquire`] / [`InternalRef::acquire`] to start sharing.
    pub fn new(value: T) -> Arc<Self> {
        Arc::new(Self {
            counts: RefCounts::new(),
            destroyed: AtomicBool::new(false),
            data: RwLock::new(value),
        })
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.data.read()
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        debug_assert!(!self.is_destroyed(), "mutating a destroyed entity");
        self.data.write()
    }

    #[inline]
    #[must_use]
    pub fn counts(&self) -> &RefCounts {
        &self.counts
    }

    #[inline]
    #[must_use]
    pub fn external_count(&self) -> i32 {
        self.counts.external()
    }

    #[inline]
    #[must_use]
    pub fn internal_count(&self) -> i32 {
        self.counts.internal()
    }

    /// `true` once the internal count has transitioned from 1 to 0.
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("external", &self.external_count())
            .field("internal", &self.internal_count())
            .field("destroyed", &self.is_destroyed())
            .field("data", &self.data)
            .finish()
    }
}

/// Anything that can hand out the shared cell of an entity.
///
/// Lets scene-graph setters accept either handle flavour.
pub trait EntityHandle<T> {
    fn shared(&self) -> &Arc<Shared<T>>;

    /// Identity comparison; two handles are the same entity iff they share a cell.
    fn same_entity(&self, other: &dyn EntityHandle<T>) -> bool {
        Arc::ptr_eq(self.shared(), other.shared())
    }
}

impl<T> EntityHandle<T> for Arc<Shared<T>> {
    fn shared(&self) -> &Arc<Shared<T>> {
        self
    }
}

// ============================================================================
// ExternalRef
// ============================================================================

/// Client-side handle. Dropping it decrements the external count only.
pub struct ExternalRef<T>(Arc<Shared<T>>);

impl<T> ExternalRef<T> {
    pub fn acquire(handle: &impl EntityHandle<T>) -> Self {
        let shared = Arc::clone(handle.shared());
        shared.counts.acquire_external();
        Self(shared)
    }
}

impl<T> EntityHandle<T> for ExternalRef<T> {
    fn shared(&self) -> &Arc<Shared<T>> {
        &self.0
    }
}

impl<T> Clone for ExternalRef<T> {
    fn clone(&self) -> Self {
        Self::acquire(self)
    }
}

impl<T> Deref for ExternalRef<T> {
    type Target = Shared<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> Drop for ExternalRef<T> {
    fn drop(&mut self) {
        self.0.counts.release_external();
    }
}

impl<T: fmt::Debug> fmt::Debug for ExternalRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExternalRef").field(&self.0).finish()
    }
}

// ============================================================================
// InternalRef
// ============================================================================

/// Backend-side handle. Dropping the last one destroys the entity.
pub struct InternalRef<T>(Arc<Shared<T>>);

impl<T> InternalRef<T> {
    /// Takes a backend reference. The entity must not be destroyed yet:
    /// destruction is final, so re-acquiring is a caller error. Use
    /// [`try_acquire`](Self::try_acquire) where the entity may be gone.
    pub fn acquire(handle: &(impl EntityHandle<T> + ?Sized)) -> Self {
        let shared = Arc::clone(handle.shared());
        debug_assert!(
            !shared.is_destroyed(),
            "acquiring an internal reference to a destroyed entity"
        );
        shared.counts.acquire_internal();
        Self(shared)
    }

    /// Like [`acquire`](Self::acquire), but returns `None` for a destroyed entity.
    pub fn try_acquire(handle: &(impl EntityHandle<T> + ?Sized)) -> Option<Self> {
        if handle.shared().is_destroyed() {
            log::warn!(
                "{} is destroyed and cannot be referenced again",
                std::any::type_name::<T>()
            );
            return None;
        }
        Some(Self::acquire(handle))
    }
}

impl<T> EntityHandle<T> for InternalRef<T> {
    fn shared(&self) -> &Arc<Shared<T>> {
        &self.0
    }
}

impl<T> Clone for InternalRef<T> {
    fn clone(&self) -> Self {
        Self::acquire(self)
    }
}

impl<T> Deref for InternalRef<T> {
    type Target = Shared<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> Drop for InternalRef<T> {
    fn drop(&mut self) {
        if self.0.counts.release_internal() == 0 {
            self.0.destroyed.store(true, Ordering::Release);
            log::trace!(
                "{} destroyed (external count {})",
                std::any::type_name::<T>(),
                self.0.external_count()
            );
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for InternalRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InternalRef").field(&self.0).finish()
    }
}
