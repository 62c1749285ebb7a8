use crate::flags::DirtyFlags;

/// State embedded in every entity: a display label and the dirty mask.
///
/// The mask is plain data. Writers are serialized by the entity's lock and by
/// the single-writer-per-frame protocol, and only the backend clears it once
/// the corresponding GPU resource has been rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBase {
    name: String,
    dirty: DirtyFlags,
}

impl EntityBase {
    #[must_use]
    pub fn new(initial_dirty: DirtyFlags) -> Self {
        Self {
            name: String::new(),
            dirty: initial_dirty,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    #[must_use]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self, flags: DirtyFlags) -> bool {
        self.dirty.intersects(flags)
    }

    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::empty();
    }
}

/// Common surface of every scene-graph entity.
///
/// Implementors only provide access to their [`EntityBase`]; naming and dirty
/// tracking come for free. Dispatch is static: the set of entity types is
/// closed and known up front.
pub trait Entity: Send + Sync + 'static {
    /// Bits a freshly created entity starts with, so the backend performs a
    /// full upload on first sight.
    const INITIAL_DIRTY: DirtyFlags;

    fn base(&self) -> &EntityBase;
    fn base_mut(&mut self) -> &mut EntityBase;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn set_name(&mut self, name: &str) {
        self.base_mut().set_name(name);
    }

    fn dirty_flags(&self) -> DirtyFlags {
        self.base().dirty_flags()
    }

    /// Pass [`DirtyFlags::ANY`] to test for any pending change.
    fn is_dirty(&self, flags: DirtyFlags) -> bool {
        self.base().is_dirty(flags)
    }

    fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.base_mut().mark_dirty(flags);
    }

    /// Backend only, after it has consumed every pending change.
    fn clear_dirty(&mut self) {
        self.base_mut().clear_dirty();
    }
}
