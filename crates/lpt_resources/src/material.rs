use glam::Vec3;

use lpt_core::{DirtyFlags, Entity, EntityBase, EntityHandle, InternalRef};

use crate::texture::Texture;
use crate::uniforms::MaterialData;

/// Surface parameters plus two shared texture bindings.
///
/// Bound textures are held through [`InternalRef`]s: a material keeps its
/// textures alive after the client drops them, and many materials may share
/// one texture. Every setter raises [`DirtyFlags::MATERIAL`].
#[derive(Debug)]
pub struct Material {
    base: EntityBase,
    data: MaterialData,
    diffuse_texture: Option<InternalRef<Texture>>,
    emissive_texture: Option<InternalRef<Texture>>,
    /// GPU slot assigned by the backend.
    index: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

impl Material {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            data: MaterialData::default(),
            diffuse_texture: None,
            emissive_texture: None,
            index: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &MaterialData {
        &self.data
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Backend bookkeeping; does not mark the material dirty.
    pub fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    #[must_use]
    pub fn diffuse_texture(&self) -> Option<&InternalRef<Texture>> {
        self.diffuse_texture.as_ref()
    }

    #[must_use]
    pub fn emissive_texture(&self) -> Option<&InternalRef<Texture>> {
        self.emissive_texture.as_ref()
    }

    pub fn set_diffuse(&mut self, color: Vec3) {
        self.data.diffuse = color;
        self.mark_dirty(DirtyFlags::MATERIAL);
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.data.roughness = roughness;
        self.mark_dirty(DirtyFlags::MATERIAL);
    }

    pub fn set_emissive(&mut self, color: Vec3) {
        self.data.emissive = color;
        self.mark_dirty(DirtyFlags::MATERIAL);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.data.opacity = opacity;
        self.mark_dirty(DirtyFlags::MATERIAL);
    }

    /// Binds (or with `None` unbinds) the diffuse texture, releasing the
    /// previous binding.
    pub fn set_diffuse_texture(&mut self, texture: Option<&dyn EntityHandle<Texture>>) {
        self.diffuse_texture = texture.map(InternalRef::acquire);
        self.data.diffuse_tex = slot_of(self.diffuse_texture.as_ref());
        self.mark_dirty(DirtyFlags::MATERIAL);
    }

    pub fn set_emissive_texture(&mut self, texture: Option<&dyn EntityHandle<Texture>>) {
        self.emissive_texture = texture.map(InternalRef::acquire);
        self.data.emissive_tex = slot_of(self.emissive_texture.as_ref());
        self.mark_dirty(DirtyFlags::MATERIAL);
    }

    /// Re-reads the GPU slots of the bound textures after the backend has
    /// reassigned them. Marks dirty only when a slot actually moved.
    pub fn update_texture_indices(&mut self) -> bool {
        let diffuse = slot_of(self.diffuse_texture.as_ref());
        let emissive = slot_of(self.emissive_texture.as_ref());
        if diffuse == self.data.diffuse_tex && emissive == self.data.emissive_tex {
            return false;
        }
        self.data.diffuse_tex = diffuse;
        self.data.emissive_tex = emissive;
        self.mark_dirty(DirtyFlags::MATERIAL);
        true
    }
}

fn slot_of(texture: Option<&InternalRef<Texture>>) -> i32 {
    texture.map_or(-1, |t| t.read().index() as i32)
}

impl Entity for Material {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::MATERIAL;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}
