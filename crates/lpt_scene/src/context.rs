//! Context
//!
//! Entity factory and backend-side owner. Every `create_*` call returns an
//! [`ExternalRef`] for the client and keeps an [`InternalRef`] in the context,
//! so the entity survives the client dropping its handle until the next frame
//! boundary.
//!
//! # Reclamation
//!
//! Releasing the last external handle only updates the count. The context
//! notices it in [`Context::frame_begin`], the synchronization point where no
//! in-flight work can still read the entity, and drops its own reference once
//! nothing else holds the entity internally either (no scene, instance or
//! material references it). Lists are walked from aggregates down to leaves,
//! so a scene released in one frame also frees the instances, meshes,
//! materials and textures only it kept alive.
//!
//! # Example
//!
//! ```rust
//! use lpt_core::ContextSettings;
//! use lpt_scene::Context;
//!
//! let mut ctx = Context::new(ContextSettings::default());
//! let light = ctx.create_light();
//! assert_eq!(ctx.frame_begin().released, 0);
//!
//! drop(light);
//! assert_eq!(ctx.frame_begin().released, 1);
//! ```

use std::sync::Arc;

use lpt_core::{
    ContextSettings, DebugFlags, DirtyFlags, Entity, EntityHandle, ExternalRef, GlobalSettings,
    InternalRef, Shared, TextureFormat,
};
use lpt_resources::{Camera, Light, Material, Mesh, RenderTarget, Texture};

use crate::instance::MeshInstance;
use crate::scene::Scene;

/// Live entities per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub cameras: usize,
    pub lights: usize,
    pub textures: usize,
    pub render_targets: usize,
    pub materials: usize,
    pub meshes: usize,
    pub mesh_instances: usize,
    pub scenes: usize,
}

impl EntityCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.cameras
            + self.lights
            + self.textures
            + self.render_targets
            + self.materials
            + self.meshes
            + self.mesh_instances
            + self.scenes
    }
}

/// Summary returned by [`Context::frame_begin`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    /// Entities whose context reference was dropped this frame.
    pub released: usize,
    /// Entities the context still tracks.
    pub live: usize,
    /// Scenes whose record changed during the refresh.
    pub scenes_changed: usize,
}

pub struct Context {
    settings: Arc<GlobalSettings>,
    reclaim_on_frame_begin: bool,
    frame: u64,

    scenes: Vec<InternalRef<Scene>>,
    mesh_instances: Vec<InternalRef<MeshInstance>>,
    materials: Vec<InternalRef<Material>>,
    meshes: Vec<InternalRef<Mesh>>,
    textures: Vec<InternalRef<Texture>>,
    render_targets: Vec<InternalRef<RenderTarget>>,
    cameras: Vec<InternalRef<Camera>>,
    lights: Vec<InternalRef<Light>>,
}

impl Context {
    #[must_use]
    pub fn new(settings: ContextSettings) -> Self {
        log::debug!(
            "Creating context (debug flags {:?}, reclaim on frame begin: {})",
            settings.debug_flags,
            settings.reclaim_on_frame_begin
        );
        Self {
            settings: Arc::new(GlobalSettings::from_settings(&settings)),
            reclaim_on_frame_begin: settings.reclaim_on_frame_begin,
            frame: 0,
            scenes: Vec::new(),
            mesh_instances: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            textures: Vec::new(),
            render_targets: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Flags shared with the backend; clone the `Arc` to keep them past the context.
    #[must_use]
    pub fn settings(&self) -> &Arc<GlobalSettings> {
        &self.settings
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    // === Factories ===

    pub fn create_camera(&mut self) -> ExternalRef<Camera> {
        track(&mut self.cameras, Camera::new())
    }

    pub fn create_light(&mut self) -> ExternalRef<Light> {
        track(&mut self.lights, Light::new())
    }

    /// Zero-filled texture; fill it with [`Texture::upload`].
    pub fn create_texture(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> ExternalRef<Texture> {
        let mut texture = Texture::new(format, width, height);
        texture.set_index(self.textures.len() as u32);
        track(&mut self.textures, texture)
    }

    pub fn create_render_target(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> ExternalRef<RenderTarget> {
        track(&mut self.render_targets, RenderTarget::new(format, width, height))
    }

    pub fn create_material(&mut self) -> ExternalRef<Material> {
        let mut material = Material::new();
        material.set_index(self.materials.len() as u32);
        track(&mut self.materials, material)
    }

    pub fn create_mesh(&mut self) -> ExternalRef<Mesh> {
        let mut mesh = Mesh::new();
        mesh.set_index(self.meshes.len() as u32);
        track(&mut self.meshes, mesh)
    }

    pub fn create_mesh_instance(
        &mut self,
        mesh: Option<&dyn EntityHandle<Mesh>>,
    ) -> ExternalRef<MeshInstance> {
        track(&mut self.mesh_instances, MeshInstance::new(mesh))
    }

    pub fn create_scene(&mut self) -> ExternalRef<Scene> {
        track(&mut self.scenes, Scene::new())
    }

    // === Queries ===

    pub fn scenes(&self) -> impl Iterator<Item = &InternalRef<Scene>> {
        self.scenes.iter()
    }

    #[must_use]
    pub fn live_counts(&self) -> EntityCounts {
        EntityCounts {
            cameras: self.cameras.len(),
            lights: self.lights.len(),
            textures: self.textures.len(),
            render_targets: self.render_targets.len(),
            materials: self.materials.len(),
            meshes: self.meshes.len(),
            mesh_instances: self.mesh_instances.len(),
            scenes: self.scenes.len(),
        }
    }

    // === Frame boundary ===

    /// Frame synchronization point.
    ///
    /// Drops the context's reference to every entity nobody else holds, packs
    /// the GPU slots of textures, materials and meshes, propagates moved slots
    /// into materials and instances, and refreshes each scene record.
    pub fn frame_begin(&mut self) -> FrameStats {
        self.frame += 1;

        let released = if self.reclaim_on_frame_begin {
            self.reclaim()
        } else {
            0
        };

        assign_slots(&self.textures);
        assign_slots(&self.materials);
        assign_slots(&self.meshes);

        for material in &self.materials {
            material.write().update_texture_indices();
        }
        for instance in &self.mesh_instances {
            instance.write().refresh_bindings();
        }

        if self.settings.has_debug_flag(DebugFlags::FORCE_UPDATE_AS) {
            for mesh in &self.meshes {
                mesh.write().mark_dirty(DirtyFlags::SHAPE);
            }
            for instance in &self.mesh_instances {
                instance.write().mark_dirty(DirtyFlags::TRANSFORM);
            }
        }

        let scenes_changed = self
            .scenes
            .iter()
            .filter(|scene| scene.write().update_data())
            .count();

        let stats = FrameStats {
            frame: self.frame,
            released,
            live: self.live_counts().total(),
            scenes_changed,
        };
        log::debug!(
            "Frame {}: released {}, live {}, scenes changed {}",
            stats.frame,
            stats.released,
            stats.live,
            stats.scenes_changed
        );
        stats
    }

    fn reclaim(&mut self) -> usize {
        // Aggregates first so their members become unreferenced in the same pass.
        release_unused(&mut self.scenes)
            + release_unused(&mut self.mesh_instances)
            + release_unused(&mut self.materials)
            + release_unused(&mut self.meshes)
            + release_unused(&mut self.textures)
            + release_unused(&mut self.render_targets)
            + release_unused(&mut self.cameras)
            + release_unused(&mut self.lights)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextSettings::default())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("frame", &self.frame)
            .field("live", &self.live_counts())
            .finish_non_exhaustive()
    }
}

fn track<T: Entity>(list: &mut Vec<InternalRef<T>>, value: T) -> ExternalRef<T> {
    let shared = Shared::new(value);
    let external = ExternalRef::acquire(&shared);
    list.push(InternalRef::acquire(&shared));
    log::debug!("Created {} #{}", std::any::type_name::<T>(), list.len() - 1);
    external
}

/// Drops entries no client holds and no other entity references.
fn release_unused<T: Entity>(list: &mut Vec<InternalRef<T>>) -> usize {
    let before = list.len();
    list.retain(|entity| {
        let keep = entity.external_count() > 0 || entity.internal_count() > 1;
        if !keep {
            log::trace!("Releasing {} '{}'", std::any::type_name::<T>(), entity.read().name());
        }
        keep
    });
    before - list.len()
}

/// Dense slot assignment in creation order.
trait Slotted {
    fn slot(&self) -> u32;
    fn set_slot(&mut self, slot: u32);
}

macro_rules! impl_slotted {
    ($($ty:ty),*) => {
        $(impl Slotted for $ty {
            fn slot(&self) -> u32 {
                self.index()
            }

            fn set_slot(&mut self, slot: u32) {
                self.set_index(slot);
            }
        })*
    };
}

impl_slotted!(Texture, Material, Mesh);

fn assign_slots<T: Slotted>(list: &[InternalRef<T>]) {
    for (slot, entity) in list.iter().enumerate() {
        let slot = slot as u32;
        if entity.read().slot() != slot {
            entity.write().set_slot(slot);
        }
    }
}
