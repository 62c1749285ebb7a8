//! Scene
//!
//! Aggregates one camera, one render target, up to [`MAX_LIGHTS`] lights and
//! any number of mesh instances. The scene shares these entities rather than
//! owning them: each membership is an [`InternalRef`], so the same light or
//! instance may belong to several scenes at once.
//!
//! The scene's [`SceneData`] record carries the light records in insertion
//! order with `light_count` always equal to the membership count.
//!
//! Dirty bits raised by the scene:
//!
//! | Change                         | Dirty bit         |
//! |--------------------------------|-------------------|
//! | `set_camera`                   | `CAMERA`          |
//! | `set_render_target`            | `RENDER_TARGET`   |
//! | `add_light` / `remove_light`   | `LIGHT`           |
//! | `add_mesh` / `remove_mesh`     | `INSTANCE`        |
//! | `clear`                        | `SCENE_ENTITIES`  |
//! | render flags, shadow params    | `SCENE_PARAMS`    |

use std::sync::Arc;

use lpt_core::{
    DirtyFlags, Entity, EntityBase, EntityHandle, InternalRef, LptError, MAX_LIGHTS, RenderFlags,
    Result,
};
use lpt_resources::{Camera, CameraData, Light, LightData, RenderTarget, SceneData};

use crate::instance::MeshInstance;

/// Render flags a new scene starts with.
pub const DEFAULT_RENDER_FLAGS: RenderFlags = RenderFlags::CULL_BACK_FACES
    .union(RenderFlags::GPU_SKINNING)
    .union(RenderFlags::CLAMP_BLENDSHAPE_WEIGHTS);

#[derive(Debug)]
pub struct Scene {
    base: EntityBase,
    data: SceneData,

    render_target: Option<InternalRef<RenderTarget>>,
    camera: Option<InternalRef<Camera>>,
    lights: Vec<InternalRef<Light>>,
    instances: Vec<InternalRef<MeshInstance>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let data = SceneData {
            render_flags: DEFAULT_RENDER_FLAGS.bits(),
            ..SceneData::default()
        };
        Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            data,
            render_target: None,
            camera: None,
            lights: Vec::with_capacity(MAX_LIGHTS),
            instances: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &SceneData {
        &self.data
    }

    // === Camera & output ===

    pub fn set_render_target(&mut self, target: Option<&dyn EntityHandle<RenderTarget>>) {
        self.render_target = target.map(InternalRef::acquire);
        self.mark_dirty(DirtyFlags::RENDER_TARGET);
    }

    #[must_use]
    pub fn render_target(&self) -> Option<&InternalRef<RenderTarget>> {
        self.render_target.as_ref()
    }

    pub fn set_camera(&mut self, camera: Option<&dyn EntityHandle<Camera>>) {
        self.camera = camera.map(InternalRef::acquire);
        self.data.camera = self.camera_record();
        self.mark_dirty(DirtyFlags::CAMERA);
    }

    #[must_use]
    pub fn camera(&self) -> Option<&InternalRef<Camera>> {
        self.camera.as_ref()
    }

    // === Lights ===

    /// Appends `light` to the light list.
    ///
    /// Adding a light that is already a member is a no-op. Once the list holds
    /// [`MAX_LIGHTS`] entries further additions are rejected and the scene is
    /// left untouched. A destroyed light is rejected as well.
    pub fn add_light(&mut self, light: &(impl EntityHandle<Light> + ?Sized)) -> Result<()> {
        if self.contains_light(light) {
            return Ok(());
        }
        if light.shared().is_destroyed() {
            return Err(LptError::EntityDestroyed);
        }
        if self.lights.len() >= MAX_LIGHTS {
            log::warn!(
                "Scene '{}': light capacity of {MAX_LIGHTS} reached, light rejected",
                self.base.name()
            );
            return Err(LptError::LightCapacityExceeded {
                capacity: MAX_LIGHTS,
            });
        }

        let slot = self.lights.len();
        self.data.lights[slot] = *light.shared().read().data();
        self.lights.push(InternalRef::acquire(light));
        self.data.light_count = self.lights.len() as u32;
        self.mark_dirty(DirtyFlags::LIGHT);
        Ok(())
    }

    /// Removes `light`, keeping the remaining lights in insertion order.
    /// Returns `false` if it was not a member.
    pub fn remove_light(&mut self, light: &(impl EntityHandle<Light> + ?Sized)) -> bool {
        let Some(pos) = self
            .lights
            .iter()
            .position(|l| Arc::ptr_eq(l.shared(), light.shared()))
        else {
            return false;
        };
        self.lights.remove(pos);

        let count = self.lights.len();
        self.data.lights.copy_within(pos + 1..=count, pos);
        self.data.lights[count] = LightData::default();
        self.data.light_count = count as u32;
        self.mark_dirty(DirtyFlags::LIGHT);
        true
    }

    #[must_use]
    pub fn contains_light(&self, light: &(impl EntityHandle<Light> + ?Sized)) -> bool {
        self.lights.iter().any(|l| Arc::ptr_eq(l.shared(), light.shared()))
    }

    #[must_use]
    pub fn lights(&self) -> &[InternalRef<Light>] {
        &self.lights
    }

    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Calls `body` with each active light record, in insertion order.
    pub fn each_light(&self, body: impl FnMut(&LightData)) {
        self.data.each_light(body);
    }

    // === Mesh instances ===

    /// Returns `false` if `instance` was already a member or is destroyed.
    pub fn add_mesh(&mut self, instance: &(impl EntityHandle<MeshInstance> + ?Sized)) -> bool {
        if self.contains_mesh(instance) {
            return false;
        }
        let Some(member) = InternalRef::try_acquire(instance) else {
            return false;
        };
        self.instances.push(member);
        self.mark_dirty(DirtyFlags::INSTANCE);
        true
    }

    pub fn remove_mesh(&mut self, instance: &(impl EntityHandle<MeshInstance> + ?Sized)) -> bool {
        let Some(pos) = self
            .instances
            .iter()
            .position(|i| Arc::ptr_eq(i.shared(), instance.shared()))
        else {
            return false;
        };
        self.instances.remove(pos);
        self.mark_dirty(DirtyFlags::INSTANCE);
        true
    }

    #[must_use]
    pub fn contains_mesh(&self, instance: &(impl EntityHandle<MeshInstance> + ?Sized)) -> bool {
        self.instances
            .iter()
            .any(|i| Arc::ptr_eq(i.shared(), instance.shared()))
    }

    #[must_use]
    pub fn mesh_instances(&self) -> &[InternalRef<MeshInstance>] {
        &self.instances
    }

    /// Drops every membership: camera, render target, lights and instances.
    pub fn clear(&mut self) {
        self.render_target = None;
        self.camera = None;
        self.lights.clear();
        self.instances.clear();

        self.data.camera = CameraData::default();
        self.data.lights = [LightData::default(); MAX_LIGHTS];
        self.data.light_count = 0;
        self.mark_dirty(DirtyFlags::SCENE_ENTITIES);
    }

    // === Render parameters ===

    #[must_use]
    pub fn render_flags(&self) -> RenderFlags {
        RenderFlags::from_bits_retain(self.data.render_flags)
    }

    pub fn set_render_flags(&mut self, flags: RenderFlags) {
        self.data.render_flags = flags.bits();
        self.mark_dirty(DirtyFlags::SCENE_PARAMS);
    }

    /// `ray_offset` pushes shadow-ray origins off the surface;
    /// `self_shadow_threshold` is the distance under which a hit counts as
    /// self-shadowing.
    pub fn set_shadow_params(&mut self, ray_offset: f32, self_shadow_threshold: f32) {
        self.data.shadow_ray_offset = ray_offset;
        self.data.self_shadow_threshold = self_shadow_threshold;
        self.mark_dirty(DirtyFlags::SCENE_PARAMS);
    }

    // === Synchronization ===

    /// Re-copies the camera and light records from the member entities.
    ///
    /// Returns `true` if the scene record differs bitwise from before. Does not
    /// touch the dirty mask: the members' own masks already describe the change.
    pub fn update_data(&mut self) -> bool {
        let before = self.data;

        self.data.camera = self.camera_record();
        for (slot, light) in self.data.lights.iter_mut().zip(&self.lights) {
            *slot = *light.read().data();
        }
        self.data.light_count = self.lights.len() as u32;

        before != self.data
    }

    fn camera_record(&self) -> CameraData {
        self.camera
            .as_ref()
            .map_or_else(CameraData::default, |c| *c.read().data())
    }
}

impl Entity for Scene {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::SCENE_ENTITIES.union(DirtyFlags::SCENE_PARAMS);

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lpt_core::{ExternalRef, Shared};

    fn light_at(x: f32) -> ExternalRef<Light> {
        let mut light = Light::new();
        light.set_position(Vec3::new(x, 0.0, 0.0));
        ExternalRef::acquire(&Shared::new(light))
    }

    #[test]
    fn new_scene_defaults() {
        let scene = Scene::new();
        assert!(scene.render_flags().contains(RenderFlags::CULL_BACK_FACES));
        assert!(scene.render_flags().contains(RenderFlags::GPU_SKINNING));
        assert!(!scene.render_flags().contains(RenderFlags::TRANSPARENT));
        assert_eq!(scene.data().light_count, 0);
        assert!(scene.is_dirty(DirtyFlags::SCENE_ENTITIES));
    }

    #[test]
    fn light_records_follow_insertion_order() {
        let lights: Vec<_> = (0..3).map(|i| light_at(i as f32)).collect();
        let mut scene = Scene::new();
        for light in &lights {
            scene.add_light(light).unwrap();
        }

        let mut xs = Vec::new();
        scene.each_light(|l| xs.push(l.position.x));
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);

        assert!(scene.remove_light(&lights[1]));
        let mut xs = Vec::new();
        scene.each_light(|l| xs.push(l.position.x));
        assert_eq!(xs, vec![0.0, 2.0]);
        assert_eq!(scene.data().light_count, 2);
        assert_eq!(scene.data().lights[2], LightData::default());
    }

    #[test]
    fn duplicate_light_is_ignored() {
        let light = light_at(1.0);
        let mut scene = Scene::new();
        scene.add_light(&light).unwrap();
        scene.add_light(&light).unwrap();
        assert_eq!(scene.light_count(), 1);
        assert_eq!(light.internal_count(), 1);
    }

    #[test]
    fn capacity_is_enforced() {
        let lights: Vec<_> = (0..=MAX_LIGHTS).map(|i| light_at(i as f32)).collect();
        let mut scene = Scene::new();
        for light in &lights[..MAX_LIGHTS] {
            scene.add_light(light).unwrap();
        }

        let err = scene.add_light(&lights[MAX_LIGHTS]).unwrap_err();
        assert_eq!(err, LptError::LightCapacityExceeded { capacity: MAX_LIGHTS });
        assert_eq!(scene.light_count(), MAX_LIGHTS);
        assert_eq!(scene.data().light_count as usize, MAX_LIGHTS);
        assert_eq!(lights[MAX_LIGHTS].internal_count(), 0);
    }

    #[test]
    fn membership_marks_dirty_and_clear_releases() {
        let instance = ExternalRef::acquire(&Shared::new(MeshInstance::default()));
        let camera = ExternalRef::acquire(&Shared::new(Camera::new()));
        let mut scene = Scene::new();
        scene.clear_dirty();

        assert!(scene.add_mesh(&instance));
        assert!(!scene.add_mesh(&instance));
        assert!(scene.is_dirty(DirtyFlags::INSTANCE));

        scene.set_camera(Some(&camera));
        assert!(scene.is_dirty(DirtyFlags::CAMERA));
        assert_eq!(camera.internal_count(), 1);

        scene.clear();
        assert!(scene.mesh_instances().is_empty());
        assert!(scene.camera().is_none());
        assert_eq!(instance.internal_count(), 0);
        assert_eq!(camera.internal_count(), 0);
    }

    #[test]
    fn render_parameters_mark_only_scene_params() {
        let mut scene = Scene::new();
        scene.clear_dirty();

        scene.set_render_flags(RenderFlags::ANTIALIASING);
        scene.set_shadow_params(0.01, 0.1);

        assert_eq!(scene.dirty_flags(), DirtyFlags::SCENE_PARAMS);
        assert!(!scene.is_dirty(DirtyFlags::SCENE_ENTITIES));
    }

    #[test]
    fn destroyed_members_are_rejected() {
        let light = light_at(0.0);
        let instance = ExternalRef::acquire(&Shared::new(MeshInstance::default()));
        let mut first = Scene::new();
        first.add_light(&light).unwrap();
        first.add_mesh(&instance);
        first.remove_light(&light);
        first.remove_mesh(&instance);
        assert!(light.is_destroyed());
        assert!(instance.is_destroyed());

        let mut second = Scene::new();
        second.clear_dirty();
        assert_eq!(second.add_light(&light), Err(LptError::EntityDestroyed));
        assert!(!second.add_mesh(&instance));
        assert_eq!(second.light_count(), 0);
        assert!(second.mesh_instances().is_empty());
        assert_eq!(light.internal_count(), 0);
        assert!(!second.is_dirty(DirtyFlags::ANY));
    }

    #[test]
    fn update_data_detects_member_edits() {
        let light = light_at(0.0);
        let mut scene = Scene::new();
        scene.add_light(&light).unwrap();

        assert!(!scene.update_data());

        light.write().set_color(Vec3::X);
        assert!(scene.update_data());
        assert_eq!(scene.data().lights[0].color, Vec3::X);

        // Same value written back: dirty on the light, but the snapshot is unchanged.
        light.write().set_color(Vec3::X);
        assert!(!scene.update_data());
    }
}
