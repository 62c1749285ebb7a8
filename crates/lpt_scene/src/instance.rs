//! Mesh Instance
//!
//! One placement of a shared [`Mesh`] with a shared [`Material`]. The instance
//! owns everything that differs per placement: the world transform, joint
//! matrices for skinning, blend-shape weights and the visibility flags.

use glam::Mat4;

use lpt_core::{DirtyFlags, Entity, EntityBase, EntityHandle, InstanceFlags, InternalRef};
use lpt_resources::{InstanceData, Material, Mesh};

#[derive(Debug)]
pub struct MeshInstance {
    base: EntityBase,
    data: InstanceData,
    mesh: Option<InternalRef<Mesh>>,
    material: Option<InternalRef<Material>>,

    joint_matrices: Vec<Mat4>,
    blendshape_weights: Vec<f32>,
}

impl Default for MeshInstance {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MeshInstance {
    /// Creates an instance, optionally bound to `mesh` right away.
    #[must_use]
    pub fn new(mesh: Option<&dyn EntityHandle<Mesh>>) -> Self {
        let mut instance = Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            data: InstanceData::default(),
            mesh: None,
            material: None,
            joint_matrices: Vec::new(),
            blendshape_weights: Vec::new(),
        };
        if mesh.is_some() {
            instance.set_mesh(mesh);
        }
        instance
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &InstanceData {
        &self.data
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&InternalRef<Mesh>> {
        self.mesh.as_ref()
    }

    #[must_use]
    pub fn material(&self) -> Option<&InternalRef<Material>> {
        self.material.as_ref()
    }

    // === Bindings ===

    /// Binds `mesh` and resizes the per-instance deformation arrays to it:
    /// identity joint matrices and zero blend-shape weights.
    pub fn set_mesh(&mut self, mesh: Option<&dyn EntityHandle<Mesh>>) {
        self.mesh = mesh.map(InternalRef::acquire);

        let (joints, shapes, slot) = self.mesh.as_ref().map_or((0, 0, 0), |m| {
            let m = m.read();
            (m.joint_count(), m.blendshape_count(), m.index())
        });
        self.joint_matrices = vec![Mat4::IDENTITY; joints];
        self.blendshape_weights = vec![0.0; shapes];
        self.data.mesh_index = slot;

        self.mark_dirty(DirtyFlags::MESH | DirtyFlags::DEFORM);
    }

    pub fn set_material(&mut self, material: Option<&dyn EntityHandle<Material>>) {
        self.material = material.map(InternalRef::acquire);
        self.data.material_index = self.material.as_ref().map_or(0, |m| m.read().index());
        self.mark_dirty(DirtyFlags::MATERIAL | DirtyFlags::INSTANCE);
    }

    /// Re-reads the bound mesh and material: their GPU slots and the mesh's
    /// current joint and blend-shape counts. Slot moves mark `INSTANCE`; a
    /// resized joint or weight array marks `JOINTS` or `BLENDSHAPE`. Existing
    /// entries are kept, new ones start at identity / zero.
    pub fn refresh_bindings(&mut self) -> bool {
        let (mesh_index, joints, shapes) = self.mesh.as_ref().map_or((0, 0, 0), |m| {
            let m = m.read();
            (m.index(), m.joint_count(), m.blendshape_count())
        });
        let material_index = self.material.as_ref().map_or(0, |m| m.read().index());

        let mut changed = DirtyFlags::empty();
        if mesh_index != self.data.mesh_index || material_index != self.data.material_index {
            self.data.mesh_index = mesh_index;
            self.data.material_index = material_index;
            changed |= DirtyFlags::INSTANCE;
        }
        if self.mesh.is_some() && self.joint_matrices.len() != joints {
            self.joint_matrices.resize(joints, Mat4::IDENTITY);
            changed |= DirtyFlags::JOINTS;
        }
        if self.mesh.is_some() && self.blendshape_weights.len() != shapes {
            self.blendshape_weights.resize(shapes, 0.0);
            changed |= DirtyFlags::BLENDSHAPE;
        }

        if changed.is_empty() {
            return false;
        }
        self.mark_dirty(changed);
        true
    }

    // === Placement ===

    /// Sets the local-to-world matrix; the inverse is kept alongside it.
    pub fn set_transform(&mut self, local_to_world: Mat4) {
        self.data.local_to_world = local_to_world;
        self.data.world_to_local = local_to_world.inverse();
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.data.local_to_world
    }

    // === Deformation ===

    /// One matrix per joint of the bound mesh.
    pub fn set_joint_matrices(&mut self, matrices: &[Mat4]) {
        if let Some(mesh) = &self.mesh {
            let expected = mesh.read().joint_count();
            debug_assert!(
                matrices.len() == expected,
                "expected {expected} joint matrices, got {}",
                matrices.len()
            );
        }
        self.joint_matrices.clear();
        self.joint_matrices.extend_from_slice(matrices);
        self.mark_dirty(DirtyFlags::JOINTS);
    }

    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// One weight per blend shape of the bound mesh.
    pub fn set_blendshape_weights(&mut self, weights: &[f32]) {
        if let Some(mesh) = &self.mesh {
            let expected = mesh.read().blendshape_count();
            debug_assert!(
                weights.len() == expected,
                "expected {expected} blend shape weights, got {}",
                weights.len()
            );
        }
        self.blendshape_weights.clear();
        self.blendshape_weights.extend_from_slice(weights);
        self.mark_dirty(DirtyFlags::BLENDSHAPE);
    }

    #[must_use]
    pub fn blendshape_weights(&self) -> &[f32] {
        &self.blendshape_weights
    }

    // === Flags ===

    #[must_use]
    pub fn flags(&self) -> InstanceFlags {
        InstanceFlags::from_bits_retain(self.data.instance_flags)
    }

    #[must_use]
    pub fn has_flag(&self, flag: InstanceFlags) -> bool {
        self.flags().contains(flag)
    }

    pub fn set_flag(&mut self, flag: InstanceFlags, enabled: bool) {
        let mut flags = self.flags();
        flags.set(flag, enabled);
        self.data.instance_flags = flags.bits();
        self.mark_dirty(DirtyFlags::INSTANCE);
    }

    #[must_use]
    pub fn layer_mask(&self) -> u32 {
        self.data.layer_mask
    }

    pub fn set_layer_mask(&mut self, mask: u32) {
        self.data.layer_mask = mask;
        self.mark_dirty(DirtyFlags::INSTANCE);
    }
}

impl Entity for MeshInstance {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::INSTANCE
        .union(DirtyFlags::MESH)
        .union(DirtyFlags::MATERIAL)
        .union(DirtyFlags::DEFORM);

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

    fn skinned_mesh(index: u32) -> ExternalRef<Mesh> {
        let mut mesh = Mesh::new();
        mesh.set_joint_bindposes(&[Mat4::IDENTITY; 3]);
        mesh.add_blendshape("blink");
        mesh.add_blendshape("smile");
        mesh.set_index(index);
        ExternalRef::acquire(&Shared::new(mesh))
    }

    #[test]
    fn default_flags() {
        let instance = MeshInstance::new(None);
        assert!(instance.has_flag(InstanceFlags::RECEIVE_SHADOWS));
        assert!(instance.has_flag(InstanceFlags::CAST_SHADOWS));
        assert!(instance.has_flag(InstanceFlags::CULL_BACK));
        assert!(!instance.has_flag(InstanceFlags::SHADOWS_ONLY));
        assert_eq!(instance.layer_mask(), u32::MAX);
    }

    #[test]
    fn binding_mesh_sizes_deformation_arrays() {
        let mesh = skinned_mesh(5);
        let instance = MeshInstance::new(Some(&mesh));

        assert_eq!(instance.joint_matrices(), &[Mat4::IDENTITY; 3]);
        assert_eq!(instance.blendshape_weights(), &[0.0, 0.0]);
        assert_eq!(instance.data().mesh_index, 5);
        assert_eq!(mesh.internal_count(), 1);
    }

    #[test]
    fn transform_keeps_inverse() {
        let mut instance = MeshInstance::default();
        instance.clear_dirty();

        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        instance.set_transform(m);

        assert!(instance.is_dirty(DirtyFlags::TRANSFORM));
        assert!(instance.is_dirty(DirtyFlags::DEFORM));
        let round = instance.data().local_to_world * instance.data().world_to_local;
        assert!(round.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn flag_toggle_marks_instance() {
        let mut instance = MeshInstance::default();
        instance.clear_dirty();

        instance.set_flag(InstanceFlags::SHADOWS_ONLY, true);
        instance.set_flag(InstanceFlags::CAST_SHADOWS, false);

        assert!(instance.is_dirty(DirtyFlags::INSTANCE));
        assert!(instance.has_flag(InstanceFlags::SHADOWS_ONLY));
        assert!(!instance.has_flag(InstanceFlags::CAST_SHADOWS));
        assert_eq!(instance.data().instance_flags, instance.flags().bits());
    }

    #[test]
    fn deformation_setters_mark_their_bits() {
        let mesh = skinned_mesh(0);
        let mut instance = MeshInstance::new(Some(&mesh));
        instance.clear_dirty();

        instance.set_joint_matrices(&[Mat4::IDENTITY, Mat4::ZERO, Mat4::IDENTITY]);
        assert!(instance.is_dirty(DirtyFlags::JOINTS));
        assert!(!instance.is_dirty(DirtyFlags::BLENDSHAPE));

        instance.set_blendshape_weights(&[0.25, 1.0]);
        assert!(instance.is_dirty(DirtyFlags::BLENDSHAPE));
        assert_eq!(instance.blendshape_weights(), &[0.25, 1.0]);
    }

    #[test]
    fn index_refresh_follows_bound_entities() {
        let mesh = skinned_mesh(1);
        let material = ExternalRef::acquire(&Shared::new(Material::new()));
        let mut instance = MeshInstance::new(Some(&mesh));
        instance.set_material(Some(&material));
        instance.clear_dirty();

        assert!(!instance.refresh_bindings());

        material.write().set_index(9);
        assert!(instance.refresh_bindings());
        assert_eq!(instance.data().material_index, 9);
        assert_eq!(instance.data().mesh_index, 1);
        assert!(instance.is_dirty(DirtyFlags::INSTANCE));
    }

    #[test]
    fn material_swap_marks_instance_record() {
        let material = ExternalRef::acquire(&Shared::new(Material::new()));
        material.write().set_index(4);
        let mut instance = MeshInstance::default();
        instance.clear_dirty();

        instance.set_material(Some(&material));
        assert_eq!(instance.data().material_index, 4);
        assert!(instance.is_dirty(DirtyFlags::MATERIAL));
        assert!(instance.is_dirty(DirtyFlags::INSTANCE));
    }

    #[test]
    fn mesh_edits_after_binding_resize_deformation() {
        let mesh = ExternalRef::acquire(&Shared::new(Mesh::new()));
        let mut instance = MeshInstance::new(Some(&mesh));
        assert!(instance.joint_matrices().is_empty());
        instance.clear_dirty();

        {
            let mut m = mesh.write();
            m.set_joint_bindposes(&[Mat4::IDENTITY; 3]);
            m.add_blendshape("blink");
        }
        // Counts are read live from the mesh, before any refresh.
        instance.set_joint_matrices(&[Mat4::IDENTITY; 3]);
        instance.set_blendshape_weights(&[0.5]);
        instance.clear_dirty();
        assert!(!instance.refresh_bindings());

        mesh.write().set_joint_bindposes(&[Mat4::IDENTITY; 5]);
        assert!(instance.refresh_bindings());
        assert_eq!(instance.joint_matrices().len(), 5);
        assert_eq!(instance.joint_matrices()[4], Mat4::IDENTITY);
        assert_eq!(instance.blendshape_weights(), &[0.5]);
        assert!(instance.is_dirty(DirtyFlags::JOINTS));
        assert!(!instance.is_dirty(DirtyFlags::BLENDSHAPE | DirtyFlags::INSTANCE));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "expected 3 joint matrices")]
    fn joint_count_mismatch_asserts() {
        let mesh = skinned_mesh(0);
        let mut instance = MeshInstance::new(Some(&mesh));
        instance.set_joint_matrices(&[Mat4::IDENTITY; 2]);
    }
}
