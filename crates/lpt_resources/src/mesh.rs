//! Mesh
//!
//! Authoring-time geometry shared by any number of mesh instances. Editing a
//! mesh is visible to every instance on its next read; there is no
//! copy-on-write.
//!
//! Each setter replaces one array and raises the matching fine-grained dirty
//! bit, so the backend can test either a single attribute or the whole
//! [`DirtyFlags::VERTICES`] group:
//!
//! | Setter                   | Dirty bit     |
//! |--------------------------|---------------|
//! | `set_indices`            | `INDICES`     |
//! | `set_points`             | `POINTS`      |
//! | `set_normals`            | `NORMALS`     |
//! | `set_tangents`           | `TANGENTS`    |
//! | `set_uv`                 | `UV`          |
//! | `set_joint_*`            | `JOINTS`      |
//! | `add_blendshape*`        | `BLENDSHAPE`  |
//! | `mark_dynamic`           | `MESH`        |

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use lpt_core::{DirtyFlags, Entity, EntityBase};

/// One joint influence of a skinned vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct JointWeight {
    pub weight: f32,
    pub index: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlendshapeFrame {
    /// Per-vertex displacement; zero for untouched vertices.
    pub delta: Vec<Vec3>,
    /// Weight at which this frame is fully applied.
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Blendshape {
    pub name: String,
    pub frames: Vec<BlendshapeFrame>,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    base: EntityBase,

    indices: Vec<i32>,
    points: Vec<Vec3>,
    normals: Vec<Vec3>,
    tangents: Vec<Vec3>,
    uv: Vec<Vec2>,

    joint_bindposes: Vec<Mat4>,
    joint_counts: Vec<u8>,
    joint_weights: Vec<JointWeight>,

    blendshapes: Vec<Blendshape>,

    dynamic: bool,
    /// GPU slot assigned by the backend.
    index: u32,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Empty mesh; geometry is supplied through the setters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            indices: Vec::new(),
            points: Vec::new(),
            normals: Vec::new(),
            tangents: Vec::new(),
            uv: Vec::new(),
            joint_bindposes: Vec::new(),
            joint_counts: Vec::new(),
            joint_weights: Vec::new(),
            blendshapes: Vec::new(),
            dynamic: false,
            index: 0,
        }
    }

    // === Geometry ===

    pub fn set_indices(&mut self, indices: &[i32]) {
        replace(&mut self.indices, indices);
        self.mark_dirty(DirtyFlags::INDICES);
    }

    pub fn set_points(&mut self, points: &[Vec3]) {
        replace(&mut self.points, points);
        self.mark_dirty(DirtyFlags::POINTS);
    }

    pub fn set_normals(&mut self, normals: &[Vec3]) {
        replace(&mut self.normals, normals);
        self.mark_dirty(DirtyFlags::NORMALS);
    }

    pub fn set_tangents(&mut self, tangents: &[Vec3]) {
        replace(&mut self.tangents, tangents);
        self.mark_dirty(DirtyFlags::TANGENTS);
    }

    pub fn set_uv(&mut self, uv: &[Vec2]) {
        replace(&mut self.uv, uv);
        self.mark_dirty(DirtyFlags::UV);
    }

    #[must_use]
    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[must_use]
    pub fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    #[must_use]
    pub fn uv(&self) -> &[Vec2] {
        &self.uv
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    // === Skinning ===

    pub fn set_joint_bindposes(&mut self, bindposes: &[Mat4]) {
        replace(&mut self.joint_bindposes, bindposes);
        self.mark_dirty(DirtyFlags::JOINTS);
    }

    /// Flat list of influences; vertex `i` owns the next `joint_counts[i]` entries.
    pub fn set_joint_weights(&mut self, weights: &[JointWeight]) {
        replace(&mut self.joint_weights, weights);
        self.mark_dirty(DirtyFlags::JOINTS);
    }

    /// Number of influences per vertex.
    pub fn set_joint_counts(&mut self, counts: &[u8]) {
        replace(&mut self.joint_counts, counts);
        self.mark_dirty(DirtyFlags::JOINTS);
    }

    #[must_use]
    pub fn joint_bindposes(&self) -> &[Mat4] {
        &self.joint_bindposes
    }

    #[must_use]
    pub fn joint_weights(&self) -> &[JointWeight] {
        &self.joint_weights
    }

    #[must_use]
    pub fn joint_counts(&self) -> &[u8] {
        &self.joint_counts
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joint_bindposes.len()
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.joint_bindposes.is_empty() && !self.joint_weights.is_empty()
    }

    /// `true` when the per-vertex counts add up to the weight list and every
    /// weight references an existing bind pose.
    #[must_use]
    pub fn skinning_consistent(&self) -> bool {
        let total: usize = self.joint_counts.iter().map(|&c| usize::from(c)).sum();
        let joints = self.joint_bindposes.len();
        total == self.joint_weights.len()
            && self
                .joint_weights
                .iter()
                .all(|w| usize::try_from(w.index).is_ok_and(|i| i < joints))
    }

    // === Blend shapes ===

    /// Adds an empty blend shape and returns its index.
    pub fn add_blendshape(&mut self, name: &str) -> usize {
        self.blendshapes.push(Blendshape {
            name: name.to_string(),
            frames: Vec::new(),
        });
        self.mark_dirty(DirtyFlags::BLENDSHAPE);
        self.blendshapes.len() - 1
    }

    /// Appends a frame to blend shape `shape`. `delta` is indexed by vertex.
    ///
    /// An out-of-range `shape` is a caller error and is ignored.
    pub fn add_blendshape_frame(&mut self, shape: usize, delta: &[Vec3], weight: f32) {
        debug_assert!(
            self.points.is_empty() || delta.len() == self.points.len(),
            "blend shape delta length {} does not match vertex count {}",
            delta.len(),
            self.points.len()
        );
        let Some(target) = self.blendshapes.get_mut(shape) else {
            log::warn!("Mesh '{}': blend shape {shape} does not exist", self.base.name());
            return;
        };
        target.frames.push(BlendshapeFrame {
            delta: delta.to_vec(),
            weight,
        });
        self.mark_dirty(DirtyFlags::BLENDSHAPE);
    }

    #[must_use]
    pub fn blendshapes(&self) -> &[Blendshape] {
        &self.blendshapes
    }

    #[must_use]
    pub fn blendshape_count(&self) -> usize {
        self.blendshapes.len()
    }

    // === Storage hints ===

    /// Hints the backend to keep this mesh in update-friendly GPU storage.
    pub fn mark_dynamic(&mut self) {
        self.dynamic = true;
        self.mark_dirty(DirtyFlags::MESH);
    }

    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Backend bookkeeping; does not mark the mesh dirty.
    pub fn set_index(&mut self, index: u32) {
        self.index = index;
    }
}

fn replace<T: Copy>(dst: &mut Vec<T>, src: &[T]) {
    dst.clear();
    dst.extend_from_slice(src);
}

impl Entity for Mesh {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::MESH
        .union(DirtyFlags::VERTICES)
        .union(DirtyFlags::JOINTS)
        .union(DirtyFlags::BLENDSHAPE);

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}
