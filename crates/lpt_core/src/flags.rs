//! Bit-flag sets shared by entities and the backend.
//!
//! Composite constants (`VERTICES`, `DEFORM`, ...) are plain unions of the
//! finer bits, so a consumer can test at whatever granularity it needs:
//!
//! ```rust
//! use lpt_core::DirtyFlags;
//!
//! let marked = DirtyFlags::POINTS;
//! assert!(marked.intersects(DirtyFlags::VERTICES));
//! assert!(!marked.intersects(DirtyFlags::NORMALS));
//! ```

use bitflags::bitflags;

bitflags! {
    /// Categories of state change not yet reflected in GPU-resident data.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u32 {
        const TRANSFORM     = 0x0000_0001;
        const BLENDSHAPE    = 0x0000_0002;
        const JOINTS        = 0x0000_0004;

        const INDICES       = 0x0000_0010;
        const POINTS        = 0x0000_0020;
        const NORMALS       = 0x0000_0040;
        const TANGENTS      = 0x0000_0080;
        const UV            = 0x0000_0100;

        /// Scene-wide render parameters (render flags, shadow offsets).
        const SCENE_PARAMS  = 0x0080_0000;

        const CAMERA        = 0x0100_0000;
        const LIGHT         = 0x0200_0000;
        const RENDER_TARGET = 0x0400_0000;
        const TEXTURE       = 0x0800_0000;
        const TEXTURE_DATA  = 0x1000_0000;
        const MATERIAL      = 0x2000_0000;
        const MESH          = 0x4000_0000;
        const INSTANCE      = 0x8000_0000;

        /// Anything that moves vertices without changing topology.
        const DEFORM = Self::TRANSFORM.bits() | Self::BLENDSHAPE.bits() | Self::JOINTS.bits();
        /// Changes that invalidate acceleration-structure topology.
        const SHAPE = Self::INDICES.bits() | Self::POINTS.bits();
        /// Every per-vertex attribute plus the index list.
        const VERTICES = Self::INDICES.bits()
            | Self::POINTS.bits()
            | Self::NORMALS.bits()
            | Self::TANGENTS.bits()
            | Self::UV.bits();
        /// Membership changes of a scene.
        const SCENE_ENTITIES = Self::CAMERA.bits()
            | Self::LIGHT.bits()
            | Self::RENDER_TARGET.bits()
            | Self::INSTANCE.bits();
        const ANY = 0xFFFF_FFFF;
    }
}

bitflags! {
    /// Per-scene render switches, copied verbatim into `SceneData::render_flags`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct RenderFlags: u32 {
        const CULL_BACK_FACES          = 0x0000_0001;
        const FLIP_CASTER_FACES        = 0x0000_0002;
        const IGNORE_SELF_SHADOW       = 0x0000_0004;
        const KEEP_SELF_DROP_SHADOW    = 0x0000_0008;
        const ALPHA_TEST               = 0x0000_0010;
        const TRANSPARENT              = 0x0000_0020;
        const ADAPTIVE_SAMPLING        = 0x0000_0100;
        const ANTIALIASING             = 0x0000_0200;
        const GPU_SKINNING             = 0x0001_0000;
        const CLAMP_BLENDSHAPE_WEIGHTS = 0x0002_0000;
    }
}

bitflags! {
    /// Per-instance shadowing and culling switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InstanceFlags: u32 {
        const RECEIVE_SHADOWS   = 0x01;
        const SHADOWS_ONLY      = 0x02;
        const CAST_SHADOWS      = 0x04;
        const CULL_FRONT        = 0x10;
        const CULL_BACK         = 0x20;
        const CULL_FRONT_SHADOW = 0x40;
        const CULL_BACK_SHADOW  = 0x80;

        const DEFAULT = Self::RECEIVE_SHADOWS.bits() | Self::CAST_SHADOWS.bits() | Self::CULL_BACK.bits();
    }
}

impl Default for InstanceFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

bitflags! {
    /// Diagnostic toggles read by the backend.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DebugFlags: u32 {
        const TIMESTAMP          = 0x01;
        const FORCE_UPDATE_AS    = 0x02;
        const POWER_STABLE_STATE = 0x04;
    }
}

bitflags! {
    /// General process-wide switches. No bits are assigned yet.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct GlobalFlags: u32 {}
}
