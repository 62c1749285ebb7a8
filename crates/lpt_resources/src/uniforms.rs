//! GPU-layout records
//!
//! These structs are uploaded to GPU buffers byte for byte. Every record is
//! `#[repr(C)]`, `Pod`, padded to 16-byte multiples, and compares by raw
//! bytes: two snapshots are equal iff every byte matches. That is stricter
//! than float equality (distinct NaN payloads differ, `0.0 != -0.0`) and is
//! meant for change detection only.

use glam::{Mat4, Quat, Vec3};

use lpt_core::MAX_LIGHTS;

macro_rules! define_gpu_record {
    (
        $(#[$meta:meta])* struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $vis:vis $field_name:ident : $field_type:ty $(= $default_val:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
        pub struct $name {
            $( $(#[$field_meta])* $vis $field_name : $field_type, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field_name: define_gpu_record!(@val_or_default $field_type $(, $default_val)?), )*
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
            }
        }

        impl Eq for $name {}

        impl $name {
            /// Raw bytes as uploaded to the GPU.
            #[inline]
            #[must_use]
            pub fn as_bytes(&self) -> &[u8] {
                bytemuck::bytes_of(self)
            }
        }
    };
    (@val_or_default $type:ty, $val:expr) => { $val };
    (@val_or_default $type:ty) => { <$type as Default>::default() };
}

define_gpu_record!(
    struct CameraData {
        pub view: Mat4 = Mat4::IDENTITY,           // 64
        pub proj: Mat4 = Mat4::IDENTITY,           // 64
        pub position: Vec3 = Vec3::ZERO,           // 12
        pub(crate) pad0: f32,                      // 4
        pub rotation: Quat = Quat::IDENTITY,       // 16

        pub near_plane: f32 = 0.01,
        pub far_plane: f32 = 100.0,
        /// Vertical field of view in degrees.
        pub fov: f32 = 60.0,
        pub(crate) pad1: f32,
    }
);

define_gpu_record!(
    struct LightData {
        /// `LightType` as its `u32` discriminant.
        pub light_type: u32,
        pub(crate) pad1: [u32; 3],

        pub position: Vec3,
        pub range: f32 = 10.0,
        pub direction: Vec3 = Vec3::NEG_Y,
        /// Radians.
        pub spot_angle: f32 = 30.0_f32.to_radians(),
        pub color: Vec3 = Vec3::ONE,
        pub(crate) pad2: f32,
    }
);

define_gpu_record!(
    struct MaterialData {
        pub diffuse: Vec3 = Vec3::splat(0.8),
        pub roughness: f32 = 0.5,
        pub emissive: Vec3 = Vec3::ZERO,
        pub opacity: f32 = 1.0,

        /// GPU texture slot, `-1` when unbound.
        pub diffuse_tex: i32 = -1,
        /// GPU texture slot, `-1` when unbound.
        pub emissive_tex: i32 = -1,
        pub(crate) pad_tex: [i32; 2],
    }
);

define_gpu_record!(
    struct InstanceData {
        pub local_to_world: Mat4 = Mat4::IDENTITY,
        pub world_to_local: Mat4 = Mat4::IDENTITY,
        pub mesh_index: u32,
        pub material_index: u32,
        /// Combination of `InstanceFlags`.
        pub instance_flags: u32 = lpt_core::InstanceFlags::DEFAULT.bits(),
        pub layer_mask: u32 = u32::MAX,
    }
);

define_gpu_record!(
    struct SceneData {
        /// Combination of `RenderFlags`.
        pub render_flags: u32,
        pub light_count: u32,
        pub shadow_ray_offset: f32 = 0.0001,
        pub self_shadow_threshold: f32 = 0.001,

        pub camera: CameraData,
        pub lights: [LightData; MAX_LIGHTS] = [LightData::default(); MAX_LIGHTS],
    }
);

const _: () = assert!(size_of::<CameraData>() == 176);
const _: () = assert!(size_of::<LightData>() == 64);
const _: () = assert!(size_of::<MaterialData>() == 48);
const _: () = assert!(size_of::<InstanceData>() == 144);
const _: () = assert!(size_of::<SceneData>() == 16 + 176 + 64 * MAX_LIGHTS);

impl SceneData {
    /// Active light records, `lights[..light_count]`.
    #[must_use]
    pub fn active_lights(&self) -> &[LightData] {
        let count = self.light_count as usize;
        debug_assert!(count <= MAX_LIGHTS, "light_count {count} exceeds capacity");
        &self.lights[..count.min(MAX_LIGHTS)]
    }

    /// Calls `body` for each active light record in insertion order.
    pub fn each_light(&self, mut body: impl FnMut(&LightData)) {
        for light in self.active_lights() {
            body(light);
        }
    }
}
