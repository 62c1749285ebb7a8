//! # LPT
//!
//! Entity and scene-graph layer of a real-time ray tracer.
//!
//! - [`lpt_core`]: dual reference counting, dirty flags, flag sets, settings
//! - [`resources`]: GPU-layout records and the leaf entities
//! - [`scene`]: mesh instances, scenes and the owning [`Context`]
//!
//! # Example
//!
//! ```rust
//! use lpt::prelude::*;
//!
//! let mut ctx = Context::new(ContextSettings::default());
//! let scene = ctx.create_scene();
//! let camera = ctx.create_camera();
//! let light = ctx.create_light();
//!
//! camera.write().set_position(Vec3::new(0.0, 1.0, 5.0));
//! scene.write().set_camera(Some(&camera));
//! scene.write().add_light(&light).unwrap();
//!
//! let stats = ctx.frame_begin();
//! assert_eq!(stats.live, 3);
//! assert_eq!(scene.read().data().light_count, 1);
//! ```

pub use lpt_core;
pub use lpt_resources as resources;
pub use lpt_scene as scene;

pub use lpt_core::{
    ContextSettings, DebugFlags, DirtyFlags, Entity, EntityHandle, ExternalRef, GlobalFlags,
    GlobalSettings, InstanceFlags, InternalRef, LptError, MAX_LIGHTS, RenderFlags, Result, Shared,
    TextureFormat, texel_size,
};
pub use lpt_resources::{
    Camera, CameraData, InstanceData, JointWeight, Light, LightData, LightType, Material,
    MaterialData, Mesh, RenderTarget, SceneData, Texture,
};
pub use lpt_scene::{Context, EntityCounts, FrameStats, MeshInstance, Scene};

pub mod prelude {
    pub use crate::{
        Camera, Context, ContextSettings, DirtyFlags, Entity, EntityHandle, ExternalRef,
        InstanceFlags, InternalRef, Light, LightType, Material, Mesh, MeshInstance, RenderFlags,
        RenderTarget, Scene, TextureFormat, Texture,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3};
}
