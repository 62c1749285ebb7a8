//! Entity types of the LPT scene graph and the GPU-layout records they own.
//!
//! Each entity writes its setters straight into its record, so the record is
//! always current; the dirty mask tells the backend which records to re-upload.

pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod render_target;
pub mod texture;
pub mod uniforms;

pub use camera::Camera;
pub use light::{Light, LightType};
pub use material::Material;
pub use mesh::{Blendshape, BlendshapeFrame, JointWeight, Mesh};
pub use render_target::RenderTarget;
pub use texture::Texture;
pub use uniforms::{CameraData, InstanceData, LightData, MaterialData, SceneData};
