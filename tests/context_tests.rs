//! Context Tests
//!
//! Tests for:
//! - Factory handles and context-held internal references
//! - Frame-begin reclamation of entities nobody uses
//! - Cascading release from scenes down to textures
//! - Slot packing and propagation into material / instance records
//! - Instance deformation arrays following later mesh edits
//! - Shared global settings

use std::sync::Arc;

use lpt::prelude::*;
use lpt::{DebugFlags, GlobalSettings};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds scene -> instance -> (mesh, material -> texture) and returns only the scene.
fn populated(ctx: &mut Context) -> ExternalRef<Scene> {
    let texture = ctx.create_texture(TextureFormat::RGBAu8, 2, 2);
    let material = ctx.create_material();
    material.write().set_diffuse_texture(Some(&texture));

    let mesh = ctx.create_mesh();
    mesh.write().set_points(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
    let instance = ctx.create_mesh_instance(Some(&mesh));
    instance.write().set_material(Some(&material));

    let light = ctx.create_light();
    let camera = ctx.create_camera();
    let target = ctx.create_render_target(TextureFormat::RGBAf32, 64, 64);

    let scene = ctx.create_scene();
    {
        let mut s = scene.write();
        s.set_camera(Some(&camera));
        s.set_render_target(Some(&target));
        s.add_light(&light).unwrap();
        s.add_mesh(&instance);
    }
    scene
}

// ============================================================================
// Reclamation
// ============================================================================

#[test]
fn scene_keeps_its_members_alive() {
    init_logger();
    let mut ctx = Context::default();
    let scene = populated(&mut ctx);

    let stats = ctx.frame_begin();
    assert_eq!(stats.released, 0);
    assert_eq!(stats.live, 8);
    assert_eq!(ctx.live_counts().total(), 8);
    assert_eq!(ctx.scenes().count(), 1);

    let s = scene.read();
    let instance = &s.mesh_instances()[0];
    assert_eq!(instance.external_count(), 0);
    assert!(!instance.is_destroyed());
}

#[test]
fn dropping_scene_cascades_in_one_frame() {
    init_logger();
    let mut ctx = Context::default();
    let scene = populated(&mut ctx);
    let instance = Arc::downgrade(scene.read().mesh_instances()[0].shared());
    drop(scene);

    let stats = ctx.frame_begin();
    assert_eq!(stats.released, 8);
    assert_eq!(stats.live, 0);
    assert_eq!(ctx.live_counts(), lpt::EntityCounts::default());
    assert!(instance.upgrade().is_none());
}

#[test]
fn client_handle_blocks_reclamation() {
    let mut ctx = Context::default();
    let mesh = ctx.create_mesh();
    let instance = ctx.create_mesh_instance(Some(&mesh));
    drop(instance);

    assert_eq!(ctx.frame_begin().released, 1);
    assert_eq!(ctx.live_counts().meshes, 1);
    assert_eq!(mesh.internal_count(), 1);
}

// ============================================================================
// Slots
// ============================================================================

#[test]
fn instance_indices_follow_packing() {
    let mut ctx = Context::default();
    let scratch = ctx.create_mesh();
    let mesh = ctx.create_mesh();
    let old_material = ctx.create_material();
    let material = ctx.create_material();
    let instance = ctx.create_mesh_instance(Some(&mesh));
    instance.write().clear_dirty();
    instance.write().set_material(Some(&material));
    assert!(instance.read().is_dirty(DirtyFlags::INSTANCE));
    assert_eq!(instance.read().data().mesh_index, 1);
    assert_eq!(instance.read().data().material_index, 1);

    drop(scratch);
    drop(old_material);
    instance.write().clear_dirty();
    ctx.frame_begin();

    let data = *instance.read().data();
    assert_eq!(data.mesh_index, 0);
    assert_eq!(data.material_index, 0);
    assert!(instance.read().is_dirty(DirtyFlags::INSTANCE));
}

#[test]
fn stable_slots_leave_records_clean() {
    let mut ctx = Context::default();
    let texture = ctx.create_texture(TextureFormat::Ru8, 1, 1);
    let material = ctx.create_material();
    material.write().set_emissive_texture(Some(&texture));
    material.write().clear_dirty();

    ctx.frame_begin();
    assert!(!material.read().is_dirty(DirtyFlags::ANY));
    assert_eq!(material.read().data().emissive_tex, 0);
}

#[test]
fn skinning_added_after_instancing() {
    let mut ctx = Context::default();
    let mesh = ctx.create_mesh();
    let instance = ctx.create_mesh_instance(Some(&mesh));
    assert!(instance.read().joint_matrices().is_empty());

    {
        let mut m = mesh.write();
        m.set_joint_bindposes(&[Mat4::IDENTITY; 3]);
        let shape = m.add_blendshape("blink");
        assert_eq!(shape, 0);
    }
    instance.write().clear_dirty();
    ctx.frame_begin();

    {
        let i = instance.read();
        assert_eq!(i.joint_matrices(), &[Mat4::IDENTITY; 3]);
        assert_eq!(i.blendshape_weights(), &[0.0]);
        assert!(i.is_dirty(DirtyFlags::JOINTS | DirtyFlags::BLENDSHAPE));
    }

    let pose = Mat4::from_translation(Vec3::Y);
    instance.write().set_joint_matrices(&[pose, Mat4::IDENTITY, pose]);
    instance.write().set_blendshape_weights(&[1.0]);
    ctx.frame_begin();
    assert_eq!(instance.read().joint_matrices()[2], pose);
}

// ============================================================================
// Scene refresh & settings
// ============================================================================

#[test]
fn frame_begin_refreshes_scene_records() {
    let mut ctx = Context::default();
    let scene = populated(&mut ctx);
    ctx.frame_begin();

    let light = scene.read().lights()[0].clone();
    light.write().set_color(Vec3::new(1.0, 0.0, 0.0));

    let stats = ctx.frame_begin();
    assert_eq!(stats.scenes_changed, 1);
    assert_eq!(scene.read().data().lights[0].color, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(ctx.frame_begin().scenes_changed, 0);
    assert_eq!(ctx.frame_count(), 3);
}

#[test]
fn settings_are_shared_with_the_backend() {
    let ctx = Context::new(ContextSettings {
        debug_flags: DebugFlags::TIMESTAMP,
        ..Default::default()
    });
    let backend: Arc<GlobalSettings> = Arc::clone(ctx.settings());

    assert!(backend.has_debug_flag(DebugFlags::TIMESTAMP));
    ctx.settings().enable_debug_flag(DebugFlags::POWER_STABLE_STATE);
    assert!(backend.has_debug_flag(DebugFlags::POWER_STABLE_STATE));

    drop(ctx);
    backend.disable_debug_flag(DebugFlags::TIMESTAMP);
    assert!(!backend.has_debug_flag(DebugFlags::TIMESTAMP));
}
