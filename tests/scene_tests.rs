//! Integration tests for the spacecraft scene.
//!
//! Everything runs against `HeadlessBackend`, which records each call the
//! engine makes. Image fixtures are written to temporary directories.
//!
//! ```bash
//! cargo test --test scene_tests
//! ```

mod common;

use common::{write_luma_alpha_png, write_rgb_png, write_rgba_png};
use spacecraft_scene::backend::{BackendCall, HeadlessBackend, UniformValue};
use spacecraft_scene::resources::{MeshKind, TextureError, TextureRegistry};
use spacecraft_scene::{Engine, FrameOutcome, SceneConfig, TextureSource};

// ============================================================================
// Texture Registry
// ============================================================================

/// Two supported images register in order; a two-channel image is rejected
/// without disturbing them.
#[test]
fn test_dome_hull_then_unsupported_image() {
    let dir = tempfile::tempdir().unwrap();
    let dome = write_rgb_png(dir.path(), "dome.png", 8, 8);
    let hull = write_rgba_png(dir.path(), "hull.png", 4, 4);
    let gray = write_luma_alpha_png(dir.path(), "gray.png", 4, 4);

    let mut backend = HeadlessBackend::default();
    let mut registry = TextureRegistry::new();

    assert_eq!(registry.load(&mut backend, &dome, "dome").unwrap(), 0);
    assert_eq!(registry.load(&mut backend, &hull, "hull").unwrap(), 1);
    assert!(matches!(
        registry.load(&mut backend, &gray, "gray"),
        Err(TextureError::UnsupportedChannels(2))
    ));

    assert_eq!(registry.tags(), vec!["dome", "hull"]);
    assert_eq!(registry.slots()[0].channels, 3);
    assert_eq!(registry.slots()[1].channels, 4);
    assert_eq!(backend.live_texture_count(), 2);
    assert_eq!(registry.slot_of("hull"), Some(1));
}

/// Missing and undecodable files are decode errors and leave no slot behind.
#[test]
fn test_unreadable_images_are_decode_errors() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("garbage.png");
    std::fs::write(&garbage, b"not an image").unwrap();

    let mut backend = HeadlessBackend::default();
    let mut registry = TextureRegistry::new();

    assert!(matches!(
        registry.load(&mut backend, dir.path().join("missing.png"), "missing"),
        Err(TextureError::Decode { .. })
    ));
    assert!(matches!(
        registry.load(&mut backend, &garbage, "garbage"),
        Err(TextureError::Decode { .. })
    ));
    assert!(registry.is_empty());
    assert_eq!(backend.live_texture_count(), 0);
}

/// A failed load doesn't register the tag, and the repeated miss after it is
/// not reported a second time.
#[test]
fn test_failed_load_keeps_tag_missing() {
    let dir = tempfile::tempdir().unwrap();
    let gray = write_luma_alpha_png(dir.path(), "gray.png", 4, 4);

    let mut backend = HeadlessBackend::default();
    let mut registry = TextureRegistry::new();

    assert_eq!(registry.slot_of("gray"), None);
    assert_eq!(registry.reported_miss_count(), 1);

    assert!(matches!(
        registry.load(&mut backend, &gray, "gray"),
        Err(TextureError::UnsupportedChannels(2))
    ));

    assert_eq!(registry.slot_of("gray"), None);
    assert_eq!(registry.id_of("gray"), None);
    assert_eq!(registry.reported_miss_count(), 1);
    assert!(registry.is_empty());
}

// ============================================================================
// Engine Frames
// ============================================================================

fn scene_fixture(dir: &std::path::Path) -> SceneConfig {
    write_rgb_png(dir, "dome.png", 8, 8);
    write_rgba_png(dir, "hull.png", 8, 8);
    write_rgb_png(dir, "shuttlebay.png", 8, 8);
    write_rgb_png(dir, "planet.png", 16, 8);

    SceneConfig {
        texture_dir: dir.to_path_buf(),
        textures: vec![
            TextureSource::new("dome.png", "dome"),
            TextureSource::new("hull.png", "hull"),
            TextureSource::new("shuttlebay.png", "shuttlebay"),
            TextureSource::new("planet.png", "planet"),
        ],
        ..Default::default()
    }
}

/// A full frame uploads the camera, then the lights, then each part in order.
#[test]
fn test_frame_renders_whole_scene() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::new(HeadlessBackend::default(), scene_fixture(dir.path()));
    assert_eq!(engine.prepare(), 4);
    engine.backend_mut().clear_calls();

    assert_eq!(engine.frame(1.0 / 60.0), FrameOutcome::Rendered);

    let backend = engine.backend();
    let draws = backend.draws();
    assert_eq!(draws.len(), 16);
    assert_eq!(draws[0], MeshKind::Plane);
    assert_eq!(draws[9], MeshKind::Cone);

    let names: Vec<&str> = backend.uniforms().map(|(name, _)| name).collect();
    assert_eq!(
        &names[..8],
        &[
            "view",
            "projection",
            "viewPosition",
            "primaryLight.position",
            "primaryLight.color",
            "primaryLight.intensity",
            "ambientLight.color",
            "ambientLight.intensity",
        ]
    );

    // The ground plane samples the planet texture in slot 3
    let ground: Vec<(&str, &UniformValue)> = backend.uniforms().skip(8).take(3).collect();
    assert_eq!(ground[0].0, "model");
    assert_eq!(ground[1], ("bUseTexture", &UniformValue::Bool(true)));
    assert_eq!(ground[2], ("objectTexture", &UniformValue::Sampler(3)));
}

/// The shuttlebay floor's tag is never registered; the miss is logged once
/// across frames and the draw still happens.
#[test]
fn test_unregistered_tag_reported_once_across_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::new(HeadlessBackend::default(), scene_fixture(dir.path()));
    engine.prepare();

    for _ in 0..3 {
        assert_eq!(engine.frame(1.0 / 60.0), FrameOutcome::Rendered);
    }

    assert_eq!(engine.textures().reported_miss_count(), 1);
    assert_eq!(engine.backend().draws().len(), 48);
    assert_eq!(engine.backend().frame_count(), 3);
}

/// Frames still draw without a shading stage, but push no uniforms.
#[test]
fn test_frame_without_shader_only_draws() {
    let mut engine = Engine::new(
        HeadlessBackend::without_shader(),
        SceneConfig {
            textures: Vec::new(),
            ..Default::default()
        },
    );
    engine.prepare();
    engine.frame(1.0 / 60.0);

    assert_eq!(engine.backend().uniforms().count(), 0);
    assert_eq!(engine.backend().draws().len(), 16);
}

/// Shutdown destroys every registered texture.
#[test]
fn test_shutdown_releases_textures() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::new(HeadlessBackend::default(), scene_fixture(dir.path()));
    engine.prepare();
    assert_eq!(engine.backend().live_texture_count(), 4);

    engine.shutdown();
    assert_eq!(engine.backend().live_texture_count(), 0);
    assert!(engine.textures().is_empty());

    let destroyed = engine
        .backend()
        .calls()
        .iter()
        .filter(|call| matches!(call, BackendCall::DestroyTexture(_)))
        .count();
    assert_eq!(destroyed, 4);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_ron_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.ron");
    std::fs::write(
        &path,
        r#"(
            title: "Bridge View",
            width: 1280,
            height: 720,
            texture_dir: "textures",
            textures: [
                (path: "hull.png", tag: "hull"),
            ],
            camera: (pitch: 20.0, distance: 15.0),
            materials: [
                (tag: "metal", shininess: 64.0),
            ],
        )"#,
    )
    .unwrap();

    let config = SceneConfig::from_ron_file(&path).unwrap();
    assert_eq!(config.title, "Bridge View");
    assert_eq!((config.width, config.height), (1280, 720));
    assert_eq!(config.textures, vec![TextureSource::new("hull.png", "hull")]);
    assert_eq!(config.camera.pitch, 20.0);
    assert_eq!(config.camera.yaw, -90.0);
    assert_eq!(config.materials[0].shininess, 64.0);
    assert!(config.vsync);
}

#[test]
fn test_config_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.ron");
    let err = SceneConfig::from_ron_file(&missing).unwrap_err();
    assert!(err.to_string().contains("missing.ron"));

    let broken = dir.path().join("broken.ron");
    std::fs::write(&broken, "(width: ").unwrap();
    let err = SceneConfig::from_ron_file(&broken).unwrap_err();
    assert!(matches!(err, spacecraft_scene::ConfigError::Parse { .. }));
}

/// The shipped sample config spells out the defaults.
#[test]
fn test_sample_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/scene.ron");
    let config = SceneConfig::from_ron_file(&path).unwrap();
    assert_eq!(config, SceneConfig::default());
}
