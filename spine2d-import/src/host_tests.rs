use crate::test_support::{MemoryFs, assert_approx};
use crate::{
    BakedKey, BakedTimeline, Bone, Channel, ImportLog, SceneHost, SceneSummary, Skeleton,
    SkeletonDocument, Slot, TextureAtlas, TextureRegion, bake_document, build_skeleton,
    materialize, quad_size, slot_bindings,
};
use glam::Vec2;
use std::path::Path;

#[derive(Debug, PartialEq)]
enum Call {
    Bone(String),
    Parent(usize, usize),
    Quad { slot: String, bone: usize, size: Vec2 },
    Texture(usize, String),
    Range(u32, u32),
    Time(u32),
    Key(usize, Channel, u32),
}

#[derive(Default)]
struct RecordingHost {
    calls: Vec<Call>,
    next: usize,
}

impl RecordingHost {
    fn node(&mut self) -> usize {
        self.next += 1;
        self.next - 1
    }
}

impl SceneHost for RecordingHost {
    type Node = usize;

    fn create_bone(&mut self, bone: &Bone) -> usize {
        self.calls.push(Call::Bone(bone.name.clone()));
        self.node()
    }

    fn set_parent(&mut self, child: usize, parent: usize) {
        self.calls.push(Call::Parent(child, parent));
    }

    fn create_quad(&mut self, slot: &Slot, bone: usize, size: Vec2) -> usize {
        self.calls.push(Call::Quad {
            slot: slot.name.clone(),
            bone,
            size,
        });
        self.node()
    }

    fn bind_texture(&mut self, quad: usize, region: &TextureRegion) {
        self.calls.push(Call::Texture(quad, region.name.clone()));
    }

    fn set_animation_range(&mut self, start_frame: u32, end_frame: u32) {
        self.calls.push(Call::Range(start_frame, end_frame));
    }

    fn set_time(&mut self, frame: u32) {
        self.calls.push(Call::Time(frame));
    }

    fn set_key(&mut self, bone: usize, channel: Channel, key: &BakedKey) {
        self.calls.push(Call::Key(bone, channel, key.frame));
    }
}

const DOCUMENT: &str = r#"
{
  "bones": [
    { "name": "root" },
    { "name": "bone1", "y": -1, "parent": "root" }
  ],
  "slots": [
    { "name": "slot1", "bone": "root", "attachment": { "name": "texture1.png", "width": 100, "height": 100 } },
    { "name": "slot2", "bone": "bone1", "attachment": { "name": "texture2.png", "width": 80, "height": 40 } },
    { "name": "empty", "bone": "bone1" }
  ],
  "animations": {
    "wave": { "bones": { "bone1": { "rotate": [ { "time": 0, "angle": 0 }, { "time": 1, "angle": 1 } ] } } }
  }
}
"#;

const ATLAS: &str = "texture1.png\n  rotate: false\ntexture2.png\n  rotate: 90\n";

struct Scene {
    skeleton: Skeleton,
    atlas: TextureAtlas,
    timeline: BakedTimeline,
}

fn scene(fs: &MemoryFs) -> Scene {
    let doc = SkeletonDocument::from_json_str(DOCUMENT).unwrap();
    let mut log = ImportLog::new(false);
    let atlas = TextureAtlas::parse(ATLAS, Path::new("tex"), fs, &mut log);
    let skeleton = build_skeleton(&doc, 1.0, &mut log);
    let timeline = bake_document(&doc, &skeleton, 30, &mut log);
    Scene {
        skeleton,
        atlas,
        timeline,
    }
}

fn all_textures() -> MemoryFs {
    MemoryFs::new()
        .with_file("tex/texture1.png")
        .with_file("tex/texture2.png")
}

fn run(scene: &Scene) -> (RecordingHost, SceneSummary, ImportLog) {
    let mut host = RecordingHost::default();
    let mut log = ImportLog::new(false);
    let summary = materialize(
        &scene.skeleton,
        &scene.atlas,
        &scene.timeline,
        &mut host,
        &mut log,
    );
    (host, summary, log)
}

#[test]
fn bones_are_created_before_they_are_parented() {
    let (host, summary, _) = run(&scene(&all_textures()));

    assert_eq!(host.calls[0], Call::Bone("root".to_string()));
    assert_eq!(host.calls[1], Call::Bone("bone1".to_string()));
    assert_eq!(host.calls[2], Call::Parent(1, 0));
    assert_eq!(summary.bones, 2);
}

#[test]
fn quads_are_sized_and_textured() {
    let (host, summary, log) = run(&scene(&all_textures()));

    let quads: Vec<_> = host
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Quad { slot, bone, size } => Some((slot.as_str(), *bone, *size)),
            _ => None,
        })
        .collect();
    assert_eq!(quads.len(), 3);
    assert_eq!(quads[0].0, "slot1");
    assert_eq!(quads[0].1, 0);
    assert_approx(quads[0].2.x, 1.0);
    assert_approx(quads[1].2.x, 0.8);
    assert_approx(quads[1].2.y, 0.4);
    assert_eq!(quads[2].2, Vec2::ONE);

    assert!(host.calls.contains(&Call::Texture(2, "texture1".to_string())));
    assert!(host.calls.contains(&Call::Texture(3, "texture2".to_string())));
    assert_eq!(summary.quads, 3);
    assert_eq!(summary.textured_quads, 2);
    assert_eq!(log.warnings().collect::<Vec<_>>(), ["slot 'empty' has no attachment"]);
}

#[test]
fn missing_region_leaves_the_quad_untextured() {
    let fs = MemoryFs::new().with_file("tex/texture2.png");
    let (host, summary, log) = run(&scene(&fs));

    assert_eq!(summary.quads, 3);
    assert_eq!(summary.textured_quads, 1);
    assert!(!host.calls.iter().any(|c| matches!(c, Call::Texture(_, name) if name == "texture1")));
    assert!(
        log.warnings()
            .any(|w| w.contains("'texture1'") && w.contains("'slot1'"))
    );
}

#[test]
fn keys_are_set_inside_the_animation_range() {
    let (host, summary, _) = run(&scene(&all_textures()));

    let range = host
        .calls
        .iter()
        .position(|c| *c == Call::Range(0, 40))
        .unwrap();
    assert_eq!(host.calls[range - 1], Call::Time(0));
    assert_eq!(host.calls.last(), Some(&Call::Time(0)));

    let keys: Vec<_> = host
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Key(..)))
        .collect();
    assert_eq!(
        keys,
        [
            &Call::Key(1, Channel::Rotate, 0),
            &Call::Key(1, Channel::Rotate, 30)
        ]
    );
    assert_eq!(summary.keys, 2);
}

#[test]
fn empty_timeline_does_not_touch_the_host_timeline() {
    let mut scene = scene(&all_textures());
    scene.timeline = BakedTimeline::empty(30);
    let (host, summary, _) = run(&scene);

    assert!(
        !host
            .calls
            .iter()
            .any(|c| matches!(c, Call::Range(..) | Call::Time(_) | Call::Key(..)))
    );
    assert_eq!(summary.keys, 0);
}

#[test]
fn bindings_resolve_bone_and_region() {
    let scene = scene(&all_textures());
    let bindings = slot_bindings(&scene.skeleton, &scene.atlas);

    assert_eq!(bindings.len(), 3);
    assert_eq!(bindings[1].bone.name, "bone1");
    assert_eq!(bindings[1].region.map(|r| r.rotation_degrees), Some(90.0));
    assert!(bindings[2].region.is_none());
    assert_eq!(quad_size(bindings[2].slot), Vec2::ONE);
}
