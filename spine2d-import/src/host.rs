//! Hand-off to the host application that owns the real scene.
//!
//! The importer never creates scene objects itself. [`materialize`] walks the built models
//! and issues calls on a [`SceneHost`], which maps them onto the host's own bones, plane
//! meshes, materials and timeline.

use crate::{
    BakedKey, BakedTimeline, Bone, Channel, ImportLog, Skeleton, Slot, Stage, TextureAtlas,
    TextureRegion,
};
use glam::Vec2;

/// Attachment pixels per scene unit on the placeholder quad.
pub const ATTACHMENT_UNIT: f32 = 0.01;

pub trait SceneHost {
    /// Host handle for a created object.
    type Node: Copy;

    fn create_bone(&mut self, bone: &Bone) -> Self::Node;

    fn set_parent(&mut self, child: Self::Node, parent: Self::Node);

    /// Creates a quad of `size` scene units, attached to `bone` at the bone's position.
    fn create_quad(&mut self, slot: &Slot, bone: Self::Node, size: Vec2) -> Self::Node;

    fn bind_texture(&mut self, quad: Self::Node, region: &TextureRegion);

    fn set_animation_range(&mut self, start_frame: u32, end_frame: u32);

    fn set_time(&mut self, frame: u32);

    fn set_key(&mut self, bone: Self::Node, channel: Channel, key: &BakedKey);
}

/// A slot with its bone and, when the atlas has it, its texture region.
#[derive(Copy, Clone, Debug)]
pub struct SlotBinding<'a> {
    pub slot: &'a Slot,
    pub bone: &'a Bone,
    pub region: Option<&'a TextureRegion>,
}

pub fn slot_bindings<'a>(skeleton: &'a Skeleton, atlas: &'a TextureAtlas) -> Vec<SlotBinding<'a>> {
    skeleton
        .slots
        .iter()
        .filter_map(|slot| {
            Some(SlotBinding {
                slot,
                bone: skeleton.bones.get(slot.bone)?,
                region: slot
                    .attachment
                    .as_ref()
                    .and_then(|a| atlas.region(&a.region_name)),
            })
        })
        .collect()
}

/// Quad size for a slot, in scene units.
pub fn quad_size(slot: &Slot) -> Vec2 {
    slot.attachment
        .as_ref()
        .map_or(Vec2::ONE, |a| Vec2::new(a.width, a.height) * ATTACHMENT_UNIT)
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SceneSummary {
    pub bones: usize,
    pub quads: usize,
    pub textured_quads: usize,
    pub keys: usize,
}

pub fn materialize<H: SceneHost>(
    skeleton: &Skeleton,
    atlas: &TextureAtlas,
    timeline: &BakedTimeline,
    host: &mut H,
    log: &mut ImportLog,
) -> SceneSummary {
    let mut summary = SceneSummary::default();

    let nodes: Vec<H::Node> = skeleton
        .bones
        .iter()
        .map(|bone| host.create_bone(bone))
        .collect();
    for (index, bone) in skeleton.bones.iter().enumerate() {
        if let Some(parent) = bone.parent {
            host.set_parent(nodes[index], nodes[parent]);
        }
    }
    summary.bones = nodes.len();

    for binding in slot_bindings(skeleton, atlas) {
        let slot = binding.slot;
        let quad = host.create_quad(slot, nodes[slot.bone], quad_size(slot));
        summary.quads += 1;

        match (&slot.attachment, binding.region) {
            (Some(_), Some(region)) => {
                host.bind_texture(quad, region);
                summary.textured_quads += 1;
                log.info(
                    Stage::Scene,
                    format!("applied texture '{}' to slot '{}'", region.name, slot.name),
                );
            }
            (Some(attachment), None) => log.warn(
                Stage::Scene,
                format!(
                    "texture region '{}' for slot '{}' not found, leaving it untextured",
                    attachment.region_name, slot.name
                ),
            ),
            (None, _) => log.warn(
                Stage::Scene,
                format!("slot '{}' has no attachment", slot.name),
            ),
        }
    }

    if !timeline.clips.is_empty() {
        host.set_time(0);
        host.set_animation_range(0, timeline.duration_frames);
        for (name, baked) in &timeline.bones {
            let Some(index) = skeleton.bone_index(name) else {
                continue;
            };
            for (&channel, keys) in &baked.channels {
                for key in keys {
                    host.set_key(nodes[index], channel, key);
                    summary.keys += 1;
                }
            }
        }
        host.set_time(0);
    }

    log.info(
        Stage::Scene,
        format!(
            "scene built: {} bones, {} quads ({} textured), {} keys",
            summary.bones, summary.quads, summary.textured_quads, summary.keys
        ),
    );
    summary
}
