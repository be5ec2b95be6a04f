//! Quantizes keyframe tracks onto a fixed frame grid.

use crate::{
    AnimationClip, Channel, ImportLog, KeyValue, Keyframe, Skeleton, SkeletonDocument, Stage,
    collect_clips, config::DEFAULT_FRAME_RATE,
};
use glam::Vec2;
use std::collections::BTreeMap;

/// Frames appended after the last key.
pub const PADDING_FRAMES: u32 = 10;

/// Source translation units per scene unit.
pub const TRANSLATE_UNIT: f32 = 0.01;

/// A key value in scene space: Y up, angles in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BakedValue {
    Vec2(Vec2),
    Degrees(f32),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BakedKey {
    pub frame: u32,
    pub value: BakedValue,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BakedBone {
    pub channels: BTreeMap<Channel, Vec<BakedKey>>,
}

impl BakedBone {
    pub fn keys(&self, channel: Channel) -> &[BakedKey] {
        self.channels.get(&channel).map_or(&[], Vec::as_slice)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BakedTimeline {
    pub frame_rate: u32,
    pub duration_frames: u32,
    /// Names of the clips that were baked, in document order.
    pub clips: Vec<String>,
    pub bones: BTreeMap<String, BakedBone>,
}

impl BakedTimeline {
    pub fn empty(frame_rate: u32) -> Self {
        Self {
            frame_rate,
            duration_frames: PADDING_FRAMES,
            clips: Vec::new(),
            bones: BTreeMap::new(),
        }
    }

    pub fn bone(&self, name: &str) -> Option<&BakedBone> {
        self.bones.get(name)
    }

    pub fn keys(&self, bone: &str, channel: Channel) -> &[BakedKey] {
        self.bone(bone).map_or(&[], |b| b.keys(channel))
    }

    pub fn key_count(&self) -> usize {
        self.bones
            .values()
            .flat_map(|b| b.channels.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// `floor(latest key time * frame_rate) + PADDING_FRAMES`, counting every channel of every
/// bone in every clip, including bones the skeleton does not have.
pub fn duration_frames(clips: &[AnimationClip], frame_rate: u32) -> u32 {
    let max_time = clips
        .iter()
        .flat_map(|c| &c.bones)
        .flat_map(|b| &b.tracks)
        .filter_map(|t| t.max_time())
        .fold(0.0f32, f32::max);
    frame_index(max_time, frame_rate).saturating_add(PADDING_FRAMES)
}

/// Frame a key at `time` seconds lands on. Negative times land on frame 0.
pub fn frame_index(time: f32, frame_rate: u32) -> u32 {
    // Float to int `as` saturates, so huge times clamp to u32::MAX.
    (time * frame_rate as f32).floor().max(0.0) as u32
}

/// Converts one authored value to scene space. `None` when the value does not fit the
/// channel.
pub fn convert_value(channel: Channel, value: KeyValue) -> Option<BakedValue> {
    match (channel, value) {
        (Channel::Translate, KeyValue::Vec2(v)) => Some(BakedValue::Vec2(Vec2::new(
            v.x * TRANSLATE_UNIT,
            -v.y * TRANSLATE_UNIT,
        ))),
        (Channel::Rotate, KeyValue::Angle(radians)) => {
            Some(BakedValue::Degrees(radians.to_degrees()))
        }
        (Channel::Scale, KeyValue::Vec2(v)) => Some(BakedValue::Vec2(v)),
        _ => None,
    }
}

pub fn bake_key(channel: Channel, key: &Keyframe, frame_rate: u32) -> Option<BakedKey> {
    Some(BakedKey {
        frame: frame_index(key.time, frame_rate),
        value: convert_value(channel, key.value)?,
    })
}

/// Bakes `clips` onto one timeline.
///
/// Clips share the timeline the way a host's own timeline would: a key set on a frame
/// that already holds a key for the same bone and channel replaces it. Within a track,
/// keys are applied in time order regardless of source order.
pub fn bake_animations(
    clips: &[AnimationClip],
    skeleton: &Skeleton,
    frame_rate: u32,
    log: &mut ImportLog,
) -> BakedTimeline {
    let frame_rate = if frame_rate == 0 {
        log.warn(Stage::Animation, format!("frame rate 0 is invalid, using {DEFAULT_FRAME_RATE}"));
        DEFAULT_FRAME_RATE
    } else {
        frame_rate
    };

    if clips.is_empty() {
        return BakedTimeline::empty(frame_rate);
    }

    let duration_frames = duration_frames(clips, frame_rate);
    log.info(Stage::Animation, format!("animation length: {duration_frames} frames"));

    let mut grid: BTreeMap<String, BTreeMap<Channel, BTreeMap<u32, BakedValue>>> =
        BTreeMap::new();
    for clip in clips {
        log.info(Stage::Animation, format!("baking animation '{}'", clip.name));

        for bone in &clip.bones {
            if skeleton.bone(&bone.bone).is_none() {
                log.warn(
                    Stage::Animation,
                    format!(
                        "animation '{}' references unknown bone '{}', skipping its timelines",
                        clip.name, bone.bone
                    ),
                );
                continue;
            }

            for track in &bone.tracks {
                let mut keys: Vec<&Keyframe> = track.keys.iter().collect();
                keys.sort_by(|a, b| a.time.total_cmp(&b.time));

                for key in keys {
                    if key.time < 0.0 {
                        log.warn(
                            Stage::Animation,
                            format!(
                                "animation '{}': {} key of bone '{}' at negative time {}, baking it at frame 0",
                                clip.name, track.channel, bone.bone, key.time
                            ),
                        );
                    }
                    let Some(baked) = bake_key(track.channel, key, frame_rate) else {
                        log.warn(
                            Stage::Animation,
                            format!(
                                "animation '{}': {} key of bone '{}' has a mismatched value, skipping it",
                                clip.name, track.channel, bone.bone
                            ),
                        );
                        continue;
                    };
                    grid.entry(bone.bone.clone())
                        .or_default()
                        .entry(track.channel)
                        .or_default()
                        .insert(baked.frame, baked.value);
                }
            }
        }
    }

    let bones = grid
        .into_iter()
        .map(|(name, channels)| {
            let channels = channels
                .into_iter()
                .map(|(channel, frames)| {
                    let keys = frames
                        .into_iter()
                        .map(|(frame, value)| BakedKey { frame, value })
                        .collect();
                    (channel, keys)
                })
                .collect();
            (name, BakedBone { channels })
        })
        .collect();

    let timeline = BakedTimeline {
        frame_rate,
        duration_frames,
        clips: clips.iter().map(|c| c.name.clone()).collect(),
        bones,
    };
    log.info(
        Stage::Animation,
        format!(
            "baked {} animations, {} keys",
            timeline.clips.len(),
            timeline.key_count()
        ),
    );
    timeline
}

/// Reads the clips out of `doc` and bakes them.
pub fn bake_document(
    doc: &SkeletonDocument,
    skeleton: &Skeleton,
    frame_rate: u32,
    log: &mut ImportLog,
) -> BakedTimeline {
    let clips = collect_clips(doc, log);
    bake_animations(&clips, skeleton, frame_rate, log)
}
