use crate::json::{self, KeyDef};
use crate::{
    AnimationClip, BoneTracks, Channel, ImportLog, KeyValue, Keyframe, KeyframeTrack,
    SkeletonDocument, Stage,
};
use glam::Vec2;
use serde_json::{Map, Value};

const ANIMATIONS_KEY: &str = "animations";

/// Finds the animation section and reads every clip in it.
///
/// Clips come back in document order. Bones named by a clip are not checked against the
/// skeleton here; the baker does that.
pub fn collect_clips(doc: &SkeletonDocument, log: &mut ImportLog) -> Vec<AnimationClip> {
    let Some(section) = find_animation_section(doc, log) else {
        log.warn(Stage::Animation, "no animation data found");
        return Vec::new();
    };

    let clips: Vec<AnimationClip> = section
        .iter()
        .filter_map(|(name, raw)| read_clip(name, raw, log))
        .collect();
    log.info(
        Stage::Animation,
        format!(
            "found {} animations: {}",
            clips.len(),
            clips
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    );
    clips
}

/// `animations` when it holds something, otherwise the first non-empty object under a key
/// that looks like animation data.
fn find_animation_section<'a>(
    doc: &'a SkeletonDocument,
    log: &mut ImportLog,
) -> Option<&'a Map<String, Value>> {
    match doc.get(ANIMATIONS_KEY) {
        Some(Value::Object(map)) if !map.is_empty() => return Some(map),
        Some(other) if !json::is_empty(other) => log.warn(
            Stage::Animation,
            format!("'{ANIMATIONS_KEY}' should be an object, found {}", json::kind(other)),
        ),
        _ => {}
    }

    log.info(Stage::Animation, "looking for animation data under other keys");
    for (key, value) in doc.entries() {
        if key == ANIMATIONS_KEY || !looks_like_animation_key(key) {
            continue;
        }
        log.info(Stage::Animation, format!("candidate animation key '{key}'"));
        match value {
            Value::Object(map) if !map.is_empty() => {
                log.warn(Stage::Animation, format!("using animation data found under '{key}'"));
                return Some(map);
            }
            _ => {}
        }
    }
    None
}

fn looks_like_animation_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("anim") || key.contains("motion")
}

fn read_clip(name: &str, raw: &Value, log: &mut ImportLog) -> Option<AnimationClip> {
    let Value::Object(clip) = raw else {
        log.warn(
            Stage::Animation,
            format!("animation '{name}' should be an object, found {}", json::kind(raw)),
        );
        return None;
    };

    let mut bones = Vec::new();
    match clip.get("bones") {
        Some(Value::Object(bone_map)) => {
            for (bone, channels) in bone_map {
                if let Some(tracks) = read_bone_tracks(name, bone, channels, log) {
                    bones.push(tracks);
                }
            }
        }
        Some(other) if !json::is_empty(other) => log.warn(
            Stage::Animation,
            format!(
                "animation '{name}': 'bones' should be an object, found {}",
                json::kind(other)
            ),
        ),
        _ => log.info(
            Stage::Animation,
            format!("animation '{name}' has no bone timelines"),
        ),
    }

    Some(AnimationClip {
        name: name.to_string(),
        bones,
    })
}

fn read_bone_tracks(
    clip: &str,
    bone: &str,
    raw: &Value,
    log: &mut ImportLog,
) -> Option<BoneTracks> {
    let Value::Object(channels) = raw else {
        log.warn(
            Stage::Animation,
            format!("animation '{clip}': timelines of bone '{bone}' should be an object"),
        );
        return None;
    };

    let mut tracks = Vec::new();
    for (channel_name, keys) in channels {
        let Some(channel) = Channel::from_json_name(channel_name) else {
            log.info(
                Stage::Animation,
                format!("animation '{clip}': ignoring '{channel_name}' timeline of bone '{bone}'"),
            );
            continue;
        };
        let Value::Array(keys) = keys else {
            log.warn(
                Stage::Animation,
                format!("animation '{clip}': {channel} timeline of bone '{bone}' should be an array"),
            );
            continue;
        };

        let mut frames = Vec::with_capacity(keys.len());
        for (i, raw) in keys.iter().enumerate() {
            match read_key(channel, raw) {
                Ok(key) => frames.push(key),
                Err(reason) => log.warn(
                    Stage::Animation,
                    format!(
                        "animation '{clip}': dropping {channel} key #{i} of bone '{bone}': {reason}"
                    ),
                ),
            }
        }
        tracks.push(KeyframeTrack {
            channel,
            keys: frames,
        });
    }

    Some(BoneTracks {
        bone: bone.to_string(),
        tracks,
    })
}

fn read_key(channel: Channel, raw: &Value) -> Result<Keyframe, String> {
    let def: KeyDef = serde_json::from_value(raw.clone()).map_err(|e| e.to_string())?;

    let time = field("time", def.time.as_ref(), 0.0)?;
    let value = match channel {
        Channel::Translate => KeyValue::Vec2(Vec2::new(
            field("x", def.x.as_ref(), 0.0)?,
            field("y", def.y.as_ref(), 0.0)?,
        )),
        Channel::Scale => KeyValue::Vec2(Vec2::new(
            field("x", def.x.as_ref(), 1.0)?,
            field("y", def.y.as_ref(), 1.0)?,
        )),
        Channel::Rotate => {
            KeyValue::Angle(field("angle", def.angle.as_ref().or(def.value.as_ref()), 0.0)?)
        }
    };
    Ok(Keyframe { time, value })
}

fn field(name: &str, value: Option<&Value>, default: f32) -> Result<f32, String> {
    json::number_or(value, default).map_err(|raw| format!("invalid {name} {raw}"))
}
