use crate::json::{self, AttachmentDef, BoneDef, SlotDef};
use crate::{Attachment, Bone, ImportLog, Skeleton, SkeletonDocument, Slot, Stage};
use glam::Vec2;
use serde_json::Value;

/// Bones shorter than this (in source units) are stretched to it before scaling.
pub const MIN_BONE_LENGTH: f32 = 0.1;

const DEFAULT_BONE_LENGTH: f32 = 1.0;

/// Attachment size in source pixels when the document gives none. Scaled by
/// [`crate::ATTACHMENT_UNIT`] this is a unit quad.
pub const DEFAULT_ATTACHMENT_SIZE: f32 = 100.0;

/// Builds the bone arena and slot list from `doc`.
///
/// Bones are created first and linked to their parents in a second pass, so a parent may
/// be declared after its children.
pub fn build_skeleton(doc: &SkeletonDocument, scale: f32, log: &mut ImportLog) -> Skeleton {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        log.warn(Stage::Bones, format!("invalid scale {scale}, using 1.0"));
        1.0
    };

    let mut skeleton = Skeleton {
        spine_version: doc.spine_version(),
        ..Skeleton::default()
    };

    let pending = create_bones(&mut skeleton, doc, scale, log);
    link_parents(&mut skeleton, &pending, log);
    create_slots(&mut skeleton, doc, log);

    skeleton
}

fn section<'a>(
    doc: &'a SkeletonDocument,
    key: &str,
    stage: Stage,
    log: &mut ImportLog,
) -> &'a [Value] {
    match doc.get(key) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(other) if !json::is_empty(other) => {
            log.warn(
                stage,
                format!("'{key}' should be an array, found {}", json::kind(other)),
            );
            &[]
        }
        _ => {
            log.warn(stage, format!("no {key} found in skeleton document"));
            &[]
        }
    }
}

/// Pass 1. Returns `(bone index, declared parent)` for every bone that names one.
fn create_bones(
    skeleton: &mut Skeleton,
    doc: &SkeletonDocument,
    scale: f32,
    log: &mut ImportLog,
) -> Vec<(usize, String)> {
    let mut pending = Vec::new();

    for (position, raw) in section(doc, "bones", Stage::Bones, log).iter().enumerate() {
        let def: BoneDef = match serde_json::from_value(raw.clone()) {
            Ok(def) => def,
            Err(e) => {
                log.warn(Stage::Bones, format!("skipping bone #{position}: {e}"));
                continue;
            }
        };

        let Some(name) = def.name.filter(|n| !n.is_empty()) else {
            log.warn(Stage::Bones, format!("skipping unnamed bone #{position}"));
            continue;
        };
        if skeleton.bone_index.contains_key(&name) {
            log.warn(
                Stage::Bones,
                format!("duplicate bone '{name}', keeping the first declaration"),
            );
            continue;
        }

        let fields = (
            json::number_or(def.x.as_ref(), 0.0),
            json::number_or(def.y.as_ref(), 0.0),
            json::number_or(def.length.as_ref(), DEFAULT_BONE_LENGTH),
        );
        let (x, y, length) = match fields {
            (Ok(x), Ok(y), Ok(length)) => (x, y, length),
            (x, y, length) => {
                let bad = [("x", x), ("y", y), ("length", length)]
                    .into_iter()
                    .filter_map(|(field, v)| v.err().map(|raw| format!("{field}={raw}")))
                    .collect::<Vec<_>>()
                    .join(", ");
                log.warn(Stage::Bones, format!("skipping bone '{name}': invalid {bad}"));
                continue;
            }
        };

        let rotation_degrees = match json::number_or(def.rotation.as_ref(), 0.0) {
            Ok(radians) => radians.to_degrees(),
            Err(raw) => {
                log.warn(
                    Stage::Bones,
                    format!("invalid rotation {raw} for bone '{name}', using 0"),
                );
                0.0
            }
        };

        let declared_parent = def.parent.filter(|p| !p.is_empty());
        let index = skeleton.bones.len();
        if let Some(parent) = &declared_parent {
            pending.push((index, parent.clone()));
        }

        let bone = Bone {
            name: name.clone(),
            position: Vec2::new(x * scale, -y * scale),
            length: length.max(MIN_BONE_LENGTH) * scale,
            rotation_degrees,
            parent: None,
            declared_parent,
        };
        log.info(
            Stage::Bones,
            format!(
                "created bone '{name}' at ({:.2}, {:.2})",
                bone.position.x, bone.position.y
            ),
        );
        skeleton.bone_index.insert(name, index);
        skeleton.bones.push(bone);
    }

    pending
}

/// Pass 2. Links run in declaration order; a link that would close a cycle is refused
/// and the bone stays a root.
fn link_parents(skeleton: &mut Skeleton, pending: &[(usize, String)], log: &mut ImportLog) {
    let mut linked = 0usize;

    for (child, parent_name) in pending {
        let child = *child;
        let child_name = skeleton.bones[child].name.clone();

        let Some(parent) = skeleton.bone_index(parent_name) else {
            log.warn(
                Stage::Bones,
                format!("parent bone '{parent_name}' of '{child_name}' not found, keeping it as a root"),
            );
            continue;
        };

        if parent == child || skeleton.ancestors(parent).any(|a| a == child) {
            log.error(
                Stage::Bones,
                format!(
                    "parenting '{child_name}' to '{parent_name}' would create a cycle, keeping it as a root"
                ),
            );
            continue;
        }

        skeleton.bones[child].parent = Some(parent);
        linked += 1;
        log.info(Stage::Bones, format!("linked '{child_name}' -> '{parent_name}'"));
    }

    log.info(
        Stage::Bones,
        format!("{} bones created, {linked} parent links", skeleton.bones.len()),
    );
}

fn create_slots(skeleton: &mut Skeleton, doc: &SkeletonDocument, log: &mut ImportLog) {
    for (position, raw) in section(doc, "slots", Stage::Slots, log).iter().enumerate() {
        let def: SlotDef = match serde_json::from_value(raw.clone()) {
            Ok(def) => def,
            Err(e) => {
                log.warn(Stage::Slots, format!("skipping slot #{position}: {e}"));
                continue;
            }
        };

        let Some(name) = def.name.filter(|n| !n.is_empty()) else {
            log.warn(Stage::Slots, format!("skipping unnamed slot #{position}"));
            continue;
        };
        if skeleton.slot_index.contains_key(&name) {
            log.warn(
                Stage::Slots,
                format!("duplicate slot '{name}', keeping the first declaration"),
            );
            continue;
        }

        let bone_name = def.bone.unwrap_or_default();
        let Some(bone) = skeleton.bone_index(&bone_name) else {
            log.warn(
                Stage::Slots,
                format!("slot '{name}' references unknown bone '{bone_name}', dropping it"),
            );
            continue;
        };

        let attachment = def
            .attachment
            .and_then(|a| build_attachment(&name, a, log));

        skeleton.slot_index.insert(name.clone(), skeleton.slots.len());
        skeleton.slots.push(Slot {
            name,
            bone,
            attachment,
        });
    }
}

fn build_attachment(slot: &str, def: AttachmentDef, log: &mut ImportLog) -> Option<Attachment> {
    let (name, width, height) = match def {
        AttachmentDef::Name(name) => (Some(name), None, None),
        AttachmentDef::Sized {
            name,
            width,
            height,
        } => (name, width, height),
    };

    let Some(name) = name.filter(|n| !n.is_empty()) else {
        log.warn(Stage::Slots, format!("attachment of slot '{slot}' has no name, ignoring it"));
        return None;
    };

    let mut size = |field: &str, value: Option<Value>| {
        json::number_or(value.as_ref(), DEFAULT_ATTACHMENT_SIZE).unwrap_or_else(|raw| {
            log.warn(
                Stage::Slots,
                format!("invalid attachment {field} {raw} for slot '{slot}', using {DEFAULT_ATTACHMENT_SIZE}"),
            );
            DEFAULT_ATTACHMENT_SIZE
        })
    };
    let width = size("width", width);
    let height = size("height", height);

    Some(Attachment {
        region_name: region_key(&name).to_string(),
        width,
        height,
    })
}

/// Attachment names may carry a file extension; regions are keyed by the part before the
/// first `.`.
fn region_key(name: &str) -> &str {
    name.split_once('.').map_or(name, |(stem, _)| stem)
}

