use glam::Vec2;
use std::collections::HashMap;
use std::fmt;

/// A bone in scene space: Y up, positions and length already scaled, rotation in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub name: String,
    pub position: Vec2,
    pub length: f32,
    pub rotation_degrees: f32,
    /// Index into [`Skeleton::bones`], set once the parent link is accepted.
    pub parent: Option<usize>,
    /// Parent name as written in the source, whether or not it resolved.
    pub declared_parent: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub region_name: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub name: String,
    pub bone: usize,
    pub attachment: Option<Attachment>,
}

/// Bone arena plus slots. Bones are stored in declaration order and refer to their
/// parent by index, so links are plain lookups.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    pub spine_version: Option<String>,
    pub bones: Vec<Bone>,
    pub slots: Vec<Slot>,
    pub(crate) bone_index: HashMap<String, usize>,
    pub(crate) slot_index: HashMap<String, usize>,
}

impl Skeleton {
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index.get(name).map(|&i| &self.bones[i])
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_index.get(name).copied()
    }

    pub fn parent(&self, bone: &Bone) -> Option<&Bone> {
        bone.parent.and_then(|i| self.bones.get(i))
    }

    /// Name of the resolved parent of `name`, if both exist.
    pub fn parent_name(&self, name: &str) -> Option<&str> {
        self.bone(name)
            .and_then(|b| self.parent(b))
            .map(|p| p.name.as_str())
    }

    /// Walks from `index`'s parent up to its root.
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            skeleton: self,
            next: self.bones.get(index).and_then(|b| b.parent),
            remaining: self.bones.len(),
        }
    }

    pub fn roots(&self) -> impl Iterator<Item = &Bone> + '_ {
        self.bones.iter().filter(|b| b.parent.is_none())
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = &Bone> + '_ {
        self.bones.iter().filter(move |b| b.parent == Some(index))
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slot_index.get(name).map(|&i| &self.slots[i])
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

pub struct Ancestors<'a> {
    skeleton: &'a Skeleton,
    next: Option<usize>,
    // Caps the walk at the bone count.
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.next = self.skeleton.bones.get(current).and_then(|b| b.parent);
        Some(current)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Channel {
    Translate,
    Rotate,
    Scale,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Translate, Channel::Rotate, Channel::Scale];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }

    pub(crate) fn from_json_name(name: &str) -> Option<Self> {
        match name {
            "translate" => Some(Self::Translate),
            "rotate" => Some(Self::Rotate),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyframe value as authored: source units, Y down, angles in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum KeyValue {
    Vec2(Vec2),
    Angle(f32),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: KeyValue,
}

/// Keys for one channel of one bone, in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeTrack {
    pub channel: Channel,
    pub keys: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn max_time(&self) -> Option<f32> {
        self.keys.iter().map(|k| k.time).reduce(f32::max)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoneTracks {
    pub bone: String,
    pub tracks: Vec<KeyframeTrack>,
}

impl BoneTracks {
    pub fn track(&self, channel: Channel) -> Option<&KeyframeTrack> {
        self.tracks.iter().find(|t| t.channel == channel)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub bones: Vec<BoneTracks>,
}

impl AnimationClip {
    pub fn key_count(&self) -> usize {
        self.bones
            .iter()
            .flat_map(|b| &b.tracks)
            .map(|t| t.keys.len())
            .sum()
    }
}
