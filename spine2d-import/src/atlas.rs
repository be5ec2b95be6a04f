use crate::{FileSystem, ImportLog, Stage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Page-file extensions that open a new region.
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "tga"];

#[derive(Clone, Debug, PartialEq)]
pub struct TextureRegion {
    pub name: String,
    pub source_path: PathBuf,
    pub rotation_degrees: f32,
}

/// Texture regions keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureAtlas {
    pub regions: HashMap<String, TextureRegion>,
}

impl TextureAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `input`, keeping only regions whose image exists under `texture_dir`.
    pub fn parse(
        input: &str,
        texture_dir: &Path,
        fs: &impl FileSystem,
        log: &mut ImportLog,
    ) -> Self {
        let mut atlas = Self::new();
        atlas.load(input, texture_dir, fs, log);
        atlas
    }

    /// Adds the regions declared in `input`. Names that are already loaded are left
    /// untouched, so loading the same text again changes nothing.
    pub fn load(
        &mut self,
        input: &str,
        texture_dir: &Path,
        fs: &impl FileSystem,
        log: &mut ImportLog,
    ) {
        parse_atlas_into(self, input, texture_dir, fs, log);
    }

    pub fn region(&self, name: &str) -> Option<&TextureRegion> {
        self.regions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

pub fn parse_atlas(
    input: &str,
    texture_dir: &Path,
    fs: &impl FileSystem,
    log: &mut ImportLog,
) -> TextureAtlas {
    TextureAtlas::parse(input, texture_dir, fs, log)
}

fn parse_atlas_into(
    atlas: &mut TextureAtlas,
    input: &str,
    texture_dir: &Path,
    fs: &impl FileSystem,
    log: &mut ImportLog,
) {
    let mut current: Option<String> = None;
    let mut loaded = 0usize;
    let mut rejected = 0usize;

    for (line_number, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if is_image_line(line) {
            let name = region_name(line);
            let source_path = texture_dir.join(line);
            if !fs.is_file(&source_path) {
                log.warn(
                    Stage::Atlas,
                    format!("texture file not found: {}", source_path.display()),
                );
                rejected += 1;
                continue;
            }
            if atlas.contains(name) {
                log.warn(Stage::Atlas, format!("texture region '{name}' already loaded, skipping"));
                // Rotate lines under a re-declaration must not reach the loaded region.
                current = None;
                continue;
            }

            atlas.regions.insert(
                name.to_string(),
                TextureRegion {
                    name: name.to_string(),
                    source_path,
                    rotation_degrees: 0.0,
                },
            );
            log.info(Stage::Atlas, format!("loaded texture region '{name}'"));
            loaded += 1;
            current = Some(name.to_string());
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim() != "rotate" {
            continue;
        }
        let Some(region) = current.as_deref().and_then(|n| atlas.regions.get_mut(n)) else {
            continue;
        };

        let value = value.trim();
        if let Some(degrees) = parse_atlas_bool(value) {
            log.info(
                Stage::Atlas,
                format!("rotate: {value} on region '{}' read as {degrees} degrees", region.name),
            );
        }
        match parse_degrees(value) {
            Some(degrees) => region.rotation_degrees = degrees,
            None => log.warn(
                Stage::Atlas,
                format!(
                    "invalid rotate value '{value}' for region '{}' (line {})",
                    region.name,
                    line_number + 1
                ),
            ),
        }
    }

    log.info(Stage::Atlas, format!("atlas parsed: {loaded} regions loaded, {rejected} missing"));
}

fn is_image_line(line: &str) -> bool {
    Path::new(line)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// The region name is the page line up to its first `.`.
fn region_name(line: &str) -> &str {
    line.split_once('.').map_or(line, |(stem, _)| stem)
}

/// Atlas booleans: `true` is a 90 degree page rotation.
fn parse_atlas_bool(value: &str) -> Option<f32> {
    match value {
        "true" => Some(90.0),
        "false" => Some(0.0),
        _ => None,
    }
}

fn parse_degrees(value: &str) -> Option<f32> {
    parse_atlas_bool(value).or_else(|| value.parse::<f32>().ok().filter(|d| d.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryFs;

    const ATLAS: &str = r#"
texture1.png
  rotate: false
  xy: 0, 0
  size: 100, 100
  orig: 100, 100
  offset: 0, 0
  index: -1
texture2.png
  rotate: 90
  xy: 100, 0
  size: 80, 80
"#;

    fn textures() -> MemoryFs {
        MemoryFs::new()
            .with_file("tex/texture1.png")
            .with_file("tex/texture2.png")
    }

    #[test]
    fn parse_registers_regions_with_resolved_paths() {
        let mut log = ImportLog::new(false);
        let atlas = TextureAtlas::parse(ATLAS, Path::new("tex"), &textures(), &mut log);

        assert_eq!(atlas.len(), 2);
        let r1 = atlas.region("texture1").unwrap();
        assert_eq!(r1.source_path, Path::new("tex").join("texture1.png"));
        assert_eq!(r1.rotation_degrees, 0.0);
        assert_eq!(atlas.region("texture2").unwrap().rotation_degrees, 90.0);
        assert!(log.is_empty());
    }

    #[test]
    fn missing_image_is_not_registered_and_warns_once() {
        let fs = MemoryFs::new().with_file("tex/texture2.png");
        let mut log = ImportLog::new(false);
        let atlas = TextureAtlas::parse(ATLAS, Path::new("tex"), &fs, &mut log);

        assert!(atlas.region("texture1").is_none());
        assert!(atlas.region("texture2").is_some());
        assert_eq!(log.warning_count(), 1);
        assert!(log.warnings().next().unwrap().contains("texture1.png"));
    }

    #[test]
    fn rotate_after_missing_image_applies_to_last_registered_region() {
        let input = "a.png\nb.png\n  rotate: 45\n";
        let fs = MemoryFs::new().with_file("t/a.png");
        let mut log = ImportLog::new(false);
        let atlas = TextureAtlas::parse(input, Path::new("t"), &fs, &mut log);

        assert_eq!(atlas.region("a").unwrap().rotation_degrees, 45.0);
        assert!(atlas.region("b").is_none());
        assert_eq!(log.warning_count(), 1);
    }

    #[test]
    fn rotate_before_any_region_is_ignored() {
        let input = "  rotate: 45\nmissing.png\n  rotate: 90\n";
        let fs = MemoryFs::new();
        let mut log = ImportLog::new(false);
        let atlas = TextureAtlas::parse(input, Path::new("t"), &fs, &mut log);

        assert!(atlas.is_empty());
        assert_eq!(log.warning_count(), 1);
    }

    #[test]
    fn malformed_rotate_warns_and_keeps_default() {
        let input = "a.png\n  rotate: sideways\n";
        let fs = MemoryFs::new().with_file("t/a.png");
        let mut log = ImportLog::new(false);
        let atlas = TextureAtlas::parse(input, Path::new("t"), &fs, &mut log);

        assert_eq!(atlas.region("a").unwrap().rotation_degrees, 0.0);
        assert_eq!(log.warning_count(), 1);
        assert!(log.warnings().next().unwrap().contains("sideways"));
    }

    #[test]
    fn boolean_rotate_is_noted_in_verbose_log() {
        let input = "a.png\n rotate: true\n";
        let fs = MemoryFs::new().with_file("t/a.png");
        let mut log = ImportLog::new(true);
        let atlas = TextureAtlas::parse(input, Path::new("t"), &fs, &mut log);

        assert_eq!(atlas.region("a").unwrap().rotation_degrees, 90.0);
        assert_eq!(log.warning_count(), 0);
        assert!(
            log.with_severity(crate::Severity::Info)
                .any(|e| e.message == "rotate: true on region 'a' read as 90 degrees")
        );
    }

    #[test]
    fn rotate_accepts_floats_and_booleans() {
        let input = "a.png\n rotate: true\nb.jpg\n rotate: -12.5\nc.PNG\n rotate: false\n";
        let fs = MemoryFs::new()
            .with_file("t/a.png")
            .with_file("t/b.jpg")
            .with_file("t/c.PNG");
        let mut log = ImportLog::new(false);
        let atlas = TextureAtlas::parse(input, Path::new("t"), &fs, &mut log);

        assert_eq!(atlas.region("a").unwrap().rotation_degrees, 90.0);
        assert_eq!(atlas.region("b").unwrap().rotation_degrees, -12.5);
        assert_eq!(atlas.region("c").unwrap().rotation_degrees, 0.0);
        assert!(log.is_empty());
    }

    #[test]
    fn duplicate_declaration_does_not_overwrite() {
        let input = "a.png\n rotate: 30\na.png\n rotate: 60\n";
        let fs = MemoryFs::new().with_file("t/a.png");
        let mut log = ImportLog::new(false);
        let atlas = TextureAtlas::parse(input, Path::new("t"), &fs, &mut log);

        assert_eq!(atlas.len(), 1);
        assert_eq!(atlas.region("a").unwrap().rotation_degrees, 30.0);
        assert_eq!(log.warning_count(), 1);
    }

    #[test]
    fn parsing_is_idempotent() {
        let fs = textures();
        let dir = Path::new("tex");
        let mut log = ImportLog::new(false);

        let first = TextureAtlas::parse(ATLAS, dir, &fs, &mut log);
        let second = TextureAtlas::parse(ATLAS, dir, &fs, &mut log);
        assert_eq!(first, second);

        let mut reloaded = first.clone();
        reloaded.load(ATLAS, dir, &fs, &mut log);
        assert_eq!(reloaded, first);
    }

    #[test]
    fn region_name_stops_at_first_dot() {
        assert_eq!(region_name("hero.body.png"), "hero");
        assert_eq!(region_name("plain"), "plain");
        assert!(is_image_line("page.WebP"));
        assert!(!is_image_line("size: 64, 64"));
        assert!(!is_image_line("notes.txt"));
    }
}
