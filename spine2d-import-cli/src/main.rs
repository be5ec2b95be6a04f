use glam::Vec2;
use serde_json::json;
use spine2d_import::{
    BakedKey, BakedValue, Bone, Channel, ImportConfig, ImportLog, Importer, SceneHost, Slot,
    TextureRegion,
};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "usage: spine2d-import <skeleton.json> <file.atlas> <texture-dir> \
[--config <options.json>] [--scale <f>] [--frame-rate <n>] [--no-animation] [--verbose] \
[--scene] [--json]";

#[derive(Debug)]
struct Args {
    skeleton: PathBuf,
    atlas: PathBuf,
    textures: PathBuf,
    config: ImportConfig,
    scene: bool,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut positional = Vec::<String>::new();
    let mut config_path: Option<PathBuf> = None;
    let mut scale: Option<f32> = None;
    let mut frame_rate: Option<u32> = None;
    let mut no_animation = false;
    let mut verbose = false;
    let mut scene = false;
    let mut json = false;

    let mut i = 0usize;
    while i < args.len() {
        let value = |name: &str| {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{name} needs a value"))
        };
        match args[i].as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(value("--config")?));
                i += 2;
            }
            "--scale" => {
                let raw = value("--scale")?;
                scale = Some(raw.parse().map_err(|_| format!("invalid --scale '{raw}'"))?);
                i += 2;
            }
            "--frame-rate" => {
                let raw = value("--frame-rate")?;
                frame_rate = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid --frame-rate '{raw}'"))?,
                );
                i += 2;
            }
            "--no-animation" => {
                no_animation = true;
                i += 1;
            }
            "--verbose" => {
                verbose = true;
                i += 1;
            }
            "--scene" => {
                scene = true;
                i += 1;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            other if other.starts_with("--") => return Err(format!("unknown option '{other}'")),
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let [skeleton, atlas, textures] = <[String; 3]>::try_from(positional)
        .map_err(|got| format!("expected 3 paths, got {}", got.len()))?;

    let mut config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            ImportConfig::from_json_str(&text).map_err(|e| e.to_string())?
        }
        None => ImportConfig::default(),
    };
    if let Some(scale) = scale {
        config.scale = scale;
    }
    if let Some(frame_rate) = frame_rate {
        config.frame_rate = frame_rate;
    }
    if no_animation {
        config.import_animation = false;
    }
    if verbose {
        config.verbose_logging = true;
    }

    Ok(Args {
        skeleton: PathBuf::from(skeleton),
        atlas: PathBuf::from(atlas),
        textures: PathBuf::from(textures),
        config,
        scene,
        json,
    })
}

/// Prints the scene calls as an indented outline instead of building anything.
#[derive(Default)]
struct OutlineHost {
    names: Vec<String>,
}

impl OutlineHost {
    fn add(&mut self, name: String) -> usize {
        self.names.push(name);
        self.names.len() - 1
    }
}

impl SceneHost for OutlineHost {
    type Node = usize;

    fn create_bone(&mut self, bone: &Bone) -> usize {
        println!(
            "bone {} at ({:.3}, {:.3}) length {:.3} rotation {:.1}",
            bone.name, bone.position.x, bone.position.y, bone.length, bone.rotation_degrees
        );
        self.add(bone.name.clone())
    }

    fn set_parent(&mut self, child: usize, parent: usize) {
        println!("  {} -> {}", self.names[child], self.names[parent]);
    }

    fn create_quad(&mut self, slot: &Slot, bone: usize, size: Vec2) -> usize {
        println!(
            "quad {} on {} ({:.2} x {:.2})",
            slot.name, self.names[bone], size.x, size.y
        );
        self.add(slot.name.clone())
    }

    fn bind_texture(&mut self, quad: usize, region: &TextureRegion) {
        println!(
            "  {} <- {} (rotate {})",
            self.names[quad],
            region.source_path.display(),
            region.rotation_degrees
        );
    }

    fn set_animation_range(&mut self, start_frame: u32, end_frame: u32) {
        println!("timeline {start_frame}..{end_frame}");
    }

    fn set_time(&mut self, _frame: u32) {}

    fn set_key(&mut self, bone: usize, channel: Channel, key: &BakedKey) {
        match key.value {
            BakedValue::Vec2(v) => println!(
                "  key {} {channel} @{}: ({:.3}, {:.3})",
                self.names[bone], key.frame, v.x, v.y
            ),
            BakedValue::Degrees(d) => println!(
                "  key {} {channel} @{}: {d:.2}",
                self.names[bone], key.frame
            ),
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let importer = Importer::new(args.config.clone());
    let import = importer.import_paths(&args.skeleton, &args.atlas, &args.textures);

    if args.scene && import.succeeded() {
        let mut scene_log = ImportLog::new(args.config.verbose_logging);
        let summary = import.materialize(&mut OutlineHost::default(), &mut scene_log);
        for entry in scene_log.entries() {
            eprintln!("{entry}");
        }
        log::info!(
            "scene: {} bones, {} quads, {} keys",
            summary.bones,
            summary.quads,
            summary.keys
        );
    }

    for entry in import.log.entries() {
        eprintln!("{entry}");
    }

    if args.json {
        let report = json!({
            "result": &import.result,
            "log": import.log.entries(),
            "durationFrames": import.timeline.duration_frames,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("failed to serialize report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", import.result);
    }

    if import.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
