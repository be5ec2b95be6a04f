use crate::{
    BakedTimeline, DEFAULT_FRAME_RATE, Error, FileSystem, ImportConfig, ImportLog, InputKind,
    LocalFs, SceneHost, SceneSummary, Skeleton, SkeletonDocument, Stage, TextureAtlas,
    bake_document, build_skeleton, materialize,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Counts and messages from one import run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub bones_created: usize,
    pub textures_loaded: usize,
    pub animations_imported: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// The skeleton document parsed and at least one bone was created.
    pub succeeded: bool,
}

impl fmt::Display for ImportResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded {
            write!(
                f,
                "import succeeded: {} bones, {} textures, {} animations ({} warnings, {} errors)",
                self.bones_created,
                self.textures_loaded,
                self.animations_imported,
                self.warnings.len(),
                self.errors.len()
            )
        } else {
            match self.errors.first() {
                Some(error) => write!(f, "import failed: {error}"),
                None => f.write_str("import failed"),
            }
        }
    }
}

/// Everything an import produced. Hand it to [`Import::materialize`] to build the scene.
#[derive(Clone, Debug)]
pub struct Import {
    pub result: ImportResult,
    pub atlas: TextureAtlas,
    pub skeleton: Skeleton,
    pub timeline: BakedTimeline,
    pub log: ImportLog,
}

impl Import {
    fn fatal(error: Error, mut log: ImportLog, frame_rate: u32) -> Self {
        log.error(Stage::Input, error.to_string());
        Self {
            result: ImportResult {
                errors: vec![error.to_string()],
                ..ImportResult::default()
            },
            atlas: TextureAtlas::default(),
            skeleton: Skeleton::default(),
            timeline: BakedTimeline::empty(frame_rate),
            log,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.result.succeeded
    }

    /// Creates the imported bones, quads and keys on `host`. Scene-level warnings, such as
    /// a slot whose texture region is missing, go to `log`.
    pub fn materialize<H: SceneHost>(&self, host: &mut H, log: &mut ImportLog) -> SceneSummary {
        materialize(&self.skeleton, &self.atlas, &self.timeline, host, log)
    }
}

/// Runs the import pipeline: atlas, skeleton, then animations.
#[derive(Clone, Debug, Default)]
pub struct Importer<F = LocalFs> {
    config: ImportConfig,
    fs: F,
}

impl Importer<LocalFs> {
    pub fn new(config: ImportConfig) -> Self {
        Self::with_fs(config, LocalFs)
    }
}

impl<F: FileSystem> Importer<F> {
    pub fn with_fs(config: ImportConfig, fs: F) -> Self {
        Self { config, fs }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn new_log(&self) -> ImportLog {
        ImportLog::new(self.config.verbose_logging)
    }

    fn frame_rate(&self) -> u32 {
        match self.config.frame_rate {
            0 => DEFAULT_FRAME_RATE,
            rate => rate,
        }
    }

    /// Reads the three inputs from the file system and imports them. A missing or
    /// unreadable input stops the run before anything is built.
    pub fn import_paths(
        &self,
        skeleton_path: &Path,
        atlas_path: &Path,
        texture_dir: &Path,
    ) -> Import {
        let log = self.new_log();
        match self.read_inputs(skeleton_path, atlas_path, texture_dir) {
            Ok((skeleton_json, atlas_text)) => {
                self.import_with_log(&skeleton_json, &atlas_text, texture_dir, log)
            }
            Err(e) => Import::fatal(e, log, self.frame_rate()),
        }
    }

    /// Imports an in-memory skeleton document and atlas. Only the texture directory is
    /// looked up on the file system.
    pub fn import_documents(
        &self,
        skeleton_json: &str,
        atlas_text: &str,
        texture_dir: &Path,
    ) -> Import {
        self.import_with_log(skeleton_json, atlas_text, texture_dir, self.new_log())
    }

    /// Like [`Self::import_documents`] for a document that is already parsed.
    pub fn import_document(
        &self,
        doc: &SkeletonDocument,
        atlas_text: &str,
        texture_dir: &Path,
    ) -> Import {
        let log = self.new_log();
        if let Err(e) = self.check_texture_dir(texture_dir) {
            return Import::fatal(e, log, self.frame_rate());
        }
        self.run(doc, atlas_text, texture_dir, log)
    }

    fn import_with_log(
        &self,
        skeleton_json: &str,
        atlas_text: &str,
        texture_dir: &Path,
        log: ImportLog,
    ) -> Import {
        if let Err(e) = self.check_texture_dir(texture_dir) {
            return Import::fatal(e, log, self.frame_rate());
        }
        let doc = match SkeletonDocument::from_json_str(skeleton_json) {
            Ok(doc) => doc,
            Err(e) => return Import::fatal(e, log, self.frame_rate()),
        };
        self.run(&doc, atlas_text, texture_dir, log)
    }

    fn read_inputs(
        &self,
        skeleton_path: &Path,
        atlas_path: &Path,
        texture_dir: &Path,
    ) -> Result<(String, String), Error> {
        self.check_file(InputKind::SkeletonDocument, skeleton_path)?;
        self.check_file(InputKind::Atlas, atlas_path)?;
        self.check_texture_dir(texture_dir)?;

        let read = |kind, path: &Path| {
            self.fs.read_to_string(path).map_err(|source| Error::Io {
                kind,
                path: path.to_path_buf(),
                source,
            })
        };
        Ok((
            read(InputKind::SkeletonDocument, skeleton_path)?,
            read(InputKind::Atlas, atlas_path)?,
        ))
    }

    fn check_file(&self, kind: InputKind, path: &Path) -> Result<(), Error> {
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyPath { kind });
        }
        if !self.fs.is_file(path) {
            return Err(Error::MissingInput {
                kind,
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn check_texture_dir(&self, path: &Path) -> Result<(), Error> {
        let kind = InputKind::TextureDirectory;
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyPath { kind });
        }
        if !self.fs.is_dir(path) {
            return Err(Error::MissingInput {
                kind,
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn run(
        &self,
        doc: &SkeletonDocument,
        atlas_text: &str,
        texture_dir: &Path,
        mut log: ImportLog,
    ) -> Import {
        log.info(Stage::Input, "loading textures");
        let atlas = TextureAtlas::parse(atlas_text, texture_dir, &self.fs, &mut log);

        log.info(Stage::Input, "building skeleton");
        let skeleton = build_skeleton(doc, self.config.scale, &mut log);

        let timeline = if self.config.import_animation {
            log.info(Stage::Input, "importing animations");
            bake_document(doc, &skeleton, self.config.frame_rate, &mut log)
        } else {
            log.info(Stage::Input, "animation import disabled");
            BakedTimeline::empty(self.frame_rate())
        };

        if skeleton.is_empty() {
            log.error(Stage::Bones, "no bones were created");
        }

        let result = ImportResult {
            bones_created: skeleton.bones.len(),
            textures_loaded: atlas.len(),
            animations_imported: timeline.clips.len(),
            warnings: log.warnings().map(str::to_string).collect(),
            errors: log.errors().map(str::to_string).collect(),
            succeeded: !skeleton.is_empty(),
        };
        log::info!(target: "spine2d_import", "{result}");

        Import {
            result,
            atlas,
            skeleton,
            timeline,
            log,
        }
    }
}

/// Imports from disk with [`LocalFs`].
pub fn import(
    skeleton_path: &Path,
    atlas_path: &Path,
    texture_dir: &Path,
    config: ImportConfig,
) -> Import {
    Importer::new(config).import_paths(skeleton_path, atlas_path, texture_dir)
}
