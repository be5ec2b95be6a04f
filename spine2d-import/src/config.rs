use serde::{Deserialize, Serialize};

/// Frames per second used when baking keyframes.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Options recognized by [`Importer`](crate::Importer).
///
/// Passed in at call time; the importer keeps no state between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportConfig {
    /// Uniform multiplier for bone positions and lengths.
    pub scale: f32,
    pub frame_rate: u32,
    /// Skip the animation step entirely when false.
    pub import_animation: bool,
    /// Keep per-element info entries in the import log.
    pub verbose_logging: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            frame_rate: DEFAULT_FRAME_RATE,
            import_animation: true,
            verbose_logging: false,
        }
    }
}

impl ImportConfig {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_animation(mut self, import_animation: bool) -> Self {
        self.import_animation = import_animation;
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub fn from_json_str(input: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(input).map_err(|e| crate::Error::JsonParse {
            message: e.to_string(),
        })
    }
}
