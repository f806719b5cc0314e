//! TOML scene files: per-chunk rectangles of visible faces.
//!
//! ```toml
//! [[chunk]]
//! coord = [0, 0, 0]
//!
//! [[chunk.run]]
//! dir = "top"
//! depth = 8
//! x = [0, 16]
//! y = [0, 16]
//! color = [120, 180, 80, 255]
//! texture = 3
//! ```

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use slicemesh_mesher::{
    CHUNK_SIZE, FaceAttrs, FaceDirection, LitFace, MAX_LIGHT_LEVEL, PackedLight, Rgba,
};
use slicemesh_runtime::ChunkCoord;

#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "scene read error: {}", e),
            SceneError::Parse(e) => write!(f, "scene parse error: {}", e),
            SceneError::Invalid(msg) => write!(f, "invalid scene: {}", msg),
        }
    }
}

impl Error for SceneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            SceneError::Parse(e) => Some(e),
            SceneError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<toml::de::Error> for SceneError {
    fn from(e: toml::de::Error) -> Self {
        SceneError::Parse(e)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub chunk: Vec<ChunkScene>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChunkScene {
    #[serde(default)]
    pub coord: [i32; 3],
    #[serde(default)]
    pub run: Vec<FaceRun>,
}

/// A filled rectangle of faces in one slice. `x` and `y` are half-open ranges.
#[derive(Clone, Debug, Deserialize)]
pub struct FaceRun {
    pub dir: String,
    pub depth: usize,
    pub x: [u16; 2],
    pub y: [u16; 2],
    #[serde(default = "default_color")]
    pub color: [u8; 4],
    #[serde(default = "default_sun")]
    pub sun: u8,
    #[serde(default)]
    pub torch: u8,
    #[serde(default)]
    pub texture: u16,
}

fn default_color() -> [u8; 4] {
    Rgba::WHITE.0
}

fn default_sun() -> u8 {
    MAX_LIGHT_LEVEL
}

/// A validated chunk: its faces in submission order.
#[derive(Clone, Debug)]
pub struct SceneChunk {
    pub coord: ChunkCoord,
    pub faces: Vec<LitFace>,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub chunks: Vec<SceneChunk>,
}

impl SceneConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

impl Scene {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        Self::from_config(SceneConfig::from_path(path)?)
    }

    /// Validates every run and expands it into unit faces, y-major then x.
    pub fn from_config(cfg: SceneConfig) -> Result<Self, SceneError> {
        let mut chunks = Vec::with_capacity(cfg.chunk.len());
        for (ci, chunk) in cfg.chunk.into_iter().enumerate() {
            let [cx, cy, cz] = chunk.coord;
            let coord = ChunkCoord::new(cx, cy, cz);
            let mut seen = vec![false; FaceDirection::COUNT * CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE];
            let mut faces = Vec::new();
            for (ri, run) in chunk.run.iter().enumerate() {
                let fail = |msg: String| SceneError::Invalid(format!("chunk {ci} {coord} run {ri}: {msg}"));
                let dir: FaceDirection = run.dir.parse().map_err(|e| fail(format!("{e}")))?;
                check_run(run).map_err(fail)?;
                let attrs = FaceAttrs::new(
                    Rgba(run.color),
                    PackedLight::new(run.sun, run.torch),
                    run.texture,
                );
                for y in run.y[0]..run.y[1] {
                    for x in run.x[0]..run.x[1] {
                        let cell = ((dir.index() * CHUNK_SIZE + run.depth) * CHUNK_SIZE
                            + y as usize)
                            * CHUNK_SIZE
                            + x as usize;
                        if std::mem::replace(&mut seen[cell], true) {
                            return Err(fail(format!(
                                "face ({x}, {y}) on {dir}@{} already covered by an earlier run",
                                run.depth
                            )));
                        }
                        faces.push(LitFace {
                            dir,
                            x: f32::from(x),
                            y: f32::from(y),
                            depth: run.depth,
                            attrs,
                        });
                    }
                }
            }
            sort_scan_order(&mut faces);
            chunks.push(SceneChunk { coord, faces });
        }
        Ok(Scene { chunks })
    }

    pub fn face_count(&self) -> usize {
        self.chunks.iter().map(|c| c.faces.len()).sum()
    }
}

fn check_run(run: &FaceRun) -> Result<(), String> {
    if run.depth >= CHUNK_SIZE {
        return Err(format!("depth {} outside [0, {CHUNK_SIZE})", run.depth));
    }
    for (name, [lo, hi]) in [("x", run.x), ("y", run.y)] {
        if lo >= hi || usize::from(hi) > CHUNK_SIZE {
            return Err(format!("{name} range [{lo}, {hi}) must be non-empty within [0, {CHUNK_SIZE}]"));
        }
    }
    if run.sun > MAX_LIGHT_LEVEL || run.torch > MAX_LIGHT_LEVEL {
        return Err(format!(
            "light sun={} torch={} above {MAX_LIGHT_LEVEL}",
            run.sun, run.torch
        ));
    }
    Ok(())
}

// Runs in one slice may interleave rows; the mesher wants every slice in y-then-x order.
fn sort_scan_order(faces: &mut [LitFace]) {
    faces.sort_by(|a, b| {
        (a.dir.index(), a.depth)
            .cmp(&(b.dir.index(), b.depth))
            .then(a.y.total_cmp(&b.y))
            .then(a.x.total_cmp(&b.x))
    });
}
