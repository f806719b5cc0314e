use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use slicemesh_mesher::{FlushStats, GeometryBuild, GeometryMesher, LitBuild, LitMesher};
use slicemesh_runtime::{ChunkCoord, ChunkMesh, MeshJob, MeshRuntime, RuntimeConfig, mesh_chunk};

mod obj;
mod scene;

use obj::ObjWriter;
use scene::{Scene, SceneChunk, SceneError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Positions and indices only.
    Geometry,
    /// Normals, UVs with texture and light, optional vertex colors.
    Lit,
}

/// Greedy-mesh a TOML scene of voxel faces.
#[derive(Debug, Parser)]
#[command(name = "slicemesh", version)]
struct Cli {
    /// Scene file (TOML).
    scene: PathBuf,
    #[arg(long, value_enum, default_value_t = Variant::Lit)]
    variant: Variant,
    /// Write all chunk meshes to one Wavefront OBJ file.
    #[arg(long)]
    obj: Option<PathBuf>,
    /// Mesh every chunk this many times and check the output never changes.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,
    /// Mesh on a worker pool of this many threads (lit only).
    #[arg(long)]
    workers: Option<usize>,
    /// Omit the per-vertex color stream.
    #[arg(long)]
    no_colors: bool,
}

struct GeometryChunk {
    coord: ChunkCoord,
    build: GeometryBuild,
    stats: FlushStats,
}

fn lit_build(colors: bool) -> LitBuild {
    if colors {
        LitBuild::new()
    } else {
        LitBuild::without_colors()
    }
}

fn mismatch(chunk: &SceneChunk, rep: u32) -> SceneError {
    SceneError::Invalid(format!(
        "chunk {} meshed differently on repetition {}",
        chunk.coord, rep
    ))
}

fn mesh_geometry(scene: &Scene, repeat: u32) -> Result<Vec<GeometryChunk>, SceneError> {
    let mut mesher = GeometryMesher::new();
    let mut out = Vec::with_capacity(scene.chunks.len());
    for chunk in &scene.chunks {
        let mut first: Option<GeometryChunk> = None;
        for rep in 0..repeat {
            for f in &chunk.faces {
                mesher.add_quad(f.dir, f.x as u16, f.y as u16, f.depth);
            }
            let mut build = GeometryBuild::new();
            let stats = mesher.flush_triangles(&mut build);
            mesher.clear();
            match &first {
                None => {
                    first = Some(GeometryChunk {
                        coord: chunk.coord,
                        build,
                        stats,
                    })
                }
                Some(f) if f.build != build => return Err(mismatch(chunk, rep)),
                Some(_) => {}
            }
        }
        out.extend(first);
    }
    Ok(out)
}

fn mesh_lit_inline(scene: &Scene, repeat: u32, colors: bool) -> Result<Vec<ChunkMesh>, SceneError> {
    let mut mesher = LitMesher::new();
    let mut out = Vec::with_capacity(scene.chunks.len());
    for chunk in &scene.chunks {
        let first = mesh_chunk(&mut mesher, chunk.coord, &chunk.faces, lit_build(colors));
        for rep in 1..repeat {
            let again = mesh_chunk(&mut mesher, chunk.coord, &chunk.faces, lit_build(colors));
            if again.build != first.build {
                return Err(mismatch(chunk, rep));
            }
        }
        out.push(first);
    }
    Ok(out)
}

fn mesh_lit_workers(
    scene: &Scene,
    repeat: u32,
    colors: bool,
    workers: usize,
) -> Result<Vec<ChunkMesh>, Box<dyn Error>> {
    let runtime = MeshRuntime::new(RuntimeConfig::with_workers(workers))?;
    log::info!("meshing on {} worker thread(s)", runtime.workers);
    let repeat = repeat as usize;
    let jobs: Vec<MeshJob> = scene
        .chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| MeshJob {
            coord: chunk.coord,
            job_id: i as u64,
            faces: chunk.faces.as_slice().into(),
        })
        .collect();
    for rep in 0..repeat {
        for job in &jobs {
            runtime.submit(MeshJob {
                job_id: (rep * jobs.len()) as u64 + job.job_id,
                ..job.clone()
            });
        }
    }

    let mut results: Vec<Option<ChunkMesh>> = vec![None; jobs.len()];
    for _ in 0..jobs.len() * repeat {
        let done = runtime
            .recv()
            .ok_or_else(|| SceneError::Invalid("mesh workers stopped early".to_string()))?;
        let i = done.job_id as usize % jobs.len();
        let rep = (done.job_id as usize / jobs.len()) as u32;
        match &results[i] {
            None => results[i] = Some(done.mesh),
            Some(prev) if prev.build != done.mesh.build => {
                return Err(mismatch(&scene.chunks[i], rep).into());
            }
            Some(_) => {}
        }
    }

    Ok(results
        .into_iter()
        .flatten()
        .map(|mut mesh| {
            if !colors {
                mesh.build.col = None;
            }
            mesh
        })
        .collect())
}

fn report(coord: ChunkCoord, stats: &FlushStats, total: &mut FlushStats) {
    log::info!("chunk {coord}: {stats}");
    total.faces += stats.faces;
    total.quads += stats.quads;
    total.vertices += stats.vertices;
    total.indices += stats.indices;
}

fn chunk_name(coord: ChunkCoord) -> String {
    format!("chunk_{}_{}_{}", coord.cx, coord.cy, coord.cz)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let scene = Scene::load(&cli.scene)?;
    log::info!(
        "loaded {:?}: {} chunk(s), {} face(s)",
        cli.scene,
        scene.chunks.len(),
        scene.face_count()
    );

    let colors = !cli.no_colors;
    let mut obj = cli.obj.as_ref().map(ObjWriter::create).transpose()?;
    let mut total = FlushStats::default();
    let t0 = Instant::now();

    match cli.variant {
        Variant::Geometry => {
            if cli.workers.is_some() {
                log::warn!("--workers only applies to the lit variant; meshing inline");
            }
            for chunk in mesh_geometry(&scene, cli.repeat)? {
                report(chunk.coord, &chunk.stats, &mut total);
                if let Some(w) = obj.as_mut() {
                    w.write_geometry(&chunk_name(chunk.coord), chunk.coord.world_origin(), &chunk.build)?;
                }
            }
        }
        Variant::Lit => {
            let meshes = match cli.workers {
                Some(n) if n > 0 => mesh_lit_workers(&scene, cli.repeat, colors, n)?,
                _ => mesh_lit_inline(&scene, cli.repeat, colors)?,
            };
            for mesh in &meshes {
                report(mesh.coord, &mesh.stats, &mut total);
                if let Some(bbox) = mesh.bbox {
                    log::debug!("chunk {} bounds {:?}..{:?}", mesh.coord, bbox.min, bbox.max);
                }
                if let Some(w) = obj.as_mut() {
                    w.write_lit(&chunk_name(mesh.coord), mesh.coord.world_origin(), &mesh.build)?;
                }
            }
        }
    }

    log::info!(
        "total: {total} in {:.2}ms",
        t0.elapsed().as_secs_f64() * 1000.0
    );
    if let (Some(w), Some(path)) = (obj, cli.obj.as_ref()) {
        let written = w.vertices_written();
        w.finish()?;
        log::info!("wrote {written} vertices to {:?}", path);
    }
    Ok(())
}
