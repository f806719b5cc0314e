//! Worker pool that meshes chunks off the caller's thread (slim, engine-only).
#![forbid(unsafe_code)]

mod mesher_pool;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use slicemesh_geom::{Aabb, Vec3};
use slicemesh_mesher::{CHUNK_SIZE, FaceAttrs, FlushStats, LitBuild, LitFace, LitMesher};

pub use crate::mesher_pool::{MesherPool, PooledMesher};

pub type LitMesherPool = MesherPool<f32, FaceAttrs>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// World-space offset of this chunk's local frame.
    #[inline]
    pub fn world_origin(self) -> Vec3 {
        let s = CHUNK_SIZE as f32;
        Vec3::new(self.cx as f32 * s, self.cy as f32 * s, self.cz as f32 * s)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.cx, self.cy, self.cz)
    }
}

/// Mesh buffers for one chunk, in chunk-local coordinates.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    /// `None` for a chunk with no visible faces.
    pub bbox: Option<Aabb>,
    pub build: LitBuild,
    pub stats: FlushStats,
}

#[derive(Clone, Debug)]
pub struct MeshJob {
    pub coord: ChunkCoord,
    pub job_id: u64,
    /// Visible faces in submission order.
    pub faces: Arc<[LitFace]>,
}

pub struct MeshOut {
    pub coord: ChunkCoord,
    pub job_id: u64,
    pub mesh: ChunkMesh,
    pub t_mesh_us: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub workers: usize,
    pub max_meshers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8);
        Self {
            workers,
            max_meshers: workers,
        }
    }
}

impl RuntimeConfig {
    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            max_meshers: workers,
        }
    }
}

/// Meshes `faces` on a caller-owned mesher. The mesher is left cleared.
/// `build` is cleared first so a recycled buffer keeps its capacity.
pub fn mesh_chunk(
    mesher: &mut LitMesher,
    coord: ChunkCoord,
    faces: &[LitFace],
    mut build: LitBuild,
) -> ChunkMesh {
    build.clear_keep_capacity();
    mesher.add_faces(faces);
    let stats = mesher.flush_triangles(&mut build);
    mesher.clear();
    let bbox = Aabb::from_positions(&build.pos);
    ChunkMesh {
        coord,
        bbox,
        build,
        stats,
    }
}

fn process_mesh_job(job: MeshJob, meshers: &LitMesherPool, tx: &Sender<MeshOut>) {
    let MeshJob {
        coord,
        job_id,
        faces,
    } = job;
    let (mesh, t_mesh_us) = {
        let mut mesher = meshers.acquire();
        let t0 = Instant::now();
        let mesh = mesh_chunk(&mut mesher, coord, &faces, LitBuild::new());
        (mesh, t0.elapsed().as_micros().min(u128::from(u32::MAX)) as u32)
    };
    log::debug!(
        "job {job_id} chunk {coord}: {} in {t_mesh_us}us",
        mesh.stats
    );
    let _ = tx.send(MeshOut {
        coord,
        job_id,
        mesh,
        t_mesh_us,
    });
}

pub struct MeshRuntime {
    job_tx: Sender<MeshJob>,
    res_rx: Receiver<MeshOut>,
    _pool: Arc<ThreadPool>,
    meshers: Arc<LitMesherPool>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    pub workers: usize,
}

impl MeshRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self, ThreadPoolBuildError> {
        let (job_tx, job_rx) = unbounded::<MeshJob>();
        let (res_tx, res_rx) = unbounded::<MeshOut>();

        let workers = config.workers.max(1);
        let meshers = Arc::new(LitMesherPool::new(config.max_meshers.max(1)));
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("slicemesh-mesh-{i}"))
                .build()?,
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let meshers = meshers.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    process_mesh_job(job, meshers.as_ref(), &tx);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::debug!(
            "mesh runtime: {workers} worker(s), up to {} mesher(s)",
            meshers.max_meshers()
        );

        Ok(Self {
            job_tx,
            res_rx,
            _pool: pool,
            meshers,
            queued,
            inflight,
            workers,
        })
    }

    pub fn submit(&self, job: MeshJob) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn try_recv(&self) -> Option<MeshOut> {
        self.res_rx.try_recv().ok()
    }

    /// Blocks until a result arrives.
    pub fn recv(&self) -> Option<MeshOut> {
        self.res_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<MeshOut> {
        self.res_rx.recv_timeout(timeout).ok()
    }

    pub fn drain_results(&self) -> Vec<MeshOut> {
        self.res_rx.try_iter().collect()
    }

    /// Jobs submitted but not yet picked up by a worker.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Relaxed)
    }

    pub fn meshers_allocated(&self) -> usize {
        self.meshers.allocated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicemesh_mesher::{FaceDirection, PackedLight, Rgba};

    fn row(len: usize) -> Vec<LitFace> {
        (0..len)
            .map(|x| LitFace {
                dir: FaceDirection::Top,
                x: x as f32,
                y: 0.0,
                depth: 8,
                attrs: FaceAttrs::new(Rgba::WHITE, PackedLight::FULL_SUN, 0),
            })
            .collect()
    }

    #[test]
    fn world_origin_scales_by_chunk_size() {
        let o = ChunkCoord::new(1, -2, 3).world_origin();
        assert_eq!(o, Vec3::new(16.0, -32.0, 48.0));
    }

    #[test]
    fn mesh_chunk_bounds_and_clears() {
        let mut mesher = LitMesher::new();
        let mesh = mesh_chunk(&mut mesher, ChunkCoord::default(), &row(4), LitBuild::new());
        assert_eq!(mesh.stats.quads, 1);
        let bbox = mesh.bbox.expect("non-empty mesh has bounds");
        assert_eq!(bbox.min, Vec3::new(-8.0, 1.0, -8.0));
        assert_eq!(bbox.max, Vec3::new(-4.0, 1.0, -7.0));
        assert_eq!(mesher.pending_candidates(), 0);
    }

    #[test]
    fn empty_chunk_has_no_bounds() {
        let mut mesher = LitMesher::new();
        let mesh = mesh_chunk(&mut mesher, ChunkCoord::default(), &[], LitBuild::new());
        assert!(mesh.bbox.is_none());
        assert!(mesh.build.is_empty());
    }

    #[test]
    fn mesh_time_excludes_pool_wait() {
        let meshers = Arc::new(LitMesherPool::new(1));
        let held = meshers.acquire();
        let (tx, rx) = unbounded();
        let worker = {
            let meshers = Arc::clone(&meshers);
            thread::spawn(move || {
                let job = MeshJob {
                    coord: ChunkCoord::default(),
                    job_id: 1,
                    faces: row(4).into(),
                };
                process_mesh_job(job, &meshers, &tx);
            })
        };
        thread::sleep(Duration::from_millis(300));
        drop(held);
        let out = rx.recv_timeout(Duration::from_secs(30)).expect("job result");
        let _ = worker.join();
        assert_eq!(out.mesh.stats.quads, 1);
        assert!(out.t_mesh_us < 300_000, "timed the pool wait: {}us", out.t_mesh_us);
    }

    #[test]
    fn config_never_asks_for_zero_workers() {
        let c = RuntimeConfig::with_workers(0);
        assert_eq!((c.workers, c.max_meshers), (1, 1));
        assert!(RuntimeConfig::default().workers >= 1);
    }
}
