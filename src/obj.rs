//! Wavefront OBJ export of meshed chunks.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use slicemesh_geom::Vec3;
use slicemesh_mesher::{GeometryBuild, LitBuild};

/// Streams several chunk meshes into one OBJ, keeping the 1-based face indices straight.
pub struct ObjWriter<W: Write> {
    out: W,
    // Vertices written so far; `v`, `vn` and `vt` stay in lockstep for lit meshes.
    written: usize,
}

impl ObjWriter<BufWriter<fs::File>> {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(fs::File::create(path)?)))
    }
}

impl<W: Write> ObjWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn vertices_written(&self) -> usize {
        self.written
    }

    fn object(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "o {name}")
    }

    fn positions(&mut self, origin: Vec3, pos: &[f32]) -> io::Result<()> {
        for p in pos.chunks_exact(3) {
            writeln!(
                self.out,
                "v {} {} {}",
                p[0] + origin.x,
                p[1] + origin.y,
                p[2] + origin.z
            )?;
        }
        Ok(())
    }

    pub fn write_geometry(&mut self, name: &str, origin: Vec3, build: &GeometryBuild) -> io::Result<()> {
        self.object(name)?;
        self.positions(origin, &build.pos)?;
        let base = self.written + 1;
        for t in build.idx.chunks_exact(3) {
            writeln!(
                self.out,
                "f {} {} {}",
                base + t[0] as usize,
                base + t[1] as usize,
                base + t[2] as usize
            )?;
        }
        self.written += build.vertex_count();
        Ok(())
    }

    /// Texture index and light ride in the UV stream but only (u, v) is written.
    pub fn write_lit(&mut self, name: &str, origin: Vec3, build: &LitBuild) -> io::Result<()> {
        self.object(name)?;
        self.positions(origin, &build.pos)?;
        for n in build.norm.chunks_exact(3) {
            writeln!(self.out, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        for uv in build.uv.chunks_exact(4) {
            writeln!(self.out, "vt {} {}", uv[0], uv[1])?;
        }
        let base = self.written + 1;
        for t in build.idx.chunks_exact(3) {
            let (a, b, c) = (
                base + t[0] as usize,
                base + t[1] as usize,
                base + t[2] as usize,
            );
            writeln!(self.out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        self.written += build.vertex_count();
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
