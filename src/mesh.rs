//! Triangle meshes and OBJ/PLY loading.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use ply_rs_bw::parser::Parser;
use ply_rs_bw::ply::{DefaultElement, Property};

use crate::colors::Color;
use crate::math::vec3::Vec3;

/// A triangle defined by three 0-based indices into the mesh's vertex list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Face {
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    pub fn indices(&self) -> [u32; 3] {
        [self.a, self.b, self.c]
    }
}

/// A vertex in object space with an optional per-vertex color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Option<Color>,
}

impl Vertex {
    pub const fn new(position: Vec3) -> Self {
        Self {
            position,
            color: None,
        }
    }

    pub const fn colored(position: Vec3, color: Color) -> Self {
        Self {
            position,
            color: Some(color),
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Obj(tobj::LoadError),
    /// The PLY file could not be opened or parsed.
    Ply(io::Error),
    /// A PLY element is missing a property or references a missing vertex.
    Malformed(String),
    /// The file parsed but contained no triangles.
    Empty,
}

impl From<tobj::LoadError> for LoadError {
    fn from(err: tobj::LoadError) -> Self {
        LoadError::Obj(err)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Obj(err) => write!(f, "obj error: {}", err),
            LoadError::Ply(err) => write!(f, "ply error: {}", err),
            LoadError::Malformed(msg) => write!(f, "malformed mesh: {}", msg),
            LoadError::Empty => write!(f, "mesh contains no triangles"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Obj(err) => Some(err),
            LoadError::Ply(err) => Some(err),
            LoadError::Malformed(_) | LoadError::Empty => None,
        }
    }
}

/// An indexed triangle mesh.
///
/// Vertex order is identity: face indices refer to positions in
/// [`vertices`](Mesh::vertices).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Builds a mesh from flat position and optional color lists.
    ///
    /// Colors are only attached when `colors` has one entry per position.
    pub fn from_parts(positions: &[Vec3], colors: Option<&[Color]>, faces: Vec<Face>) -> Self {
        let colors = colors.filter(|c| c.len() == positions.len());
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| Vertex {
                position: p,
                color: colors.map(|c| c[i]),
            })
            .collect();
        Self { vertices, faces }
    }

    /// Load every object in an OBJ file and merge them into one mesh.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(path, &Self::load_options())?;
        let mesh = Self::from_models(&models)?;
        log::info!(
            "Loaded {}: {} vertices, {} faces, colors: {}.",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.has_colors()
        );
        Ok(mesh)
    }

    /// Parse OBJ text from a reader. Material libraries are ignored.
    pub fn from_obj_reader<R: BufRead>(reader: &mut R) -> Result<Self, LoadError> {
        let (models, _materials) = tobj::load_obj_buf(reader, &Self::load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })?;
        Self::from_models(&models)
    }

    /// Load a PLY file with optional per-vertex `red`/`green`/`blue`.
    pub fn from_ply<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(LoadError::Ply)?;
        let mesh = Self::from_ply_reader(&mut BufReader::new(file))?;
        log::info!(
            "Loaded {}: {} vertices, {} faces, colors: {}.",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.has_colors()
        );
        Ok(mesh)
    }

    /// Parse an ASCII or binary PLY stream.
    ///
    /// Integer color channels are scaled by 1/255, float channels are taken
    /// as they are. Polygons are fanned into triangles.
    pub fn from_ply_reader<R: Read>(reader: &mut R) -> Result<Self, LoadError> {
        let ply = Parser::<DefaultElement>::new()
            .read_ply(reader)
            .map_err(LoadError::Ply)?;
        let no_elements = Vec::new();
        let vertex_elements = ply.payload.get("vertex").unwrap_or(&no_elements);
        let face_elements = ply.payload.get("face").unwrap_or(&no_elements);

        let mut vertices = Vec::with_capacity(vertex_elements.len());
        for (i, element) in vertex_elements.iter().enumerate() {
            let coord = |name: &str| {
                element
                    .get(name)
                    .and_then(scalar)
                    .ok_or_else(|| LoadError::Malformed(format!("vertex {} has no {}", i, name)))
            };
            let position = Vec3::new(coord("x")?, coord("y")?, coord("z")?);
            let color = match (
                element.get("red").and_then(channel),
                element.get("green").and_then(channel),
                element.get("blue").and_then(channel),
            ) {
                (Some(r), Some(g), Some(b)) => Some(Color::new(r, g, b)),
                _ => None,
            };
            vertices.push(Vertex { position, color });
        }

        let mut faces = Vec::with_capacity(face_elements.len());
        for (i, element) in face_elements.iter().enumerate() {
            let indices = element
                .get("vertex_indices")
                .or_else(|| element.get("vertex_index"))
                .and_then(index_list)
                .ok_or_else(|| LoadError::Malformed(format!("face {} has no vertex indices", i)))?;
            if let Some(&bad) = indices.iter().find(|&&v| v as usize >= vertices.len()) {
                return Err(LoadError::Malformed(format!(
                    "face {} references vertex {} of {}",
                    i,
                    bad,
                    vertices.len()
                )));
            }
            for k in 1..indices.len().saturating_sub(1) {
                faces.push(Face::new(indices[0], indices[k], indices[k + 1]));
            }
        }

        if faces.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { vertices, faces })
    }

    fn load_options() -> tobj::LoadOptions {
        tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        }
    }

    fn from_models(models: &[tobj::Model]) -> Result<Self, LoadError> {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for model in models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            let has_colors = mesh.vertex_color.len() == mesh.positions.len();

            for (i, p) in mesh.positions.chunks_exact(3).enumerate() {
                let position = Vec3::new(p[0], p[1], p[2]);
                let color = has_colors.then(|| {
                    let c = &mesh.vertex_color[i * 3..i * 3 + 3];
                    Color::new(c[0], c[1], c[2])
                });
                vertices.push(Vertex { position, color });
            }

            faces.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|f| Face::new(base + f[0], base + f[1], base + f[2])),
            );
        }

        if faces.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True if every vertex carries its own color.
    pub fn has_colors(&self) -> bool {
        !self.vertices.is_empty() && self.vertices.iter().all(|v| v.color.is_some())
    }

    /// Object-space positions in vertex order.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| v.position).collect()
    }
}

fn scalar(property: &Property) -> Option<f32> {
    match *property {
        Property::Char(v) => Some(v as f32),
        Property::UChar(v) => Some(v as f32),
        Property::Short(v) => Some(v as f32),
        Property::UShort(v) => Some(v as f32),
        Property::Int(v) => Some(v as f32),
        Property::UInt(v) => Some(v as f32),
        Property::Float(v) => Some(v),
        Property::Double(v) => Some(v as f32),
        _ => None,
    }
}

fn channel(property: &Property) -> Option<f32> {
    match property {
        Property::Float(_) | Property::Double(_) => scalar(property),
        _ => scalar(property).map(|v| v / 255.0),
    }
}

fn index_list(property: &Property) -> Option<Vec<u32>> {
    fn convert<T: Copy + TryInto<u32>>(values: &[T]) -> Option<Vec<u32>> {
        values.iter().map(|&v| v.try_into().ok()).collect()
    }
    match property {
        Property::ListChar(v) => convert(v.as_slice()),
        Property::ListUChar(v) => convert(v.as_slice()),
        Property::ListShort(v) => convert(v.as_slice()),
        Property::ListUShort(v) => convert(v.as_slice()),
        Property::ListInt(v) => convert(v.as_slice()),
        Property::ListUInt(v) => convert(v.as_slice()),
        _ => None,
    }
}
