//! Core types for the rasterizer

use super::fixed::Scalar;
use super::math::{Vec2, Vec3};
use std::fmt;

/// Background colour used when a frame is cleared.
pub const DEFAULT_CLEAR_COLOR: u32 = 0xFF00_0000;

/// Flat colours cycled across faces that carry no texture.
pub const FACE_PALETTE: [u32; 6] = [
    0xFFFF_0000,
    0xFF00_FF00,
    0xFF00_00FF,
    0xFFFF_FF00,
    0xFFFF_00FF,
    0xFF00_FFFF,
];

/// RGBA colour (0-255 per channel). Buffers store it packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack as `0xAARRGGBB`
    pub fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Convert to [u8; 4] (RGBA byte order, for texture uploads)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Handle into the texture table of a resource arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

/// Handle into the mesh table of a resource arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub usize);

/// Which index array a face index points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Vertex,
    TexCoord,
}

/// Error type for mesh and texture loading
#[derive(Debug)]
pub enum AssetError {
    IoError(std::io::Error),
    ImageError(image::ImageError),
    ParseError { line: usize, message: String },
    NonTriangleFace { line: usize, count: usize },
    MissingTexCoords { line: usize },
    IndexOutOfRange { face: usize, kind: IndexKind, index: usize, len: usize },
    UnknownTexture(TextureHandle),
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::IoError(e)
    }
}

impl From<image::ImageError> for AssetError {
    fn from(e: image::ImageError) -> Self {
        AssetError::ImageError(e)
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::IoError(e) => write!(f, "IO error: {}", e),
            AssetError::ImageError(e) => write!(f, "Image error: {}", e),
            AssetError::ParseError { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
            AssetError::NonTriangleFace { line, count } => {
                write!(f, "Face on line {} has {} vertices, expected 3", line, count)
            }
            AssetError::MissingTexCoords { line } => {
                write!(f, "Face on line {} has no texture coordinates", line)
            }
            AssetError::IndexOutOfRange { face, kind, index, len } => write!(
                f,
                "Face {} references {:?} index {} but only {} exist",
                face, kind, index, len
            ),
            AssetError::UnknownTexture(handle) => write!(f, "Unknown texture handle {}", handle.0),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::IoError(e) => Some(e),
            AssetError::ImageError(e) => Some(e),
            _ => None,
        }
    }
}

/// A triangle face (indices into the mesh's vertex and texcoord arrays)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub tex_coords: [usize; 3],
    /// Flat fill used when the mesh has no texture
    pub color: Option<u32>,
}

impl Face {
    pub fn new(vertices: [usize; 3], tex_coords: [usize; 3]) -> Self {
        Self {
            vertices,
            tex_coords,
            color: None,
        }
    }

    pub fn with_color(vertices: [usize; 3], tex_coords: [usize; 3], color: u32) -> Self {
        Self {
            vertices,
            tex_coords,
            color: Some(color),
        }
    }
}

/// Immutable triangle mesh, shared read-only by every entity that draws it
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub faces: Vec<Face>,
    pub texture: Option<TextureHandle>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, tex_coords: Vec<Vec2>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            tex_coords,
            faces,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Check every face index against the vertex and texcoord arrays.
    /// Corrupt indices are rejected here so the renderer never has to.
    pub fn validate(&self) -> Result<(), AssetError> {
        for (face_idx, face) in self.faces.iter().enumerate() {
            for &index in &face.vertices {
                if index >= self.vertices.len() {
                    return Err(AssetError::IndexOutOfRange {
                        face: face_idx,
                        kind: IndexKind::Vertex,
                        index,
                        len: self.vertices.len(),
                    });
                }
            }
            for &index in &face.tex_coords {
                if index >= self.tex_coords.len() {
                    return Err(AssetError::IndexOutOfRange {
                        face: face_idx,
                        kind: IndexKind::TexCoord,
                        index,
                        len: self.tex_coords.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Unit cube centred on the origin, one palette colour per side
    pub fn cube() -> Self {
        let h = Scalar::HALF;
        let vertices = vec![
            // 'front' quad (negative Z)
            Vec3::new(-h, -h, -h), // 0
            Vec3::new(h, -h, -h),  // 1
            Vec3::new(-h, h, -h),  // 2
            Vec3::new(h, h, -h),   // 3
            // 'back' quad (positive Z)
            Vec3::new(-h, -h, h), // 4
            Vec3::new(h, -h, h),  // 5
            Vec3::new(-h, h, h),  // 6
            Vec3::new(h, h, h),   // 7
        ];

        let tex_coords = vec![
            Vec2::from_ints(1, 0),
            Vec2::from_ints(0, 0),
            Vec2::from_ints(0, 1),
            Vec2::from_ints(1, 1),
        ];

        // Each side is a quad (p, q, r, s) split into (p, q, r) and (p, r, s)
        let quads: [[usize; 4]; 6] = [
            [1, 0, 2, 3], // front
            [7, 6, 4, 5], // back
            [3, 2, 6, 7], // bottom
            [5, 4, 0, 1], // top
            [0, 4, 6, 2], // left
            [5, 1, 3, 7], // right
        ];

        let mut faces = Vec::with_capacity(12);
        for (side, q) in quads.iter().enumerate() {
            let color = FACE_PALETTE[side % FACE_PALETTE.len()];
            faces.push(Face::with_color([q[0], q[1], q[2]], [0, 1, 2], color));
            faces.push(Face::with_color([q[0], q[2], q[3]], [0, 2, 3], color));
        }

        Self::new(vertices, tex_coords, faces)
    }

    /// Two triangles sharing a diagonal, facing -Z. Useful for checking
    /// that shared edges are neither doubled nor dropped.
    pub fn adjoining_quad() -> Self {
        let h = Scalar::HALF;
        let z = Scalar::ZERO;
        let vertices = vec![
            Vec3::new(-h, -h, z),
            Vec3::new(h, -h, z),
            Vec3::new(-h, h, z),
            Vec3::new(h, h, z),
        ];
        let tex_coords = vec![
            Vec2::from_ints(0, 0),
            Vec2::from_ints(1, 0),
            Vec2::from_ints(0, 1),
            Vec2::from_ints(1, 1),
        ];
        let faces = vec![
            Face::with_color([2, 1, 0], [2, 1, 0], FACE_PALETTE[0]),
            Face::with_color([2, 3, 1], [2, 3, 1], FACE_PALETTE[1]),
        ];
        Self::new(vertices, tex_coords, faces)
    }
}

/// Texture with packed `0xAARRGGBB` pixels, row-major from the top row
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
    pub name: String,
}

impl Texture {
    pub fn solid(width: usize, height: usize, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        tracing::info!("Loading texture from '{}'", path.display());
        let img = image::open(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let texture = Self::from_image(img, name);
        tracing::info!("Loaded texture '{}' ({}x{})", texture.name, texture.width, texture.height);
        Ok(texture)
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<u32> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]).to_argb())
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: u32, color2: u32) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Get pixel at x,y coordinates
    pub fn color_at(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            DEFAULT_CLEAR_COLOR
        }
    }

    /// Sample at UV coordinates (nearest texel). V points up, as exported by
    /// modelling tools; coordinates outside `[0, 1]` wrap around.
    pub fn sample(&self, u: Scalar, v: Scalar) -> u32 {
        if self.width == 0 || self.height == 0 {
            return DEFAULT_CLEAR_COLOR;
        }
        let u = wrap_unit(u);
        let v = Scalar::ONE - wrap_unit(v);
        let tx = texel_index(u, self.width);
        let ty = texel_index(v, self.height);
        self.pixels[ty * self.width + tx]
    }
}

/// Wrap a texture coordinate into `[0, 1]` by keeping its fractional part.
/// Values already in range (including exactly 1) pass through.
fn wrap_unit(t: Scalar) -> Scalar {
    if t < Scalar::ZERO || t > Scalar::ONE {
        t.fract()
    } else {
        t
    }
}

fn texel_index(t: Scalar, size: usize) -> usize {
    let scaled = (t * Scalar::from_int(size as i32)).to_int();
    scaled.clamp(0, size as i64 - 1) as usize
}
