//! Resource table for meshes and textures
//!
//! Created once at startup and passed by reference to whatever needs it.
//! Entities refer to assets through handles, never by owning them.

use std::path::Path;

use crate::rasterizer::{AssetError, Mesh, MeshHandle, Texture, TextureHandle};

use super::obj;

#[derive(Debug, Default)]
pub struct Resources {
    textures: Vec<Texture>,
    meshes: Vec<Mesh>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        let handle = TextureHandle(self.textures.len());
        tracing::debug!(
            "Registered texture '{}' ({}x{}) as {:?}",
            texture.name,
            texture.width,
            texture.height,
            handle
        );
        self.textures.push(texture);
        handle
    }

    /// Register a mesh after checking its indices and texture handle.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<MeshHandle, AssetError> {
        mesh.validate()?;
        if let Some(texture) = mesh.texture {
            if texture.0 >= self.textures.len() {
                return Err(AssetError::UnknownTexture(texture));
            }
        }

        let handle = MeshHandle(self.meshes.len());
        tracing::debug!(
            "Registered mesh with {} vertices, {} faces as {:?}",
            mesh.vertices.len(),
            mesh.faces.len(),
            handle
        );
        self.meshes.push(mesh);
        Ok(handle)
    }

    /// Load an OBJ file (and optionally an image to texture it with)
    pub fn load_mesh<P: AsRef<Path>>(
        &mut self,
        obj_path: P,
        texture_path: Option<&Path>,
    ) -> Result<MeshHandle, AssetError> {
        let mut mesh = obj::load_obj(obj_path)?;
        if let Some(path) = texture_path {
            let texture = self.add_texture(Texture::from_file(path)?);
            mesh = mesh.with_texture(texture);
        }
        self.add_mesh(mesh)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Face, IndexKind};

    #[test]
    fn test_handles_are_sequential() {
        let mut resources = Resources::new();
        let t = resources.add_texture(Texture::solid(2, 2, 0xFFFF_FFFF));
        let a = resources.add_mesh(Mesh::cube()).unwrap();
        let b = resources.add_mesh(Mesh::adjoining_quad().with_texture(t)).unwrap();
        assert_eq!((a, b), (MeshHandle(0), MeshHandle(1)));
        assert_eq!(resources.mesh(b).and_then(|m| m.texture), Some(t));
        assert_eq!(resources.texture(t).map(|t| t.width), Some(2));
        assert!(resources.mesh(MeshHandle(5)).is_none());
    }

    #[test]
    fn test_rejects_unknown_texture() {
        let mut resources = Resources::new();
        let mesh = Mesh::adjoining_quad().with_texture(TextureHandle(3));
        assert!(matches!(
            resources.add_mesh(mesh),
            Err(AssetError::UnknownTexture(TextureHandle(3)))
        ));
        assert_eq!(resources.mesh_count(), 0);
    }

    #[test]
    fn test_rejects_corrupt_indices() {
        let mut resources = Resources::new();
        let mut mesh = Mesh::adjoining_quad();
        mesh.faces.push(Face::new([0, 1, 2], [0, 1, 7]));
        match resources.add_mesh(mesh) {
            Err(AssetError::IndexOutOfRange { kind, index, .. }) => {
                assert_eq!((kind, index), (IndexKind::TexCoord, 7));
            }
            other => panic!("expected index error, got {:?}", other),
        }
    }
}
