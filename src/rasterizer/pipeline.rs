//! Geometry pipeline
//!
//! Walks the scene and sends every mesh face through
//! transform -> backface cull -> frustum clip -> fan triangulation ->
//! projection -> rasterization. Degenerate faces are dropped for the frame;
//! nothing here can fail.

use super::clip::{Frustum, Polygon};
use super::fixed::Scalar;
use super::math::{Mat4, Vec2, Vec3, Vec4};
use super::render::RenderTarget;
use super::types::{Mesh, Texture, FACE_PALETTE};
use crate::config::RenderConfig;
use crate::world::{Resources, Scene};

/// Per-frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces_submitted: usize,
    /// Back-facing or degenerate in view space
    pub faces_culled: usize,
    /// Entirely outside the frustum
    pub faces_clipped_away: usize,
    /// Screen-space triangles handed to the rasterizer
    pub triangles_drawn: usize,
}

/// Projection state shared by every frame
pub struct Renderer {
    projection: Mat4,
    frustum: Frustum,
    clear_color: u32,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        let params = config.projection_params();
        let renderer = Self::with_params(config.width, config.height, params.fov_y, params.near, params.far)
            .with_clear_color(config.clear_color);
        tracing::info!(
            "Renderer {}x{}, fov {} deg, planes {}..{}",
            config.width,
            config.height,
            config.fov_y_degrees,
            config.near,
            config.far
        );
        renderer
    }

    /// `far` must differ from `near`. [`RenderConfig::validate`] checks this
    /// and the other projection divisors.
    pub fn with_params(width: usize, height: usize, fov_y: Scalar, near: Scalar, far: Scalar) -> Self {
        let aspect = aspect_ratio(width, height);
        Self {
            projection: Mat4::perspective(fov_y, aspect, near, far),
            frustum: Frustum::new(fov_y, aspect, near, far),
            clear_color: super::types::DEFAULT_CLEAR_COLOR,
        }
    }

    pub fn with_clear_color(mut self, color: u32) -> Self {
        self.clear_color = color;
        self
    }

    /// Clear `target` and draw every mesh in the scene from the scene camera
    pub fn render(&self, scene: &Scene, resources: &Resources, target: &mut RenderTarget) -> FrameStats {
        target.clear_buffers_with(self.clear_color);
        let mut stats = FrameStats::default();

        let Some(view) = scene.camera.view_matrix() else {
            tracing::debug!("Degenerate camera orientation, skipping frame");
            return stats;
        };

        scene.visit_meshes(|entity, handle| match resources.mesh(handle) {
            Some(mesh) => self.draw_mesh(
                &view,
                entity.position,
                entity.rotation,
                mesh,
                resources,
                target,
                &mut stats,
            ),
            None => tracing::warn!("Entity references missing mesh {:?}", handle),
        });
        stats
    }

    /// Draw one mesh placed at `position` with Euler `rotation`
    #[allow(clippy::too_many_arguments)]
    pub fn draw_mesh(
        &self,
        view: &Mat4,
        position: Vec3,
        rotation: Vec3,
        mesh: &Mesh,
        resources: &Resources,
        target: &mut RenderTarget,
        stats: &mut FrameStats,
    ) {
        let model_view = *view * Mat4::translation(position) * Mat4::rotation(rotation);
        let texture = mesh.texture.and_then(|h| resources.texture(h));

        for (index, face) in mesh.faces.iter().enumerate() {
            stats.faces_submitted += 1;
            let Some((points, uvs)) = face_attributes(mesh, index) else {
                tracing::trace!("Face {} has out-of-range indices", index);
                stats.faces_culled += 1;
                continue;
            };

            let view_points = points.map(|p| (model_view * p.to_point()).xyz());
            if !is_front_facing(&view_points) {
                stats.faces_culled += 1;
                continue;
            }

            let Some(clipped) = self.frustum.clip(Polygon::from_triangle(view_points, uvs)) else {
                stats.faces_clipped_away += 1;
                continue;
            };

            let color = face.color.unwrap_or(FACE_PALETTE[index % FACE_PALETTE.len()]);
            for (tri, tri_uvs) in clipped.triangles() {
                let Some(screen) = self.project(&tri, target.width, target.height) else {
                    tracing::trace!("Face {} projected degenerate, skipped", index);
                    continue;
                };
                draw_screen_triangle(target, screen, tri_uvs, texture, color);
                stats.triangles_drawn += 1;
            }
        }
    }

    /// Project view-space points to pixel coordinates, keeping view-space `w`
    fn project(&self, tri: &[Vec3; 3], width: usize, height: usize) -> Option<[Vec4; 3]> {
        let half_w = Scalar::from_i64(width as i64) / Scalar::from_int(2);
        let half_h = Scalar::from_i64(height as i64) / Scalar::from_int(2);

        let mut out = [Vec4::default(); 3];
        for (slot, p) in out.iter_mut().zip(tri) {
            let clip = self.projection * p.to_point();
            if clip.w <= Scalar::ZERO {
                return None;
            }
            let ndc_x = clip.x.checked_div(clip.w)?;
            let ndc_y = clip.y.checked_div(clip.w)?;
            *slot = Vec4::new(ndc_x * half_w + half_w, ndc_y * half_h + half_h, clip.z, clip.w);
        }
        Some(out)
    }
}

/// Width over height. Dimensions are clamped to at least one pixel.
pub fn aspect_ratio(width: usize, height: usize) -> Scalar {
    let w = Scalar::from_i64(width.max(1) as i64);
    let h = Scalar::from_i64(height.max(1) as i64);
    w / h
}

fn face_attributes(mesh: &Mesh, index: usize) -> Option<([Vec3; 3], [Vec2; 3])> {
    let face = mesh.faces.get(index)?;
    let mut points = [Vec3::ZERO; 3];
    let mut uvs = [Vec2::ZERO; 3];
    for i in 0..3 {
        points[i] = *mesh.vertices.get(face.vertices[i])?;
        // Untextured meshes may carry no UVs at all
        uvs[i] = mesh.tex_coords.get(face.tex_coords[i]).copied().unwrap_or(Vec2::ZERO);
    }
    Some((points, uvs))
}

/// The camera sits at the view-space origin: a face is visible when its
/// normal points back towards it. Zero-area faces have no normal and are
/// treated as hidden.
fn is_front_facing(points: &[Vec3; 3]) -> bool {
    let (Some(ab), Some(ac)) = (
        (points[1] - points[0]).try_normalize(),
        (points[2] - points[0]).try_normalize(),
    ) else {
        return false;
    };
    let Some(normal) = ab.cross(ac).try_normalize() else {
        return false;
    };
    let to_camera = -points[0];
    normal.dot(to_camera) > Scalar::ZERO
}

fn draw_screen_triangle(
    target: &mut RenderTarget,
    screen: [Vec4; 3],
    uvs: [Vec2; 3],
    texture: Option<&Texture>,
    color: u32,
) {
    let [a, b, c] = screen;
    match texture {
        Some(texture) => target.draw_textured_triangle(a, b, c, uvs[0], uvs[1], uvs[2], texture),
        None => target.draw_filled_triangle(a, b, c, color),
    }
}
