//! Polygon clipping against view-frustum planes
//!
//! Sutherland-Hodgman, one plane at a time. Positions and texture coordinates
//! are carried in lockstep so every emitted vertex has a matching UV.

use super::fixed::Scalar;
use super::math::{Vec2, Vec3};

/// Half-space boundary: points with `normal . (p - point) > 0` are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    pub fn signed_distance(&self, p: Vec3) -> Scalar {
        (p - self.point).dot(self.normal)
    }
}

/// Transient clip polygon: parallel position / texcoord lists of equal length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polygon {
    pub vertices: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
}

impl Polygon {
    pub fn from_triangle(vertices: [Vec3; 3], tex_coords: [Vec2; 3]) -> Self {
        Self {
            vertices: vertices.to_vec(),
            tex_coords: tex_coords.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(n),
            tex_coords: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, vertex: Vec3, tex_coord: Vec2) {
        self.vertices.push(vertex);
        self.tex_coords.push(tex_coord);
    }

    /// Fan triangulation from vertex 0: `(0,1,2), (0,2,3), ...`.
    /// Only valid for convex polygons, which clipping a triangle against
    /// convex half-spaces always yields.
    pub fn triangles(&self) -> impl Iterator<Item = ([Vec3; 3], [Vec2; 3])> + '_ {
        (1..self.len().saturating_sub(1)).map(move |i| {
            (
                [self.vertices[0], self.vertices[i], self.vertices[i + 1]],
                [self.tex_coords[0], self.tex_coords[i], self.tex_coords[i + 1]],
            )
        })
    }
}

/// Clip `polygon` against a single plane.
///
/// Walks edges cyclically (last -> first included). When an edge's endpoints
/// lie strictly on opposite sides, the crossing point is emitted first; then
/// the current vertex is emitted if it is strictly inside. Vertices exactly on
/// the plane count as outside.
pub fn clip_polygon(polygon: &Polygon, plane: &Plane) -> Polygon {
    let n = polygon.len();
    if n == 0 {
        return polygon.clone();
    }

    let mut out = Polygon::with_capacity(n + 1);
    let mut prev_v = polygon.vertices[n - 1];
    let mut prev_t = polygon.tex_coords[n - 1];
    let mut prev_d = plane.signed_distance(prev_v);

    for (&cur_v, &cur_t) in polygon.vertices.iter().zip(&polygon.tex_coords) {
        let cur_d = plane.signed_distance(cur_v);

        // Sign test without multiplying (the product can saturate)
        let crosses = (prev_d > Scalar::ZERO && cur_d < Scalar::ZERO)
            || (prev_d < Scalar::ZERO && cur_d > Scalar::ZERO);
        if crosses {
            let t = prev_d / (prev_d - cur_d);
            out.push(prev_v.lerp(cur_v, t), prev_t.lerp(cur_t, t));
        }

        if cur_d > Scalar::ZERO {
            out.push(cur_v, cur_t);
        }

        prev_v = cur_v;
        prev_t = cur_t;
        prev_d = cur_d;
    }

    out
}

/// Identifies a frustum plane; the discriminant is its clipping order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
    Near = 4,
    Far = 5,
}

impl FrustumPlane {
    /// Clipping order
    pub const ALL: [FrustumPlane; 6] = [
        FrustumPlane::Left,
        FrustumPlane::Right,
        FrustumPlane::Top,
        FrustumPlane::Bottom,
        FrustumPlane::Near,
        FrustumPlane::Far,
    ];
}

/// The six view-space planes bounding what the camera can see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Build the frustum matching [`Mat4::perspective`](super::math::Mat4::perspective)
    /// for the same arguments. Side normals are derived from the tangent of
    /// each half-angle, so no inverse trig is needed.
    pub fn new(fov_y: Scalar, aspect: Scalar, near: Scalar, far: Scalar) -> Self {
        let half = fov_y / Scalar::from_int(2);
        let tan_y = half.sin() / half.cos();
        let tan_x = tan_y * aspect;

        let o = Scalar::ZERO;
        let one = Scalar::ONE;
        let origin = Vec3::ZERO;
        let side = |x: Scalar, y: Scalar, z: Scalar| {
            let n = Vec3::new(x, y, z);
            Plane::new(origin, n.try_normalize().unwrap_or(n))
        };

        Self {
            planes: [
                side(one, o, tan_x),
                side(-one, o, tan_x),
                side(o, -one, tan_y),
                side(o, one, tan_y),
                Plane::new(Vec3::new(o, o, near), Vec3::FORWARD),
                Plane::new(Vec3::new(o, o, far), -Vec3::FORWARD),
            ],
        }
    }

    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    /// Clip against every plane in order, stopping as soon as fewer than
    /// three vertices remain.
    pub fn clip(&self, polygon: Polygon) -> Option<Polygon> {
        let mut current = polygon;
        for which in FrustumPlane::ALL {
            current = clip_polygon(&current, self.plane(which));
            if current.len() < 3 {
                return None;
            }
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon {
            vertices: vec![
                Vec3::from_ints(2, 0, 1),
                Vec3::from_ints(-2, 0, 1),
                Vec3::from_ints(-2, 2, 1),
                Vec3::from_ints(2, 2, 1),
            ],
            tex_coords: vec![
                Vec2::from_ints(1, 0),
                Vec2::from_ints(0, 0),
                Vec2::from_ints(0, 1),
                Vec2::from_ints(1, 1),
            ],
        }
    }

    fn x_plane() -> Plane {
        Plane::new(Vec3::ZERO, Vec3::from_ints(1, 0, 0))
    }

    #[test]
    fn test_fully_inside_is_unchanged() {
        let plane = Plane::new(Vec3::from_ints(-5, 0, 0), Vec3::from_ints(1, 0, 0));
        assert_eq!(clip_polygon(&square(), &plane), square());
    }

    #[test]
    fn test_fully_outside_is_empty() {
        let plane = Plane::new(Vec3::from_ints(5, 0, 0), Vec3::from_ints(1, 0, 0));
        assert!(clip_polygon(&square(), &plane).is_empty());
    }

    #[test]
    fn test_straddling_plane() {
        let clipped = clip_polygon(&square(), &x_plane());
        let half = Scalar::HALF;
        assert_eq!(
            clipped.vertices,
            vec![
                Vec3::from_ints(2, 0, 1),
                Vec3::from_ints(0, 0, 1),
                Vec3::from_ints(0, 2, 1),
                Vec3::from_ints(2, 2, 1),
            ]
        );
        // UVs interpolated at the same t (0.5) as positions
        assert_eq!(
            clipped.tex_coords,
            vec![
                Vec2::from_ints(1, 0),
                Vec2::new(half, Scalar::ZERO),
                Vec2::new(half, Scalar::ONE),
                Vec2::from_ints(1, 1),
            ]
        );
    }

    #[test]
    fn test_reclip_strictly_inside_is_unchanged() {
        let once = clip_polygon(&square(), &x_plane());
        // Every vertex of `once` has x >= 0, strictly inside x > -1
        let inner = Plane::new(Vec3::from_ints(-1, 0, 0), Vec3::from_ints(1, 0, 0));
        assert_eq!(clip_polygon(&once, &inner), once);
    }

    #[test]
    fn test_reclip_same_plane_drops_boundary_vertices() {
        let once = clip_polygon(&square(), &x_plane());
        let twice = clip_polygon(&once, &x_plane());
        assert_eq!(twice.vertices, vec![Vec3::from_ints(2, 0, 1), Vec3::from_ints(2, 2, 1)]);
        assert_eq!(twice.triangles().count(), 0);
    }

    #[test]
    fn test_vertex_on_plane_counts_as_outside() {
        let tri = Polygon::from_triangle(
            [Vec3::from_ints(0, 0, 1), Vec3::from_ints(2, 0, 1), Vec3::from_ints(2, 2, 1)],
            [Vec2::ZERO; 3],
        );
        let clipped = clip_polygon(&tri, &x_plane());
        assert_eq!(clipped.vertices, vec![Vec3::from_ints(2, 0, 1), Vec3::from_ints(2, 2, 1)]);
    }

    #[test]
    fn test_empty_passes_through() {
        let empty = Polygon::default();
        assert_eq!(clip_polygon(&empty, &x_plane()), empty);
    }

    #[test]
    fn test_fan_triangulation() {
        let tris: Vec<_> = square().triangles().collect();
        assert_eq!(tris.len(), 2);
        let v = square().vertices;
        assert_eq!(tris[0].0, [v[0], v[1], v[2]]);
        assert_eq!(tris[1].0, [v[0], v[2], v[3]]);
    }

    fn frustum() -> Frustum {
        Frustum::new(Scalar::FRAC_PI_2, Scalar::ONE, Scalar::from_f32(0.1), Scalar::from_int(100))
    }

    #[test]
    fn test_frustum_keeps_visible_triangle() {
        let tri = Polygon::from_triangle(
            [Vec3::from_ints(0, 0, 5), Vec3::from_ints(0, 1, 5), Vec3::from_ints(1, 0, 5)],
            [Vec2::ZERO; 3],
        );
        assert_eq!(frustum().clip(tri.clone()), Some(tri));
    }

    #[test]
    fn test_frustum_rejects_behind_camera() {
        let tri = Polygon::from_triangle(
            [Vec3::from_ints(0, 0, -5), Vec3::from_ints(0, 1, -5), Vec3::from_ints(1, 0, -5)],
            [Vec2::ZERO; 3],
        );
        assert_eq!(frustum().clip(tri), None);
    }

    #[test]
    fn test_frustum_near_plane_split() {
        // One vertex in front of the near plane: the triangle becomes a quad
        let tri = Polygon::from_triangle(
            [Vec3::from_f32(0.0, 0.0, 0.05), Vec3::from_ints(0, 1, 3), Vec3::from_ints(1, 0, 3)],
            [Vec2::ZERO; 3],
        );
        let clipped = frustum().clip(tri).expect("partially visible");
        assert_eq!(clipped.len(), 4);
        assert_eq!(clipped.triangles().count(), 2);
        let near = Scalar::from_f32(0.1);
        let slack = Scalar::from_bits(8);
        assert!(clipped.vertices.iter().all(|v| v.z + slack >= near));
    }

    #[test]
    fn test_random_clips_stay_inside_frustum() {
        let mut rng = fastrand::Rng::with_seed(42);
        let f = frustum();
        // Intersection points carry one step of `t` rounding across edges up to ~110 long
        let slack = Scalar::from_bits(1 << 10);
        let mut changed = 0;
        let mut strict_reclips = 0;
        for _ in 0..200 {
            // Side planes sit at |x| = |y| = z, so +-40 at z = 10 crosses them often
            let mut pick = || Scalar::from_bits(rng.i64(-(40 << 16)..(40 << 16)));
            let z = Scalar::from_int(10);
            let tri = Polygon::from_triangle(
                [Vec3::new(pick(), pick(), z), Vec3::new(pick(), pick(), z), Vec3::new(pick(), pick(), z)],
                [Vec2::ZERO; 3],
            );
            let Some(once) = f.clip(tri.clone()) else {
                continue;
            };
            if once != tri {
                changed += 1;
            }
            for which in FrustumPlane::ALL {
                let plane = f.plane(which);
                assert!(once.vertices.iter().all(|v| plane.signed_distance(*v) + slack >= Scalar::ZERO));
                if once.vertices.iter().all(|v| plane.signed_distance(*v) > Scalar::ZERO) {
                    assert_eq!(clip_polygon(&once, plane), once);
                    strict_reclips += 1;
                }
            }
        }
        assert!(changed > 0, "no triangle was actually clipped");
        assert!(strict_reclips > 0);
    }
}
