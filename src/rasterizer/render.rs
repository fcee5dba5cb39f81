//! Render target and triangle rasterization
//!
//! Triangles are filled by walking their screen bounding box with three
//! incrementally updated edge functions. Textures are sampled with
//! perspective-correct UVs and every write is depth tested.

use super::fixed::Scalar;
use super::math::{edge_function, Vec2, Vec4};
use super::types::{Color, Texture, DEFAULT_CLEAR_COLOR};

/// Colour + depth buffers, allocated once at a fixed size
pub struct RenderTarget {
    pub width: usize,
    pub height: usize,
    pixels: Vec<u32>,  // 0xAARRGGBB, row-major
    depth: Vec<Scalar>, // smaller = nearer
}

impl RenderTarget {
    /// Depth stored by a clear; any drawn fragment is nearer.
    pub const FAR_DEPTH: Scalar = Scalar::MAX;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![DEFAULT_CLEAR_COLOR; width * height],
            depth: vec![Self::FAR_DEPTH; width * height],
        }
    }

    /// Reset colour to the default background and depth to infinitely far
    pub fn clear_buffers(&mut self) {
        self.clear_buffers_with(DEFAULT_CLEAR_COLOR);
    }

    pub fn clear_buffers_with(&mut self, color: u32) {
        self.pixels.fill(color);
        self.depth.fill(Self::FAR_DEPTH);
    }

    /// Raw ARGB pixels for presentation
    pub fn buffer(&self) -> &[u32] {
        &self.pixels
    }

    /// RGBA bytes, 4 per pixel (texture upload format)
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&argb| Color::from_argb(argb).to_bytes())
            .collect()
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn pixel_at(&self, x: usize, y: usize) -> Option<u32> {
        self.index(x as i64, y as i64).map(|i| self.pixels[i])
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<Scalar> {
        self.index(x as i64, y as i64).map(|i| self.depth[i])
    }

    /// Write a pixel, ignoring coordinates outside the target
    pub fn draw_pixel(&mut self, x: i64, y: i64, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Filled rectangle, both corners inclusive
    pub fn draw_rectangle(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: u32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let min_x = x1.min(x2).max(0);
        let max_x = x1.max(x2).min(self.width as i64 - 1);
        let min_y = y1.min(y2).max(0);
        let max_y = y1.max(y2).min(self.height as i64 - 1);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.draw_pixel(x, y, color);
            }
        }
    }

    /// Draw a line with DDA stepping along the longer axis
    pub fn draw_line(&mut self, a: Vec2, b: Vec2, color: u32) {
        // Step through pixel centres
        let a = Vec2::new(a.x + Scalar::HALF, a.y + Scalar::HALF);
        let b = Vec2::new(b.x + Scalar::HALF, b.y + Scalar::HALF);

        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let side = dx.abs().max(dy.abs());
        if side.is_zero() {
            self.draw_pixel(a.x.to_int(), a.y.to_int(), color);
            return;
        }

        let steps = side.to_int();
        let x_inc = dx / side;
        let y_inc = dy / side;
        // Only walk the steps that can land inside the target
        let Some((x_lo, x_hi)) = visible_steps(a.x, x_inc, self.width, steps) else {
            return;
        };
        let Some((y_lo, y_hi)) = visible_steps(a.y, y_inc, self.height, steps) else {
            return;
        };
        for i in x_lo.max(y_lo)..=x_hi.min(y_hi) {
            let t = Scalar::from_i64(i);
            self.draw_pixel((a.x + x_inc * t).to_int(), (a.y + y_inc * t).to_int(), color);
        }
    }

    /// Solid 2D triangle without depth testing (overlays, debug drawing)
    pub fn draw_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: u32) {
        let width = self.width;
        let pixels = &mut self.pixels;
        rasterize(self.width, self.height, a, b, c, |x, y, _| {
            pixels[y * width + x] = color;
        });
    }

    /// Depth-tested solid triangle. Vertices carry screen `x`, `y` and the
    /// view-space `w` used for depth.
    pub fn draw_filled_triangle(&mut self, a: Vec4, b: Vec4, c: Vec4, color: u32) {
        let Some(inv_w) = reciprocal_ws(a, b, c) else {
            return;
        };

        let width = self.width;
        let pixels = &mut self.pixels;
        let depth = &mut self.depth;
        rasterize(self.width, self.height, a.xy(), b.xy(), c.xy(), |x, y, weights| {
            let one_over_w = interpolate(weights, inv_w);
            if one_over_w <= Scalar::ZERO {
                return;
            }
            let i = y * width + x;
            let z = Scalar::ONE - one_over_w;
            // Strict less-than: the first fragment written at a given depth wins
            if z < depth[i] {
                depth[i] = z;
                pixels[i] = color;
            }
        });
    }

    /// Depth-tested textured triangle with perspective-correct UVs
    #[allow(clippy::too_many_arguments)]
    pub fn draw_textured_triangle(
        &mut self,
        a: Vec4,
        b: Vec4,
        c: Vec4,
        ta: Vec2,
        tb: Vec2,
        tc: Vec2,
        texture: &Texture,
    ) {
        let Some(inv_w) = reciprocal_ws(a, b, c) else {
            return;
        };
        // u/w and v/w are linear in screen space; u and v are not
        let u_over_w = [ta.x * inv_w[0], tb.x * inv_w[1], tc.x * inv_w[2]];
        let v_over_w = [ta.y * inv_w[0], tb.y * inv_w[1], tc.y * inv_w[2]];

        let width = self.width;
        let pixels = &mut self.pixels;
        let depth = &mut self.depth;
        rasterize(self.width, self.height, a.xy(), b.xy(), c.xy(), |x, y, weights| {
            let one_over_w = interpolate(weights, inv_w);
            if one_over_w <= Scalar::ZERO {
                return;
            }
            let i = y * width + x;
            let z = Scalar::ONE - one_over_w;
            // Strict less-than: the first fragment written at a given depth wins
            if z >= depth[i] {
                return;
            }
            let (Some(u), Some(v)) = (
                interpolate(weights, u_over_w).checked_div(one_over_w),
                interpolate(weights, v_over_w).checked_div(one_over_w),
            ) else {
                return;
            };
            depth[i] = z;
            pixels[i] = texture.sample(u, v);
        });
    }
}

/// Range of DDA steps `i` in `0..=steps` for which `start + inc * i` can fall
/// in `[0, limit)`, padded by one step either side for rounding.
fn visible_steps(start: Scalar, inc: Scalar, limit: usize, steps: i64) -> Option<(i64, i64)> {
    let end = Scalar::from_i64(limit as i64);
    if inc.is_zero() {
        return (start >= Scalar::ZERO && start < end).then_some((0, steps));
    }
    let t0 = (Scalar::ZERO - start) / inc;
    let t1 = (end - start) / inc;
    let lo = t0.min(t1).floor().to_int().saturating_sub(1).max(0);
    let hi = t0.max(t1).ceil().to_int().saturating_add(1).min(steps);
    (lo <= hi).then_some((lo, hi))
}

fn reciprocal_ws(a: Vec4, b: Vec4, c: Vec4) -> Option<[Scalar; 3]> {
    Some([a.w.recip()?, b.w.recip()?, c.w.recip()?])
}

fn interpolate(weights: [Scalar; 3], values: [Scalar; 3]) -> Scalar {
    weights[0] * values[0] + weights[1] * values[1] + weights[2] * values[2]
}

/// Top-left fill rule: left edges (running down the screen) and top edges
/// (horizontal, running left) lose ties. Shared edges are therefore filled by
/// exactly one of the two triangles that meet there.
fn fill_bias(from: Vec2, to: Vec2) -> Scalar {
    let edge = to - from;
    let is_left = edge.y > Scalar::ZERO;
    let is_top = edge.y.is_zero() && edge.x < Scalar::ZERO;
    if is_left || is_top {
        -Scalar::EPSILON
    } else {
        Scalar::ZERO
    }
}

/// Visit every pixel whose centre lies inside triangle `(a, b, c)`, passing
/// the barycentric weights of `a`, `b` and `c` at that centre.
///
/// Triangles whose winding determinant is not positive (back-facing after
/// projection, or degenerate) are skipped. The bounding box is clamped to
/// `width` x `height`, so `plot` only ever sees valid coordinates.
fn rasterize<F>(width: usize, height: usize, a: Vec2, b: Vec2, c: Vec2, mut plot: F)
where
    F: FnMut(usize, usize, [Scalar; 3]),
{
    let area = edge_function(a, b, c);
    if area <= Scalar::ZERO || width == 0 || height == 0 {
        return;
    }

    let min_x = a.x.min(b.x).min(c.x).floor().to_int().max(0);
    let min_y = a.y.min(b.y).min(c.y).floor().to_int().max(0);
    let max_x = a.x.max(b.x).max(c.x).ceil().to_int().min(width as i64 - 1);
    let max_y = a.y.max(b.y).max(c.y).ceil().to_int().min(height as i64 - 1);
    if min_x > max_x || min_y > max_y {
        return;
    }

    // Edge values at the centre of the top-left pixel of the box; every
    // other pixel is reached by constant steps
    let start = Vec2::new(
        Scalar::from_i64(min_x) + Scalar::HALF,
        Scalar::from_i64(min_y) + Scalar::HALF,
    );
    let mut row = [
        edge_function(b, c, start),
        edge_function(c, a, start),
        edge_function(a, b, start),
    ];
    let bias = [fill_bias(b, c), fill_bias(c, a), fill_bias(a, b)];
    let dwdx = [c.y - b.y, a.y - c.y, b.y - a.y];
    let dwdy = [b.x - c.x, c.x - a.x, a.x - b.x];

    for y in min_y..=max_y {
        let mut w = row;
        for x in min_x..=max_x {
            if w[0] + bias[0] >= Scalar::ZERO
                && w[1] + bias[1] >= Scalar::ZERO
                && w[2] + bias[2] >= Scalar::ZERO
            {
                let alpha = w[0] / area;
                let beta = w[1] / area;
                let gamma = Scalar::ONE - alpha - beta;
                plot(x as usize, y as usize, [alpha, beta, gamma]);
            }
            for i in 0..3 {
                w[i] += dwdx[i];
            }
        }
        for i in 0..3 {
            row[i] += dwdy[i];
        }
    }
}
