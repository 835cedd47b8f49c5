//! Pure-computation rasterization of a [`Frame`] into an RGBA8 buffer.
//!
//! This module is always available (no feature gate) so that the `png`
//! snapshot path and any host that wants raw pixels share the same
//! conversion. It is a preview renderer: sprites become filled discs, the
//! point cloud goes through a fixed perspective camera, and the cube is drawn
//! as its twelve edges.

use glam::{DVec2, DVec3, Mat4, Vec3, Vec4};
use particle_sphere_core::color::Srgb;
use particle_sphere_core::error::EngineError;
use particle_sphere_core::projection::{Projector, Rotation, Sprite};
use particle_sphere_core::Frame;
use std::ops::RangeInclusive;

/// Point-cloud camera: eye on +z looking at the origin.
const CAMERA_DISTANCE: f32 = 4.0;
const CAMERA_FOV_DEG: f32 = 60.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 100.0;

/// Cube half-side as a fraction of the shorter image side.
const CUBE_HALF_FRACTION: f64 = 0.25;
const CUBE_EDGE_SAMPLES: usize = 96;
const CUBE_COLOR: Srgb = Srgb {
    r: 0.85,
    g: 0.88,
    b: 0.95,
};
const CUBE_GLOW_COLOR: Srgb = Srgb {
    r: 0.55,
    g: 0.75,
    b: 1.0,
};

/// Glow halo radius relative to the sprite radius, and its strength.
const GLOW_SCALE: f64 = 2.5;
const GLOW_STRENGTH: f64 = 0.25;

/// An RGBA8 image being composited.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Creates an opaque raster filled with `background`.
    ///
    /// Returns `EngineError::InvalidExtent` for a zero or overflowing size.
    pub fn new(width: usize, height: usize, background: Srgb) -> Result<Self, EngineError> {
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                EngineError::InvalidExtent(format!("raster size {width}x{height} is unusable"))
            })?;
        let [r, g, b] = background.to_rgb8();
        let mut data = Vec::with_capacity(len);
        for _ in 0..width * height {
            data.extend_from_slice(&[r, g, b, 255]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGB at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize * self.width + x as usize) * 4)
    }

    /// Source-over compositing of `color` at `alpha`.
    fn blend(&mut self, x: i64, y: i64, color: Srgb, alpha: f64) {
        let Some(i) = self.offset(x, y) else { return };
        let alpha = alpha.clamp(0.0, 1.0);
        let src = color.to_rgb8();
        for (dst, s) in self.data[i..i + 3].iter_mut().zip(src) {
            let mixed = *dst as f64 * (1.0 - alpha) + s as f64 * alpha;
            *dst = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Additive compositing, saturating at white.
    fn add(&mut self, x: i64, y: i64, color: Srgb, alpha: f64) {
        let Some(i) = self.offset(x, y) else { return };
        let src = color.to_rgb8();
        for (dst, s) in self.data[i..i + 3].iter_mut().zip(src) {
            let mixed = *dst as f64 + s as f64 * alpha.clamp(0.0, 1.0);
            *dst = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Columns and rows of the square of half-side `r` around `center`,
    /// clipped to the image. Either range is empty when the square misses it.
    fn clipped_box(&self, center: DVec2, r: f64) -> (RangeInclusive<i64>, RangeInclusive<i64>) {
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let x0 = ((center.x - r).floor() as i64).max(0);
        let x1 = ((center.x + r).ceil() as i64).min(max_x);
        let y0 = ((center.y - r).floor() as i64).max(0);
        let y1 = ((center.y + r).ceil() as i64).min(max_y);
        (x0..=x1, y0..=y1)
    }

    /// Fills a disc of `radius` pixels; anything under one pixel still covers
    /// the pixel containing its center.
    fn disc(&mut self, center: DVec2, radius: f64, color: Srgb, alpha: f64) {
        let r = radius.max(0.5);
        let (xs, ys) = self.clipped_box(center, r);
        let mut hit = false;
        for y in ys {
            for x in xs.clone() {
                let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - center;
                if d.length_squared() <= r * r {
                    self.blend(x, y, color, alpha);
                    hit = true;
                }
            }
        }
        if !hit {
            self.blend(center.x.floor() as i64, center.y.floor() as i64, color, alpha);
        }
    }

    /// Additive halo whose strength falls off linearly with distance.
    fn halo(&mut self, center: DVec2, radius: f64, color: Srgb, strength: f64) {
        let r = radius.max(1.0);
        let (xs, ys) = self.clipped_box(center, r);
        for y in ys {
            for x in xs.clone() {
                let d = (DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - center).length();
                if d <= r {
                    self.add(x, y, color, strength * (1.0 - d / r));
                }
            }
        }
    }
}

/// Rasterizes `frame` into a `width`×`height` image over `background`.
pub fn rasterize(
    frame: &Frame<'_>,
    width: usize,
    height: usize,
    background: Srgb,
) -> Result<Raster, EngineError> {
    let mut raster = Raster::new(width, height, background)?;
    match *frame {
        Frame::Sprites { sprites, viewport } => draw_sprites(&mut raster, sprites, viewport),
        Frame::PointCloud {
            positions,
            colors,
            point_size,
            opacity,
            model,
        } => draw_point_cloud(&mut raster, positions, colors, point_size, opacity, model),
        Frame::Transform { rotation, glow } => draw_cube(&mut raster, rotation, glow),
    }
    Ok(raster)
}

/// Rasterizes `frame` to a bare RGBA8 buffer of length `width * height * 4`.
pub fn frame_to_rgba(
    frame: &Frame<'_>,
    width: usize,
    height: usize,
    background: Srgb,
) -> Result<Vec<u8>, EngineError> {
    rasterize(frame, width, height, background).map(Raster::into_data)
}

fn draw_sprites(raster: &mut Raster, sprites: &[Sprite], viewport: [f64; 2]) {
    let scale = DVec2::new(
        raster.width as f64 / viewport[0].max(f64::EPSILON),
        raster.height as f64 / viewport[1].max(f64::EPSILON),
    );
    let radius_scale = scale.min_element();
    for sprite in sprites.iter().filter(|s| s.visible) {
        let center = DVec2::new(sprite.x, sprite.y) * scale;
        let radius = sprite.size * radius_scale / 2.0;
        if sprite.glow {
            raster.halo(center, radius * GLOW_SCALE, sprite.color, GLOW_STRENGTH);
        }
        raster.disc(center, radius, sprite.color, sprite.opacity);
    }
}

fn draw_point_cloud(
    raster: &mut Raster,
    positions: &[f32],
    colors: &[f32],
    point_size: f32,
    opacity: f32,
    model: Mat4,
) {
    let (w, h) = (raster.width as f32, raster.height as f32);
    let projection = Mat4::perspective_rh(CAMERA_FOV_DEG.to_radians(), w / h, CAMERA_NEAR, CAMERA_FAR);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_DISTANCE), Vec3::ZERO, Vec3::Y);
    let mvp = projection * view * model;
    // Pixels per world unit at unit clip-space depth.
    let focal = projection.y_axis.y * h / 2.0;

    for (p, c) in positions.chunks_exact(3).zip(colors.chunks_exact(3)) {
        let clip = mvp * Vec4::new(p[0], p[1], p[2], 1.0);
        if clip.w <= CAMERA_NEAR {
            continue;
        }
        let ndc = clip.truncate() / clip.w;
        let screen = DVec2::new(
            ((ndc.x + 1.0) / 2.0 * w) as f64,
            ((1.0 - ndc.y) / 2.0 * h) as f64,
        );
        let radius = (point_size * focal / clip.w / 2.0) as f64;
        let color = Srgb {
            r: c[0] as f64,
            g: c[1] as f64,
            b: c[2] as f64,
        };
        raster.disc(screen, radius, color, opacity as f64);
    }
}

fn draw_cube(raster: &mut Raster, rotation: Rotation, glow: bool) {
    let (w, h) = (raster.width as f64, raster.height as f64);
    let half = w.min(h) * CUBE_HALF_FRACTION;
    let projector = Projector {
        perspective: half * 8.0,
        center: [w / 2.0, h / 2.0],
    };
    let matrix = rotation.matrix();
    let corner = |i: usize| {
        DVec3::new(
            if i & 1 == 0 { -half } else { half },
            if i & 2 == 0 { -half } else { half },
            if i & 4 == 0 { -half } else { half },
        )
    };
    let color = if glow { CUBE_GLOW_COLOR } else { CUBE_COLOR };
    for a in 0..8 {
        for bit in [1, 2, 4] {
            let b = a | bit;
            if b == a {
                continue;
            }
            let (start, end) = (matrix * corner(a), matrix * corner(b));
            for s in 0..=CUBE_EDGE_SAMPLES {
                let t = s as f64 / CUBE_EDGE_SAMPLES as f64;
                if let Some(p) = projector.project(start.lerp(end, t)) {
                    if glow {
                        raster.halo(p.screen, 3.0, color, 0.08);
                    }
                    raster.disc(p.screen, 0.75, color, 1.0);
                }
            }
        }
    }
}
