//! Animated cloud backdrop
//!
//! A flat layer of cloud cells at a fixed height, seen from a camera on the
//! ground looking up and forward. The cell pattern comes from a seeded value
//! noise lattice and drifts sideways as time advances.

use crate::frame_limiter::{Clock, FrameRateLimiter};
use crate::video::VideoDriver;
use glam::{Mat4, Vec3, Vec4};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdl2::pixels::Color;
use sdl2::rect::Rect;

/// Scales real time into cloud time. Controls the apparent cloud speed.
pub const CLOUD_SPEED_MULTIPLIER: f32 = 3.0;

const CLOUD_HEIGHT: f32 = 100.0;
const CELL_SIZE: f32 = 40.0;
const CELL_RADIUS: i32 = 30;
const DRIFT_PER_SECOND: f32 = 4.0;
const DENSITY_THRESHOLD: f32 = 0.55;
const LATTICE_SIZE: usize = 64;
/// Cells per lattice step; larger means bigger clumps
const LATTICE_SCALE: i32 = 3;

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub near: f32,
    pub far: f32,
    pub fov_y: f32,
}

impl Camera {
    /// The fixed menu camera: at the origin, looking up and ahead at the clouds
    pub fn menu_default() -> Self {
        Camera {
            position: Vec3::ZERO,
            target: Vec3::new(0.0, 60.0, 100.0),
            near: 1.0,
            far: 10000.0,
            fov_y: std::f32::consts::PI / 2.5,
        }
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(self.fov_y, aspect, self.near, self.far);
        projection * view
    }
}

pub struct Clouds {
    time: f32,
    lattice: Vec<f32>,
    color: Color,
}

impl Clouds {
    pub fn new(seed: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let lattice = (0..LATTICE_SIZE * LATTICE_SIZE)
            .map(|_| rng.random::<f32>())
            .collect();
        Clouds {
            time: 0.0,
            lattice,
            color: Color::RGB(240, 240, 255),
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn step(&mut self, dtime: f32) {
        self.time += dtime;
    }

    fn lattice_at(&self, x: i32, z: i32) -> f32 {
        let n = LATTICE_SIZE as i32;
        let xi = x.rem_euclid(n) as usize;
        let zi = z.rem_euclid(n) as usize;
        self.lattice[zi * LATTICE_SIZE + xi]
    }

    /// Smoothed noise value in [0, 1) for a cloud cell
    pub fn density(&self, cell_x: i32, cell_z: i32) -> f32 {
        let lx = cell_x.div_euclid(LATTICE_SCALE);
        let lz = cell_z.div_euclid(LATTICE_SCALE);
        let fx = cell_x.rem_euclid(LATTICE_SCALE) as f32 / LATTICE_SCALE as f32;
        let fz = cell_z.rem_euclid(LATTICE_SCALE) as f32 / LATTICE_SCALE as f32;

        let top = lerp(self.lattice_at(lx, lz), self.lattice_at(lx + 1, lz), fx);
        let bottom = lerp(self.lattice_at(lx, lz + 1), self.lattice_at(lx + 1, lz + 1), fx);
        lerp(top, bottom, fz)
    }

    pub fn is_cloud(&self, cell_x: i32, cell_z: i32) -> bool {
        self.density(cell_x, cell_z) > DENSITY_THRESHOLD
    }

    pub fn render<D: VideoDriver>(&self, driver: &mut D, camera: &Camera) -> Result<(), String> {
        let (width, height) = driver.screen_size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        let view_projection = camera.view_projection(width as f32 / height as f32);

        let drift = self.time * DRIFT_PER_SECOND;
        let shift = (drift / CELL_SIZE).floor() as i32;
        let offset = drift.rem_euclid(CELL_SIZE);

        // Far cells first so near ones paint over them
        for gz in (0..CELL_RADIUS * 2).rev() {
            for gx in -CELL_RADIUS..CELL_RADIUS {
                if !self.is_cloud(gx - shift, gz) {
                    continue;
                }

                let x0 = gx as f32 * CELL_SIZE + offset;
                let z0 = gz as f32 * CELL_SIZE;
                let corners = [
                    Vec3::new(x0, CLOUD_HEIGHT, z0),
                    Vec3::new(x0 + CELL_SIZE, CLOUD_HEIGHT, z0),
                    Vec3::new(x0, CLOUD_HEIGHT, z0 + CELL_SIZE),
                    Vec3::new(x0 + CELL_SIZE, CLOUD_HEIGHT, z0 + CELL_SIZE),
                ];

                let Some(rect) = project_quad(&view_projection, &corners, camera, width, height)
                else {
                    continue;
                };

                let distance = (Vec3::new(x0, CLOUD_HEIGHT, z0) - camera.position).length();
                let fade = 1.0 - (distance / (CELL_SIZE * CELL_RADIUS as f32 * 2.0)).min(1.0);
                let alpha = (fade * 230.0) as u8;
                if alpha == 0 {
                    continue;
                }
                let color = Color::RGBA(self.color.r, self.color.g, self.color.b, alpha);
                driver.fill_rect(color, rect)?;
            }
        }

        Ok(())
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Screen-space bounding box of a world quad, or `None` if any corner is
/// behind the camera or past the far plane
fn project_quad(
    view_projection: &Mat4,
    corners: &[Vec3; 4],
    camera: &Camera,
    width: u32,
    height: u32,
) -> Option<Rect> {
    let mut min = (f32::MAX, f32::MAX);
    let mut max = (f32::MIN, f32::MIN);

    for corner in corners {
        let clip = *view_projection * Vec4::new(corner.x, corner.y, corner.z, 1.0);
        if clip.w <= camera.near || clip.w >= camera.far {
            return None;
        }
        let sx = (clip.x / clip.w * 0.5 + 0.5) * width as f32;
        let sy = (1.0 - (clip.y / clip.w * 0.5 + 0.5)) * height as f32;
        min = (min.0.min(sx), min.1.min(sy));
        max = (max.0.max(sx), max.1.max(sy));
    }

    if max.0 < 0.0 || max.1 < 0.0 || min.0 > width as f32 || min.1 > height as f32 {
        return None;
    }

    let w = (max.0 - min.0).ceil().max(1.0) as u32;
    let h = (max.1 - min.1).ceil().max(1.0) as u32;
    Some(Rect::new(min.0 as i32, min.1 as i32, w, h))
}

/// Cloud scene plus the timing state driving it
pub struct CloudBackdrop {
    pub clouds: Clouds,
    pub camera: Camera,
    last_ms: u32,
    dtime: f32,
}

impl CloudBackdrop {
    /// Creates a randomly seeded cloud field and records the start time
    pub fn init(clock: &dyn Clock) -> Self {
        Self::with_seed(clock, rand::random::<u32>())
    }

    pub fn with_seed(clock: &dyn Clock, seed: u32) -> Self {
        let mut clouds = Clouds::new(seed);
        clouds.set_color(Color::RGB(200, 200, 255));
        debug!("Cloud backdrop seeded with {}", seed);
        CloudBackdrop {
            clouds,
            camera: Camera::menu_default(),
            last_ms: clock.now_ms(),
            dtime: 0.0,
        }
    }

    /// Seconds covered by the latest step. Never negative.
    pub fn dtime(&self) -> f32 {
        self.dtime
    }

    /// Advances the timer and the cloud simulation without drawing
    pub fn advance(&mut self, now_ms: u32) {
        self.dtime = if now_ms > self.last_ms {
            (now_ms - self.last_ms) as f32 / 1000.0
        } else {
            0.0
        };
        self.last_ms = now_ms;
        self.clouds.step(self.dtime * CLOUD_SPEED_MULTIPLIER);
    }

    /// Steps the clouds by the time since the previous frame and draws them
    pub fn pre_process<D: VideoDriver>(
        &mut self,
        clock: &dyn Clock,
        driver: &mut D,
    ) -> Result<(), String> {
        self.advance(clock.now_ms());
        self.clouds.render(driver, &self.camera)
    }

    /// Caps the frame rate against the time recorded in `pre_process`
    pub fn post_process(&self, clock: &dyn Clock, limiter: &FrameRateLimiter) -> u32 {
        limiter.pace(clock, self.last_ms)
    }
}
