//! Ray launching engine.
//!
//! Every (azimuth, elevation) ray is marched independently against the
//! read-only [`Scene`]. Rays are split across rayon workers; each worker
//! fills its own [`PowerMap`] and the maps are reduced with an element-wise
//! max. Diffraction sub-rays are queued as [`RayTask`]s and processed by the
//! worker that owns their parent ray.

use log::{debug, info};
use rayon::prelude::*;
use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, PI};
use std::time::{Duration, Instant};

use super::config::TransmitterConfig;
use super::diffraction::{EDGE_SEARCH_RADIUS, edge_fan};
use super::power_map::PowerMap;
use super::propagation::received_power_dbm;
use super::ray::{EdgeLoss, RayPath, RayPoint, RayState, RayTask, Surface};
use super::reflection::{Material, ReflectionModel, Specular, incidence_angle};
use crate::scene::Scene;
use crate::scene::cell::Cell;
use crate::scene::grid::Dims;
use crate::{Point, Vector};

/// Direction components are rounded to multiples of `1 / DIRECTION_SCALE`.
const DIRECTION_SCALE: f64 = 1e15;

const UP: Vector = Vector {
    dx: 0.0,
    dy: 0.0,
    dz: 1.0,
};

/// Output of a casting run.
#[derive(Debug, Clone)]
pub struct CastResult {
    pub power_map: PowerMap,
    /// One path per tracked ray, in configuration order.
    pub ray_paths: Vec<RayPath>,
    pub rays_cast: usize,
    /// Diffraction sub-rays spawned by all rays.
    pub sub_rays: usize,
    pub elapsed: Duration,
}

/// Per-worker partial result.
struct Tally {
    map: PowerMap,
    paths: Vec<RayPath>,
    sub_rays: usize,
}

impl Tally {
    fn new(dims: Dims, tracked: usize) -> Self {
        Self {
            map: PowerMap::new(dims),
            paths: vec![Vec::new(); tracked],
            sub_rays: 0,
        }
    }

    fn merge(mut self, other: Tally) -> Self {
        self.map.merge(&other.map);
        for (mine, theirs) in self.paths.iter_mut().zip(other.paths) {
            mine.extend(theirs);
        }
        self.sub_rays += other.sub_rays;
        self
    }
}

/// Marches rays through one scene with one transmitter configuration.
pub struct RayEngine<'a> {
    scene: &'a Scene,
    config: &'a TransmitterConfig,
    wavelength: f64,
    /// Continuous extent of the grid: (nx-1, ny-1, nz-1) steps.
    extent: Point,
}

impl<'a> RayEngine<'a> {
    pub fn new(scene: &'a Scene, config: &'a TransmitterConfig) -> Self {
        let dims = scene.dims();
        let span = |n: usize| n.saturating_sub(1) as f64 * config.step;
        Self {
            scene,
            config,
            wavelength: config.wavelength(),
            extent: Point::new(span(dims.nx), span(dims.ny), span(dims.nz)),
        }
    }

    /// Launch direction of ray (i, j), scaled to one grid step.
    ///
    /// A transmitter on the ground only launches into the upper hemisphere.
    pub fn initial_direction(&self, azimuth: usize, elevation: usize) -> Vector {
        let theta = 2.0 * PI / self.config.num_azimuth as f64 * azimuth as f64;
        let j = elevation as f64;
        let n = self.config.num_elevation as f64;
        let phi = if self.config.tx_position.z == 0.0 {
            FRAC_PI_2 / n * j
        } else {
            PI * j / n - FRAC_PI_2
        };
        let d = Vector::new(theta.cos() * phi.cos(), theta.sin() * phi.cos(), phi.sin());
        (d * self.config.step).quantize(DIRECTION_SCALE)
    }

    fn origin(&self) -> Point {
        let tx = self.config.tx_position;
        let s = self.config.step;
        Point::new(tx.x * s, tx.y * s, tx.z * s)
    }

    fn in_bounds(&self, p: Point) -> bool {
        (0.0..=self.extent.x).contains(&p.x) && (0.0..self.extent.y).contains(&p.y) && p.z <= self.extent.z
    }

    fn should_continue(&self, s: &RayState) -> bool {
        self.in_bounds(s.position)
            && s.bounces < self.config.max_bounces
            && s.power_dbm >= self.config.min_power_dbm
    }

    /// Casts ray (i, j) and all its diffraction descendants.
    ///
    /// Returns the number of sub-rays spawned.
    pub fn cast_ray(
        &self,
        azimuth: usize,
        elevation: usize,
        map: &mut PowerMap,
        paths: &mut [RayPath],
    ) -> usize {
        let direction = self.initial_direction(azimuth, elevation);
        let tracked = self.config.tracked_index(azimuth, elevation);
        let root = RayTask::new(RayState::launch(self.origin(), direction), tracked);

        let mut queue = VecDeque::from([root]);
        let mut spawned = 0;
        while let Some(task) = queue.pop_front() {
            spawned += self.march(task, map, paths, &mut queue);
        }
        spawned
    }

    /// Runs one ray to termination. Returns the number of sub-rays queued.
    fn march(
        &self,
        mut task: RayTask,
        map: &mut PowerMap,
        paths: &mut [RayPath],
        queue: &mut VecDeque<RayTask>,
    ) -> usize {
        let grid = self.scene.grid();

        while self.should_continue(&task.state) {
            self.touch_ground(&mut task.state);

            let (x, y, z) = task.state.voxel(self.config.step);
            let Some(cell) = grid.get_signed(x, y, z) else {
                break;
            };

            if task.stop_after_roof && task.state.last == Surface::Roof {
                break;
            }

            match cell {
                Cell::Interior => break,
                Cell::Roof if !task.skip_roof && task.state.last != Surface::Roof => {
                    self.reflect_roof(&mut task.state);
                    continue;
                }
                Cell::RoofCorner if task.state.direction.dz == 0.0 => break,
                Cell::Corner | Cell::RoofCorner if task.state.last != Surface::of_cell(cell) => {
                    return self.spawn_fan(&task, cell, (x, y, z), queue);
                }
                Cell::Wall(id) if task.state.last != Surface::Wall(id) && !task.ignores(id) => {
                    self.reflect_wall(&mut task.state, id);
                }
                _ => self.sample(&mut task, cell, (x, y, z), map, paths),
            }

            task.state.advance();
        }
        0
    }

    fn touch_ground(&self, s: &mut RayState) {
        if s.position.z >= 0.0 {
            return;
        }
        if s.last != Surface::Ground {
            let angle = incidence_angle(s.direction, UP);
            s.reflection *= Material::MediumDryGround.reflection_factor(angle);
            s.bounces += 1;
            s.last = Surface::Ground;
            s.flush_segment();
        }
        s.direction.dz = s.direction.dz.abs();
        s.position.z = 0.0;
    }

    fn reflect_roof(&self, s: &mut RayState) {
        let angle = incidence_angle(s.direction, UP);
        s.reflection *= Material::Concrete.reflection_factor(angle);
        s.direction = Specular.reflect(s.direction, UP);
        s.bounces += 1;
        s.last = Surface::Roof;
        s.flush_segment();
    }

    fn reflect_wall(&self, s: &mut RayState, wall_id: u32) {
        let Some(normal) = self.scene.normal(wall_id) else {
            return;
        };
        let n = normal.as_vector();
        let angle = incidence_angle(s.direction, n);
        s.reflection *= Material::Concrete.reflection_factor(angle);
        s.direction = Specular.reflect(s.direction, n);
        s.bounces += 1;
        s.last = Surface::Wall(wall_id);
        s.flush_segment();
    }

    /// Free-space sample: updates the ray's power, the map and its path.
    fn sample(
        &self,
        task: &mut RayTask,
        cell: Cell,
        (x, y, z): (i64, i64, i64),
        map: &mut PowerMap,
        paths: &mut [RayPath],
    ) {
        let s = &mut task.state;
        let power = received_power_dbm(
            self.config.tx_power_w,
            s.path_length(),
            self.wavelength,
            s.reflection,
            s.loss_db(self.wavelength),
        );
        s.power_dbm = power;

        if cell.is_empty()
            && let Some((x, y, z)) = self.scene.dims().index(x, y, z)
        {
            map.record(x, y, z, power);
        }

        if let Some(path) = task.tracked.and_then(|t| paths.get_mut(t)) {
            path.push(RayPoint {
                x: x as f64,
                y: y as f64,
                z: z as f64,
                power,
            });
        }
    }

    /// Replaces the ray by a fan of sub-rays leaving the edge voxel.
    ///
    /// Without diffraction budget, or with no wall found around the edge,
    /// the edge is opaque and the ray simply ends.
    fn spawn_fan(
        &self,
        task: &RayTask,
        edge: Cell,
        (x, y, z): (i64, i64, i64),
        queue: &mut VecDeque<RayTask>,
    ) -> usize {
        if !self.config.diffraction_enabled()
            || task.state.order >= self.config.max_diffraction_order
        {
            return 0;
        }
        let walls = self.scene.walls_near(x, y, z, EDGE_SEARCH_RADIUS);
        if walls.is_empty() {
            return 0;
        }

        let mut parent = task.state.clone();
        let base_db = parent.loss_db(self.wavelength);
        parent.last = Surface::of_cell(edge);
        parent.flush_segment();
        let to_edge = parent.prior_length;

        let normals: Vec<_> = walls.values().copied().collect();
        let fan = edge_fan(edge, parent.direction, &normals, self.config.fan_width);
        for ray in &fan {
            let mut state = parent.clone();
            state.direction = ray.direction;
            state.position = parent.position + ray.direction;
            state.edge_loss = Some(EdgeLoss {
                to_edge,
                angle: ray.angle,
                base_db,
            });
            state.order += 1;

            let upward = ray.direction.dz > 0.0;
            queue.push_back(RayTask {
                state,
                ignored_walls: walls.keys().copied().collect(),
                skip_roof: edge == Cell::RoofCorner && upward,
                stop_after_roof: upward,
                tracked: task.tracked,
            });
        }
        debug!(
            "Edge at ({x}, {y}, {z}) spawned {} sub-rays at order {}",
            fan.len(),
            parent.order + 1
        );
        fan.len()
    }
}

/// Casts the full ray bundle of `config` into `scene`.
pub fn cast(scene: &Scene, config: &TransmitterConfig) -> CastResult {
    let start = Instant::now();
    let dims = scene.dims();
    let engine = RayEngine::new(scene, config);
    let num_rays = config.num_rays();
    let tracked = config.tracked_rays.len();
    info!(
        "Casting {} x {} rays from {} into a {}x{}x{} grid ({:.1} MHz, {} bounces, fan {})",
        config.num_azimuth,
        config.num_elevation,
        config.tx_position,
        dims.nx,
        dims.ny,
        dims.nz,
        config.frequency_hz / 1e6,
        config.max_bounces,
        config.fan_width
    );

    let tally = (0..num_rays)
        .into_par_iter()
        .fold(
            || Tally::new(dims, tracked),
            |mut tally, idx| {
                let (i, j) = (idx / config.num_elevation, idx % config.num_elevation);
                tally.sub_rays += engine.cast_ray(i, j, &mut tally.map, &mut tally.paths);
                tally
            },
        )
        .reduce(|| Tally::new(dims, tracked), Tally::merge);

    let mut power_map = tally.map;
    // The transmitter voxel is the 0 dBm reference
    let tx = config.tx_position;
    if let Some((x, y, z)) = dims.index(
        tx.x.round() as i64,
        tx.y.round() as i64,
        tx.z.round() as i64,
    ) {
        power_map.record(x, y, z, 0.0);
    }

    let elapsed = start.elapsed();
    info!(
        "Cast {} rays and {} sub-rays in {:.2?}, {} voxels reached",
        num_rays,
        tally.sub_rays,
        elapsed,
        power_map.visited_count()
    );

    CastResult {
        power_map,
        ray_paths: tally.paths,
        rays_cast: num_rays,
        sub_rays: tally.sub_rays,
        elapsed,
    }
}
