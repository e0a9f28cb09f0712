//! Weighted placement of elements on a host mesh.
//!
//! Vertices are weighted by a pattern and a camera-facing boost, then drawn
//! either by weighted random choice or around a few cluster centres, while
//! keeping a minimum separation. If separation cannot be met the distance is
//! halved, so sampling always terminates.

use glam::Vec3;

use crate::core::math::{safe_normalize, EPSILON};
use crate::core::random::RandomSource;

/// Candidates at or below this weight are never placed.
const MIN_WEIGHT: f32 = 0.01;
/// Cluster centres come from this many top-weighted candidates.
const CLUSTER_CENTER_POOL: usize = 10;
/// Smallest weighted-pick pool in unclustered mode.
const MIN_PICK_POOL: usize = 20;
/// Fraction of eligible candidates in the weighted-pick pool.
const PICK_POOL_FRACTION: f32 = 0.4;

/// Where on the mesh elements prefer to sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfacePattern {
    /// Upper surfaces and upward normals.
    Crown,
    /// Nearly uniform, slight camera bias.
    #[default]
    Shell,
    /// Random weights with camera bias.
    Scattered,
    /// Normals pointing away from the mesh centre.
    Spikes,
    /// Horizontal normals near the equator.
    Ring,
}

impl SurfacePattern {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "crown" => Some(Self::Crown),
            "shell" => Some(Self::Shell),
            "scattered" => Some(Self::Scattered),
            "spikes" => Some(Self::Spikes),
            "ring" => Some(Self::Ring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub normal: Vec3,
    pub weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    pub count: usize,
    pub pattern: SurfacePattern,
    /// 0 spreads samples out, 1 packs them around one centre.
    pub clustering: f32,
    /// Minimum separation as a fraction of the mesh radius.
    pub min_distance_factor: f32,
    /// Unit vector from the mesh towards the camera.
    pub camera_direction: Vec3,
    pub max_attempts: usize,
    /// Consecutive failed picks before the separation is halved.
    pub max_failures: usize,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            count: 8,
            pattern: SurfacePattern::Shell,
            clustering: 0.0,
            min_distance_factor: 0.15,
            camera_direction: Vec3::Z,
            max_attempts: 1000,
            max_failures: 5,
        }
    }
}

impl SampleOptions {
    pub fn new(count: usize, pattern: SurfacePattern) -> Self {
        Self {
            count,
            pattern,
            ..Default::default()
        }
    }

    pub fn with_clustering(mut self, clustering: f32) -> Self {
        self.clustering = clustering.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_distance_factor(mut self, factor: f32) -> Self {
        self.min_distance_factor = factor.max(0.0);
        self
    }

    pub fn with_camera_direction(mut self, direction: Vec3) -> Self {
        self.camera_direction = direction;
        self
    }

    pub fn with_limits(mut self, max_attempts: usize, max_failures: usize) -> Self {
        self.max_attempts = max_attempts;
        self.max_failures = max_failures.max(1);
        self
    }
}

/// Sampling result plus what it took to produce it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    pub samples: Vec<SurfaceSample>,
    pub initial_min_distance: f32,
    /// Separation in force when sampling stopped; every pair is at least this far apart.
    pub final_min_distance: f32,
    /// Times the separation was halved.
    pub relaxations: u32,
    /// Vertices that passed the weight threshold.
    pub candidate_count: usize,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Host mesh vertex data, ready to sample.
#[derive(Debug, Clone)]
pub struct SurfaceSampler {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    center: Vec3,
    radius: f32,
    min_y: f32,
    max_y: f32,
}

impl SurfaceSampler {
    /// Missing normals (or a mismatched count) default to +Y.
    pub fn new(positions: Vec<Vec3>, normals: Option<Vec<Vec3>>) -> Self {
        let normals = match normals {
            Some(n) if n.len() == positions.len() => {
                n.into_iter().map(|v| safe_normalize(v, Vec3::Y)).collect()
            }
            Some(n) => {
                log::warn!(
                    "normal count {} does not match vertex count {}, using +Y",
                    n.len(),
                    positions.len()
                );
                vec![Vec3::Y; positions.len()]
            }
            None => vec![Vec3::Y; positions.len()],
        };

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        );
        let center = if positions.is_empty() { Vec3::ZERO } else { (min + max) * 0.5 };
        let radius = positions
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0f32, f32::max);

        Self {
            positions,
            normals,
            center,
            radius,
            min_y: min.y,
            max_y: max.y,
        }
    }

    /// From flat `xyz` buffers, as stored in a vertex attribute.
    pub fn from_buffers(positions: &[f32], normals: Option<&[f32]>) -> Self {
        let to_vecs = |buf: &[f32]| -> Vec<Vec3> {
            buf.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2])).collect()
        };
        Self::new(to_vecs(positions), normals.map(to_vecs))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Pattern weight of every vertex, camera boost included.
    pub fn weights(&self, pattern: SurfacePattern, camera: Vec3, rng: &mut dyn RandomSource) -> Vec<f32> {
        let camera = safe_normalize(camera, Vec3::Z);
        let height_span = self.max_y - self.min_y;
        let half_height = (height_span * 0.5).max(EPSILON);
        self.positions
            .iter()
            .zip(&self.normals)
            .map(|(p, n)| {
                let dot = n.dot(camera);
                let height = if height_span > EPSILON {
                    (p.y - self.min_y) / height_span
                } else {
                    0.5
                };
                let base = match pattern {
                    SurfacePattern::Crown => {
                        let w = 0.6 * n.y.max(0.0) + 0.4 * height;
                        w * w
                    }
                    SurfacePattern::Shell => 0.8 + 0.2 * dot,
                    SurfacePattern::Scattered => 0.3 + 0.7 * rng.next_f32() + 0.2 * dot,
                    SurfacePattern::Spikes => {
                        let radial = safe_normalize(*p - self.center, *n);
                        let a = n.dot(radial).max(0.0);
                        a * a
                    }
                    SurfacePattern::Ring => {
                        let equatorial = (1.0 - (p.y - self.center.y).abs() / half_height).clamp(0.0, 1.0);
                        (1.0 - n.y.abs()) * equatorial
                    }
                };
                base * (1.0 + 0.3 * dot.max(0.0))
            })
            .collect()
    }

    pub fn sample(&self, options: &SampleOptions, rng: &mut dyn RandomSource) -> SampleSet {
        let weights = self.weights(options.pattern, options.camera_direction, rng);
        let mut candidates: Vec<SurfaceSample> = self
            .positions
            .iter()
            .zip(&self.normals)
            .zip(&weights)
            .filter(|(_, w)| **w > MIN_WEIGHT)
            .map(|((p, n), w)| SurfaceSample {
                position: *p,
                normal: *n,
                weight: *w,
            })
            .collect();
        candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        let initial_min_distance = options.min_distance_factor * self.radius;
        let mut set = SampleSet {
            samples: Vec::with_capacity(options.count.min(candidates.len())),
            initial_min_distance,
            final_min_distance: initial_min_distance,
            relaxations: 0,
            candidate_count: candidates.len(),
        };
        if candidates.is_empty() || options.count == 0 {
            return set;
        }

        let centers = if options.clustering > 0.0 && options.count > 2 {
            let k = ((options.count as f32 * (1.0 - options.clustering) * 0.5).floor() as usize).max(1);
            let pool = candidates.len().min(CLUSTER_CENTER_POOL);
            (0..k)
                .map(|_| candidates[rng.index(pool)].position)
                .collect::<Vec<_>>()
        } else {
            Vec::new()
        };

        let mut used = vec![false; candidates.len()];
        let mut min_distance = initial_min_distance;
        let mut failures = 0;
        let mut attempts = 0;

        while set.samples.len() < options.count && attempts < options.max_attempts {
            attempts += 1;
            let eligible: Vec<usize> = (0..candidates.len())
                .filter(|&i| !used[i])
                .filter(|&i| {
                    set.samples
                        .iter()
                        .all(|s| s.position.distance(candidates[i].position) >= min_distance)
                })
                .collect();

            let pick = if centers.is_empty() {
                pick_weighted(&candidates, &eligible, rng)
            } else {
                let center = centers[set.samples.len() % centers.len()];
                pick_nearest(&candidates, &eligible, center)
            };

            match pick {
                Some(i) => {
                    used[i] = true;
                    set.samples.push(candidates[i]);
                    failures = 0;
                }
                None => {
                    if used.iter().all(|u| *u) {
                        break;
                    }
                    failures += 1;
                    if failures >= options.max_failures.max(1) {
                        min_distance *= 0.5;
                        set.relaxations += 1;
                        failures = 0;
                        log::debug!(
                            "surface sampler: relaxed separation to {:.4} after {} samples",
                            min_distance,
                            set.samples.len()
                        );
                    }
                }
            }
        }

        set.final_min_distance = min_distance;
        set
    }
}

/// Weighted random pick from the top slice of `eligible` (already weight-sorted).
fn pick_weighted(
    candidates: &[SurfaceSample],
    eligible: &[usize],
    rng: &mut dyn RandomSource,
) -> Option<usize> {
    if eligible.is_empty() {
        return None;
    }
    let pool_len = ((eligible.len() as f32 * PICK_POOL_FRACTION).ceil() as usize)
        .max(MIN_PICK_POOL)
        .min(eligible.len());
    let pool = &eligible[..pool_len];
    let total: f32 = pool.iter().map(|&i| candidates[i].weight).sum();
    let mut target = rng.next_f32() * total;
    for &i in pool {
        target -= candidates[i].weight;
        if target < 0.0 {
            return Some(i);
        }
    }
    pool.last().copied()
}

/// Lowest `distance / (weight + 0.1)` to `center`.
fn pick_nearest(candidates: &[SurfaceSample], eligible: &[usize], center: Vec3) -> Option<usize> {
    let score = |i: usize| candidates[i].position.distance(center) / (candidates[i].weight + 0.1);
    eligible
        .iter()
        .copied()
        .min_by(|&a, &b| score(a).total_cmp(&score(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::Rng;

    /// Unit sphere with outward normals.
    fn sphere(n: usize) -> SurfaceSampler {
        let golden = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
        let positions: Vec<Vec3> = (0..n)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f32 + 0.5) / n as f32;
                let r = (1.0 - y * y).sqrt();
                let theta = golden * i as f32;
                Vec3::new(r * theta.cos(), y, r * theta.sin())
            })
            .collect();
        let normals = positions.clone();
        SurfaceSampler::new(positions, Some(normals))
    }

    fn assert_separated(set: &SampleSet) {
        for (i, a) in set.samples.iter().enumerate() {
            for b in &set.samples[i + 1..] {
                assert!(
                    a.position.distance(b.position) >= set.final_min_distance - 1e-6,
                    "samples closer than {}",
                    set.final_min_distance
                );
            }
        }
    }

    #[test]
    fn unclustered_samples_are_separated() {
        let sampler = sphere(400);
        let mut rng = Rng::new(21);
        for pattern in [
            SurfacePattern::Crown,
            SurfacePattern::Shell,
            SurfacePattern::Scattered,
            SurfacePattern::Spikes,
            SurfacePattern::Ring,
        ] {
            let set = sampler.sample(&SampleOptions::new(12, pattern), &mut rng);
            assert!(set.len() <= 12);
            assert!(set.len() <= set.candidate_count);
            assert_separated(&set);
        }
    }

    #[test]
    fn crowded_request_relaxes_separation() {
        let sampler = sphere(200);
        let options = SampleOptions::new(150, SurfacePattern::Shell).with_min_distance_factor(0.8);
        let set = sampler.sample(&options, &mut Rng::new(5));
        assert!(set.relaxations > 0);
        assert!(set.final_min_distance < set.initial_min_distance);
        assert_separated(&set);
    }

    #[test]
    fn clustered_samples_stay_separated() {
        let sampler = sphere(300);
        let options = SampleOptions::new(10, SurfacePattern::Shell)
            .with_clustering(0.8)
            .with_min_distance_factor(0.05);
        let set = sampler.sample(&options, &mut Rng::new(8));
        assert_eq!(set.len(), 10);
        assert_separated(&set);
    }

    #[test]
    fn crown_prefers_the_top() {
        let sampler = sphere(500);
        let set = sampler.sample(
            &SampleOptions::new(20, SurfacePattern::Crown).with_min_distance_factor(0.05),
            &mut Rng::new(3),
        );
        let mean_y: f32 = set.samples.iter().map(|s| s.position.y).sum::<f32>() / set.len() as f32;
        assert!(mean_y > 0.3, "mean y {}", mean_y);
    }

    #[test]
    fn short_result_when_few_vertices_qualify() {
        // Normals all face down: crown weights are tiny except near the top.
        let positions = vec![Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let normals = vec![-Vec3::Y; 3];
        let sampler = SurfaceSampler::new(positions, Some(normals));
        let set = sampler.sample(
            &SampleOptions::new(10, SurfacePattern::Crown).with_camera_direction(-Vec3::Z),
            &mut Rng::new(1),
        );
        assert_eq!(set.candidate_count, 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn missing_normals_default_up() {
        let sampler = SurfaceSampler::from_buffers(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 9.0], None);
        assert_eq!(sampler.vertex_count(), 3);
        let set = sampler.sample(&SampleOptions::new(3, SurfacePattern::Crown), &mut Rng::new(1));
        assert!(set.samples.iter().all(|s| s.normal == Vec3::Y));
    }

    #[test]
    fn empty_mesh_yields_nothing() {
        let sampler = SurfaceSampler::new(Vec::new(), None);
        let set = sampler.sample(&SampleOptions::default(), &mut Rng::new(1));
        assert!(set.is_empty());
    }

    #[test]
    fn pattern_names() {
        assert_eq!(SurfacePattern::from_name("Ring"), Some(SurfacePattern::Ring));
        assert_eq!(SurfacePattern::from_name("halo"), None);
    }
}
