use crate::config::RenderConfig;
use crate::ray::Ray;
use crate::sdf::Sdf;

/// Sphere traces `ray` through `sdf` and returns the fraction of the step
/// budget spent before the surface was reached.
///
/// Rays that run out of budget and rays that hit on the very last step both
/// come out near 1.0, so misses shade as white fog.
pub fn march(sdf: &impl Sdf, ray: &Ray, cfg: &RenderConfig) -> f64 {
    if cfg.max_steps == 0 {
        return 1.;
    }

    let mut t = cfg.start_distance;
    let mut step = 0;
    while step < cfg.max_steps {
        let dist = sdf.dist(ray.cast(t));
        if dist < cfg.hit_threshold {
            break;
        }
        t += dist;
        step += 1;
    }

    step as f64 / cfg.max_steps as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::SphereLattice;
    use crate::vec3::*;

    struct Plane {
        z: f64,
    }

    impl Sdf for Plane {
        fn dist(&self, p: Point3) -> f64 {
            self.z - p.z()
        }
    }

    struct Empty;

    impl Sdf for Empty {
        fn dist(&self, _: Point3) -> f64 {
            f64::INFINITY
        }
    }

    fn down_z() -> Ray {
        Ray::new(Vec3::empty(), vec3!(0., 0., 1.)).unwrap()
    }

    #[test]
    fn test_immediate_hit() {
        // origin already inside a sphere of the lattice
        let ray = Ray::new(vec3!(0.5, 0.5, 0.5), vec3!(1., 0., 0.)).unwrap();
        let res = march(&SphereLattice::default(), &ray, &RenderConfig::default());
        assert_eq!(res, 0.);
    }

    #[test]
    fn test_plane_hit_in_one_step() {
        // the first sample jumps the ray straight onto the plane
        let res = march(&Plane { z: 3. }, &down_z(), &RenderConfig::default());
        assert_eq!(res, 1. / 64.);
    }

    #[test]
    fn test_miss_saturates() {
        let cfg = RenderConfig::default();
        assert_eq!(march(&Empty, &down_z(), &cfg), 1.);

        // a ray skimming just above the plane never gets under the threshold
        let ray = Ray::new(vec3!(0., 0., 0.), vec3!(1., 0., 0.)).unwrap();
        assert_eq!(march(&Plane { z: 0.5 }, &ray, &cfg), 1.);
    }

    #[test]
    fn test_zero_budget() {
        let cfg = RenderConfig {
            max_steps: 0,
            ..RenderConfig::default()
        };
        assert_eq!(march(&SphereLattice::default(), &down_z(), &cfg), 1.);
    }

    #[test]
    fn test_range() {
        let lattice = SphereLattice::default();
        let cfg = RenderConfig::default();
        let dirs = [
            vec3!(0., 0., -1.),
            vec3!(1., 1., 1.),
            vec3!(0.3, -0.2, -1.),
            vec3!(-0.9, 0.01, 0.4),
            vec3!(1., 0., 0.),
        ];

        for d in &dirs {
            let ray = Ray::new(Vec3::empty(), *d).unwrap();
            let res = march(&lattice, &ray, &cfg);
            assert!((0. ..=1.).contains(&res), "{:?} -> {}", d, res);
            // quantized to the step budget
            let steps = res * cfg.max_steps as f64;
            assert!((steps - steps.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_diagonal_hits_first_sphere() {
        // straight at the center of the (0,0,0) cell sphere
        let ray = Ray::new(Vec3::empty(), vec3!(1., 1., 1.)).unwrap();
        let res = march(&SphereLattice::default(), &ray, &RenderConfig::default());
        assert!(res < 0.5);
    }
}
