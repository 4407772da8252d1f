use anyhow::{ensure, Result};

use crate::vec3::*;

/// A distance estimator: never overestimates the distance from `p` to the
/// nearest surface, negative inside solids.
pub trait Sdf: Sync {
    fn dist(&self, p: Point3) -> f64;

    /// Checked once before rendering; `dist` may assume it passed.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// True modulo, result in `[0, period)` even for negative `x`.
pub fn wrap(x: f64, period: f64) -> f64 {
    let r = x - period * (x / period).floor();
    // tiny negative x rounds up to exactly period
    if r >= period {
        0.
    } else {
        r
    }
}

/// Spheres of `radius` centered in every cell of a cubic lattice with
/// spacing `period`, repeating forever along all three axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereLattice {
    pub period: f64,
    pub radius: f64,
}

impl SphereLattice {
    pub fn new(period: f64, radius: f64) -> Self {
        Self { period, radius }
    }
}

impl Default for SphereLattice {
    fn default() -> Self {
        Self::new(1.0, 0.2)
    }
}

impl Sdf for SphereLattice {
    fn dist(&self, p: Point3) -> f64 {
        let period = self.period;
        let local = p.map(|c| wrap(c, period)) - period / 2.;
        local.mag() - self.radius
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.period > 0. && self.period.is_finite(),
            "lattice period must be positive and finite, got {}",
            self.period
        );
        ensure!(
            self.radius >= 0. && self.radius.is_finite(),
            "sphere radius must be non-negative and finite, got {}",
            self.radius
        );
        Ok(())
    }
}

#[cfg(test)]
fn lattice_points() -> Vec<Point3> {
    let mut pts = Vec::new();
    for &x in &[-3.7, -1.0, -0.25, 0., 0.5, 0.9, 2.3, 17.01] {
        for &y in &[-2.2, -0.5, 0.1, 0.7, 4.45] {
            for &z in &[-9.9, -0.01, 0.5, 1.33] {
                pts.push(vec3!(x, y, z));
            }
        }
    }
    pts
}

#[test]
fn test_wrap() {
    assert_eq!(wrap(0.25, 1.), 0.25);
    assert_eq!(wrap(1.25, 1.), 0.25);
    assert_eq!(wrap(-0.25, 1.), 0.75);
    assert_eq!(wrap(-3., 1.), 0.);
    assert_eq!(wrap(-1.5, 2.), 0.5);

    for &x in &[-1e-20, -1e-17, -5e-324, -3e-16] {
        let w = wrap(x, 1.);
        assert!((0. ..1.).contains(&w), "wrap({}) = {}", x, w);
    }
    assert_eq!(wrap(-1e-20, 1.), 0.);
}

#[test]
fn test_validate() {
    assert!(SphereLattice::default().validate().is_ok());
    assert!(SphereLattice::new(3., 0.).validate().is_ok());

    for &(period, radius) in &[
        (0., 0.2),
        (-1., 0.2),
        (f64::NAN, 0.2),
        (f64::INFINITY, 0.2),
        (1., -0.1),
        (1., f64::NAN),
    ] {
        assert!(SphereLattice::new(period, radius).validate().is_err());
    }
}

#[test]
fn test_sign() {
    let lattice = SphereLattice::default();

    // cell centers sit inside, at depth radius
    for c in &[vec3!(0.5, 0.5, 0.5), vec3!(-0.5, 3.5, -7.5)] {
        assert!((lattice.dist(*c) + 0.2).abs() < 1e-12);
    }

    // on the surface along each axis, both sides of the center
    for c in &[vec3!(0.5, 0.5, 0.5), vec3!(-2.5, 1.5, -0.5)] {
        for &off in &[
            vec3!(0.2, 0., 0.),
            vec3!(-0.2, 0., 0.),
            vec3!(0., 0.2, 0.),
            vec3!(0., 0., -0.2),
        ] {
            assert!(lattice.dist(*c + off).abs() < 1e-12);
            assert!(lattice.dist(*c + off * 0.9) < 0.);
            assert!(lattice.dist(*c + off * 1.1) > 0.);
        }
    }

    // lattice corners are as far from any sphere as it gets
    let corner = (0.75_f64).sqrt() - 0.2;
    assert!((lattice.dist(Vec3::empty()) - corner).abs() < 1e-12);
    assert!((lattice.dist(vec3!(-4., 2., 1.)) - corner).abs() < 1e-12);
}

#[test]
fn test_periodic() {
    let lattice = SphereLattice::default();
    let shifts = [
        vec3!(1., 0., 0.),
        vec3!(0., -1., 0.),
        vec3!(0., 0., 5.),
        vec3!(-3., 7., -2.),
        vec3!(100., -100., 42.),
    ];

    for p in lattice_points() {
        for s in &shifts {
            let d0 = lattice.dist(p);
            let d1 = lattice.dist(p + *s);
            assert!((d0 - d1).abs() < 1e-9, "{:?} vs {:?}: {} {}", p, *s, d0, d1);
        }
    }
}

#[test]
fn test_lipschitz() {
    let lattice = SphereLattice::default();
    let step = vec3!(0.013, -0.007, 0.021);

    for p in lattice_points() {
        let q = p + step;
        assert!((lattice.dist(p) - lattice.dist(q)).abs() <= (p - q).mag() + 1e-12);
    }
}

#[test]
fn test_scaled_lattice() {
    let lattice = SphereLattice::new(2., 0.5);
    assert!((lattice.dist(vec3!(1., 1., 1.)) + 0.5).abs() < 1e-12);
    assert!((lattice.dist(vec3!(-1., 3., 1.5)) - 0.).abs() < 1e-12);
    assert!((lattice.dist(vec3!(1., 1., 1.)) - lattice.dist(vec3!(3., -1., 5.))).abs() < 1e-12);
}
