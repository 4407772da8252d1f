use std::ops::{Add, Div, Index, Mul, Neg, Sub};

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    a: [f64; 3],
}

pub type Point3 = Vec3;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    #[error("cannot normalize zero vector")]
    ZeroLength,
    #[error("cannot normalize vector ({x}, {y}, {z}) with non-finite components")]
    NonFinite { x: f64, y: f64, z: f64 },
}

impl Vec3 {
    pub fn empty() -> Self {
        Self { a: [0., 0., 0.] }
    }

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { a: [x, y, z] }
    }

    pub fn x(&self) -> f64 {
        self.a[0]
    }

    pub fn y(&self) -> f64 {
        self.a[1]
    }

    pub fn z(&self) -> f64 {
        self.a[2]
    }

    pub fn of_scalar(x: f64) -> Self {
        Self::new(x, x, x)
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            a: [f(self.a[0]), f(self.a[1]), f(self.a[2])],
        }
    }

    fn zip_with(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            a: [
                f(self.a[0], other.a[0]),
                f(self.a[1], other.a[1]),
                f(self.a[2], other.a[2]),
            ],
        }
    }

    pub fn dot(self, other: &Self) -> f64 {
        self.a.iter().zip(other.a.iter()).map(|(a, b)| a * b).sum()
    }

    pub fn mag_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn mag(&self) -> f64 {
        self.mag_squared().sqrt()
    }

    /// Returns the vector scaled to length 1.
    ///
    /// Fails instead of producing NaN components for the zero vector or a
    /// vector with an infinite or NaN component.
    pub fn unit_vec(self) -> Result<Self, MathError> {
        if self.a.iter().any(|c| !c.is_finite()) {
            return Err(MathError::NonFinite {
                x: self.x(),
                y: self.y(),
                z: self.z(),
            });
        }

        // scale by the largest component first so squaring can neither
        // underflow to 0 nor overflow to inf
        let largest = self.a.iter().fold(0., |m: f64, c| m.max(c.abs()));
        if largest == 0. {
            return Err(MathError::ZeroLength);
        }
        let scaled = self / largest;
        Ok(scaled / scaled.mag())
    }
}

#[macro_export]
macro_rules! vec3 {
    ($a:expr,$b:expr,$c:expr) => {
        Vec3::new($a, $b, $c)
    };
}

impl Index<usize> for Vec3 {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.a[i]
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }
}

impl Add<f64> for Vec3 {
    type Output = Self;

    fn add(self, v: f64) -> Self {
        self + Self::of_scalar(v)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(|a| -a)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }
}

impl Sub<f64> for Vec3 {
    type Output = Self;

    fn sub(self, v: f64) -> Self {
        self - Self::of_scalar(v)
    }
}

impl Mul for Vec3 {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a * b)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, fact: f64) -> Self {
        self.map(|a| a * fact)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;

    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl Div for Vec3 {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a / b)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    fn div(self, fact: f64) -> Self {
        self.map(|a| a / fact)
    }
}

#[test]
fn test_ops() {
    let a = Vec3::new(3., 0., 2.);
    let b = Vec3::new(-1., 4., 2.);

    assert_eq!(a.dot(&b), 1.);
    assert_eq!(a + b, Vec3::new(2., 4., 4.));
    assert_eq!(-a, Vec3::new(-3., -0., -2.));
    assert_eq!(-a * 2., Vec3::new(-6., -0., -4.));
    assert_eq!(2. * a, Vec3::new(6., 0., 4.));
    assert_eq!(a / 2., Vec3::new(1.5, 0., 1.));
    assert_eq!(a - b, Vec3::new(4., -4., 0.));
    assert_eq!(a * b, Vec3::new(-3., 0., 4.));
    assert_eq!(a / Vec3::new(3., 1., 4.), Vec3::new(1., 0., 0.5));
    assert_eq!(a + 1., Vec3::new(4., 1., 3.));
    assert_eq!(a - 0.5, Vec3::new(2.5, -0.5, 1.5));
    assert_eq!(a.mag_squared(), 13.);
    assert_eq!(a.mag(), (13 as f64).sqrt());
    assert_eq!(b[1], 4.);
}

#[test]
fn test_unit_vec() {
    for v in [
        vec3!(3., 0., 4.),
        vec3!(-1e-3, 2e-4, 7e-5),
        vec3!(1e8, -3e7, 12.),
        vec3!(0., 0., -2.),
    ] {
        let u = v.unit_vec().unwrap();
        assert!((u.mag() - 1.).abs() < 1e-12);
        // same direction: parallel and pointing the same way
        assert!((u.dot(&v) - v.mag()).abs() < 1e-9 * v.mag());
    }

    assert_eq!(Vec3::empty().unit_vec(), Err(MathError::ZeroLength));
    assert_eq!(vec3!(-0., 0., -0.).unit_vec(), Err(MathError::ZeroLength));
    assert!(matches!(
        vec3!(f64::INFINITY, 0., 0.).unit_vec(),
        Err(MathError::NonFinite { .. })
    ));
    assert!(matches!(
        vec3!(1., f64::NAN, 0.).unit_vec(),
        Err(MathError::NonFinite { .. })
    ));
}

#[test]
fn test_unit_vec_extreme_magnitudes() {
    let tiny = vec3!(1e-200, 0., 0.).unit_vec().unwrap();
    assert_eq!(tiny, vec3!(1., 0., 0.));

    let denormal = vec3!(0., -5e-324, 0.).unit_vec().unwrap();
    assert_eq!(denormal, vec3!(0., -1., 0.));

    let huge = vec3!(1e200, 1e200, 0.).unit_vec().unwrap();
    let half = (0.5_f64).sqrt();
    assert!((huge - vec3!(half, half, 0.)).mag() < 1e-12);

    let max = vec3!(f64::MAX, -f64::MAX, f64::MAX).unit_vec().unwrap();
    assert!((max.mag() - 1.).abs() < 1e-12);
    assert!(max.x() > 0. && max.y() < 0. && max.z() > 0.);
}
