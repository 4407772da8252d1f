use crate::vec3::{MathError, Point3, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Point3, dir: Vec3) -> Result<Ray, MathError> {
        Ok(Ray {
            origin,
            dir: dir.unit_vec()?,
        })
    }

    pub fn cast(&self, t: f64) -> Point3 {
        self.origin + self.dir * t
    }
}

#[test]
fn test_cast() {
    let ray = Ray::new(vec3!(1., 2., 3.), vec3!(0., 0., -5.)).unwrap();
    assert_eq!(ray.dir, vec3!(0., 0., -1.));
    assert_eq!(ray.cast(2.), vec3!(1., 2., 1.));
    assert!(Ray::new(ray.origin, Vec3::empty()).is_err());
}
