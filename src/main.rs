use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[macro_use]
mod vec3;
mod config;
mod march;
mod ray;
mod sdf;

use crate::config::RenderConfig;
use crate::march::march;
use crate::ray::Ray;
use crate::sdf::{Sdf, SphereLattice};
use crate::vec3::{MathError, Point3, Vec3};

const OUTPUT_PATH: &str = "inf.ppm";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn of_rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    pub fn gray(v: f64) -> Self {
        Self::of_rgb(v, v, v)
    }

    const MAX_VAL: i32 = 255;

    pub fn to_int_rgb(&self) -> (i32, i32, i32) {
        let norm = |c: f64| (c * Self::MAX_VAL as f64).round() as i32;

        (norm(self.r), norm(self.g), norm(self.b))
    }
}

#[derive(Debug)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<Vec<Color>>,
}

impl Image {
    /// Plain `P3` ppm, one pixel per line, top-left first.
    pub fn write_ppm(&self, out: &mut impl Write) -> std::io::Result<()> {
        write!(
            out,
            "P3\n{} {}\n{}\n",
            self.width,
            self.height,
            Color::MAX_VAL
        )?;

        for row in &self.buffer {
            for col in row {
                let (r, g, b) = col.to_int_rgb();
                writeln!(out, "{} {} {}", r, g, b)?;
            }
        }

        Ok(())
    }

    pub fn to_ppm(&self, path: &str) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path))?;
        let mut out = BufWriter::new(file);

        self.write_ppm(&mut out)
            .and_then(|_| out.flush())
            .with_context(|| format!("writing {}", path))?;

        Ok(())
    }
}

/// Pinhole camera at the config origin looking down -z.
#[derive(Debug, Clone, Copy)]
struct Camera {
    origin: Point3,
    viewport_width: usize,
    viewport_height: usize,
    // distance from the pinhole to the virtual screen, in pixels
    screen_dist: f64,
}

impl Camera {
    pub fn new(cfg: &RenderConfig) -> Self {
        let fov = cfg.fov_degrees.to_radians();

        Camera {
            origin: cfg.origin,
            viewport_width: cfg.width,
            viewport_height: cfg.height,
            screen_dist: cfg.height as f64 / (fov / 2.).tan(),
        }
    }

    pub fn ray_dir(&self, row: f64, col: f64) -> Result<Vec3, MathError> {
        let x = col - self.viewport_width as f64 / 2.;
        let y = row - self.viewport_height as f64 / 2.;

        vec3!(x, y, -self.screen_dist).unit_vec()
    }

    pub fn cast_ray(&self, row: f64, col: f64) -> Result<Ray, MathError> {
        Ray::new(self.origin, self.ray_dir(row, col)?)
    }
}

fn render(cfg: &RenderConfig, sdf: &impl Sdf) -> Result<Image> {
    cfg.validate()?;
    sdf.validate()?;

    info!(
        "rendering {}x{}, fov {}, {} steps",
        cfg.width, cfg.height, cfg.fov_degrees, cfg.max_steps
    );

    let cam = Camera::new(cfg);
    let lines_complete = AtomicUsize::new(0);

    let buffer = (0..cfg.height)
        .into_par_iter()
        .map(|y| {
            let line = (0..cfg.width)
                .map(|x| -> Result<Color, MathError> {
                    let ray = cam.cast_ray(y as f64 + 0.5, x as f64 + 0.5)?;
                    Ok(Color::gray(march(sdf, &ray, cfg)))
                })
                .collect::<Result<Vec<_>, MathError>>();

            let lines_complete = lines_complete.fetch_add(1, Ordering::Relaxed) + 1;
            if lines_complete % 50 == 0 {
                let progress = (lines_complete as f64 / cfg.height as f64) * 100.;
                debug!("{:.1}%", progress);
            }
            line
        })
        .collect::<Result<Vec<_>, MathError>>()?;

    Ok(Image {
        width: cfg.width,
        height: cfg.height,
        buffer,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start = Instant::now();
    let img = render(&RenderConfig::default(), &SphereLattice::default())?;
    img.to_ppm(OUTPUT_PATH)?;

    info!("wrote {} in {:.2?}", OUTPUT_PATH, start.elapsed());
    Ok(())
}

#[cfg(test)]
fn small_config() -> RenderConfig {
    RenderConfig {
        width: 64,
        height: 36,
        ..RenderConfig::default()
    }
}

#[cfg(test)]
fn ppm_bytes(img: &Image) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_ppm(&mut out).unwrap();
    out
}

#[cfg(test)]
fn check_ppm(text: &str, width: usize, height: usize) {
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some(format!("{} {}", width, height).as_str()));
    assert_eq!(lines.next(), Some("255"));

    let mut count = 0;
    for line in lines {
        let vals: Vec<i32> = line.split(' ').map(|v| v.parse().unwrap()).collect();
        assert_eq!(vals.len(), 3, "bad triplet {:?}", line);
        assert!(vals[0] == vals[1] && vals[1] == vals[2], "not gray {:?}", line);
        assert!((0..=255).contains(&vals[0]));
        count += 1;
    }
    assert_eq!(count, width * height);
}

#[test]
fn test_color() {
    assert_eq!(Color::gray(1.).to_int_rgb(), (255, 255, 255));
    assert_eq!(Color::gray(0.).to_int_rgb(), (0, 0, 0));
    // 1/64 * 255 = 3.98
    assert_eq!(Color::gray(1. / 64.).to_int_rgb(), (4, 4, 4));
    assert_eq!(Color::gray(0.5).to_int_rgb(), (128, 128, 128));
}

#[test]
fn test_center_ray() {
    let cfg = RenderConfig::default();
    let cam = Camera::new(&cfg);
    let dir = cam.ray_dir(540., 960.).unwrap();

    assert!((dir - vec3!(0., 0., -1.)).mag() < 1e-12);

    let ray = cam.cast_ray(540., 960.).unwrap();
    assert_eq!(ray.origin, Vec3::empty());
}

#[test]
fn test_ray_dirs() {
    let cfg = RenderConfig::default();
    let cam = Camera::new(&cfg);

    for &(row, col) in &[(0.5, 0.5), (0.5, 1919.5), (1079.5, 0.5), (300.5, 1200.5)] {
        let dir = cam.ray_dir(row, col).unwrap();
        assert!((dir.mag() - 1.).abs() < 1e-12);
        assert!(dir.z() < 0.);
        // screen offsets keep their sign
        assert_eq!(dir.x() < 0., col < 960.);
        assert_eq!(dir.y() < 0., row < 540.);
    }

    // bottom edge is height/2 below center on a screen height/tan(fov/2) away
    let fov = 45_f64.to_radians();
    let edge = cam.ray_dir(1080., 960.).unwrap();
    assert!((edge.y() / -edge.z() - 0.5 * (fov / 2.).tan()).abs() < 1e-12);
}

#[test]
fn test_render_rejects_bad_input() {
    let bad_cfg = RenderConfig {
        fov_degrees: 180.,
        ..RenderConfig::default()
    };
    assert!(render(&bad_cfg, &SphereLattice::default()).is_err());

    // a zero period would make every distance NaN and every pixel white
    let err = render(&small_config(), &SphereLattice::new(0., 0.2)).unwrap_err();
    assert!(err.to_string().contains("period"));
}

#[test]
fn test_render_small() {
    let cfg = small_config();
    let img = render(&cfg, &SphereLattice::default()).unwrap();

    assert_eq!(img.buffer.len(), cfg.height);
    assert!(img.buffer.iter().all(|row| row.len() == cfg.width));

    let text = String::from_utf8(ppm_bytes(&img)).unwrap();
    check_ppm(&text, cfg.width, cfg.height);
}

#[test]
fn test_render_row_order() {
    // solid wherever y > 0, which rows past the middle of the screen look at
    struct HalfSpace;

    impl Sdf for HalfSpace {
        fn dist(&self, p: Point3) -> f64 {
            if p.y() > 0. {
                0.
            } else {
                1.
            }
        }
    }

    let cfg = RenderConfig {
        width: 8,
        height: 8,
        max_steps: 4,
        ..RenderConfig::default()
    };
    let img = render(&cfg, &HalfSpace).unwrap();

    // first row written is the one looking at -y
    assert!(img.buffer[0].iter().all(|c| *c == Color::gray(1.)));
    assert!(img.buffer[7].iter().all(|c| *c == Color::gray(0.)));

    let text = String::from_utf8(ppm_bytes(&img)).unwrap();
    assert_eq!(text.lines().nth(3), Some("255 255 255"));
    assert_eq!(text.lines().last(), Some("0 0 0"));
}

#[test]
fn test_render_deterministic() {
    let cfg = small_config();
    let a = ppm_bytes(&render(&cfg, &SphereLattice::default()).unwrap());
    let b = ppm_bytes(&render(&cfg, &SphereLattice::default()).unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_render_full_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inf.ppm");
    let path = path.to_str().unwrap();

    let cfg = RenderConfig::default();
    render(&cfg, &SphereLattice::default())
        .unwrap()
        .to_ppm(path)
        .unwrap();

    let text = std::fs::read_to_string(path).unwrap();
    check_ppm(&text, 1920, 1080);
}
