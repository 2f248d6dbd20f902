//! Randomized recovery of known radii on synthetic tubes.

use image::{ImageBuffer, Luma};
use nalgebra::{Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tube_radius::{
    compute_tangents_and_normals, estimate_radii, EstimatorConfig, FnField, PointStatus,
    TubePoint,
};

const TRIALS: usize = 40;

fn profile(rho: f64, radius: f64, width: f64) -> f64 {
    0.5 * (1.0 - ((rho - radius) / width).tanh())
}

fn random_unit3(rng: &mut StdRng) -> Vector3<f64> {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let n = v.norm();
        if n > 0.2 && n <= 1.0 {
            return v / n;
        }
    }
}

#[test]
fn tilted_cylinders_recover_radius_within_one_unit() {
    let mut rng = StdRng::seed_from_u64(0x7ab3);
    let mut hits = 0usize;

    for trial in 0..TRIALS {
        let radius = rng.gen_range(2.0..8.0);
        let guess = rng.gen_range(1.0..3.0);
        let width = rng.gen_range(0.6..1.4);
        let axis = random_unit3(&mut rng);
        let origin = Vector3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        );

        let field = FnField::new(move |p: &Vector3<f64>| {
            let d = p - origin;
            let rho = (d - axis * d.dot(&axis)).norm();
            Some(profile(rho, radius, width))
        });
        let mut pts: Vec<TubePoint<3>> = (0..9)
            .map(|k| TubePoint::new(origin + axis * (k as f64 - 4.0)))
            .collect();
        compute_tangents_and_normals(&mut pts).expect("frames");

        let cfg = EstimatorConfig {
            radius0: guess,
            ..Default::default()
        };
        let report = estimate_radii(&mut pts, &field, &cfg).expect("estimate");

        let mid = &pts[4];
        let ok = (mid.radius - radius).abs() <= 1.0
            && report.points[4].status == PointStatus::Accepted;
        if ok {
            hits += 1;
        } else {
            eprintln!(
                "trial {}: R={:.3} guess={:.3} got {:.3} ({:?})",
                trial, radius, guess, mid.radius, report.points[4].status
            );
        }
    }

    assert!(
        hits * 10 >= TRIALS * 8,
        "only {} of {} trials within one unit",
        hits,
        TRIALS
    );
}

#[test]
fn rotated_bars_in_float_images_recover_half_width() {
    let mut rng = StdRng::seed_from_u64(0x51de);
    let size = 96u32;
    let c = (size as f64 - 1.0) * 0.5;
    let mut hits = 0usize;

    for _ in 0..TRIALS {
        let radius = rng.gen_range(2.0..8.0);
        let guess = rng.gen_range(1.0..3.0);
        let angle = rng.gen_range(0.0..std::f64::consts::PI);
        let dir = Vector2::new(angle.cos(), angle.sin());
        let normal = Vector2::new(-dir.y, dir.x);

        let img = ImageBuffer::<Luma<f32>, Vec<f32>>::from_fn(size, size, |x, y| {
            let d = Vector2::new(x as f64 - c, y as f64 - c);
            Luma([profile(d.dot(&normal).abs(), radius, 1.0) as f32])
        });
        let mut pts: Vec<TubePoint<2>> = (0..7)
            .map(|k| TubePoint::new(Vector2::new(c, c) + dir * (3.0 * k as f64 - 9.0)))
            .collect();
        compute_tangents_and_normals(&mut pts).expect("frames");

        let cfg = EstimatorConfig {
            radius0: guess,
            ..Default::default()
        };
        estimate_radii(&mut pts, &img, &cfg).expect("estimate");

        if (pts[3].radius - radius).abs() <= 1.0 {
            hits += 1;
        }
    }

    assert!(hits * 10 >= TRIALS * 8, "{} of {}", hits, TRIALS);
}
