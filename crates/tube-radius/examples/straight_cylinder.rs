use nalgebra::Vector3;
use std::error::Error;
use std::path::Path;
use tube_radius::{
    compute_tangents_and_normals, smooth_radii, EstimatorConfig, RadiusEstimator, TubePoint,
    Volume,
};

/// Synthetic bright cylinder along z, unit voxels, tanh boundary of width 1.
fn cylinder_volume(radius: f64, dims: [usize; 3]) -> Result<Volume<f32>, Box<dyn Error>> {
    let cx = (dims[0] as f64 - 1.0) * 0.5;
    let cy = (dims[1] as f64 - 1.0) * 0.5;
    let vol = Volume::from_fn(dims, [0.0; 3], [1.0; 3], |p| {
        let rho = (p.x - cx).hypot(p.y - cy);
        (0.5 * (1.0 - (rho - radius).tanh())) as f32
    })?;
    Ok(vol)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => EstimatorConfig::from_json_file(Path::new(path))?,
        None => EstimatorConfig {
            radius0: 3.0,
            ..Default::default()
        },
    };
    let true_radius: f64 = match args.get(2) {
        Some(r) => r.parse()?,
        None => 5.0,
    };

    let dims = [40, 40, 24];
    let vol = cylinder_volume(true_radius, dims)?;
    let axis_xy = (dims[0] as f64 - 1.0) * 0.5;
    let mut points: Vec<TubePoint<3>> = (0..20)
        .map(|k| TubePoint::new(Vector3::new(axis_xy, axis_xy, 2.0 + k as f64)))
        .collect();

    let frames = compute_tangents_and_normals(&mut points)?;
    println!(
        "Built frames for {} points ({} tangent repairs).",
        frames.n_points,
        frames.repairs.len()
    );

    let estimator = RadiusEstimator::with_config(config)?;
    let report = estimator.estimate(&mut points, &vol)?;
    let smoothed = smooth_radii(&mut points, &report, 1.5, estimator.config())?;

    println!(
        "Estimated {} radii: {} accepted, {} low-confidence, {} skipped ({} smoothed).",
        report.points.len(),
        report.n_accepted(),
        report.n_low_confidence(),
        report.n_skipped(),
        smoothed
    );
    let mean = points.iter().map(|p| p.radius).sum::<f64>() / points.len() as f64;
    println!("Mean radius {:.3} (true {:.3}).", mean, true_radius);

    if let Some(out_path) = args.get(3) {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
