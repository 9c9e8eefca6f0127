//! End-to-end comparisons through files on disk.

use std::path::{Path, PathBuf};

use diffpool::{
    CompareConfig, CompareSession, Error, ErrorMap, EvalParams, HistogramPool, PixelBuffer,
    PoolConfig,
};

fn write_png(dir: &Path, name: &str, width: u32, height: u32, pixel: impl Fn(u32, u32) -> u8) -> PathBuf {
    let path = dir.join(name);
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = pixel(x, y);
            data.extend_from_slice(&[v, v, v]);
        }
    }
    image::save_buffer(&path, &data, width, height, image::ColorType::Rgb8).unwrap();
    path
}

#[test]
fn test_identical_images() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_png(dir.path(), "ref.png", 32, 24, |x, y| ((x * 7 + y * 3) % 256) as u8);
    let test = write_png(dir.path(), "test.png", 32, 24, |x, y| ((x * 7 + y * 3) % 256) as u8);

    let session = CompareSession::new(CompareConfig::default());
    let report = session.run_comparison(&reference, &test).unwrap();

    assert_eq!((report.width, report.height), (32, 24));
    assert!(!report.hdr);
    assert_eq!(report.summary.count, 32 * 24);

    let text = report.to_text();
    for label in ["Mean", "Weighted median", "Min", "Max"] {
        assert!(text.contains(&format!("     {label}: 0.000000")), "{label}:\n{text}");
    }
}

#[test]
fn test_checkerboard_error_map() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_png(dir.path(), "ref.png", 16, 16, |_, _| 0);
    let test = write_png(dir.path(), "test.png", 16, 16, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 });

    let session = CompareSession::new(CompareConfig::builder().parallel(false).build());
    let report = session.run_comparison(&reference, &test).unwrap();
    let s = &report.summary;

    assert!((s.mean - 0.5).abs() < 1e-9);
    assert_eq!(s.min, 0.0);
    assert_eq!(s.max, 1.0);
    // Unweighted: half the pixels on each side of the gap.
    assert!((s.median - 0.5).abs() < 1e-6);
    // Weighted: all error mass sits in the top bin.
    assert!(s.weighted_median >= 0.99);
    assert!(s.weighted_q1 >= 0.99);
}

#[test]
fn test_dimension_mismatch_before_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_png(dir.path(), "ref.png", 4, 4, |_, _| 128);
    let test = write_png(dir.path(), "test.png", 8, 8, |_, _| 128);

    let evaluator = |_: &PixelBuffer, _: &PixelBuffer, _: bool, _: &mut EvalParams| -> diffpool::Result<ErrorMap> {
        panic!("evaluator must not run on mismatched inputs")
    };
    let session = CompareSession::with_evaluator(CompareConfig::default(), evaluator);

    match session.run_comparison(&reference, &test) {
        Err(Error::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, (4, 4));
            assert_eq!(actual, (8, 8));
        }
        other => panic!("expected dimension mismatch, got {other:?}"),
    }
}

#[test]
fn test_unreadable_reference() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"not an image").unwrap();
    let test = write_png(dir.path(), "test.png", 4, 4, |_, _| 0);

    let session = CompareSession::new(CompareConfig::default());
    match session.run_comparison(&bogus, &test) {
        Err(Error::ImageLoad { path, .. }) => assert_eq!(path, bogus),
        other => panic!("expected image load error, got {other:?}"),
    }
}

#[test]
fn test_hdr_mode_from_reference_path() {
    let dir = tempfile::tempdir().unwrap();
    let exr_dir = dir.path().join("exr");
    std::fs::create_dir(&exr_dir).unwrap();
    let reference = write_png(&exr_dir, "ref.png", 8, 8, |_, _| 200);
    let test = write_png(dir.path(), "test.png", 8, 8, |_, _| 180);

    let session = CompareSession::new(CompareConfig::default());
    let report = session.run_comparison(&reference, &test).unwrap();

    assert!(report.hdr);
    assert!(report.params.start_exposure.is_some());
    assert!(report.params.num_exposures.unwrap() >= 2);
    assert!(report.to_text().contains("Number of exposures: "));
}

#[test]
fn test_parallel_matches_sequential() {
    let values: Vec<f32> = (0..64 * 48).map(|i| ((i * 37) % 1000) as f32 / 999.0).collect();
    let map = ErrorMap::new(values, 64, 48).unwrap();

    let parallel = HistogramPool::from_error_map(&map, &PoolConfig::new(100)).unwrap();
    let sequential =
        HistogramPool::from_error_map(&map, &PoolConfig::new(100).with_parallel(false)).unwrap();

    assert_eq!(parallel.count(), sequential.count());
    assert!(parallel.bins().zip(sequential.bins()).all(|(a, b)| a.count == b.count));
    assert!((parallel.mean().unwrap() - sequential.mean().unwrap()).abs() < 1e-9);
    assert_eq!(
        parallel.weighted_percentile(0.5).unwrap(),
        sequential.weighted_percentile(0.5).unwrap()
    );
}
