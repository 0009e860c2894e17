//! Tests for fitting and applying the standardization normalizer.

use ndarray::{Array1, Array2, Axis};
use sysid_data::{DataError, SystemData, SystemDataList, SystemDataNorm, WindowableSequence};
use tempfile::TempDir;

fn recording(n: usize, offset: f64, scale: f64) -> SystemData {
    let u = Array2::from_shape_fn((n, 2), |(t, j)| offset + scale * ((t + j) as f64 * 0.37).sin());
    let y = Array1::from_iter((0..n).map(|t| offset * 2.0 + scale * (t as f64 * 0.11).cos()));
    SystemData::from_io(u, y).unwrap()
}

fn assert_close(a: &Array2<f64>, b: &Array2<f64>) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() < 1e-9, "{x} != {y}");
    }
}

#[test]
fn test_round_trip_single() {
    let data = recording(200, 5.0, 3.0);
    let norm = SystemDataNorm::fitted(&data).unwrap();

    let normed = norm.transform(&data).unwrap();
    assert!(normed.is_normed());
    let restored = norm.inverse_transform(&normed).unwrap();
    assert!(!restored.is_normed());

    assert_close(restored.u().values(), data.u().values());
    assert_close(restored.y().unwrap().values(), data.y().unwrap().values());
    assert!(restored.y().unwrap().is_scalar());
}

#[test]
fn test_transform_does_not_mutate_input() {
    let data = recording(50, 1.0, 2.0);
    let before = data.clone();
    let norm = SystemDataNorm::fitted(&data).unwrap();
    let _ = norm.transform(&data).unwrap();
    assert_eq!(data, before);
}

#[test]
fn test_state_and_warm_up_pass_through() {
    let x = Array2::from_shape_fn((30, 3), |(t, j)| (t * j) as f64);
    let data = recording(30, 0.0, 1.0)
        .with_state(x.clone())
        .unwrap()
        .with_cheat_n(4)
        .unwrap();
    let norm = SystemDataNorm::fitted(&data).unwrap();
    let normed = norm.transform(&data).unwrap();

    assert_eq!(normed.x().unwrap().values(), &x);
    assert_eq!(normed.cheat_n(), 4);
}

#[test]
fn test_fit_pools_all_members() {
    let a = recording(100, 0.0, 1.0);
    let b = recording(300, 10.0, 4.0);

    let from_vec = SystemDataNorm::fitted(&vec![a.clone(), b.clone()]).unwrap();
    let list = SystemDataList::new(vec![a.clone(), b.clone()]).unwrap();
    let from_list = SystemDataNorm::fitted(&list).unwrap();
    assert_eq!(from_vec, from_list);

    // pooled statistics equal those of the concatenated data
    let pooled = ndarray::concatenate(
        Axis(0),
        &[a.u().values().view(), b.u().values().view()],
    )
    .unwrap();
    let mean = pooled.mean_axis(Axis(0)).unwrap();
    let std = pooled.std_axis(Axis(0), 0.0);
    for j in 0..2 {
        assert!((from_list.u0[j] - mean[j]).abs() < 1e-9);
        assert!((from_list.ustd[j] - std[j]).abs() < 1e-9);
    }
}

#[test]
fn test_transform_collection_and_vec() {
    let members = vec![recording(80, 0.0, 1.0), recording(60, 3.0, 2.0)];
    let norm = SystemDataNorm::fitted(&members).unwrap();

    let normed_vec = norm.transform(&members).unwrap();
    assert_eq!(normed_vec.len(), 2);
    assert!(normed_vec.iter().all(|m| m.is_normed()));

    let list = SystemDataList::new(members).unwrap();
    let normed_list = norm.transform(&list).unwrap();
    assert!(normed_list.is_normed());
    assert_eq!(normed_list.members(), normed_vec.as_slice());

    // pooled output has zero mean and unit std
    let y = normed_list.y().unwrap();
    let column = y.values().column(0);
    assert!(column.mean().unwrap().abs() < 1e-9);
    assert!((column.std(0.0) - 1.0).abs() < 1e-9);

    let restored = norm.inverse_transform(&normed_list).unwrap();
    assert!(!restored.is_normed());
}

#[test]
fn test_state_checks() {
    let data = recording(20, 0.0, 1.0);
    let norm = SystemDataNorm::new();
    let normed = norm.transform(&data).unwrap();

    assert!(matches!(norm.transform(&normed), Err(DataError::AlreadyNormalized)));
    assert!(matches!(norm.inverse_transform(&data), Err(DataError::NotNormalized)));
}

#[test]
fn test_fit_on_empty_vec() {
    let empty: Vec<SystemData> = Vec::new();
    assert!(matches!(SystemDataNorm::fitted(&empty), Err(DataError::EmptyFit)));
}

#[test]
fn test_json_persistence() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("norm.json");

    let norm = SystemDataNorm::fitted(&recording(64, 2.0, 0.5)).unwrap();
    norm.save_json(&path).unwrap();
    let loaded = SystemDataNorm::load_json(&path).unwrap();

    for (a, b) in [
        (&loaded.u0, &norm.u0),
        (&loaded.ustd, &norm.ustd),
        (&loaded.y0, &norm.y0),
        (&loaded.ystd, &norm.ystd),
    ] {
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-12));
    }
    assert!(norm.to_string().starts_with("norm: u0=["));
}
