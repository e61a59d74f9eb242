use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::{write::GzEncoder, Compression};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, SeedableRng};

use sann::data::table::shuffle_together;
use sann::{
    read_table, train_network, write_predictions, ActivationFunction, LossType, Model,
    NetworkSpec, TrainConfig,
};

/// Inputs on a grid; the target is 1 when x0 > x1.
fn write_dataset(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let mut x = String::from("#sample\tx0\tx1\n");
    let mut y = String::from("#sample\tabove\n");
    for i in 0..12 {
        for j in 0..12 {
            if i == j {
                continue;
            }
            let (a, b) = (i as f64 / 11.0, j as f64 / 11.0);
            let name = format!("s{i}_{j}");
            x.push_str(&format!("{name}\t{a}\t{b}\n"));
            y.push_str(&format!("{name}\t{}\n", if a > b { 1 } else { 0 }));
        }
    }
    let x_path = dir.join("x.snd");
    let y_path = dir.join("y.snd.gz");
    fs::write(&x_path, x).unwrap();
    let mut enc = GzEncoder::new(fs::File::create(&y_path).unwrap(), Compression::default());
    enc.write_all(y.as_bytes()).unwrap();
    enc.finish().unwrap();
    (x_path, y_path)
}

#[test]
fn train_save_load_and_apply() {
    let dir = tempfile::tempdir().unwrap();
    let (x_path, y_path) = write_dataset(dir.path());

    let mut x = read_table(&x_path).unwrap();
    let mut y = read_table(&y_path).unwrap();
    assert_eq!(x.n_rows(), y.n_rows());
    assert_eq!(y.col_names, Some(vec!["above".to_string()]));

    let mut rng = StdRng::seed_from_u64(11);
    let mut spec = NetworkSpec::mlp(2, &[10], ActivationFunction::Tanh, 1, LossType::BinaryCrossEntropy)
        .unwrap();
    spec.metadata.input_names = x.col_names.clone();
    spec.metadata.output_names = y.col_names.clone();
    let mut model = Model::new(spec, &mut rng).unwrap();

    shuffle_together(&mut x, Some(&mut y), &mut rng).unwrap();
    let config = TrainConfig { learning_rate: Some(0.01), ..TrainConfig::new(60, 8) };
    let summary = train_network(&mut model, &x.rows, &y.rows, &config, &mut rng).unwrap();
    assert!(summary.epochs_run > 0);

    let single = dir.path().join("model.json");
    let arch = dir.path().join("arch.json");
    let weights = dir.path().join("weights.json");
    model.save_json(&single).unwrap();
    model.save_split(&arch, &weights).unwrap();

    let from_single = Model::load_json(&single).unwrap();
    let from_split = Model::load_split(&arch, &weights).unwrap();
    assert_eq!(from_single.weights(), from_split.weights());
    assert_eq!(from_single.spec, from_split.spec);

    let probe = read_table(&x_path).unwrap();
    let predictions: Vec<Vec<f64>> = probe.rows.iter()
        .map(|row| from_single.network.predict(row))
        .collect();
    let correct = probe.rows.iter().zip(predictions.iter())
        .filter(|(row, p)| (row[0] > row[1]) == (p[0] > 0.5))
        .count();
    assert!(correct as f64 / probe.n_rows() as f64 > 0.9, "{correct}/{}", probe.n_rows());

    let mut out = Vec::new();
    write_predictions(
        &mut out,
        from_single.spec.metadata.output_names.as_deref(),
        &probe.row_names,
        &predictions,
    )
    .unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("#sample\tabove"));
    assert_eq!(lines.count(), probe.n_rows());
}

#[test]
fn mean_jacobian_points_along_the_decision_boundary_normal() {
    let dir = tempfile::tempdir().unwrap();
    let (x_path, y_path) = write_dataset(dir.path());
    let mut x = read_table(&x_path).unwrap();
    let mut y = read_table(&y_path).unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    let spec = NetworkSpec::mlp(2, &[10], ActivationFunction::Tanh, 1, LossType::BinaryCrossEntropy)
        .unwrap();
    let mut model = Model::new(spec, &mut rng).unwrap();
    shuffle_together(&mut x, Some(&mut y), &mut rng).unwrap();
    let config = TrainConfig { learning_rate: Some(0.01), validation_fraction: 0.0, ..TrainConfig::new(60, 8) };
    train_network(&mut model, &x.rows, &y.rows, &config, &mut rng).unwrap();

    let mean = model.network.mean_jacobian(&x.rows, &y.rows);
    let row = mean[0].as_ref().unwrap();
    // Raising x0 pushes a sample towards "above", raising x1 away from it.
    assert!(row[0] > 0.0 && row[1] < 0.0, "{row:?}");
}
