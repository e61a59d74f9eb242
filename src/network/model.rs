use std::io::Write;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::stream::{create_writer, open_reader};
use crate::error::{Result, SannError};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::network::spec::NetworkSpec;

/// Version stamped into every model, architecture and weights file.
pub const FORMAT_VERSION: u32 = 1;

/// Trained parameters of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    /// Shape (input_size, size).
    pub weights: Matrix,
    /// Shape (1, size).
    pub biases: Matrix,
}

/// Single-file layout: architecture and weights together.
#[derive(Serialize, Deserialize)]
struct ModelFile {
    format_version: u32,
    spec: NetworkSpec,
    layers: Vec<LayerWeights>,
}

/// Architecture half of the split layout.
#[derive(Serialize, Deserialize)]
struct ArchitectureFile {
    format_version: u32,
    spec: NetworkSpec,
}

/// Weights half of the split layout.
#[derive(Serialize, Deserialize)]
struct WeightsFile {
    format_version: u32,
    layers: Vec<LayerWeights>,
}

/// A network together with the architecture it was built from.
#[derive(Debug, Clone)]
pub struct Model {
    pub spec: NetworkSpec,
    pub network: Network,
}

impl Model {
    /// Builds a freshly initialised model.
    pub fn new<R: Rng + ?Sized>(spec: NetworkSpec, rng: &mut R) -> Result<Model> {
        spec.validate()?;
        let network = Network::new(&spec.layers, rng);
        Ok(Model { spec, network })
    }

    /// Rebuilds a model from an architecture and stored weights, checking
    /// every matrix against the architecture.
    pub fn from_parts(spec: NetworkSpec, layers: Vec<LayerWeights>) -> Result<Model> {
        spec.validate()?;
        if layers.len() != spec.layers.len() {
            return Err(SannError::shape(format!(
                "architecture has {} layers but {} weight sets were stored",
                spec.layers.len(),
                layers.len()
            )));
        }
        let layers = spec.layers.iter().zip(layers).enumerate()
            .map(|(i, (ls, lw))| {
                let weights_ok = lw.weights.is_well_formed()
                    && lw.weights.rows == ls.input_size
                    && lw.weights.cols == ls.size;
                let biases_ok = lw.biases.is_well_formed()
                    && lw.biases.rows == 1
                    && lw.biases.cols == ls.size;
                if !weights_ok || !biases_ok {
                    return Err(SannError::shape(format!(
                        "layer {}: stored weights do not match {}x{} ({} activation)",
                        i + 1, ls.input_size, ls.size, ls.activation
                    )));
                }
                Ok(Layer::from_parts(lw.weights, lw.biases, ls.activation))
            })
            .collect::<Result<Vec<Layer>>>()?;
        Ok(Model { spec, network: Network { layers } })
    }

    pub fn n_in(&self) -> usize {
        self.network.n_in()
    }

    pub fn n_out(&self) -> usize {
        self.network.n_out()
    }

    /// Current parameters of every layer.
    pub fn weights(&self) -> Vec<LayerWeights> {
        self.network.layers.iter()
            .map(|l| LayerWeights { weights: l.weights.clone(), biases: l.biases.clone() })
            .collect()
    }

    /// Serializes the whole model to one pretty-printed JSON file (`-` for stdout).
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = ModelFile {
            format_version: FORMAT_VERSION,
            spec: self.spec.clone(),
            layers: self.weights(),
        };
        write_json(path.as_ref(), &file)
    }

    /// Deserializes a model written by `save_json` (`-` for stdin).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Model> {
        let file: ModelFile = read_json(path.as_ref())?;
        check_version(file.format_version)?;
        Model::from_parts(file.spec, file.layers)
    }

    /// Writes the architecture and the weights to two separate files.
    pub fn save_split(&self, arch_path: impl AsRef<Path>, weights_path: impl AsRef<Path>) -> Result<()> {
        write_json(arch_path.as_ref(), &ArchitectureFile {
            format_version: FORMAT_VERSION,
            spec: self.spec.clone(),
        })?;
        write_json(weights_path.as_ref(), &WeightsFile {
            format_version: FORMAT_VERSION,
            layers: self.weights(),
        })
    }

    /// Reads a model written by `save_split`.
    pub fn load_split(arch_path: impl AsRef<Path>, weights_path: impl AsRef<Path>) -> Result<Model> {
        let arch: ArchitectureFile = read_json(arch_path.as_ref())?;
        check_version(arch.format_version)?;
        let weights: WeightsFile = read_json(weights_path.as_ref())?;
        check_version(weights.format_version)?;
        Model::from_parts(arch.spec, weights.layers)
    }
}

fn check_version(found: u32) -> Result<()> {
    if found != FORMAT_VERSION {
        return Err(SannError::Format(format!(
            "format version {found}, expected {FORMAT_VERSION}"
        )));
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = create_writer(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    debug!(path = %path.display(), "wrote model file");
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let reader = open_reader(path)?;
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::loss::loss_type::LossType;
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_model() -> Model {
        let mut spec = NetworkSpec::mlp(3, &[4], ActivationFunction::ReLU, 2, LossType::BinaryCrossEntropy)
            .unwrap();
        spec.metadata.output_names = Some(vec!["yes".into(), "no".into()]);
        Model::new(spec, &mut StdRng::seed_from_u64(11)).unwrap()
    }

    #[test]
    fn single_file_round_trip_preserves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = small_model();
        model.save_json(&path).unwrap();

        let loaded = Model::load_json(&path).unwrap();
        assert_eq!(loaded.spec, model.spec);
        let x = [0.1, 0.7, -0.3];
        assert_eq!(loaded.network.predict(&x), model.network.predict(&x));
    }

    #[test]
    fn split_round_trip_preserves_weights() {
        let dir = tempfile::tempdir().unwrap();
        let arch = dir.path().join("arch.json");
        let weights = dir.path().join("weights.json");
        let model = small_model();
        model.save_split(&arch, &weights).unwrap();

        let loaded = Model::load_split(&arch, &weights).unwrap();
        assert_eq!(loaded.weights(), model.weights());
        assert_eq!(loaded.spec.metadata.output_names, model.spec.metadata.output_names);
    }

    #[test]
    fn from_parts_rejects_mismatched_weights() {
        let model = small_model();
        let mut layers = model.weights();
        layers[1].weights = Matrix::zeros(3, 2);
        let err = Model::from_parts(model.spec.clone(), layers).unwrap_err();
        assert!(matches!(err, SannError::Shape(_)));

        let err = Model::from_parts(model.spec.clone(), model.weights()[..1].to_vec()).unwrap_err();
        assert!(matches!(err, SannError::Shape(_)));
    }

    #[test]
    fn rejects_unknown_format_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        small_model().save_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap()
            .replacen("\"format_version\": 1", "\"format_version\": 99", 1);
        std::fs::write(&path, text).unwrap();
        assert!(matches!(Model::load_json(&path), Err(SannError::Format(_))));
    }
}
