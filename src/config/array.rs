use ndarray::{ArrayD, Axis};

use crate::data::model::{CellValue, Image, Value};
use crate::error::{ConfigError, Result};

/// A numeric array indexed along its leading sample axis.
///
/// Arrays with more than two axes are split into one [`Image`] per sample;
/// rank-2 arrays yield one vector per row and rank-1 arrays one scalar per
/// entry.
#[derive(Debug, Clone)]
pub struct ArrayConfig {
    shape: Vec<usize>,
    pub(crate) values: Vec<Value>,
    pub(crate) ids: Option<Vec<String>>,
}

impl ArrayConfig {
    pub fn new(array: ArrayD<f64>) -> Result<Self> {
        let shape = array.shape().to_vec();
        let values = match array.ndim() {
            0 => {
                return Err(ConfigError::InvalidArray(
                    "a scalar has no sample axis".into(),
                ))
            }
            1 => array
                .iter()
                .map(|&v| Value::Cell(CellValue::Float(v)))
                .collect(),
            2 => array
                .axis_iter(Axis(0))
                .map(|row| Value::Vector(row.iter().copied().collect()))
                .collect(),
            _ => array
                .axis_iter(Axis(0))
                .map(|sample| Value::image(Image::from_array(sample.to_owned())))
                .collect(),
        };
        log::debug!("array config with shape {shape:?}");
        Ok(ArrayConfig {
            shape,
            values,
            ids: None,
        })
    }

    /// A rank-1 sequence of non-numeric scalars, e.g. class labels.
    pub fn from_cells(cells: Vec<CellValue>) -> Self {
        ArrayConfig {
            shape: vec![cells.len()],
            values: cells.into_iter().map(Value::Cell).collect(),
            ids: None,
        }
    }

    /// Shape of the source array.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use ndarray::IxDyn;

    use super::*;
    use crate::config::Config;

    #[test]
    fn rank_four_splits_into_volumes() {
        let array = ArrayD::from_shape_fn(IxDyn(&[5, 4, 3, 2]), |ix| ix[0] as f64);
        let config: Config = ArrayConfig::new(array).unwrap().into();

        assert_eq!(config.len(), 5);
        assert!(config.ids().is_none());
        for (i, value) in config.values().iter().enumerate() {
            let img = value.as_image().unwrap();
            assert_eq!(img.shape(), [4, 3, 2]);
            assert!(img.pixels().iter().all(|&v| v == i as f64));
        }
    }

    #[test]
    fn rank_three_splits_into_slices() {
        let array = ArrayD::zeros(IxDyn(&[2, 8, 8]));
        let config = ArrayConfig::new(array).unwrap();
        assert_eq!(config.values[1].as_image().unwrap().shape(), [8, 8]);
    }

    #[test]
    fn rank_two_yields_rows() {
        let array = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1., 2., 3., 4., 5., 6.]).unwrap();
        let config = ArrayConfig::new(array).unwrap();
        assert_eq!(config.values[1], Value::Vector(vec![4., 5., 6.]));
        assert_eq!(config.shape(), [2, 3]);
    }

    #[test]
    fn rank_one_yields_scalars() {
        let array = ArrayD::from_shape_vec(IxDyn(&[3]), vec![0.5, 1.5, 2.5]).unwrap();
        let config = ArrayConfig::new(array).unwrap();
        assert_eq!(config.values[2], Value::Cell(CellValue::Float(2.5)));
    }

    #[test]
    fn rank_zero_is_rejected() {
        let array = ArrayD::from_elem(IxDyn(&[]), 1.0);
        assert!(matches!(
            ArrayConfig::new(array),
            Err(ConfigError::InvalidArray(_))
        ));
    }
}
