use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column or a rank-1 array
// ---------------------------------------------------------------------------

/// A dynamically-typed scalar mirroring the dtypes a participants table holds.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Coerce the cell into an identifier string.
    ///
    /// Floats keep their full precision (`1.0`, not `1.0000`) and nulls become
    /// the empty string.
    pub fn to_id_string(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => format!("{v:?}"),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Image – an opaque, decoded image handle
// ---------------------------------------------------------------------------

/// A decoded image: a dense block of intensities with arbitrary rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: ArrayD<f64>,
}

impl Image {
    /// Wrap an array as an image; the array's shape becomes the image shape.
    pub fn from_array(pixels: ArrayD<f64>) -> Self {
        Image { pixels }
    }

    /// Build an image from a shape and row-major intensities.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f64>) -> Option<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .ok()
            .map(Image::from_array)
    }

    pub fn shape(&self) -> &[usize] {
        self.pixels.shape()
    }

    pub fn ndim(&self) -> usize {
        self.pixels.ndim()
    }

    pub fn pixels(&self) -> &ArrayD<f64> {
        &self.pixels
    }

    pub fn into_array(self) -> ArrayD<f64> {
        self.pixels
    }

    /// Mean intensity, or `None` for an empty image.
    pub fn mean(&self) -> Option<f64> {
        self.pixels.mean()
    }
}

// ---------------------------------------------------------------------------
// Value – one entry of a config's value sequence
// ---------------------------------------------------------------------------

/// An entry of a config's `values` sequence.
///
/// Stored values are handles: a `Path` is only decoded when the owning config
/// materialises it. Materialised values never contain `Path`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A scalar from a table column or a rank-1 array.
    Cell(CellValue),
    /// One row of a rank-2 array.
    Vector(Vec<f64>),
    /// An in-memory image.
    Image(Arc<Image>),
    /// A file reference decoded on access.
    Path(PathBuf),
    /// Position-wise tuple from a composite config.
    Tuple(Vec<Value>),
}

impl Value {
    pub fn image(image: Image) -> Self {
        Value::Image(Arc::new(image))
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Value::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&CellValue> {
        match self {
            Value::Cell(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Short human-readable description used by the CLI.
    pub fn describe(&self) -> String {
        match self {
            Value::Cell(c) => c.to_string(),
            Value::Vector(v) => format!("vector[{}]", v.len()),
            Value::Image(img) => format!("image{:?}", img.shape()),
            Value::Path(p) => p.display().to_string(),
            Value::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(Value::describe).collect();
                format!("({})", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_string_coercion() {
        assert_eq!(CellValue::String("sub-01".into()).to_id_string(), "sub-01");
        assert_eq!(CellValue::Integer(7).to_id_string(), "7");
        assert_eq!(CellValue::Float(1.0).to_id_string(), "1.0");
        assert_eq!(CellValue::Null.to_id_string(), "");
    }

    #[test]
    fn image_from_shape_vec_checks_size() {
        assert!(Image::from_shape_vec(&[2, 3], vec![0.0; 6]).is_some());
        assert!(Image::from_shape_vec(&[2, 3], vec![0.0; 5]).is_none());
    }

    #[test]
    fn describe_tuple() {
        let v = Value::Tuple(vec![
            Value::Cell(CellValue::Integer(3)),
            Value::image(Image::from_shape_vec(&[2, 2], vec![1.0; 4]).unwrap()),
        ]);
        assert_eq!(v.describe(), "(3, image[2, 2])");
    }
}
