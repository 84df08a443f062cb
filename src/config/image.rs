use crate::data::model::{Image, Value};

/// Wraps images that are already in memory.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub(crate) values: Vec<Value>,
    pub(crate) ids: Option<Vec<String>>,
}

impl ImageConfig {
    pub fn new(images: Vec<Image>) -> Self {
        ImageConfig {
            values: images.into_iter().map(Value::image).collect(),
            ids: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn keeps_images_verbatim() {
        let images: Vec<Image> = (0..3)
            .map(|i| Image::from_shape_vec(&[2, 2], vec![f64::from(i); 4]).unwrap())
            .collect();
        let config: Config = ImageConfig::new(images.clone()).into();

        assert_eq!(config.len(), 3);
        assert!(config.ids().is_none());
        assert_eq!(config.get(2).unwrap().as_image(), Some(&images[2]));
    }
}
