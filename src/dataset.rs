use crate::colormap::image_to_label;
use crate::example::SegmentationExample;
use crate::utils::file_stem;
use anyhow::{anyhow, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_SETS_DIR: &str = "ImageSets/Segmentation";
const IMAGES_DIR: &str = "JPEGImages";
const LABELS_DIR: &str = "SegmentationClass";
/// Input size of VGG-16; smaller images can't be randomly cropped to it.
pub const DEFAULT_MIN_SIZE: u32 = 224;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Val,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Val];

    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }

    pub fn list_file(self) -> String {
        format!("{}.txt", self.name())
    }

    pub fn record_file(self) -> String {
        format!("fcn_{}.record", self.name())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub image: PathBuf,
    pub label: PathBuf,
}

impl ImagePair {
    pub fn new(root: &Path, id: &str) -> Self {
        Self {
            image: root.join(IMAGES_DIR).join(format!("{}.jpg", id)),
            label: root.join(LABELS_DIR).join(format!("{}.png", id)),
        }
    }
}

/// Reads the image ids listed for `split` and resolves their image and
/// label paths.
pub fn read_image_names(root: &Path, split: Split) -> Result<Vec<ImagePair>> {
    let list_path = root.join(IMAGE_SETS_DIR).join(split.list_file());
    let content = fs::read_to_string(&list_path)
        .map_err(|e| anyhow!("Could not read {}: {}", list_path.display(), e))?;
    Ok(content
        .split_whitespace()
        .map(|id| ImagePair::new(root, id))
        .collect())
}

/// Loads a single pair. Returns `None` when the label image is smaller
/// than `min_size` in either dimension.
pub fn build_example(pair: &ImagePair, min_size: u32) -> Result<Option<SegmentationExample>> {
    let encoded = fs::read(&pair.image)
        .map_err(|e| anyhow!("Could not read {}: {}", pair.image.display(), e))?;
    let (width, height) = image::image_dimensions(&pair.label)
        .map_err(|e| anyhow!("Could not read {}: {}", pair.label.display(), e))?;
    if height < min_size || width < min_size {
        return Ok(None);
    }
    let label_image = image::open(&pair.label)
        .map_err(|e| anyhow!("Could not decode {}: {}", pair.label.display(), e))?
        .to_rgb8();
    let label = image_to_label(&label_image);

    Ok(Some(SegmentationExample {
        height,
        width,
        filename: file_stem(&pair.image)?,
        encoded,
        label,
    }))
}
