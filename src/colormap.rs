use image::RgbImage;
use rayon::prelude::*;

pub const NUM_CLASSES: usize = 21;
const TABLE_SIZE: usize = 256 * 256 * 256;

pub const CLASSES: [&str; NUM_CLASSES] = [
    "background",
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "potted plant",
    "sheep",
    "sofa",
    "train",
    "tv/monitor",
];

/// RGB color of each class in the VOC `SegmentationClass` images.
pub const COLORMAP: [[u8; 3]; NUM_CLASSES] = [
    [0, 0, 0],
    [128, 0, 0],
    [0, 128, 0],
    [128, 128, 0],
    [0, 0, 128],
    [128, 0, 128],
    [0, 128, 128],
    [128, 128, 128],
    [64, 0, 0],
    [192, 0, 0],
    [64, 128, 0],
    [192, 128, 0],
    [64, 0, 128],
    [192, 0, 128],
    [64, 128, 128],
    [192, 128, 128],
    [0, 64, 0],
    [128, 64, 0],
    [0, 192, 0],
    [128, 192, 0],
    [0, 64, 128],
];

lazy_static! {
    /// Class index for every packed RGB value, 0 for colors outside the colormap.
    static ref COLOR_TO_LABEL: Vec<u8> = {
        let mut table = vec![0; TABLE_SIZE];
        for (label, [r, g, b]) in COLORMAP.iter().enumerate() {
            table[pack_rgb(*r, *g, *b)] = label as u8;
        }
        table
    };
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> usize {
    (r as usize * 256 + g as usize) * 256 + b as usize
}

#[inline]
pub fn color_to_label(r: u8, g: u8, b: u8) -> u8 {
    COLOR_TO_LABEL[pack_rgb(r, g, b)]
}

pub fn class_name(label: u8) -> Option<&'static str> {
    CLASSES.get(label as usize).copied()
}

/// Maps every pixel of a colored segmentation image to its class index.
///
/// The result is row-major with one byte per pixel, so it has exactly
/// `width * height` entries.
pub fn image_to_label(image: &RgbImage) -> Vec<u8> {
    image
        .as_raw()
        .par_chunks_exact(3)
        .map(|px| color_to_label(px[0], px[1], px[2]))
        .collect()
}
