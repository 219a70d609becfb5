use crate::dataset::Split;
use anyhow::Result;
use image::{Rgb, RgbImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tempfile::TempDir;

const VOID_COLOR: Rgb<u8> = Rgb([224, 224, 192]);

/// A VOC-like directory tree in a temp dir.
pub struct FakeVoc {
    dir: TempDir,
}

impl FakeVoc {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        for sub in &["ImageSets/Segmentation", "JPEGImages", "SegmentationClass"] {
            fs::create_dir_all(dir.path().join(sub))?;
        }
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_list(&self, split: Split, content: &str) -> Result<()> {
        fs::write(
            self.root()
                .join("ImageSets/Segmentation")
                .join(split.list_file()),
            content,
        )?;
        Ok(())
    }

    /// Writes a gray jpeg and a label filled with `color`, surrounded by a
    /// one pixel void border.
    pub fn add_image(&self, id: &str, width: u32, height: u32, color: [u8; 3]) -> Result<()> {
        let image = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
        image.save(self.root().join("JPEGImages").join(format!("{}.jpg", id)))?;
        let label = RgbImage::from_fn(width, height, |x, y| {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                VOID_COLOR
            } else {
                Rgb(color)
            }
        });
        label.save(
            self.root()
                .join("SegmentationClass")
                .join(format!("{}.png", id)),
        )?;
        Ok(())
    }

    /// Writes a label the way VOC ships them: an 8-bit palette PNG where
    /// every pixel is an index into `palette`.
    pub fn add_palette_image<F>(
        &self,
        id: &str,
        width: u32,
        height: u32,
        palette: &[[u8; 3]],
        index: F,
    ) -> Result<()>
    where
        F: Fn(u32, u32) -> u8,
    {
        let image = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
        image.save(self.root().join("JPEGImages").join(format!("{}.jpg", id)))?;

        let file = File::create(
            self.root()
                .join("SegmentationClass")
                .join(format!("{}.png", id)),
        )?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(palette.concat());
        let mut writer = encoder.write_header()?;
        let indices = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| index(x, y))
            .collect::<Vec<u8>>();
        writer.write_image_data(&indices)?;
        Ok(())
    }

    /// Writes a file that isn't an image under the label path.
    pub fn add_broken_label(&self, id: &str) -> Result<()> {
        let image = RgbImage::from_pixel(300, 300, Rgb([90, 90, 90]));
        image.save(self.root().join("JPEGImages").join(format!("{}.jpg", id)))?;
        fs::write(
            self.root()
                .join("SegmentationClass")
                .join(format!("{}.png", id)),
            b"not a png",
        )?;
        Ok(())
    }
}
