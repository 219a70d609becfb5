use crate::colormap::{class_name, NUM_CLASSES};
use crate::example::{Example, SegmentationExample};
use crate::tfrecord::RecordReader;
use anyhow::{anyhow, Result};
use log::info;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub records: usize,
    pub min_dimensions: Option<(u32, u32)>,
    pub max_dimensions: Option<(u32, u32)>,
    pub class_pixels: [u64; NUM_CLASSES],
}

impl Default for RecordSummary {
    fn default() -> Self {
        Self {
            records: 0,
            min_dimensions: None,
            max_dimensions: None,
            class_pixels: [0; NUM_CLASSES],
        }
    }
}

impl RecordSummary {
    fn add(&mut self, index: usize, example: &SegmentationExample) -> Result<()> {
        let expected = example.width as usize * example.height as usize;
        if example.label.len() != expected {
            return Err(anyhow!(
                "Record {} ({}) has {} label values, expected {}x{}",
                index,
                example.filename,
                example.label.len(),
                example.width,
                example.height
            ));
        }
        for &label in &example.label {
            let count = self.class_pixels.get_mut(label as usize).ok_or_else(|| {
                anyhow!(
                    "Record {} ({}) has invalid class {}",
                    index,
                    example.filename,
                    label
                )
            })?;
            *count += 1;
        }

        let (w, h) = (example.width, example.height);
        self.min_dimensions = Some(match self.min_dimensions {
            Some((min_w, min_h)) => (min_w.min(w), min_h.min(h)),
            None => (w, h),
        });
        self.max_dimensions = Some(match self.max_dimensions {
            Some((max_w, max_h)) => (max_w.max(w), max_h.max(h)),
            None => (w, h),
        });
        self.records += 1;
        Ok(())
    }

    pub fn total_pixels(&self) -> u64 {
        self.class_pixels.iter().sum()
    }
}

/// Reads back a record file written by `convert`, checking every example.
pub fn inspect(path: &Path) -> Result<RecordSummary> {
    let mut summary = RecordSummary::default();
    for (index, record) in RecordReader::open(path)?.enumerate() {
        let example = SegmentationExample::from_example(&Example::from_bytes(&record?)?)
            .map_err(|e| anyhow!("Record {}: {}", index, e))?;
        summary.add(index, &example)?;
    }
    Ok(summary)
}

pub fn log_summary(path: &Path, summary: &RecordSummary) {
    info!("{}: {} records", path.display(), summary.records);
    if let (Some(min), Some(max)) = (summary.min_dimensions, summary.max_dimensions) {
        info!("smallest {}x{}, largest {}x{}", min.0, min.1, max.0, max.1);
    }
    let total = summary.total_pixels().max(1) as f64;
    for (label, &count) in summary.class_pixels.iter().enumerate() {
        info!(
            "{:>2} {:<14} {:>12} px {:6.2}%",
            label,
            class_name(label as u8).unwrap_or("?"),
            count,
            100. * count as f64 / total
        );
    }
}
