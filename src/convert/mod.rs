pub mod options;

use crate::dataset::{build_example, read_image_names, ImagePair};
use crate::tfrecord::RecordWriter;
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use options::ConvertOptions;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

const LOG_INTERVAL: usize = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub written: usize,
    pub too_small: usize,
    pub invalid: usize,
}

impl ConvertStats {
    pub fn total(&self) -> usize {
        self.written + self.too_small + self.invalid
    }
}

/// Converts every split selected in `opts` into `<output_dir>/fcn_<split>.record`.
pub fn run(opts: &ConvertOptions) -> Result<()> {
    let data_dir = Path::new(opts.data_dir);
    if !data_dir.is_dir() {
        return Err(anyhow!("Data dir {} doesn't exist", opts.data_dir));
    }
    let output_dir = Path::new(opts.output_dir);
    fs::create_dir_all(output_dir)?;

    for &split in &opts.splits {
        info!("Preparing {} file names", split);
        let pairs = read_image_names(data_dir, split)?;
        let output_path = output_dir.join(split.record_file());
        let stats = measure_time!(
            format!("writing {}", output_path.display()),
            || create_tf_record(&output_path, &pairs, opts),
            log::Level::Info
        )?;
        info!(
            "{}: wrote {} of {} examples ({} too small, {} invalid)",
            output_path.display(),
            stats.written,
            stats.total(),
            stats.too_small,
            stats.invalid
        );
    }

    Ok(())
}

/// Writes one record per pair, in the order of `pairs`.
///
/// Pairs are decoded in parallel chunks of `opts.chunk_size`. Pairs whose
/// label is smaller than `opts.min_size`, or that can't be read or decoded,
/// are skipped and counted in the returned stats.
pub fn create_tf_record(
    output_path: &Path,
    pairs: &[ImagePair],
    opts: &ConvertOptions,
) -> Result<ConvertStats> {
    let mut writer = RecordWriter::create(output_path)?;
    let mut stats = ConvertStats::default();
    let chunk_size = opts.chunk_size.max(1);
    let total = pairs.len();

    for (chunk_idx, chunk) in pairs.chunks(chunk_size).enumerate() {
        let encoded = chunk
            .par_iter()
            .map(|pair| {
                build_example(pair, opts.min_size)
                    .map(|example| example.map(|e| e.to_example().to_bytes()))
            })
            .collect::<Vec<Result<Option<Vec<u8>>>>>();

        for (i, (pair, res)) in chunk.iter().zip(encoded).enumerate() {
            let idx = chunk_idx * chunk_size + i;
            if idx % LOG_INTERVAL == 0 {
                info!("On image {} of {}", idx, total);
            }
            match res {
                Ok(Some(record)) => {
                    writer.write(&record)?;
                    stats.written += 1;
                }
                Ok(None) => {
                    debug!("Skipping {}, smaller than {}", pair.label.display(), opts.min_size);
                    stats.too_small += 1;
                }
                Err(e) => {
                    warn!("Invalid example: {}, ignoring. {}", pair.image.display(), e);
                    stats.invalid += 1;
                }
            }
        }
    }
    writer.flush()?;
    debug!("{} records in {}", writer.count(), output_path.display());

    Ok(stats)
}
