use crate::dataset::{Split, DEFAULT_MIN_SIZE};
use crate::utils::parse_number;
use anyhow::{anyhow, Result};

pub const DEFAULT_DATA_DIR: &str = "./VOC/";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_CHUNK_SIZE: usize = 64;

#[derive(Debug)]
pub struct ConvertOptions<'a> {
    pub data_dir: &'a str,
    pub output_dir: &'a str,
    pub min_size: u32,
    pub chunk_size: usize,
    pub splits: Vec<Split>,
}

impl Default for ConvertOptions<'_> {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR,
            output_dir: DEFAULT_OUTPUT_DIR,
            min_size: DEFAULT_MIN_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            splits: Split::ALL.to_vec(),
        }
    }
}

impl<'a> ConvertOptions<'a> {
    pub fn new(args: &'a clap::ArgMatches) -> Result<Self> {
        let mut opts = Self::default();
        if let Some(path) = args.value_of("data-dir") {
            opts.data_dir = path;
        }
        if let Some(path) = args.value_of("output-dir") {
            opts.output_dir = path;
        }
        if let Some(min_size) = args.value_of("min-size") {
            opts.min_size = parse_number(min_size, "min size")?;
        }
        if let Some(chunk_size) = args.value_of("chunk-size") {
            opts.chunk_size = parse_number(chunk_size, "chunk size")?;
            if opts.chunk_size == 0 {
                return Err(anyhow!("chunk size must be greater than 0"));
            }
        }
        if let Some(split) = args.value_of("split") {
            opts.splits = parse_splits(split)?;
        }

        Ok(opts)
    }
}

fn parse_splits(value: &str) -> Result<Vec<Split>> {
    match value {
        "train" => Ok(vec![Split::Train]),
        "val" => Ok(vec![Split::Val]),
        "all" => Ok(Split::ALL.to_vec()),
        _ => Err(anyhow!("Invalid value '{}' for split", value)),
    }
}
