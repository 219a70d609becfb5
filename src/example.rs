//! `tf.train.Example` protocol buffers, as defined in
//! `tensorflow/core/example/{example,feature}.proto`.
use anyhow::{anyhow, Result};
use prost::Message;
use std::collections::BTreeMap;

pub const HEIGHT_KEY: &str = "image/height";
pub const WIDTH_KEY: &str = "image/width";
pub const FILENAME_KEY: &str = "image/filename";
pub const ENCODED_KEY: &str = "image/encoded";
pub const LABEL_KEY: &str = "image/label";
pub const FORMAT_KEY: &str = "image/format";
pub const JPEG_FORMAT: &[u8] = b"jpeg";

#[derive(Clone, PartialEq, Message)]
pub struct BytesList {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FloatList {
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Int64List {
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

/// Containers for non-sequential data.
#[derive(Clone, PartialEq, Message)]
pub struct Feature {
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

pub mod feature {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Features {
    /// Map from feature name to feature. Sorted, so encoding is deterministic.
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Example {
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

pub fn int64_feature(value: i64) -> Feature {
    int64_list_feature(vec![value])
}

pub fn int64_list_feature(value: Vec<i64>) -> Feature {
    Feature {
        kind: Some(feature::Kind::Int64List(Int64List { value })),
    }
}

pub fn bytes_feature(value: Vec<u8>) -> Feature {
    bytes_list_feature(vec![value])
}

pub fn bytes_list_feature(value: Vec<Vec<u8>>) -> Feature {
    Feature {
        kind: Some(feature::Kind::BytesList(BytesList { value })),
    }
}

#[allow(dead_code)]
pub fn float_list_feature(value: Vec<f32>) -> Feature {
    Feature {
        kind: Some(feature::Kind::FloatList(FloatList { value })),
    }
}

impl Example {
    pub fn from_features<I>(features: I) -> Self
    where
        I: IntoIterator<Item = (String, Feature)>,
    {
        Self {
            features: Some(Features {
                feature: features.into_iter().collect(),
            }),
        }
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        Ok(Self::decode(buf)?)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.as_ref()?.feature.get(key)
    }

    /// First value of an int64 feature.
    pub fn int64(&self, key: &str) -> Option<i64> {
        match self.feature(key)?.kind.as_ref()? {
            feature::Kind::Int64List(list) => list.value.first().copied(),
            _ => None,
        }
    }

    /// First value of a bytes feature.
    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        match self.feature(key)?.kind.as_ref()? {
            feature::Kind::BytesList(list) => list.value.first().map(Vec::as_slice),
            _ => None,
        }
    }
}

/// One image / label pair in the layout the FCN input pipeline reads:
/// `image/encoded` is decoded as JPEG and `image/label` as raw `u8`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationExample {
    pub height: u32,
    pub width: u32,
    pub filename: String,
    pub encoded: Vec<u8>,
    pub label: Vec<u8>,
}

impl SegmentationExample {
    pub fn to_example(&self) -> Example {
        Example::from_features(vec![
            (HEIGHT_KEY.to_string(), int64_feature(self.height as i64)),
            (WIDTH_KEY.to_string(), int64_feature(self.width as i64)),
            (
                FILENAME_KEY.to_string(),
                bytes_feature(self.filename.as_bytes().to_vec()),
            ),
            (ENCODED_KEY.to_string(), bytes_feature(self.encoded.clone())),
            (LABEL_KEY.to_string(), bytes_feature(self.label.clone())),
            (FORMAT_KEY.to_string(), bytes_feature(JPEG_FORMAT.to_vec())),
        ])
    }

    pub fn from_example(example: &Example) -> Result<Self> {
        let format = required_bytes(example, FORMAT_KEY)?;
        if format != JPEG_FORMAT {
            return Err(anyhow!(
                "Unsupported image format {}",
                String::from_utf8_lossy(format)
            ));
        }

        Ok(Self {
            height: required_dimension(example, HEIGHT_KEY)?,
            width: required_dimension(example, WIDTH_KEY)?,
            filename: String::from_utf8(required_bytes(example, FILENAME_KEY)?.to_vec())?,
            encoded: required_bytes(example, ENCODED_KEY)?.to_vec(),
            label: required_bytes(example, LABEL_KEY)?.to_vec(),
        })
    }
}

fn required_dimension(example: &Example, key: &str) -> Result<u32> {
    let value = example
        .int64(key)
        .ok_or_else(|| anyhow!("Missing int64 feature {}", key))?;
    if value < 0 || value > u32::MAX as i64 {
        return Err(anyhow!("Invalid value {} for {}", value, key));
    }
    Ok(value as u32)
}

fn required_bytes<'a>(example: &'a Example, key: &str) -> Result<&'a [u8]> {
    example
        .bytes(key)
        .ok_or_else(|| anyhow!("Missing bytes feature {}", key))
}
