use std::fmt::{Display, Formatter};

use bytes::Bytes;

use crate::jpeg::EncodeError;

/// One input file of a batch: file name plus undecoded bytes.
#[derive(Clone, Debug)]
pub struct InputImage {
    pub name: String,
    pub data: Bytes,
}

impl InputImage {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Re-encoded JPEG output.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    /// Name of the input this was produced from.
    pub source: String,
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

impl Display for EncodedImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "EncodedImage {{ source: {}, {}x{}, {} bytes }}",
            self.source,
            self.width,
            self.height,
            self.data.len()
        )
    }
}

/// Completion event emitted by the bus, exactly one per started input.
#[derive(Debug)]
pub struct EncodeEvent {
    pub source: String,
    pub result: Result<EncodedImage, EncodeError>,
}
