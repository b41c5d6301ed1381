use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::io::{BufRead, BufReader, Read};
use tracing::debug;
use xz2::read::XzDecoder;

const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Stream compression used by package archives and sync databases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Zstd,
    Xz,
    Gzip,
    Bzip2,
    None,
}

impl Compression {
    /// Detect compression from the leading bytes of a stream.
    ///
    /// Sync databases carry no meaningful extension, so the magic number is
    /// authoritative for both them and package archives.
    pub fn detect(magic: &[u8]) -> Self {
        if magic.starts_with(ZSTD_MAGIC) {
            Compression::Zstd
        } else if magic.starts_with(XZ_MAGIC) {
            Compression::Xz
        } else if magic.starts_with(GZIP_MAGIC) {
            Compression::Gzip
        } else if magic.starts_with(BZIP2_MAGIC) {
            Compression::Bzip2
        } else {
            Compression::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Zstd => "zstd",
            Compression::Xz => "xz",
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
            Compression::None => "none",
        }
    }
}

/// Wrap `reader` in the decoder matching its magic number
pub fn auto_decompress<'a, R: Read + 'a>(reader: R) -> std::io::Result<Box<dyn Read + 'a>> {
    let mut reader = BufReader::new(reader);
    let compression = Compression::detect(reader.fill_buf()?);
    debug!(compression = compression.as_str(), "Detected stream compression");

    let decoded: Box<dyn Read + 'a> = match compression {
        Compression::Zstd => Box::new(zstd::Decoder::with_buffer(reader)?),
        Compression::Xz => Box::new(XzDecoder::new(reader)),
        Compression::Gzip => Box::new(GzDecoder::new(reader)),
        Compression::Bzip2 => Box::new(BzDecoder::new(reader)),
        Compression::None => Box::new(reader),
    };

    Ok(decoded)
}
