//! Reads what an existing device art file looks like.

use std::io::{Cursor, ErrorKind};
use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::domain::entities::ArtInspection;
use crate::domain::errors::{CoverError, CoverResult};

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const PNG_INTERLACE_OFFSET: usize = 28;

/// Inspects the file at `path`. `Ok(None)` if it does not exist.
///
/// # Errors
/// Returns error if the file cannot be read or decoded.
pub fn inspect_file(path: &Path) -> CoverResult<Option<ArtInspection>> {
    match std::fs::read(path) {
        Ok(bytes) => inspect_bytes(&bytes).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoverError::io("Failed to read device art", &e)),
    }
}

/// Decodes `bytes` fully and reports height, format and progressiveness.
///
/// # Errors
/// Returns error if the bytes are not a decodable image.
pub fn inspect_bytes(bytes: &[u8]) -> CoverResult<ArtInspection> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoverError::io("Failed to sniff device art", &e))?;
    let format = reader.format();
    let img = reader.decode()?;

    Ok(ArtInspection {
        height: img.height(),
        format,
        progressive: format.is_some_and(|f| is_progressive(bytes, f)),
    })
}

/// True for progressive JPEGs and Adam7-interlaced PNGs.
#[must_use]
pub fn is_progressive(bytes: &[u8], format: ImageFormat) -> bool {
    match format {
        ImageFormat::Jpeg => jpeg_is_progressive(bytes),
        ImageFormat::Png => png_is_interlaced(bytes),
        _ => false,
    }
}

/// Walks JPEG marker segments up to the first start-of-frame.
fn jpeg_is_progressive(bytes: &[u8]) -> bool {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return false;
    }

    let mut pos = 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            return false;
        }
        let marker = bytes[pos + 1];
        match marker {
            // fill byte
            0xFF => pos += 1,
            0xC2 | 0xC6 | 0xCA | 0xCE => return true,
            0xC0 | 0xC1 | 0xC3 | 0xC5 | 0xC7 | 0xC9 | 0xCB | 0xCD | 0xCF | 0xDA | 0xD9 => {
                return false;
            }
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => pos += 2,
            _ => {
                let Some(len) = bytes.get(pos + 2..pos + 4) else {
                    return false;
                };
                pos += 2 + usize::from(u16::from_be_bytes([len[0], len[1]]));
            }
        }
    }
    false
}

fn png_is_interlaced(bytes: &[u8]) -> bool {
    bytes.starts_with(PNG_SIGNATURE)
        && bytes.get(12..16) == Some(b"IHDR".as_slice())
        && bytes.get(PNG_INTERLACE_OFFSET).is_some_and(|&b| b != 0)
}
