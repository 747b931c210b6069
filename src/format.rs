//! Packed pixel formats
//!
//! The panels store one bit per pixel with inverted polarity: a logical
//! "on" (white) pixel is a cleared bit on the wire. Format 0 packs eight
//! horizontally adjacent pixels per byte, MSB first in traversal order.
//! Formats 2 and 4 exist on other panels in the family but are not
//! implemented.

use crate::error::Error;

/// On-wire pixel format identifier
///
/// All formats the controller family advertises are represented so the
/// unimplemented ones fail with a clear error rather than silently packing
/// wrong data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 1 bit per pixel, MSB first, inverted polarity. The only format
    /// implemented here.
    Format0,
    /// Alternate packing for the 4.41 inch panel; not implemented
    Format2,
    /// Packing used by the 7.4 inch panel; not implemented
    Format4,
}

impl PixelFormat {
    /// Format identifier as the controller documentation numbers them
    pub const fn id(self) -> u8 {
        match self {
            PixelFormat::Format0 => 0,
            PixelFormat::Format2 => 2,
            PixelFormat::Format4 => 4,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            PixelFormat::Format0 => "pixel format 0",
            PixelFormat::Format2 => "pixel format 2",
            PixelFormat::Format4 => "pixel format 4",
        }
    }
}

/// Pack a row-major pixel sequence into the controller's byte format
///
/// `true` is a lit (white) pixel. Output bytes are the bitwise complement
/// of the MSB-first pack, so an all-on input packs to `0x00` bytes.
///
/// # Errors
///
/// - [`Error::Unsupported`] for formats 2 and 4
/// - [`Error::InvalidArgument`] if the pixel count does not equal
///   `width * height`, is not a multiple of 8, or exceeds `out`
pub fn pack_into<E>(
    format: PixelFormat,
    mut pixels: impl ExactSizeIterator<Item = bool>,
    width: u16,
    height: u16,
    out: &mut [u8],
) -> Result<(), Error<E>> {
    if format != PixelFormat::Format0 {
        return Err(Error::Unsupported(format.name()));
    }
    let count = pixels.len();
    if count != usize::from(width) * usize::from(height) {
        return Err(Error::InvalidArgument(
            "pixel count does not match dimensions",
        ));
    }
    if count % 8 != 0 {
        return Err(Error::InvalidArgument("pixel count is not a multiple of 8"));
    }
    if out.len() < count / 8 {
        return Err(Error::InvalidArgument("output buffer too small"));
    }

    for byte in out[..count / 8].iter_mut() {
        let mut packed = 0u8;
        for _ in 0..8 {
            packed = packed << 1 | pixels.next().unwrap_or(false) as u8;
        }
        // Black and white are inverted on these panels
        *byte = !packed;
    }
    Ok(())
}

/// Unpack controller bytes back into a row-major pixel sequence
///
/// Inverse of [`pack_into`]: each byte expands to eight pixels, MSB first,
/// with the polarity inversion undone.
///
/// # Errors
///
/// - [`Error::Unsupported`] for formats 2 and 4
/// - [`Error::InvalidArgument`] if `pixels` is not exactly eight entries
///   per packed byte
pub fn unpack_into<E>(
    format: PixelFormat,
    packed: &[u8],
    pixels: &mut [bool],
) -> Result<(), Error<E>> {
    if format != PixelFormat::Format0 {
        return Err(Error::Unsupported(format.name()));
    }
    if pixels.len() != packed.len() * 8 {
        return Err(Error::InvalidArgument(
            "pixel count does not match packed length",
        ));
    }

    for (&byte, group) in packed.iter().zip(pixels.chunks_exact_mut(8)) {
        let restored = !byte;
        for (bit, pixel) in group.iter_mut().enumerate() {
            *pixel = restored >> (7 - bit) & 1 != 0;
        }
    }
    Ok(())
}
