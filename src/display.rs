//! Top-level driver: model detection, frame buffer and display operations

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::command::{
    DISPLAY_UPDATE, GET_DEVICE_ID, GET_DEVICE_INFO, GET_FIRMWARE_INFO, GET_FIRMWARE_VERSION,
    READ_TEMPERATURE, RESET_POINTER, UPLOAD_IMAGE,
};
use crate::error::{Error, ProtocolError};
use crate::format;
use crate::interface::TconInterface;
use crate::models::{self, Profile};
use crate::protocol::{MAX_DATA_LEN, Protocol};

/// Length of the fixed per-model header prepended to every upload
const HEADER_LEN: usize = 16;

/// A borrowed one-bit bitmap, one sample byte per pixel in row-major order
///
/// A sample of zero is a dark pixel, anything else is lit. `bit_depth`
/// declares the depth of the source image; only 1 is accepted, mirroring
/// the panels' single implemented format.
#[derive(Clone, Copy, Debug)]
pub struct Bitmap<'a> {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Declared bit depth of the source image; must be 1
    pub bit_depth: u8,
    /// One sample byte per pixel, row-major, `width * height` entries
    pub data: &'a [u8],
}

impl<'a> Bitmap<'a> {
    /// Create a one-bit bitmap view over `data`
    pub const fn new(width: u16, height: u16, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            bit_depth: 1,
            data,
        }
    }
}

/// Driver for TC(M)-P series e-paper panels
///
/// Owns the command protocol engine and the packed image buffer. The
/// backing buffer is caller-provided and must be at least as large as the
/// detected model's `buffer_size`; [`begin`](Tcmp::begin) checks this.
///
/// ## Example
///
/// ```rust,ignore
/// use tcmp::{Bitmap, Interface, Tcmp};
///
/// let mut display = Tcmp::new(Interface::new(spi, busy), [0u8; 15000]);
/// display.begin(&mut delay)?;
/// display.set_image(&Bitmap::new(400, 300, &pixels))?;
/// display.display(&mut delay)?;
/// ```
pub struct Tcmp<I, B> {
    protocol: Protocol<I>,
    buffer: B,
    profile: Option<&'static Profile>,
}

impl<I, B> Tcmp<I, B>
where
    I: TconInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a new driver over a transport and a backing buffer
    ///
    /// The buffer must hold `width * height / 8` bytes for the panel the
    /// caller intends to drive (15000 for the TC-P441, 163840 for the
    /// TC-P102).
    pub fn new(interface: I, buffer: B) -> Self {
        Self {
            protocol: Protocol::new(interface),
            buffer,
            profile: None,
        }
    }

    /// Detect the attached panel and select its profile
    ///
    /// Reads the device identity string and resolves it against the model
    /// registry. Must succeed before any display operation; on failure the
    /// driver stays uninitialised and display operations return
    /// [`Error::NotReady`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownModel`] if the identity string matches no entry
    /// - [`Error::Unsupported`] for models the registry lists but the
    ///   driver cannot run (TC-P74)
    /// - [`Error::BufferTooSmall`] if the backing buffer cannot hold the
    ///   detected panel's image
    pub fn begin<D: DelayNs>(&mut self, delay: &mut D) -> Result<&'static Profile, Error<I::Error>> {
        let profile = {
            let info = self.device_info(delay)?;
            models::identify(info).ok_or(Error::UnknownModel)?
        };

        info!(
            "Detected a {} with a resolution of {}x{}",
            profile.model.name(),
            profile.width,
            profile.height
        );

        if !profile.model.is_supported() {
            return Err(Error::Unsupported(profile.model.name()));
        }

        let provided = self.buffer.as_ref().len();
        if provided < profile.buffer_size {
            return Err(Error::BufferTooSmall {
                required: profile.buffer_size,
                provided,
            });
        }

        self.buffer.as_mut()[..profile.buffer_size].fill(0);
        self.profile = Some(profile);
        Ok(profile)
    }

    /// Profile of the detected panel, if [`begin`](Tcmp::begin) succeeded
    pub fn profile(&self) -> Option<&'static Profile> {
        self.profile
    }

    /// Read the device identity string
    pub fn device_info<D: DelayNs>(&mut self, delay: &mut D) -> Result<&str, Error<I::Error>> {
        let payload = self.protocol.execute(&GET_DEVICE_INFO, &[], delay)?;
        core::str::from_utf8(payload).map_err(|_| ProtocolError::NotAscii.into())
    }

    /// Read the 20-byte device identifier
    pub fn device_id<D: DelayNs>(&mut self, delay: &mut D) -> Result<&[u8], Error<I::Error>> {
        self.protocol.execute(&GET_DEVICE_ID, &[], delay)
    }

    /// Read the firmware description string
    pub fn firmware_info<D: DelayNs>(&mut self, delay: &mut D) -> Result<&str, Error<I::Error>> {
        let payload = self.protocol.execute(&GET_FIRMWARE_INFO, &[], delay)?;
        core::str::from_utf8(payload).map_err(|_| ProtocolError::NotAscii.into())
    }

    /// Read the 16-byte firmware version
    pub fn firmware_version<D: DelayNs>(&mut self, delay: &mut D) -> Result<&[u8], Error<I::Error>> {
        self.protocol.execute(&GET_FIRMWARE_VERSION, &[], delay)
    }

    /// Temperature of the controller board in degrees Celsius
    pub fn temperature<D: DelayNs>(&mut self, delay: &mut D) -> Result<f32, Error<I::Error>> {
        let payload = self.protocol.execute(&READ_TEMPERATURE, &[], delay)?;
        let raw = match *payload {
            [hi, lo] => u16::from(hi) << 8 | u16::from(lo),
            _ => return Err(ProtocolError::Truncated.into()),
        };
        Ok(calibrate(raw))
    }

    /// Pack a bitmap into the local image buffer
    ///
    /// # Errors
    ///
    /// - [`Error::NotReady`] before a successful [`begin`](Tcmp::begin)
    /// - [`Error::InvalidFormat`] if the bitmap is not one bit deep
    /// - [`Error::DimensionMismatch`] if it does not match the panel
    pub fn set_image(&mut self, bitmap: &Bitmap<'_>) -> Result<(), Error<I::Error>> {
        let profile = self.profile.ok_or(Error::NotReady)?;
        if bitmap.bit_depth != 1 {
            return Err(Error::InvalidFormat {
                bit_depth: bitmap.bit_depth,
            });
        }
        if (bitmap.width, bitmap.height) != (profile.width, profile.height) {
            return Err(Error::DimensionMismatch {
                expected: (profile.width, profile.height),
                actual: (bitmap.width, bitmap.height),
            });
        }
        format::pack_into(
            profile.format,
            bitmap.data.iter().map(|&sample| sample != 0),
            bitmap.width,
            bitmap.height,
            &mut self.buffer.as_mut()[..profile.buffer_size],
        )
    }

    /// Unpack the local image buffer into one bool per pixel
    ///
    /// `pixels` must hold exactly `width * height` entries.
    pub fn image_into(&self, pixels: &mut [bool]) -> Result<(), Error<I::Error>> {
        let profile = self.profile.ok_or(Error::NotReady)?;
        format::unpack_into(
            profile.format,
            &self.buffer.as_ref()[..profile.buffer_size],
            pixels,
        )
    }

    /// Set a single pixel in the local buffer; out-of-bounds is a no-op
    ///
    /// `on` is a lit (white) pixel.
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        let Some(profile) = self.profile else {
            return;
        };
        if x >= u32::from(profile.width) || y >= u32::from(profile.height) {
            return;
        }
        let index = (y * u32::from(profile.width) + x) as usize;
        let bit = 1 << (7 - index % 8);
        let byte = &mut self.buffer.as_mut()[index / 8];
        // Lit pixels are cleared bits on these panels
        if on {
            *byte &= !bit;
        } else {
            *byte |= bit;
        }
    }

    /// Clear the local image buffer (all pixels lit)
    pub fn clear(&mut self) -> Result<(), Error<I::Error>> {
        let profile = self.profile.ok_or(Error::NotReady)?;
        self.buffer.as_mut()[..profile.buffer_size].fill(0);
        Ok(())
    }

    /// Send the local image buffer to the controller flash
    ///
    /// Resets the controller's write pointer, then streams the 16-byte
    /// header followed by the packed buffer in chunks of at most 250
    /// bytes. The controller advances its write cursor by the bytes of
    /// each accepted chunk, so the reset must precede every fresh upload.
    ///
    /// Chunks the controller rejects are logged and skipped rather than
    /// retried; experience is that these rejections are spurious. There is
    /// no read-back verification, so a genuinely lost chunk shows up on
    /// the panel. Transport errors and timeouts still abort the upload.
    pub fn upload<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        let profile = self.profile.ok_or(Error::NotReady)?;
        self.protocol.execute(&RESET_POINTER, &[], delay)?;

        let image = &self.buffer.as_ref()[..profile.buffer_size];
        let total = HEADER_LEN + image.len();
        let mut chunk = [0u8; MAX_DATA_LEN];
        let mut skipped = 0usize;

        let mut offset = 0;
        while offset < total {
            let len = usize::min(total - offset, MAX_DATA_LEN);

            // The header and the image buffer form one logical payload;
            // only the first chunk straddles the seam.
            let mut filled = 0;
            if offset < HEADER_LEN {
                filled = usize::min(HEADER_LEN - offset, len);
                chunk[..filled].copy_from_slice(&profile.header[offset..offset + filled]);
            }
            if filled < len {
                let start = offset + filled - HEADER_LEN;
                chunk[filled..len].copy_from_slice(&image[start..start + len - filled]);
            }

            match self.protocol.execute(&UPLOAD_IMAGE, &chunk[..len], delay) {
                Ok(_) => {}
                Err(Error::Device { code, description }) => {
                    skipped += 1;
                    warn!(
                        "image chunk at offset {offset} rejected (0x{code:04X} - {description}), continuing"
                    );
                }
                Err(e) => return Err(e),
            }
            offset += len;
        }

        if skipped > 0 {
            warn!("{skipped} image chunks were rejected during upload");
        }
        Ok(())
    }

    /// Refresh the panel, showing the contents of the controller flash
    pub fn refresh<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.protocol.execute(&DISPLAY_UPDATE, &[], delay)?;
        Ok(())
    }

    /// Upload the local image and refresh the panel
    pub fn display<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.upload(delay)?;
        self.refresh(delay)
    }

    /// Release the underlying transport and backing buffer
    pub fn release(self) -> (I, B) {
        (self.protocol.release(), self.buffer)
    }
}

/// Piecewise-linear calibration from the raw sensor value to degrees
/// Celsius, per the TCon developer's guide
fn calibrate(raw: u16) -> f32 {
    let (slope, intercept) = match raw {
        0..=41 => (0.66, -19.69),
        42..=61 => (0.52, -13.95),
        62..=86 => (0.43, -8.55),
        _ => (0.39, -4.57),
    };
    slope * f32::from(raw) + intercept
}
