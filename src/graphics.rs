//! Graphics support via embedded-graphics
//!
//! Implements [`DrawTarget`] for the [`Tcmp`] driver so primitives, text
//! and images from the embedded-graphics ecosystem render straight into
//! the packed image buffer. [`BinaryColor::On`] is a lit (white) pixel.
//!
//! Drawing before [`begin`](Tcmp::begin) is a no-op: the panel size is
//! unknown, so the target reports zero dimensions.
//!
//! ## Example
//!
//! ```rust,ignore
//! use embedded_graphics::{
//!     pixelcolor::BinaryColor,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//!
//! display.begin(&mut delay)?;
//! Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
//!     .draw(&mut display)?;
//! display.display(&mut delay)?;
//! ```

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
};

use crate::display::Tcmp;
use crate::interface::TconInterface;

impl<I, B> OriginDimensions for Tcmp<I, B>
where
    I: TconInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        match self.profile() {
            Some(profile) => Size::new(u32::from(profile.width), u32::from(profile.height)),
            None => Size::zero(),
        }
    }
}

impl<I, B> DrawTarget for Tcmp<I, B>
where
    I: TconInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<P>(&mut self, pixels: P) -> Result<(), Self::Error>
    where
        P: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color.is_on());
            }
        }
        Ok(())
    }
}
