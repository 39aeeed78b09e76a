//! 128×64 monochrome game surface.

use core::convert::Infallible;

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
};

use crate::config::{
    FRAME_H,
    FRAME_W,
};

const BYTES: usize = (FRAME_W * FRAME_H / 8) as usize;

/// Bit-packed frame, row-major, one bit per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    bits: [u8; BYTES],
}

impl Frame {
    pub const fn new() -> Self {
        Self { bits: [0; BYTES] }
    }

    /// Pixels outside the frame read as off.
    #[must_use]
    pub fn is_on(&self, x: u32, y: u32) -> bool {
        if x >= FRAME_W || y >= FRAME_H {
            return false;
        }
        let bit = (y * FRAME_W + x) as usize;
        self.bits[bit / 8] & (0x80 >> (bit % 8)) != 0
    }

    /// Number of lit pixels.
    #[must_use]
    pub fn lit(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    fn put(&mut self, x: i32, y: i32, on: bool) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x >= FRAME_W || y >= FRAME_H {
            return;
        }
        let bit = (y * FRAME_W + x) as usize;
        let mask = 0x80 >> (bit % 8);
        if on {
            self.bits[bit / 8] |= mask;
        } else {
            self.bits[bit / 8] &= !mask;
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(FRAME_W, FRAME_H)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.put(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.bits.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

/// Draws onto `target` turned 90° counter-clockwise about `origin`, so text
/// drawn at the adapter's origin reads bottom-to-top starting at `origin`.
pub struct Rotated270<'a, T> {
    target: &'a mut T,
    origin: Point,
}

impl<'a, T> Rotated270<'a, T> {
    pub fn new(target: &'a mut T, origin: Point) -> Self {
        Self { target, origin }
    }

    const fn map(origin: Point, p: Point) -> Point {
        Point::new(origin.x + p.y, origin.y - p.x)
    }
}

impl<T: DrawTarget> Dimensions for Rotated270<'_, T> {
    fn bounding_box(&self) -> Rectangle {
        let area = self.target.bounding_box();
        let (w, h) = (area.size.width, area.size.height);
        Rectangle::new(
            Point::new(
                self.origin.y - area.top_left.y - h as i32 + 1,
                area.top_left.x - self.origin.x,
            ),
            Size::new(h, w),
        )
    }
}

impl<T: DrawTarget> DrawTarget for Rotated270<'_, T> {
    type Color = T::Color;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let origin = self.origin;
        self.target.draw_iter(
            pixels
                .into_iter()
                .map(|Pixel(p, color)| Pixel(Self::map(origin, p), color)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_outside_are_dropped() {
        let mut frame = Frame::new();
        let Ok(()) = frame.draw_iter([
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(0, FRAME_H as i32), BinaryColor::On),
            Pixel(Point::new(FRAME_W as i32 - 1, FRAME_H as i32 - 1), BinaryColor::On),
        ]);
        assert_eq!(frame.lit(), 1);
        assert!(frame.is_on(FRAME_W - 1, FRAME_H - 1));
    }

    #[test]
    fn clear_sets_every_pixel() {
        let mut frame = Frame::new();
        let Ok(()) = frame.clear(BinaryColor::On);
        assert_eq!(frame.lit(), FRAME_W * FRAME_H);
        let Ok(()) = frame.clear(BinaryColor::Off);
        assert_eq!(frame.lit(), 0);
    }

    #[test]
    fn rotation_runs_x_upward() {
        let mut frame = Frame::new();
        let mut rotated = Rotated270::new(&mut frame, Point::new(20, 60));
        let Ok(()) = rotated.draw_iter([
            Pixel(Point::new(0, 0), BinaryColor::On),
            Pixel(Point::new(5, 0), BinaryColor::On),
            Pixel(Point::new(0, -3), BinaryColor::On),
        ]);
        assert!(frame.is_on(20, 60));
        assert!(frame.is_on(20, 55));
        assert!(frame.is_on(17, 60));
        assert_eq!(frame.lit(), 3);
    }

    #[test]
    fn rotated_bounding_box_maps_onto_the_frame() {
        let mut frame = Frame::new();
        let rotated = Rotated270::new(&mut frame, Point::new(20, 60));
        let area = rotated.bounding_box();
        assert_eq!(area.size, Size::new(FRAME_H, FRAME_W));

        let corners = [
            area.top_left,
            area.top_left + Point::new(area.size.width as i32 - 1, area.size.height as i32 - 1),
        ];
        for corner in corners {
            let p = Rotated270::<Frame>::map(Point::new(20, 60), corner);
            assert!((0..FRAME_W as i32).contains(&p.x));
            assert!((0..FRAME_H as i32).contains(&p.y));
        }
    }
}
