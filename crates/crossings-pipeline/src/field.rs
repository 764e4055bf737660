//! Binary raster field: the ink/paper grid every detection stage reads.
//!
//! The field is produced once per run by thresholding a grayscale image
//! and is never mutated by the core afterwards. Coordinates are
//! `(x, y)` = (column, row); reads outside the grid are "not ink", which
//! lets the detector treat boundary samples as ordinary rejections.

use image::GrayImage;

use crate::types::{Dimensions, Point};

/// A width x height grid of ink flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryField {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl BinaryField {
    /// Create an all-background field.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ink: vec![false; width as usize * height as usize],
        }
    }

    /// Build a field by evaluating `f(x, y)` for every pixel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut ink = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                ink.push(f(x, y));
            }
        }
        Self { width, height, ink }
    }

    /// Threshold a grayscale image: luma strictly below `ink_threshold`
    /// is ink.
    ///
    /// Drawings are dark strokes on light paper, so a threshold of `1`
    /// accepts only pure black and `255` accepts everything but white.
    #[must_use = "returns the thresholded field"]
    pub fn from_luma(image: &GrayImage, ink_threshold: u8) -> Self {
        Self::from_fn(image.width(), image.height(), |x, y| {
            image.get_pixel(x, y).0[0] < ink_threshold
        })
    }

    /// Field width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Field height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Field dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether `p` is inside the grid and ink.
    #[must_use]
    pub fn is_ink(&self, p: Point) -> bool {
        self.index(p).is_some_and(|i| self.ink[i])
    }

    /// Set the ink flag of an in-bounds pixel. Out-of-bounds writes are
    /// ignored.
    pub fn set(&mut self, p: Point, ink: bool) {
        if let Some(i) = self.index(p) {
            self.ink[i] = ink;
        }
    }

    /// Number of ink pixels.
    #[must_use]
    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|&&b| b).count()
    }

    /// Linear index of `p`, or `None` if out of bounds.
    pub(crate) fn index(&self, p: Point) -> Option<usize> {
        let x = u32::try_from(p.x).ok()?;
        let y = u32::try_from(p.y).ok()?;
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_is_blank() {
        let field = BinaryField::new(7, 3);
        assert_eq!(field.width(), 7);
        assert_eq!(field.height(), 3);
        assert_eq!(field.ink_count(), 0);
    }

    #[test]
    fn out_of_bounds_is_never_ink() {
        let field = BinaryField::from_fn(4, 4, |_, _| true);
        assert!(field.is_ink(Point::new(0, 0)));
        assert!(field.is_ink(Point::new(3, 3)));
        assert!(!field.is_ink(Point::new(-1, 0)));
        assert!(!field.is_ink(Point::new(0, -1)));
        assert!(!field.is_ink(Point::new(4, 0)));
        assert!(!field.is_ink(Point::new(0, 4)));
        assert!(!field.is_ink(Point::new(4, 4)));
    }

    #[test]
    fn from_fn_uses_column_row_order() {
        // Only column 2 is ink.
        let field = BinaryField::from_fn(5, 3, |x, _| x == 2);
        assert!(field.is_ink(Point::new(2, 0)));
        assert!(field.is_ink(Point::new(2, 2)));
        assert!(!field.is_ink(Point::new(0, 2)));
        assert_eq!(field.ink_count(), 3);
    }

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut field = BinaryField::new(3, 3);
        field.set(Point::new(1, 1), true);
        field.set(Point::new(5, 5), true);
        field.set(Point::new(-1, 0), true);
        assert_eq!(field.ink_count(), 1);
        assert!(field.is_ink(Point::new(1, 1)));
    }

    #[test]
    fn luma_threshold_is_strict() {
        let mut img = GrayImage::from_pixel(3, 1, image::Luma([255]));
        img.put_pixel(0, 0, image::Luma([0]));
        img.put_pixel(1, 0, image::Luma([99]));
        img.put_pixel(2, 0, image::Luma([100]));

        let field = BinaryField::from_luma(&img, 100);
        assert!(field.is_ink(Point::new(0, 0)));
        assert!(field.is_ink(Point::new(1, 0)));
        assert!(!field.is_ink(Point::new(2, 0)));
    }

    #[test]
    fn dimensions_match_image() {
        let img = GrayImage::new(17, 31);
        let field = BinaryField::from_luma(&img, 100);
        assert_eq!(
            field.dimensions(),
            Dimensions {
                width: 17,
                height: 31
            }
        );
        // GrayImage::new is all black, so everything is ink.
        assert_eq!(field.ink_count(), 17 * 31);
    }
}
