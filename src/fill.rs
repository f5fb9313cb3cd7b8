//! Flood fill over RGBA pixel buffers
//!
//! Exact-match, 4-connected fill driven by an explicit stack so large or
//! uniformly colored buffers never recurse.

use image::{Rgba, RgbaImage};

use crate::color::opaque;

/// Fill the 4-connected region around `(x, y)` with `fill`.
///
/// A pixel joins the region only when all four channels equal the seed's
/// original RGBA; there is no tolerance. Filled pixels are written opaque.
/// Returns the number of pixels changed.
///
/// Filling with the color the seed already has, or seeding outside the buffer,
/// changes nothing. Transparent seeds are ordinary fill targets.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use pixelstudio::fill::flood_fill;
///
/// let mut buffer = RgbaImage::new(4, 4);
/// let changed = flood_fill(&mut buffer, 1, 1, Rgba([255, 0, 0, 255]));
/// assert_eq!(changed, 16);
/// ```
pub fn flood_fill(buffer: &mut RgbaImage, x: u32, y: u32, fill: Rgba<u8>) -> usize {
    let (width, height) = buffer.dimensions();
    if x >= width || y >= height {
        return 0;
    }

    let fill = opaque(fill);
    let target = *buffer.get_pixel(x, y);
    if target == fill {
        return 0;
    }

    let mut changed = 0;
    let mut stack = vec![(x, y)];
    while let Some((cx, cy)) = stack.pop() {
        if *buffer.get_pixel(cx, cy) != target {
            continue;
        }
        buffer.put_pixel(cx, cy, fill);
        changed += 1;

        if cx + 1 < width {
            stack.push((cx + 1, cy));
        }
        if cx > 0 {
            stack.push((cx - 1, cy));
        }
        if cy + 1 < height {
            stack.push((cx, cy + 1));
        }
        if cy > 0 {
            stack.push((cx, cy - 1));
        }
    }

    changed
}
