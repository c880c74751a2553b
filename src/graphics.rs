/// A wrapper around the 64x32 bit buffer the draw instructions composite onto
use fixedbitset::FixedBitSet;
use std::fmt;
use std::ops::Index;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

pub struct Graphics {
    buffer: FixedBitSet, // row-major, bit (y * WIDTH + x) is lit when set
}

impl Graphics {
    pub fn new() -> Self {
        Graphics {
            buffer: FixedBitSet::with_capacity(WIDTH * HEIGHT),
        }
    }

    pub fn len(&self) -> usize {
        WIDTH * HEIGHT
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.count_ones(..) == 0
    }

    /// Given x and y coordinate for a bit in the buffer, return the corresponding
    /// index of that bit in the buffer. Coordinates past the edges wrap around
    pub fn get_graphics_idx(x: usize, y: usize) -> usize {
        let column = x % WIDTH;
        let row = (y % HEIGHT) * WIDTH;

        column + row
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.buffer[Graphics::get_graphics_idx(x, y)]
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// XOR the pixel at (x, y) and return whether it was lit beforehand,
    /// i.e. whether this toggle turned it off
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let idx = Graphics::get_graphics_idx(x, y);
        let was_lit = self.buffer[idx];
        self.buffer.set(idx, !was_lit);
        was_lit
    }

    /// Expand the bit buffer into one u32 per pixel, the format pixel surfaces
    /// like minifb's windows consume
    pub fn to_argb(&self, on: u32, off: u32) -> Vec<u32> {
        (0..self.len())
            .map(|i| if self.buffer[i] { on } else { off })
            .collect()
    }
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Graphics {
    type Output = bool;

    #[inline]
    fn index(&self, bit: usize) -> &Self::Output {
        &self.buffer[bit]
    }
}

/// Renders lit pixels as `#`, one line per row
impl fmt::Display for Graphics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..HEIGHT {
            let row: String = (0..WIDTH)
                .map(|x| if self.get(x, y) { '#' } else { ' ' })
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_reports_previous_state() {
        let mut g = Graphics::new();
        assert!(g.is_blank());

        assert_eq!(g.toggle(3, 4), false);
        assert!(g.get(3, 4));
        assert!(g[4 * WIDTH + 3]);

        assert_eq!(g.toggle(3, 4), true);
        assert!(!g.get(3, 4));
        assert!(g.is_blank());
    }

    #[test]
    fn coordinates_wrap() {
        assert_eq!(Graphics::get_graphics_idx(WIDTH, 0), 0);
        assert_eq!(Graphics::get_graphics_idx(WIDTH + 1, HEIGHT), 1);
        assert_eq!(
            Graphics::get_graphics_idx(WIDTH - 1, HEIGHT - 1),
            WIDTH * HEIGHT - 1
        );
    }

    #[test]
    fn clear_turns_everything_off() {
        let mut g = Graphics::new();
        g.toggle(0, 0);
        g.toggle(WIDTH - 1, HEIGHT - 1);
        g.clear();

        for i in 0..g.len() {
            assert_eq!(g[i], false);
        }
    }

    #[test]
    fn argb_and_text_rendering() {
        let mut g = Graphics::new();
        g.toggle(1, 0);

        let argb = g.to_argb(0xFFFFFF, 0);
        assert_eq!(argb.len(), WIDTH * HEIGHT);
        assert_eq!(&argb[..3], &[0, 0xFFFFFF, 0]);

        let text = g.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), HEIGHT);
        assert!(lines[0].starts_with(" # "));
        assert_eq!(lines[1].trim(), "");
    }
}
