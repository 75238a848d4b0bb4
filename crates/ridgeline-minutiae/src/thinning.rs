// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Zhang-Suen skeletonization of a binary ridge mask.

use image::{GrayImage, Luma};
use ridgeline_core::error::{Result, RidgelineError};
use tracing::{debug, instrument};

/// A binary ridge mask. `true` marks a ridge (foreground) pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RidgeMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl RidgeMask {
    /// Build a mask from a two-valued grayscale image, treating dark pixels
    /// (below 128) as ridge.
    ///
    /// Images with more than two distinct gray levels are rejected: the
    /// enhancement pipeline must run first.
    pub fn from_binary(gray: &GrayImage) -> Result<Self> {
        let mut seen = [false; 256];
        let mut distinct = 0usize;
        for pixel in gray.pixels() {
            let v = pixel.0[0] as usize;
            if !seen[v] {
                seen[v] = true;
                distinct += 1;
            }
        }
        if distinct > 2 {
            return Err(RidgelineError::NotBinary(distinct));
        }

        let data = gray.pixels().map(|p| p.0[0] < 128).collect();
        Ok(Self {
            width: gray.width(),
            height: gray.height(),
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ridge test with out-of-bounds treated as background.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Number of ridge pixels in the mask.
    pub fn count_foreground(&self) -> u64 {
        self.data.iter().filter(|&&v| v).count() as u64
    }

    /// Render the mask back to a grayscale image, ridge black on white.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.data[y as usize * self.width as usize + x as usize] {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }

    /// Thin the mask in place to a one-pixel-wide skeleton using the
    /// Zhang-Suen algorithm.
    ///
    /// Each iteration runs two sub-passes. A boundary pixel is deleted when
    /// it has 2..=6 ridge neighbours, exactly one background-to-ridge
    /// transition around its 8-neighbour cycle, and the directional
    /// conditions of the sub-pass hold. Iterates until a full pass deletes
    /// nothing. Border pixels are never touched.
    ///
    /// Returns the number of full iterations performed.
    #[instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn thin(&mut self) -> u32 {
        let mut iterations = 0u32;
        loop {
            let first = self.thinning_subpass(SubPass::First);
            let second = self.thinning_subpass(SubPass::Second);
            iterations += 1;
            if first == 0 && second == 0 {
                break;
            }
        }
        debug!(
            iterations,
            remaining = self.count_foreground(),
            "Thinning converged"
        );
        iterations
    }

    /// One Zhang-Suen sub-pass. Marks candidates against the frozen mask,
    /// then deletes them all at once. Returns the number of deletions.
    fn thinning_subpass(&mut self, pass: SubPass) -> usize {
        if self.width < 3 || self.height < 3 {
            return 0;
        }

        let mut to_delete = Vec::new();
        for y in 1..(self.height as i64 - 1) {
            for x in 1..(self.width as i64 - 1) {
                if !self.get(x, y) {
                    continue;
                }

                let n = self.neighbors(x, y);
                let count = n.iter().filter(|&&v| v).count();
                if !(2..=6).contains(&count) {
                    continue;
                }
                if transitions(&n) != 1 {
                    continue;
                }

                // Neighbour order is P2..P9 starting north, clockwise.
                let (p2, p4, p6, p8) = (n[0], n[2], n[4], n[6]);
                let ok = match pass {
                    SubPass::First => !(p2 && p4 && p6) && !(p4 && p6 && p8),
                    SubPass::Second => !(p2 && p4 && p8) && !(p2 && p6 && p8),
                };
                if ok {
                    to_delete.push((x as usize, y as usize));
                }
            }
        }

        for &(x, y) in &to_delete {
            self.data[y * self.width as usize + x] = false;
        }
        to_delete.len()
    }

    /// The 8-neighbour ring P2..P9: north, then clockwise.
    pub(crate) fn neighbors(&self, x: i64, y: i64) -> [bool; 8] {
        [
            self.get(x, y - 1),     // P2
            self.get(x + 1, y - 1), // P3
            self.get(x + 1, y),     // P4
            self.get(x + 1, y + 1), // P5
            self.get(x, y + 1),     // P6
            self.get(x - 1, y + 1), // P7
            self.get(x - 1, y),     // P8
            self.get(x - 1, y - 1), // P9
        ]
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        let data = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| b == b'#'))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SubPass {
    First,
    Second,
}

/// Number of background-to-ridge transitions around the neighbour cycle
/// P2, P3, ..., P9, P2.
pub(crate) fn transitions(neighbors: &[bool; 8]) -> u8 {
    let mut count = 0u8;
    for i in 0..8 {
        let current = neighbors[i];
        let next = neighbors[(i + 1) % 8];
        if !current && next {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn from_binary_rejects_grayscale() {
        let gray = GrayImage::from_fn(4, 4, |x, y| Luma([(x * 4 + y * 16) as u8]));
        let err = RidgeMask::from_binary(&gray).unwrap_err();
        assert!(matches!(err, RidgelineError::NotBinary(_)));
    }

    #[test]
    fn from_binary_dark_is_ridge() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([if x < 2 { 0u8 } else { 255u8 }]));
        let mask = RidgeMask::from_binary(&gray).expect("binary");
        assert!(mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(2, 0));
        assert_eq!(mask.count_foreground(), 2);
    }

    #[test]
    fn transitions_counts_cycle() {
        // One solid arc: a single 0->1 transition.
        let one = [true, true, true, false, false, false, false, false];
        assert_eq!(transitions(&one), 1);

        // Alternating: four transitions.
        let four = [true, false, true, false, true, false, true, false];
        assert_eq!(transitions(&four), 4);

        assert_eq!(transitions(&[false; 8]), 0);
        assert_eq!(transitions(&[true; 8]), 0);
    }

    #[test]
    fn thinning_reduces_thick_stroke_to_unit_width() {
        // A 3-pixel-thick horizontal bar.
        let mut mask = RidgeMask::from_rows(&[
            "..........",
            ".########.",
            ".########.",
            ".########.",
            "..........",
        ]);
        mask.thin();

        // Every remaining column of the bar holds at most one ridge pixel.
        for x in 1..9 {
            let column: usize = (0..5).filter(|&y| mask.get(x, y)).count();
            assert!(column <= 1, "column {x} still {column} pixels thick");
        }
        // The stroke itself survives.
        assert!(mask.count_foreground() >= 6);
    }

    #[test]
    fn thinning_preserves_connectivity() {
        let mut mask = RidgeMask::from_rows(&[
            "............",
            ".##########.",
            ".##########.",
            ".##########.",
            "............",
        ]);
        mask.thin();

        // Walk the skeleton from its leftmost pixel; every skeleton pixel
        // must be reachable.
        let total = mask.count_foreground();
        let start = (0..12i64)
            .flat_map(|x| (0..5i64).map(move |y| (x, y)))
            .find(|&(x, y)| mask.get(x, y))
            .expect("skeleton is non-empty");

        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![start];
        while let Some((x, y)) = stack.pop() {
            if !seen.insert((x, y)) {
                continue;
            }
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx, dy) != (0, 0) && mask.get(x + dx, y + dy) {
                        stack.push((x + dx, y + dy));
                    }
                }
            }
        }
        assert_eq!(seen.len() as u64, total);
    }

    #[test]
    fn thinning_is_stable_on_thin_line() {
        let mut mask = RidgeMask::from_rows(&[
            ".......",
            ".#####.",
            ".......",
        ]);
        let before = mask.clone();
        mask.thin();
        assert_eq!(mask, before);
    }

    #[test]
    fn thinning_never_touches_border_pixels() {
        // Ridge mass flush against the border: the border row/column must be
        // left exactly as-is.
        let mut mask = RidgeMask::from_rows(&[
            "####",
            "####",
            "####",
            "####",
        ]);
        mask.thin();
        for x in 0..4 {
            assert!(mask.get(x, 0));
            assert!(mask.get(x, 3));
        }
        for y in 0..4 {
            assert!(mask.get(0, y));
            assert!(mask.get(3, y));
        }
    }

    #[test]
    fn round_trip_through_gray() {
        let mask = RidgeMask::from_rows(&[
            ".....",
            ".###.",
            ".....",
        ]);
        let gray = mask.to_gray();
        let back = RidgeMask::from_binary(&gray).expect("binary");
        assert_eq!(back, mask);
    }
}
