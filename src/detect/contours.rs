// Connected-component extraction over binary edge maps.

use crate::detect::edges::BitMap;
use crate::page::PixelRect;

/// One connected region of set pixels: its bounding box and pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    pub bbox: PixelRect,
    pub pixels: u64,
}

impl Blob {
    /// Set-pixel fraction of the bounding box; a rough solidity measure.
    pub fn fill_ratio(&self) -> f32 {
        if self.bbox.area() == 0 {
            return 0.0;
        }
        self.pixels as f32 / self.bbox.area() as f32
    }
}

/// Label 4-connected components and return one blob per component, in scan
/// order of each component's first-seen pixel. An all-zero map yields an
/// empty vector.
pub fn connected_components(map: &BitMap) -> Vec<Blob> {
    components_in(map, &PixelRect::new(0, 0, map.width, map.height))
}

/// Connected components restricted to `rect`; pixels outside the rectangle
/// are treated as background. Used both for contour extraction and for the
/// glyph-density metric inside a candidate box.
pub fn components_in(map: &BitMap, rect: &PixelRect) -> Vec<Blob> {
    let x_end = rect.right().min(map.width);
    let y_end = rect.bottom().min(map.height);
    if rect.x >= x_end || rect.y >= y_end {
        return Vec::new();
    }

    let mut visited = vec![false; map.width as usize * map.height as usize];
    let mut blobs = Vec::new();
    let mut stack: Vec<(u32, u32)> = Vec::new();

    for y in rect.y..y_end {
        for x in rect.x..x_end {
            let idx = y as usize * map.width as usize + x as usize;
            if visited[idx] || map.data[idx] == 0 {
                continue;
            }

            // Flood fill with an explicit stack; recursion would overflow on
            // page-sized components.
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
            let mut pixels = 0u64;
            visited[idx] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                pixels += 1;
                min_x = min_x.min(cx);
                min_y = min_y.min(cy);
                max_x = max_x.max(cx);
                max_y = max_y.max(cy);

                let mut neighbors = [(0u32, 0u32); 4];
                let mut n = 0;
                if cx > rect.x {
                    neighbors[n] = (cx - 1, cy);
                    n += 1;
                }
                if cx + 1 < x_end {
                    neighbors[n] = (cx + 1, cy);
                    n += 1;
                }
                if cy > rect.y {
                    neighbors[n] = (cx, cy - 1);
                    n += 1;
                }
                if cy + 1 < y_end {
                    neighbors[n] = (cx, cy + 1);
                    n += 1;
                }

                for &(nx, ny) in &neighbors[..n] {
                    let nidx = ny as usize * map.width as usize + nx as usize;
                    if !visited[nidx] && map.data[nidx] != 0 {
                        visited[nidx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            blobs.push(Blob {
                bbox: PixelRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
                pixels,
            });
        }
    }

    blobs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from(rows: &[&str]) -> BitMap {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        let mut map = BitMap::new(w, h);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    map.set(x as u32, y as u32);
                }
            }
        }
        map
    }

    #[test]
    fn test_empty_map_yields_no_blobs() {
        let map = BitMap::new(16, 16);
        assert!(connected_components(&map).is_empty());
    }

    #[test]
    fn test_two_separate_blobs() {
        let map = map_from(&[
            "##....",
            "##....",
            "....##",
            "....##",
        ]);
        let blobs = connected_components(&map);
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].bbox, PixelRect::new(0, 0, 2, 2));
        assert_eq!(blobs[0].pixels, 4);
        assert_eq!(blobs[1].bbox, PixelRect::new(4, 2, 2, 2));
    }

    #[test]
    fn test_diagonal_pixels_are_not_connected() {
        let map = map_from(&[
            "#.",
            ".#",
        ]);
        assert_eq!(connected_components(&map).len(), 2);
    }

    #[test]
    fn test_components_in_ignores_outside_pixels() {
        let map = map_from(&[
            "#....#",
            "......",
            "......",
        ]);
        let blobs = components_in(&map, &PixelRect::new(0, 0, 3, 3));
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].bbox, PixelRect::new(0, 0, 1, 1));
    }
}
