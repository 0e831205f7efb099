use std::collections::BTreeMap;

use sp_core::ImageView;

/// Per-column bottom-edge detections: column index mapped to the deepest
/// (maximum-row) foreground row seen in that column. Columns with no
/// foreground pixel have no entry. Iteration is in ascending column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgePoints {
    columns: BTreeMap<u32, u32>,
}

impl EdgePoints {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row_at(&self, column: u32) -> Option<u32> {
        self.columns.get(&column).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.columns.iter().map(|(&x, &y)| (x, y))
    }

    /// Consumes the set into ascending-column parallel arrays.
    pub fn into_sorted(self) -> (Vec<u32>, Vec<u32>) {
        let mut xs = Vec::with_capacity(self.columns.len());
        let mut ys = Vec::with_capacity(self.columns.len());
        for (x, y) in self.columns {
            xs.push(x);
            ys.push(y);
        }
        (xs, ys)
    }
}

/// Scans every foreground pixel of the mask and keeps, per column, the pixel
/// with the greatest row index. A later/lower detection in the same column
/// always overrides an earlier one.
pub fn bottom_edge(mask: &ImageView<'_, u8>) -> EdgePoints {
    let mut columns: BTreeMap<u32, u32> = BTreeMap::new();

    for y in 0..mask.height() {
        let row = mask.row(y);
        for (x, &px) in row.iter().enumerate() {
            if px == 0 {
                continue;
            }

            let entry = columns.entry(x as u32).or_insert(y as u32);
            if (y as u32) > *entry {
                *entry = y as u32;
            }
        }
    }

    EdgePoints { columns }
}
