//! Ordered diff between two inventory snapshots.

use std::cmp::Ordering;

use crate::inventory::FileInfo;

/// Classification of one entry in an inventory diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    New,
    Deleted,
    Modified,
}

impl Change {
    /// Single-letter code used by the diff line format.
    pub fn code(self) -> char {
        match self {
            Change::New => 'N',
            Change::Deleted => 'D',
            Change::Modified => 'M',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub change: Change,
    pub name: String,
}

/// Compare two inventories and classify every file as new, deleted or
/// modified.
///
/// Both sides are sorted by name first (lexicographic byte order, on internal
/// copies), then walked with one cursor each. The single linear pass is what
/// lets the diff tell "gone from the current listing" apart from "still there
/// with different metadata", which a plain set difference over names cannot.
/// Entries come out in ascending name order as a consequence of the merge.
pub fn diff_inventories(previous: &[FileInfo], current: &[FileInfo]) -> Vec<DiffEntry> {
    let mut a: Vec<&FileInfo> = previous.iter().collect();
    let mut b: Vec<&FileInfo> = current.iter().collect();
    a.sort_by(|x, y| x.name.cmp(&y.name));
    b.sort_by(|x, y| x.name.cmp(&y.name));

    let mut diff = Vec::new();
    let mut pos_a = 0;
    let mut pos_b = 0;
    loop {
        if pos_a >= a.len() {
            // Previous side exhausted: everything left in the current
            // listing is new.
            for info in &b[pos_b..] {
                diff.push(DiffEntry {
                    change: Change::New,
                    name: info.name.clone(),
                });
            }
            break;
        }
        if pos_b >= b.len() {
            // Current side exhausted: everything left in the previous
            // snapshot is gone.
            for info in &a[pos_a..] {
                diff.push(DiffEntry {
                    change: Change::Deleted,
                    name: info.name.clone(),
                });
            }
            break;
        }

        match a[pos_a].name.cmp(&b[pos_b].name) {
            Ordering::Less => {
                diff.push(DiffEntry {
                    change: Change::Deleted,
                    name: a[pos_a].name.clone(),
                });
                pos_a += 1;
            }
            Ordering::Greater => {
                diff.push(DiffEntry {
                    change: Change::New,
                    name: b[pos_b].name.clone(),
                });
                pos_b += 1;
            }
            Ordering::Equal => {
                // Same name on both sides; only a full-record mismatch makes
                // it a modification.
                if a[pos_a] != b[pos_b] {
                    diff.push(DiffEntry {
                        change: Change::Modified,
                        name: b[pos_b].name.clone(),
                    });
                }
                pos_a += 1;
                pos_b += 1;
            }
        }
    }

    diff
}
