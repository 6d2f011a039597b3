//! Set operations over sorted, duplicate-free posting lists.
//!
//! Every function takes ascending lists without duplicates and returns one.

use crate::DocId;

/// Union by two-pointer merge.
pub fn or(left: &[DocId], right: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0usize, 0usize);
    while i < left.len() && j < right.len() {
        let (l, r) = (left[i], right[j]);
        if l == r {
            out.push(l);
            i += 1;
            j += 1;
        } else if l > r {
            out.push(r);
            j += 1;
        } else {
            out.push(l);
            i += 1;
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    out
}

/// Intersection with skip pointers.
///
/// Each side's skip distance is the integer square root of its length, fixed for the whole call.
/// On a mismatch the lagging side jumps by its skip distance when the landing index is in range
/// and its value does not pass the other side's current value; otherwise it steps by one.
pub fn and(left: &[DocId], right: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    let l_skip = skip_distance(left.len());
    let r_skip = skip_distance(right.len());

    while i < left.len() && j < right.len() {
        let (l, r) = (left[i], right[j]);
        if l == r {
            out.push(l);
            i += 1;
            j += 1;
        } else if l > r {
            if j + r_skip < right.len() && right[j + r_skip] <= l {
                j += r_skip;
            } else {
                j += 1;
            }
        } else if i + l_skip < left.len() && left[i + l_skip] <= r {
            i += l_skip;
        } else {
            i += 1;
        }
    }
    out
}

/// Complement of `operand` within `universe`. `operand` must be a subset of `universe`.
pub fn not(operand: &[DocId], universe: &[DocId]) -> Vec<DocId> {
    if operand.is_empty() {
        return universe.to_vec();
    }
    let mut out = Vec::with_capacity(universe.len().saturating_sub(operand.len()));
    let mut k = 0usize;
    for &doc_id in universe {
        if doc_id != operand[k] {
            out.push(doc_id);
        } else if k + 1 < operand.len() {
            k += 1;
        }
    }
    out
}

fn skip_distance(len: usize) -> usize {
    (len as f64).sqrt() as usize
}
