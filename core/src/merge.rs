//! Linear-time combination of postings lists sorted by ascending doc id.

use std::cmp::Ordering;

use crate::index::Posting;

/// When one list is at least this many times longer than the other,
/// `intersect` gallops through the long list instead of scanning it.
pub const GALLOP_RATIO: usize = 8;

/// Union of two postings lists. A doc id present in both lists appears once
/// with the two scores added; every other posting is copied unchanged.
pub fn merge(list1: &[Posting], list2: &[Posting]) -> Vec<Posting> {
    let mut out = Vec::with_capacity(list1.len() + list2.len());
    let (mut i, mut j) = (0, 0);
    while i < list1.len() && j < list2.len() {
        let (a, b) = (list1[i], list2[j]);
        match a.doc_id.cmp(&b.doc_id) {
            Ordering::Equal => {
                out.push(Posting::new(a.doc_id, a.score + b.score));
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(a);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b);
                j += 1;
            }
        }
    }
    out.extend_from_slice(&list1[i..]);
    out.extend_from_slice(&list2[j..]);
    out
}

/// Intersection of two postings lists with summed scores.
pub fn intersect(list1: &[Posting], list2: &[Posting]) -> Vec<Posting> {
    let (short, long) = if list1.len() <= list2.len() { (list1, list2) } else { (list2, list1) };
    if short.is_empty() {
        return Vec::new();
    }
    if long.len() / short.len() >= GALLOP_RATIO {
        intersect_gallop(short, long)
    } else {
        intersect_linear(short, long)
    }
}

pub(crate) fn intersect_linear(list1: &[Posting], list2: &[Posting]) -> Vec<Posting> {
    let mut out = Vec::with_capacity(list1.len().min(list2.len()));
    let (mut i, mut j) = (0, 0);
    while i < list1.len() && j < list2.len() {
        let (a, b) = (list1[i], list2[j]);
        match a.doc_id.cmp(&b.doc_id) {
            Ordering::Equal => {
                out.push(Posting::new(a.doc_id, a.score + b.score));
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}

/// For each posting of `short`, double the step through `long` until it
/// overshoots, then binary search the last window.
pub(crate) fn intersect_gallop(short: &[Posting], long: &[Posting]) -> Vec<Posting> {
    let mut out = Vec::with_capacity(short.len());
    let mut lo = 0;
    for a in short {
        if lo >= long.len() {
            break;
        }
        let mut step = 1;
        let mut hi = lo;
        while hi < long.len() && long[hi].doc_id < a.doc_id {
            lo = hi + 1;
            hi += step;
            step *= 2;
        }
        let hi = hi.min(long.len() - 1);
        if lo > hi {
            break;
        }
        match long[lo..=hi].binary_search_by_key(&a.doc_id, |p| p.doc_id) {
            Ok(pos) => {
                let b = long[lo + pos];
                out.push(Posting::new(a.doc_id, a.score + b.score));
                lo += pos + 1;
            }
            Err(pos) => lo += pos,
        }
    }
    out
}
