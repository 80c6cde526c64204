//! Change detection: which listed files need re-transforming.

use mirrorsync_core::{FileDescriptor, FingerprintMap};

/// Stable filter of `listing`: a descriptor is kept iff the store has no
/// entry for its path or the stored fingerprint differs.
pub fn detect(listing: &[FileDescriptor], stored: &FingerprintMap) -> Vec<FileDescriptor> {
    listing
        .iter()
        .filter(|d| is_changed(d, stored))
        .cloned()
        .collect()
}

fn is_changed(descriptor: &FileDescriptor, stored: &FingerprintMap) -> bool {
    stored
        .get(descriptor.path.as_str())
        .map_or(true, |fp| fp != descriptor.fingerprint.as_str())
}

/// Counts for plan/log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectSummary {
    pub changed: usize,
    pub unchanged: usize,
    /// Changed files with no stored entry at all (subset of `changed`).
    pub new: usize,
}

pub fn summarize(listing: &[FileDescriptor], stored: &FingerprintMap) -> DetectSummary {
    let mut summary = DetectSummary::default();
    for d in listing {
        if !is_changed(d, stored) {
            summary.unchanged += 1;
            continue;
        }
        summary.changed += 1;
        if !stored.contains_key(d.path.as_str()) {
            summary.new += 1;
        }
    }
    summary
}
