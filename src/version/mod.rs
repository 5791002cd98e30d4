// src/version/mod.rs

//! Version comparison for package dependencies
//!
//! The resolver treats version ordering as an opaque three-way comparator
//! ([`VersionComparator`]). [`Vercmp`] is the default pacman-style
//! implementation for `[epoch:]version[-release]` strings.

use crate::packages::{DepMod, Dependency};
use std::cmp::Ordering;
use tracing::debug;

/// Three-way comparison of two version strings
pub trait VersionComparator {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

impl<F> VersionComparator for F
where
    F: Fn(&str, &str) -> Ordering,
{
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self(a, b)
    }
}

/// pacman-style version comparison
#[derive(Debug, Clone, Copy, Default)]
pub struct Vercmp;

impl VersionComparator for Vercmp {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        vercmp(a, b)
    }
}

/// Compare two full `[epoch:]version[-release]` strings
///
/// Epochs are compared first (missing epoch is 0), then versions. Releases
/// only take part when both sides carry one.
pub fn vercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let (epoch_a, ver_a, rel_a) = parse_evr(a);
    let (epoch_b, ver_b, rel_b) = parse_evr(b);

    match segment_cmp(epoch_a, epoch_b) {
        Ordering::Equal => {}
        ord => return ord,
    }
    match segment_cmp(ver_a, ver_b) {
        Ordering::Equal => {}
        ord => return ord,
    }
    match (rel_a, rel_b) {
        (Some(ra), Some(rb)) => segment_cmp(ra, rb),
        _ => Ordering::Equal,
    }
}

/// Split `[epoch:]version[-release]`
///
/// The epoch is only recognised when everything before the colon is
/// numeric; the release is whatever follows the last dash.
fn parse_evr(s: &str) -> (&str, &str, Option<&str>) {
    let (epoch, rest) = match s.split_once(':') {
        Some((e, r)) if e.bytes().all(|b| b.is_ascii_digit()) => {
            (if e.is_empty() { "0" } else { e }, r)
        }
        _ => ("0", s),
    };

    match rest.rsplit_once('-') {
        Some((version, release)) => (epoch, version, Some(release)),
        None => (epoch, rest, None),
    }
}

/// Compare two version fragments segment by segment
///
/// Runs of digits compare numerically and beat runs of letters;
/// separators only matter by their count. When one side runs out, a
/// trailing letter segment makes the longer side older (`1.0a < 1.0`),
/// anything else makes it newer (`1.0 < 1.0.1`).
fn segment_cmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let one = a.as_bytes();
    let two = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < one.len() && j < two.len() {
        let (sep_i, sep_j) = (i, j);
        while i < one.len() && !one[i].is_ascii_alphanumeric() {
            i += 1;
        }
        while j < two.len() && !two[j].is_ascii_alphanumeric() {
            j += 1;
        }

        if i >= one.len() || j >= two.len() {
            break;
        }

        // Differing separator runs: the side with fewer separators is older
        if i - sep_i != j - sep_j {
            return (i - sep_i).cmp(&(j - sep_j));
        }

        let (start_i, start_j) = (i, j);
        let is_num = one[i].is_ascii_digit();
        if is_num {
            while i < one.len() && one[i].is_ascii_digit() {
                i += 1;
            }
            while j < two.len() && two[j].is_ascii_digit() {
                j += 1;
            }
        } else {
            while i < one.len() && one[i].is_ascii_alphabetic() {
                i += 1;
            }
            while j < two.len() && two[j].is_ascii_alphabetic() {
                j += 1;
            }
        }

        let mut seg_one = &one[start_i..i];
        let mut seg_two = &two[start_j..j];

        // Segment types differ: numeric always wins over alpha
        if seg_two.is_empty() {
            return if is_num { Ordering::Greater } else { Ordering::Less };
        }

        if is_num {
            seg_one = trim_leading_zeros(seg_one);
            seg_two = trim_leading_zeros(seg_two);
            match seg_one.len().cmp(&seg_two.len()) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        match seg_one.cmp(seg_two) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }

    let rest_one = &one[i..];
    let rest_two = &two[j..];
    if rest_one.is_empty() && rest_two.is_empty() {
        return Ordering::Equal;
    }

    let starts_alpha = |s: &[u8]| s.first().is_some_and(|c| c.is_ascii_alphabetic());
    if (rest_one.is_empty() && !starts_alpha(rest_two)) || starts_alpha(rest_one) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

fn trim_leading_zeros(seg: &[u8]) -> &[u8] {
    let start = seg.iter().position(|&c| c != b'0').unwrap_or(seg.len());
    &seg[start..]
}

/// Check an installed (or candidate) version against a dependency
///
/// A dependency version without a release suffix is compared against the
/// candidate version with its `-release` suffix stripped.
pub fn version_satisfies(cmp: &dyn VersionComparator, version: &str, dep: &Dependency) -> bool {
    if dep.modifier == DepMod::Any {
        return true;
    }

    let candidate = if dep.version.contains('-') {
        version
    } else {
        version.split('-').next().unwrap_or(version)
    };

    let order = cmp.compare(candidate, &dep.version);
    let found = match dep.modifier {
        DepMod::Any => true,
        DepMod::Eq => order == Ordering::Equal,
        DepMod::Ge => order != Ordering::Less,
        DepMod::Le => order != Ordering::Greater,
        DepMod::Gt => order == Ordering::Greater,
        DepMod::Lt => order == Ordering::Less,
    };

    debug!(
        "depcmp: {} {} {} => {}",
        candidate,
        dep.modifier.as_str(),
        dep.version,
        if found { "match" } else { "no match" }
    );

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vercmp_simple() {
        assert_eq!(vercmp("1.0", "1.0"), Ordering::Equal);
        assert_eq!(vercmp("1.0", "1.1"), Ordering::Less);
        assert_eq!(vercmp("1.10", "1.9"), Ordering::Greater);
        assert_eq!(vercmp("1.010", "1.10"), Ordering::Equal);
    }

    #[test]
    fn test_vercmp_trailing_segments() {
        assert_eq!(vercmp("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(vercmp("1.0a", "1.0"), Ordering::Less);
        assert_eq!(vercmp("1.0", "1.0a"), Ordering::Greater);
        assert_eq!(vercmp("1.0alpha", "1.0beta"), Ordering::Less);
    }

    #[test]
    fn test_vercmp_numeric_beats_alpha() {
        assert_eq!(vercmp("1.1", "1.a"), Ordering::Greater);
        assert_eq!(vercmp("1.a", "1.1"), Ordering::Less);
    }

    #[test]
    fn test_vercmp_epochs() {
        assert_eq!(vercmp("1:1.0", "2.0"), Ordering::Greater);
        assert_eq!(vercmp("0:2.0", "2.0"), Ordering::Equal);
        assert_eq!(vercmp("1:1.0-1", "2:0.1-1"), Ordering::Less);
    }

    #[test]
    fn test_vercmp_releases() {
        assert_eq!(vercmp("1.0-1", "1.0-2"), Ordering::Less);
        assert_eq!(vercmp("1.0-10", "1.0-9"), Ordering::Greater);
        // Release ignored when only one side has it
        assert_eq!(vercmp("1.0", "1.0-5"), Ordering::Equal);
    }

    #[test]
    fn test_version_satisfies_operators() {
        let cmp = Vercmp;
        let ge = Dependency::parse("foo>=2.0").unwrap();
        assert!(!version_satisfies(&cmp, "1.5-1", &ge));
        assert!(version_satisfies(&cmp, "2.0-1", &ge));

        let lt = Dependency::parse("foo<2.0").unwrap();
        assert!(version_satisfies(&cmp, "1.5-1", &lt));
        assert!(!version_satisfies(&cmp, "2.0-3", &lt));

        let gt = Dependency::parse("foo>2.0").unwrap();
        assert!(!version_satisfies(&cmp, "2.0-3", &gt));
        assert!(version_satisfies(&cmp, "2.1-1", &gt));

        let any = Dependency::parse("foo").unwrap();
        assert!(version_satisfies(&cmp, "0.0.1", &any));
    }

    #[test]
    fn test_version_satisfies_strips_release_only_when_dep_has_none() {
        let cmp = Vercmp;
        let eq = Dependency::parse("foo=1.0").unwrap();
        assert!(version_satisfies(&cmp, "1.0-3", &eq));

        let eq_rel = Dependency::parse("foo=1.0-2").unwrap();
        assert!(!version_satisfies(&cmp, "1.0-3", &eq_rel));
        assert!(version_satisfies(&cmp, "1.0-2", &eq_rel));
    }

    #[test]
    fn test_closure_comparator() {
        let reversed = |a: &str, b: &str| b.cmp(a);
        let dep = Dependency::parse("foo>=b").unwrap();
        assert!(version_satisfies(&reversed, "a", &dep));
        assert!(!version_satisfies(&reversed, "c", &dep));
    }
}
