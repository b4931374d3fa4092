//! Route pattern syntax.
//!
//! - literal segments match byte-for-byte
//! - `:name` binds the whole segment as the named parameter `name`
//! - `*` (anything after the star is ignored) marks a catch-all segment
//!
//! Markers are only recognized as the first byte of a segment; anywhere else
//! they are a setup fault. A pattern without a leading `/` gets one.

use std::borrow::Cow;

use crate::error::SetupError;

const PARAM_MARKER: u8 = b':';
const CATCH_ALL_MARKER: u8 = b'*';

/// One classified segment of a dynamic pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Static(&'a str),
    Param(&'a str),
    CatchAll,
}

/// Prefix `pattern` with `/` when it lacks one. The empty pattern becomes `/`.
pub(crate) fn normalize(pattern: &str) -> Cow<'_, str> {
    if pattern.starts_with('/') {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(format!("/{pattern}"))
    }
}

/// True when `pattern` contains no parameter or catch-all marker anywhere.
pub(crate) fn is_static(pattern: &str) -> bool {
    !pattern
        .bytes()
        .any(|b| b == PARAM_MARKER || b == CATCH_ALL_MARKER)
}

/// Split a normalized dynamic pattern into classified segments.
///
/// A single trailing `/` is tolerated and produces no segment.
pub(crate) fn parse(pattern: &str) -> Result<Vec<Segment<'_>>, SetupError> {
    let body = pattern.strip_prefix('/').unwrap_or(pattern);
    let body = body.strip_suffix('/').unwrap_or(body);

    body.split('/')
        .map(|segment| classify(pattern, segment))
        .collect()
}

fn classify<'a>(pattern: &str, segment: &'a str) -> Result<Segment<'a>, SetupError> {
    let bytes = segment.as_bytes();
    let Some((&first, rest)) = bytes.split_first() else {
        return Err(SetupError::EmptySegment {
            pattern: pattern.to_string(),
        });
    };

    if rest
        .iter()
        .any(|&b| b == PARAM_MARKER || b == CATCH_ALL_MARKER)
    {
        return Err(SetupError::MarkerNotLeading {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
        });
    }

    Ok(match first {
        PARAM_MARKER => Segment::Param(&segment[1..]),
        CATCH_ALL_MARKER => Segment::CatchAll,
        _ => Segment::Static(segment),
    })
}
