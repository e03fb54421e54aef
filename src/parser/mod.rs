// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod clippath;
mod context;
mod converter;
mod defs;
mod filter;
mod image;
mod mask;
mod options;
mod paint;
mod paint_server;
mod shapes;
mod style;
mod svgtree;
mod switch;
mod text;
mod units;
mod use_node;

pub use options::{FileFetcher, FileFetcherFn, Options, Resolution};
pub use units::{convert_length, parse_length, resolve_length, Axis, Settings};

/// The maximum number of elements in a document.
const ELEMENTS_LIMIT: usize = 1_000_000;

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// Only UTF-8 content are supported.
    NotAnUtf8Str,

    /// Compressed SVG must use the GZip algorithm.
    MalformedGZip,

    /// We do not allow SVG with more than 1_000_000 elements for security reasons.
    ///
    /// Elements instantiated by `use` are counted too.
    ElementsLimitReached,

    /// The root element is not an `svg` element in the SVG namespace.
    NotAnSvg,

    /// Failed to parse an SVG data.
    ParsingFailed(roxmltree::Error),
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::NotAnUtf8Str => {
                write!(f, "provided data has not an UTF-8 encoding")
            }
            Error::MalformedGZip => {
                write!(f, "provided data has a malformed GZip content")
            }
            Error::ElementsLimitReached => {
                write!(f, "the maximum number of SVG elements has been reached")
            }
            Error::NotAnSvg => {
                write!(f, "the root element is not an SVG element")
            }
            Error::ParsingFailed(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
        }
    }
}

impl std::error::Error for Error {}

pub(crate) trait OptionLog {
    fn log_none<F: FnOnce()>(self, f: F) -> Self;
}

impl<T> OptionLog for Option<T> {
    #[inline]
    fn log_none<F: FnOnce()>(self, f: F) -> Self {
        self.or_else(|| {
            f();
            None
        })
    }
}

impl crate::Tree {
    /// Parses `Tree` from an SVG data.
    ///
    /// Can contain an SVG string or a gzip compressed data.
    pub fn from_data(data: &[u8], opt: &Options) -> Result<Self, Error> {
        if data.starts_with(&[0x1f, 0x8b]) {
            let data = decompress_svgz(data)?;
            let text = std::str::from_utf8(&data).map_err(|_| Error::NotAnUtf8Str)?;
            Self::from_str(text, opt)
        } else {
            let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
            Self::from_str(text, opt)
        }
    }

    /// Parses `Tree` from an SVG string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str, opt: &Options) -> Result<Self, Error> {
        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };

        let doc =
            roxmltree::Document::parse_with_options(text, xml_opt).map_err(Error::ParsingFailed)?;

        Self::from_xmltree(&doc, opt)
    }

    /// Parses `Tree` from `roxmltree::Document`.
    pub fn from_xmltree(doc: &roxmltree::Document, opt: &Options) -> Result<Self, Error> {
        if doc.descendants().filter(|n| n.is_element()).count() > ELEMENTS_LIMIT {
            return Err(Error::ElementsLimitReached);
        }

        converter::convert_doc(doc, opt)
    }
}

/// Decompresses an SVGZ file.
pub fn decompress_svgz(data: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decoded = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut decoded)
        .map_err(|_| Error::MalformedGZip)?;
    Ok(decoded)
}

#[inline]
pub(crate) fn f32_bound(min: f32, val: f32, max: f32) -> f32 {
    debug_assert!(min.is_finite());
    debug_assert!(val.is_finite());
    debug_assert!(max.is_finite());

    if val > max {
        max
    } else if val < min {
        min
    } else {
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tree;

    #[test]
    fn not_an_svg() {
        let res = Tree::from_str("<html/>", &Options::default());
        assert!(matches!(res, Err(Error::NotAnSvg)));
    }

    #[test]
    fn svg_outside_namespace() {
        let res = Tree::from_str("<svg/>", &Options::default());
        assert!(matches!(res, Err(Error::NotAnSvg)));
    }

    #[test]
    fn malformed_xml() {
        let res = Tree::from_str("<svg", &Options::default());
        assert!(matches!(res, Err(Error::ParsingFailed(_))));
    }

    #[test]
    fn not_utf8() {
        let res = Tree::from_data(&[0xff, 0xfe, 0x00], &Options::default());
        assert!(matches!(res, Err(Error::NotAnUtf8Str)));
    }

    #[test]
    fn malformed_gzip() {
        let res = Tree::from_data(&[0x1f, 0x8b, 0x00, 0x01], &Options::default());
        assert!(matches!(res, Err(Error::MalformedGZip)));
    }

    #[test]
    fn bound() {
        assert_eq!(f32_bound(0.0, -1.0, 1.0), 0.0);
        assert_eq!(f32_bound(0.0, 0.5, 1.0), 0.5);
        assert_eq!(f32_bound(0.0, 2.0, 1.0), 1.0);
    }
}
