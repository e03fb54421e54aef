// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{NonZeroRect, Size};

/// A shorthand for [FileFetcher]'s function.
pub type FileFetcherFn = Box<dyn Fn(&str) -> Option<Vec<u8>> + Send + Sync>;

/// A loader for external resources referenced by `xlink:href`.
///
/// The parser never touches the network or the file system by itself,
/// every external reference goes through this callback.
pub struct FileFetcher {
    /// Loads a resource by an absolute path.
    ///
    /// Relative paths are already resolved via [Options::resources_dir].
    pub fetch: FileFetcherFn,

    /// Allows `data:` URLs.
    ///
    /// Default: `true`
    pub allow_data_urls: bool,
}

impl Default for FileFetcher {
    fn default() -> Self {
        FileFetcher {
            fetch: FileFetcher::default_fetch(),
            allow_data_urls: true,
        }
    }
}

impl FileFetcher {
    /// Creates a fetcher that reads local files.
    ///
    /// URLs and missing files are ignored.
    pub fn default_fetch() -> FileFetcherFn {
        Box::new(|path: &str| {
            let path = std::path::Path::new(path);
            if !path.exists() {
                log::warn!("'{}' is not a path to a file.", path.display());
                return None;
            }

            match std::fs::read(path) {
                Ok(data) => Some(data),
                Err(_) => {
                    log::warn!("Failed to load '{}'. Skipped.", path.display());
                    None
                }
            }
        })
    }

    /// Creates a fetcher that refuses everything, including `data:` URLs.
    pub fn disabled() -> Self {
        FileFetcher {
            fetch: Box::new(|_| None),
            allow_data_urls: false,
        }
    }
}

impl std::fmt::Debug for FileFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FileFetcher { .. }")
    }
}

/// A target resolution of the document.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Resolution {
    /// The initial viewport in pixels.
    ///
    /// Percentages on the root element are resolved against it.
    pub bounds_in_pixels: NonZeroRect,

    /// Pixels per inch.
    ///
    /// Replaces [Options::dpi].
    pub pixels_per_inch: f32,
}

/// Processing options.
#[derive(Debug)]
pub struct Options {
    /// Directory that will be used during relative paths resolving.
    ///
    /// Expected to be the same as the directory that contains the SVG file,
    /// but can be set to any.
    ///
    /// Default: `None`
    pub resources_dir: Option<std::path::PathBuf>,

    /// Target DPI.
    ///
    /// Impacts units conversion.
    ///
    /// Default: 96.0
    pub dpi: f32,

    /// A default font family.
    ///
    /// Will be used when no `font-family` attribute is set in the SVG.
    ///
    /// Default: Times New Roman
    pub font_family: String,

    /// A default font size.
    ///
    /// Will be used when no `font-size` attribute is set in the SVG.
    ///
    /// Default: 12
    pub font_size: f32,

    /// A list of languages.
    ///
    /// Will be used to resolve a `systemLanguage` conditional attribute.
    ///
    /// Format: en, en-US.
    ///
    /// Default: `[en]`
    pub languages: Vec<String>,

    /// Default viewport size to assume if there is no `viewBox` attribute and
    /// the `width` or `height` attributes are relative.
    ///
    /// Default: `(100, 100)`
    pub default_size: Size,

    /// A target resolution.
    ///
    /// Default: `None`
    pub resolution: Option<Resolution>,

    /// Specifies how external files should be loaded.
    ///
    /// Default: reads local files
    pub file_fetcher: FileFetcher,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            resources_dir: None,
            dpi: 96.0,
            // Default font is user-agent dependent so we can use whichever we like.
            font_family: "Times New Roman".to_owned(),
            font_size: 12.0,
            languages: vec!["en".to_string()],
            default_size: Size::from_wh(100.0, 100.0).unwrap(),
            resolution: None,
            file_fetcher: FileFetcher::default(),
        }
    }
}

impl Options {
    /// Converts a relative path into absolute relative to the SVG file itself.
    ///
    /// If `Options::resources_dir` is not set, returns itself.
    pub fn get_abs_path(&self, rel_path: &std::path::Path) -> std::path::PathBuf {
        match self.resources_dir {
            Some(ref dir) => dir.join(rel_path),
            None => rel_path.into(),
        }
    }

    /// Returns the DPI used for absolute units.
    pub fn effective_dpi(&self) -> f32 {
        match self.resolution {
            Some(ref r) => r.pixels_per_inch,
            None => self.dpi,
        }
    }
}
