// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgscene` is an [SVG] parser that builds an editable scene graph.

An input SVG fragment is turned into a tree of groups, paths, images and text
where styles, units, references and transforms are already resolved.
Each node keeps its local transform, so the result can be edited and moved around
without losing the original structure.

## Features

- Presentation attributes, `style` declarations and inheritance are resolved
- Basic shapes (like `rect` and `circle`) are converted into paths,
  while keeping the original shape parameters
- Relative length units (mm, em, %, etc.) are converted into user units
- Gradients and patterns are resolved, including `xlink:href` inheritance
- Clip paths, masks and filters are resolved and attached to nodes
- `use`, `symbol`, nested `svg` and `switch` are resolved
- Embedded and external images are loaded via a user-provided fetcher
- Text content and style are resolved. No layout is performed
- Forward references and recursive references are handled

## Limitations

- Unsupported SVG features are ignored
- CSS `<style>` sheets are not applied. Only inline `style` attributes
- Only static SVG. No animations, scripts or events
- No rendering

[SVG]: https://en.wikipedia.org/wiki/Scalable_Vector_Graphics
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod parser;
mod tree;

pub use parser::{
    convert_length, decompress_svgz, parse_length, resolve_length, Axis, Error, FileFetcher,
    FileFetcherFn, Options, Resolution, Settings,
};
pub use tree::*;
