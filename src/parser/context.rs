// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgtypes::TransformOrigin;

use super::defs::Definitions;
use super::style::{self, Styles};
use super::svgtree::{AId, SvgNode};
use super::units::{self, Axis, Settings};
use super::Options;
use crate::{NonZeroRect, Transform, ViewBox};

/// A loading context of a single element.
///
/// Each element derives its own state from the parent one.
/// The parent state is never modified, so nothing leaks upwards.
#[derive(Clone)]
pub struct State<'a> {
    pub(crate) opt: &'a Options,
    pub(crate) defs: &'a Definitions<'a>,
    /// A viewBox of the parent SVG element.
    ///
    /// The reference box for percentages.
    pub(crate) view_box: NonZeroRect,
    /// A size of the parent `use` element.
    /// Used only during nested `svg` size resolving.
    /// Width and height can be set independently.
    pub(crate) use_size: (Option<f32>, Option<f32>),
    /// Element's own transform.
    pub(crate) transform: Transform,
    /// Accumulated transform, including the element's own one.
    pub(crate) abs_transform: Transform,
    pub(crate) style: Styles<'a>,
    /// Computed `font-size`.
    pub(crate) font_size: f32,
    pub(crate) dpi: f32,
    /// Set while converting `clipPath` content.
    pub(crate) in_clip_path: bool,
    /// `use` elements currently being instantiated.
    pub(crate) use_chain: Vec<SvgNode<'a, 'a>>,
    /// Clip paths, masks, patterns and filters currently being converted.
    pub(crate) def_chain: Vec<SvgNode<'a, 'a>>,
}

impl<'a> State<'a> {
    /// Creates a root state.
    pub fn new(opt: &'a Options, defs: &'a Definitions<'a>, view_box: NonZeroRect) -> Self {
        State {
            opt,
            defs,
            view_box,
            use_size: (None, None),
            transform: Transform::default(),
            abs_transform: Transform::default(),
            style: Styles::default(),
            font_size: opt.font_size,
            dpi: opt.effective_dpi(),
            in_clip_path: false,
            use_chain: Vec::new(),
            def_chain: Vec::new(),
        }
    }

    /// Creates a state of a child element.
    pub fn derive(&self, node: SvgNode<'a, 'a>) -> Self {
        let declarations = style::declarations(node);

        let mut font_size = self.font_size;
        if let Some((_, value)) = declarations.iter().rev().find(|(aid, _)| *aid == AId::FontSize) {
            if value.trim() != "inherit" {
                let n = units::resolve_font_size(value, self.font_size, self.dpi);
                if n.is_finite() && n > 0.0 {
                    font_size = n;
                } else {
                    log::warn!("Invalid 'font-size' value: '{}'.", value);
                }
            }
        }

        let mut state = State {
            opt: self.opt,
            defs: self.defs,
            view_box: self.view_box,
            use_size: self.use_size,
            transform: Transform::default(),
            abs_transform: self.abs_transform,
            style: Styles::cascade(&self.style, &declarations),
            font_size,
            dpi: self.dpi,
            in_clip_path: self.in_clip_path,
            use_chain: self.use_chain.clone(),
            def_chain: self.def_chain.clone(),
        };

        state.transform = state.resolve_transform(node, AId::Transform);
        state.abs_transform = self.abs_transform.pre_concat(state.transform);
        state
    }

    /// Creates a state for a definition content, like `clipPath` children.
    ///
    /// The style is computed from the definition's own ancestors,
    /// not from the element that references it.
    pub fn for_definition(&self, node: SvgNode<'a, 'a>) -> Self {
        let mut state = self.clone();
        state.style = Styles::computed(node);
        state.transform = Transform::default();
        state.abs_transform = Transform::default();
        state.in_clip_path = false;
        state.font_size = node
            .ancestors()
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .fold(self.opt.font_size, |parent, n| {
                match n.raw_attribute(AId::FontSize) {
                    Some(v) => {
                        let n = units::resolve_font_size(v, parent, self.dpi);
                        if n.is_finite() && n > 0.0 {
                            n
                        } else {
                            parent
                        }
                    }
                    None => parent,
                }
            });
        state.def_chain.push(node);
        state
    }

    /// Establishes a new viewport.
    ///
    /// Returns a state with `viewport` (or the element's `viewBox`) as the reference box
    /// and a transform that maps element's content onto the viewport.
    pub fn with_viewport(&self, node: SvgNode, viewport: NonZeroRect) -> (Self, Transform) {
        let mut ts = Transform::from_translate(viewport.x(), viewport.y());
        let mut state = self.clone();
        state.view_box = viewport;

        if let Some(rect) = node.parse_viewbox() {
            let view_box = ViewBox {
                rect,
                aspect: node.attribute(AId::PreserveAspectRatio).unwrap_or_default(),
            };

            ts = ts.pre_concat(view_box.to_transform(viewport.size()));
            state.view_box = rect;
        }

        state.abs_transform = self.abs_transform.pre_concat(ts);
        (state, ts)
    }

    /// Returns values needed for unit conversion.
    pub fn settings(&self) -> Settings {
        Settings {
            dpi: self.dpi,
            font_size: self.font_size,
        }
    }

    /// Parses a transform attribute, honoring `transform-origin`.
    pub(crate) fn resolve_transform(&self, node: SvgNode, aid: AId) -> Transform {
        let mut transform: Transform = node.attribute(aid).unwrap_or_default();
        let origin: Option<TransformOrigin> = node.attribute(AId::TransformOrigin);

        if let Some(origin) = origin {
            let size = self.view_box.size();
            let settings = self.settings();
            let dx = units::convert_length(origin.x_offset, Axis::Horizontal, size, settings);
            let dy = units::convert_length(origin.y_offset, Axis::Vertical, size, settings);
            transform = Transform::default()
                .pre_translate(dx, dy)
                .pre_concat(transform)
                .pre_translate(-dx, -dy);
        }

        transform
    }
}
