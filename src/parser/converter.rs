// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use svgtypes::Length;

use super::context::State;
use super::defs::Definitions;
use super::paint_server::PaintServer;
use super::svgtree::{AId, EId, SvgNode};
use super::units::{self, Axis};
use super::{paint, shapes, Error, Options};
use crate::tree::geom::transform_rect;
use crate::*;

#[derive(Default)]
pub(crate) struct Cache {
    pub clip_paths: HashMap<String, Arc<ClipPath>>,
    pub masks: HashMap<String, Arc<Mask>>,
    pub filters: HashMap<String, Arc<filter::Filter>>,
    pub paint: HashMap<String, PaintServer>,

    /// Ids already given to output nodes.
    all_ids: HashSet<String>,
}

pub(crate) trait SvgColorExt {
    fn split_alpha(self) -> (Color, Opacity);
}

impl SvgColorExt for svgtypes::Color {
    fn split_alpha(self) -> (Color, Opacity) {
        (
            Color::new_rgb(self.red, self.green, self.blue),
            Opacity::new_u8(self.alpha),
        )
    }
}

/// Converts an input `Document` into a `Tree`.
///
/// # Errors
///
/// - If the root element is not an `svg` one - returns `Error::NotAnSvg`.
/// - If `use` instances expand the document past the elements limit -
///   returns `Error::ElementsLimitReached`.
pub(crate) fn convert_doc(doc: &roxmltree::Document, opt: &Options) -> Result<Tree, Error> {
    let svg = SvgNode::new(doc.root_element());
    if svg.tag_name() != Some(EId::Svg) {
        return Err(Error::NotAnSvg);
    }

    let defs = Definitions::collect(svg);
    if defs.expanded_len(svg) > super::ELEMENTS_LIMIT {
        return Err(Error::ElementsLimitReached);
    }

    let view_box = svg.parse_viewbox().map(|rect| ViewBox {
        rect,
        aspect: svg.attribute(AId::PreserveAspectRatio).unwrap_or_default(),
    });

    let size = resolve_svg_size(svg, view_box.map(|vb| vb.rect), opt);

    // The reference box for percentages of the top-level elements.
    let viewport = match (view_box, size) {
        (Some(vb), _) => vb.rect,
        (None, Some(size)) => size.to_non_zero_rect(0.0, 0.0),
        (None, None) => initial_viewport(opt),
    };

    let mut root_state = State::new(opt, &defs, viewport);
    if let (Some(vb), Some(size)) = (view_box, size) {
        root_state.abs_transform = vb.to_transform(size);
    }

    let mut tree = Tree {
        size,
        view_box,
        root: Group::empty(),
    };

    if !svg.has_valid_transform(AId::Transform) {
        log::warn!("The root element has an invalid transform. Nothing to convert.");
        return Ok(tree);
    }

    let state = root_state.derive(svg);
    if is_hidden(&state) {
        return Ok(tree);
    }

    tree.root.transform = state.abs_transform;
    tree.root.abs_transform = state.abs_transform;

    let mut cache = Cache::default();
    convert_children(svg, &state, &mut cache, &mut tree.root);
    tree.root.calculate_bounding_boxes();

    if tree.size.is_none() {
        calculate_svg_bbox(&mut tree);
    } else if tree.view_box.is_none() {
        tree.view_box = tree.size.map(|size| ViewBox {
            rect: size.to_non_zero_rect(0.0, 0.0),
            aspect: AspectRatio::default(),
        });
    }

    Ok(tree)
}

fn initial_viewport(opt: &Options) -> NonZeroRect {
    match opt.resolution {
        Some(ref r) => r.bounds_in_pixels,
        None => opt.default_size.to_non_zero_rect(0.0, 0.0),
    }
}

/// Resolves the root `width` and `height`.
///
/// Returns `None` when at least one of them cannot be resolved.
fn resolve_svg_size(svg: SvgNode, view_box: Option<NonZeroRect>, opt: &Options) -> Option<Size> {
    let reference = view_box.unwrap_or_else(|| initial_viewport(opt)).size();
    let settings = units::Settings {
        dpi: opt.effective_dpi(),
        font_size: opt.font_size,
    };

    let resolve = |aid: AId, axis: Axis, from_view_box: Option<f32>| -> Option<f32> {
        // Percentages are relative to the viewBox, or to the fallback size without one.
        match svg.attribute::<Length>(aid) {
            Some(length) => Some(units::convert_length(length, axis, reference, settings)),
            None => from_view_box,
        }
    };

    let width = resolve(AId::Width, Axis::Horizontal, view_box.map(|r| r.width()));
    let height = resolve(AId::Height, Axis::Vertical, view_box.map(|r| r.height()));

    let size = Size::from_wh(width?, height?);
    if size.is_none() {
        log::warn!("The root element has an invalid size. Fallback to the content size.");
    }

    size
}

/// Calculates SVG's size and viewBox in case they were not set.
///
/// Simply uses the bounding box of the whole scene.
fn calculate_svg_bbox(tree: &mut Tree) {
    let bbox = match tree
        .root
        .bounding_box
        .and_then(|r| transform_rect(r, tree.root.transform))
    {
        Some(v) => v,
        None => {
            tree.size = None;
            tree.view_box = None;
            return;
        }
    };

    tree.size = Size::from_wh(bbox.right(), bbox.bottom());
    if let Some(rect) = NonZeroRect::from_xywh(0.0, 0.0, bbox.right(), bbox.bottom()) {
        tree.view_box = Some(ViewBox {
            rect,
            aspect: AspectRatio::default(),
        });
    }
}

#[inline(never)]
pub(crate) fn convert_children<'a>(
    parent_node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) {
    for node in parent_node.children() {
        convert_element(node, state, cache, parent);
    }
}

#[inline(never)]
pub(crate) fn convert_element<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) {
    if !node.is_element() {
        return;
    }

    let tag_name = match node.tag_name() {
        Some(v) => v,
        None => {
            log::warn!("Unknown element '{}'. Skipped.", node.local_name());
            return;
        }
    };

    match tag_name {
        EId::Style | EId::Script | EId::Title | EId::Desc | EId::Metadata => {
            log::debug!("'{}' is not a graphic element. Skipped.", tag_name);
            return;
        }
        // Already collected by `Definitions`.
        _ if tag_name.is_definition() => return,
        _ => {}
    }

    if !super::switch::is_condition_passed(node, state.opt) {
        return;
    }

    if !node.has_valid_transform(AId::Transform) {
        log::warn!("Element '{}' has an invalid transform. Skipped.", node.element_id());
        return;
    }

    let state = state.derive(node);
    if is_hidden(&state) {
        return;
    }

    if state.in_clip_path && !is_clip_path_child(tag_name) {
        log::warn!("'{}' is not a valid 'clip-path' child. Skipped.", tag_name);
        return;
    }

    match tag_name {
        EId::Rect
        | EId::Circle
        | EId::Ellipse
        | EId::Line
        | EId::Polyline
        | EId::Polygon
        | EId::Path => convert_path(node, &state, cache, parent),
        EId::G | EId::A => {
            convert_group(node, &state, Transform::default(), cache, parent, &|cache, g| {
                convert_children(node, &state, cache, g);
            });
        }
        EId::Svg => super::use_node::convert_svg(node, &state, cache, parent),
        EId::Switch => super::switch::convert(node, &state, cache, parent),
        EId::Use => super::use_node::convert(node, &state, cache, parent),
        EId::Image => super::image::convert(node, &state, cache, parent),
        EId::Text => super::text::convert(node, &state, cache, parent),
        _ => log::warn!("'{}' cannot be rendered directly. Skipped.", tag_name),
    }
}

pub(crate) fn is_hidden(state: &State) -> bool {
    state.style.raw(AId::Display).map(str::trim) == Some("none")
}

// `clipPath` can have only shapes, `text` and `use` children.
fn is_clip_path_child(tag_name: EId) -> bool {
    matches!(
        tag_name,
        EId::Rect
            | EId::Circle
            | EId::Ellipse
            | EId::Line
            | EId::Polyline
            | EId::Polygon
            | EId::Path
            | EId::Text
            | EId::Use
    )
}

/// Creates a group for a container element.
///
/// `shape_to_user` is an extra transform between the element's user space
/// and the group's content, like the `x`/`y` offset of `use`.
pub(crate) fn convert_group<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    shape_to_user: Transform,
    cache: &mut Cache,
    parent: &mut Group,
    collect_children: &dyn Fn(&mut Cache, &mut Group),
) {
    let mut g = Group::empty();
    g.transform = state.transform.pre_concat(shape_to_user);
    g.abs_transform = state.abs_transform.pre_concat(shape_to_user);

    collect_children(cache, &mut g);

    // We need to know group's bounding box before converting
    // clipPaths, masks and filters.
    g.calculate_bounding_boxes();

    let mut g = Node::Group(Box::new(g));
    if apply_style(node, &mut g, shape_to_user, state, cache) {
        g.set_id(unique_id(node, state, cache));
        parent.children.push(g);
    }
}

fn convert_path<'a>(node: SvgNode<'a, 'a>, state: &State<'a>, cache: &mut Cache, parent: &mut Group) {
    let (kind, data) = match shapes::convert(node, state) {
        Some(v) => v,
        None => return,
    };

    let bounding_box = data.bounds();
    let fill = paint::resolve_fill(state, Some(bounding_box), cache);
    let stroke = paint::resolve_stroke(state, Some(bounding_box), cache);
    let mut visibility: Visibility = state.style.get(AId::Visibility).unwrap_or_default();

    // If a path doesn't have a fill or a stroke then it's invisible.
    if fill.is_none() && stroke.is_none() {
        visibility = Visibility::Hidden;
    }

    let mut path = Node::Path(Box::new(Path {
        id: String::new(),
        transform: state.transform,
        abs_transform: state.abs_transform,
        effects: Effects::default(),
        visibility,
        kind,
        fill,
        stroke,
        data,
        bounding_box,
    }));

    if apply_style(node, &mut path, Transform::default(), state, cache) {
        path.set_id(unique_id(node, state, cache));
        parent.children.push(path);
    }
}

/// Returns an id for an output node.
///
/// Instantiated and definition content gets no ids, and an id is given only once.
pub(crate) fn unique_id(node: SvgNode, state: &State, cache: &mut Cache) -> String {
    let id = node.element_id();
    if id.is_empty() || !state.use_chain.is_empty() || !state.def_chain.is_empty() {
        return String::new();
    }

    if !cache.all_ids.insert(id.to_string()) {
        log::debug!("Element ID '{}' is already in use. Cleared.", id);
        return String::new();
    }

    id.to_string()
}

/// Returns an element id referenced by a `url(#id)` style property.
pub(crate) fn style_link<'a>(state: &State<'a>, aid: AId) -> Option<&'a str> {
    let value = state.style.raw(aid)?.trim();
    if value == "none" {
        return None;
    }

    match svgtypes::FuncIRI::from_str(value) {
        Ok(link) => Some(link.0),
        Err(_) => {
            log::warn!("Failed to parse {} value: '{}'.", aid, value);
            None
        }
    }
}

/// Binds opacity, clip path, mask and filter to a node.
///
/// Returns `false` when the node must not be rendered at all,
/// which happens when a referenced clip path or mask is invalid.
pub(crate) fn apply_style<'a>(
    node: SvgNode<'a, 'a>,
    shape: &mut Node,
    shape_to_user: Transform,
    state: &State<'a>,
    cache: &mut Cache,
) -> bool {
    // Effects are defined in the element's user space.
    let object_bbox = shape
        .bounding_box()
        .and_then(|r| transform_rect(r, shape_to_user))
        .and_then(|r| r.to_non_zero_rect());

    let user_to_shape = if shape_to_user.is_identity() {
        None
    } else {
        match shape_to_user.invert() {
            Some(ts) => Some(ts),
            None => return false,
        }
    };

    let mut effects = Effects::default();

    // A `clipPath` child cannot have an opacity.
    if !state.in_clip_path {
        effects.opacity = state.style.get(AId::Opacity).unwrap_or(Opacity::ONE);
    }

    if let Some(link) = style_link(state, AId::ClipPath) {
        match state.defs.clip_paths.find(link) {
            Some(link) => {
                match super::clippath::convert(link, state, object_bbox, cache) {
                    Some(clip) => effects.clip_path = Some(clip),
                    None => return false,
                }
            }
            None => log::warn!("Clip path '{}' is not defined.", link),
        }
    }

    // `mask` and `filter` cannot be set on `clipPath` children.
    if !state.in_clip_path {
        if let Some(link) = style_link(state, AId::Mask) {
            match state.defs.masks.find(link) {
                Some(link) => match super::mask::convert(link, state, object_bbox, cache) {
                    Some(mask) => effects.mask = Some(mask),
                    None => return false,
                },
                None => log::warn!("Mask '{}' is not defined.", link),
            }
        }

        if let Some(value) = state.style.raw(AId::Filter) {
            match super::filter::convert(value, state, object_bbox, cache) {
                Ok(filter) => effects.filter = filter,
                Err(()) => {
                    log::warn!("Element '{}' has an invalid filter. Ignored.", node.element_id())
                }
            }
        }
    }

    if let Some(ts) = user_to_shape {
        effects.clip_path = effects.clip_path.map(|clip| {
            let mut clip = ClipPath::clone(&clip);
            clip.transform = ts.pre_concat(clip.transform);
            Arc::new(clip)
        });

        if let Some(mask) = effects.mask {
            match map_mask(&mask, ts) {
                Some(mask) => effects.mask = Some(mask),
                None => return false,
            }
        }

        effects.filter = match effects.filter {
            Some(filter) => map_filter(&filter, ts),
            None => None,
        };
    }

    *shape.effects_mut() = effects;
    true
}

fn map_mask(mask: &Mask, ts: Transform) -> Option<Arc<Mask>> {
    let rect = transform_rect(mask.rect.to_rect(), ts)?.to_non_zero_rect()?;

    let mut content = Group::empty();
    content.transform = ts;
    content.abs_transform = ts;
    content.children = mask.root.children.clone();
    content.calculate_bounding_boxes();

    let mut root = Group::empty();
    root.children.push(Node::Group(Box::new(content)));
    root.calculate_bounding_boxes();

    let inner = match mask.mask {
        Some(ref inner) => Some(map_mask(inner, ts)?),
        None => None,
    };

    Some(Arc::new(Mask {
        id: mask.id.clone(),
        rect,
        kind: mask.kind,
        mask: inner,
        root,
    }))
}

fn map_filter(filter: &filter::Filter, ts: Transform) -> Option<Arc<filter::Filter>> {
    let map = |r: NonZeroRect| transform_rect(r.to_rect(), ts).and_then(|r| r.to_non_zero_rect());

    let mut filter = filter.clone();
    filter.rect = map(filter.rect)?;
    for primitive in &mut filter.primitives {
        primitive.rect = map(primitive.rect)?;
    }

    Some(Arc::new(filter))
}
