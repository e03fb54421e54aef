// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use svgtypes::{Length, LengthUnit};

use super::context::State;
use super::converter::{self, Cache};
use super::svgtree::{AId, EId, SvgNode};
use super::units;
use crate::{
    ClipPath, Effects, Fill, Group, IsValidLength, Node, NonZeroRect, Path, ShapeKind, Transform,
    Visibility,
};

/// Instantiates the element referenced by `use`.
///
/// `state` is the state of the `use` element itself.
pub(crate) fn convert<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) {
    let link = match node.href_id() {
        Some(v) => v,
        None => {
            log::warn!("Use '{}' has no valid reference. Skipped.", node.element_id());
            return;
        }
    };

    let linked = match state.defs.elements.find(link) {
        Some(v) => v,
        None => {
            log::warn!("Use '{}' references an undefined element '{}'. Skipped.", node.element_id(), link);
            return;
        }
    };

    if linked == node || state.use_chain.contains(&node) || node.ancestors().any(|n| n == linked) {
        log::warn!("Use '{}' is recursive. Skipped.", node.element_id());
        return;
    }

    let linked_to_symbol = linked.tag_name() == Some(EId::Symbol);
    if state.in_clip_path && linked_to_symbol {
        // `symbol` is not a valid `clipPath` child.
        return;
    }

    let x = units::convert_user_length(node, AId::X, state, Length::zero());
    let y = units::convert_user_length(node, AId::Y, state, Length::zero());
    let offset = Transform::from_translate(x, y);

    let mut use_state = state.clone();
    use_state.use_chain.push(node);
    use_state.abs_transform = state.abs_transform.pre_concat(offset);

    if linked_to_symbol {
        let (w, h) = use_node_size(node, state);
        let viewport = match NonZeroRect::from_xywh(0.0, 0.0, w, h) {
            Some(v) => v,
            None => {
                log::warn!("Use '{}' has an invalid size. Skipped.", node.element_id());
                return;
            }
        };

        converter::convert_group(node, state, offset, cache, parent, &|cache, g| {
            let mut symbol_state = use_state.derive(linked);
            if converter::is_hidden(&symbol_state) {
                return;
            }

            // `transform` on `symbol` is ignored.
            symbol_state.transform = Transform::default();
            symbol_state.abs_transform = use_state.abs_transform;

            let clip = !has_visible_overflow(&symbol_state);
            convert_viewport(linked, &symbol_state, viewport, clip, cache, g);
        });
        return;
    }

    if linked.tag_name() == Some(EId::Svg) {
        // When a `use` element references a `svg` element,
        // `use` size replaces the `svg` one.
        //
        // Each `use` resets the size, so nested `use` elements do not mix their sizes.
        let def = Length::new(100.0, LengthUnit::Percent);
        use_state.use_size = (None, None);

        // Width and height can be set independently.
        if node.has_attribute(AId::Width) {
            use_state.use_size.0 = Some(units::convert_user_length(node, AId::Width, state, def));
        }
        if node.has_attribute(AId::Height) {
            use_state.use_size.1 = Some(units::convert_user_length(node, AId::Height, state, def));
        }
    }

    converter::convert_group(node, state, offset, cache, parent, &|cache, g| {
        converter::convert_element(linked, &use_state, cache, g);
    });
}

/// Converts a nested `svg` element.
///
/// `state` is the state of the `svg` element itself.
pub(crate) fn convert_svg<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) {
    let x = units::convert_user_length(node, AId::X, state, Length::zero());
    let y = units::convert_user_length(node, AId::Y, state, Length::zero());
    let (mut w, mut h) = use_node_size(node, state);

    // If attributes `width` and/or `height` are provided on the `use` element,
    // then these values will override the corresponding attributes
    // on the `svg` in the generated tree.
    w = state.use_size.0.unwrap_or(w);
    h = state.use_size.1.unwrap_or(h);

    if !w.is_valid_length() || !h.is_valid_length() {
        log::warn!("Nested svg '{}' has an invalid size. Skipped.", node.element_id());
        return;
    }

    let viewport = match NonZeroRect::from_xywh(x, y, w, h) {
        Some(v) => v,
        None => return,
    };

    // A nested `svg` without an explicit size is not clipped.
    // One referenced by `use` is still clipped by the `use` bounds.
    let has_size = state.use_size.0.is_some()
        || state.use_size.1.is_some()
        || (node.has_attribute(AId::Width) && node.has_attribute(AId::Height));
    let clip = has_size && !has_visible_overflow(state);

    // `use` size applies only to the referenced `svg` itself.
    let mut inner_state = state.clone();
    inner_state.use_size = (None, None);

    converter::convert_group(node, state, Transform::default(), cache, parent, &|cache, g| {
        convert_viewport(node, &inner_state, viewport, clip, cache, g);
    });
}

/// Converts the children of `node` into a group that maps `viewBox` onto `viewport`.
fn convert_viewport<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    viewport: NonZeroRect,
    clip: bool,
    cache: &mut Cache,
    parent: &mut Group,
) {
    let (content_state, ts) = state.with_viewport(node, viewport);

    let mut g = Group::empty();
    g.transform = ts;
    g.abs_transform = content_state.abs_transform;
    converter::convert_children(node, &content_state, cache, &mut g);

    if !g.has_children() {
        return;
    }

    if clip {
        // The clip rectangle is in the parent coordinates.
        match ts.invert() {
            Some(inv) => g.effects.clip_path = Some(viewport_clip_path(viewport, inv)),
            None => return,
        }
    }

    g.calculate_bounding_boxes();
    parent.children.push(Node::Group(Box::new(g)));
}

// Emulates a new viewport via a clip path.
fn viewport_clip_path(rect: NonZeroRect, transform: Transform) -> Arc<ClipPath> {
    let rect = rect.to_rect();
    let path = Path {
        id: String::new(),
        transform: Transform::default(),
        abs_transform: Transform::default(),
        effects: Effects::default(),
        visibility: Visibility::Visible,
        kind: ShapeKind::Rect {
            x: rect.x(),
            y: rect.y(),
            width: rect.width(),
            height: rect.height(),
            rx: 0.0,
            ry: 0.0,
        },
        fill: Some(Fill::default()),
        stroke: None,
        data: Arc::new(tiny_skia_path::PathBuilder::from_rect(rect)),
        bounding_box: rect,
    };

    let mut root = Group::empty();
    root.children.push(Node::Path(Box::new(path)));
    root.calculate_bounding_boxes();

    Arc::new(ClipPath {
        id: String::new(),
        transform,
        clip_path: None,
        root,
    })
}

// No need to clip elements with `overflow:visible`.
fn has_visible_overflow(state: &State) -> bool {
    matches!(
        state.style.raw(AId::Overflow).map(str::trim),
        Some("visible") | Some("auto")
    )
}

fn use_node_size(node: SvgNode, state: &State) -> (f32, f32) {
    let def = Length::new(100.0, LengthUnit::Percent);
    let w = units::convert_user_length(node, AId::Width, state, def);
    let h = units::convert_user_length(node, AId::Height, state, def);
    (w, h)
}
