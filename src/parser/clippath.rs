// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;
use std::sync::Arc;

use super::context::State;
use super::converter::{self, Cache};
use super::svgtree::{AId, SvgNode, Units};
use super::OptionLog;
use crate::{ClipPath, Group, NonZeroRect, Transform};

pub(crate) fn convert<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    object_bbox: Option<NonZeroRect>,
    cache: &mut Cache,
) -> Option<Arc<ClipPath>> {
    if state.def_chain.contains(&node) {
        log::warn!("Clip path '{}' is recursive. Skipped.", node.element_id());
        return None;
    }

    // The whole clip path should be ignored when a transform is invalid.
    let mut transform = resolve_clip_path_transform(node, state)?;

    let units = node
        .attribute(AId::ClipPathUnits)
        .unwrap_or(Units::UserSpaceOnUse);

    // Check if this element was already converted.
    //
    // Only `userSpaceOnUse` clipPaths can be shared,
    // because `objectBoundingBox` one will be converted into user one
    // and will become node-specific.
    let cacheable = units == Units::UserSpaceOnUse;
    if cacheable {
        if let Some(clip) = cache.clip_paths.get(node.element_id()) {
            return Some(clip.clone());
        }
    }

    if units == Units::ObjectBoundingBox {
        let object_bbox = match object_bbox {
            Some(v) => v,
            None => {
                log::warn!("Clipping of zero-sized shapes is not allowed.");
                return None;
            }
        };

        let ts = Transform::from_bbox(object_bbox);
        transform = transform.pre_concat(ts);
    }

    let mut clip_state = state.for_definition(node);
    clip_state.in_clip_path = true;

    // Resolve linked clip path.
    let mut clip_path = None;
    if let Some(link) = converter::style_link(&clip_state, AId::ClipPath) {
        let link = state.defs.clip_paths.find(link).log_none(|| {
            log::warn!("Clip path '{}' references an unknown clip path.", node.element_id())
        })?;
        clip_path = convert(link, &clip_state, object_bbox, cache);

        // Linked `clipPath` must be valid.
        if clip_path.is_none() {
            return None;
        }
    }

    let mut clip = ClipPath {
        id: node.element_id().to_string(),
        transform,
        clip_path,
        root: Group::empty(),
    };

    converter::convert_children(node, &clip_state, cache, &mut clip.root);

    if clip.root.has_children() {
        clip.root.calculate_bounding_boxes();
        let clip = Arc::new(clip);
        if cacheable {
            cache.clip_paths.insert(node.element_id().to_string(), clip.clone());
        }
        Some(clip)
    } else {
        // A clip path without children is invalid.
        log::warn!("Clip path '{}' has no valid children. Skipped.", node.element_id());
        None
    }
}

fn resolve_clip_path_transform(node: SvgNode, state: &State) -> Option<Transform> {
    // Do not use SvgNode::attribute::<Transform>, because it will always
    // return a valid transform.

    let value: &str = match node.attribute(AId::Transform) {
        Some(v) => v,
        None => return Some(Transform::default()),
    };

    let ts = match svgtypes::Transform::from_str(value) {
        Ok(v) => v,
        Err(_) => {
            log::warn!("Failed to parse {} value: '{}'.", AId::Transform, value);
            return None;
        }
    };

    let ts = Transform::from_row(
        ts.a as f32,
        ts.b as f32,
        ts.c as f32,
        ts.d as f32,
        ts.e as f32,
        ts.f as f32,
    );

    if ts.is_valid() {
        Some(state.resolve_transform(node, AId::Transform))
    } else {
        None
    }
}
