// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use svgtypes::{Length, LengthUnit as Unit};

use super::context::State;
use super::converter::{self, Cache};
use super::svgtree::{AId, SvgNode, Units};
use super::{units, OptionLog};
use crate::{Group, Mask, MaskType, Node, NonZeroRect, Transform};

pub(crate) fn convert<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    object_bbox: Option<NonZeroRect>,
    cache: &mut Cache,
) -> Option<Arc<Mask>> {
    if state.def_chain.contains(&node) {
        log::warn!("Mask '{}' is recursive. Skipped.", node.element_id());
        return None;
    }

    let units = node
        .attribute(AId::MaskUnits)
        .unwrap_or(Units::ObjectBoundingBox);

    let content_units = node
        .attribute(AId::MaskContentUnits)
        .unwrap_or(Units::UserSpaceOnUse);

    // Only `userSpaceOnUse` masks can be shared,
    // because `objectBoundingBox` one will be converted into user one
    // and will become node-specific.
    let cacheable = units == Units::UserSpaceOnUse && content_units == Units::UserSpaceOnUse;
    if cacheable {
        if let Some(mask) = cache.masks.get(node.element_id()) {
            return Some(mask.clone());
        }
    }

    let rect = NonZeroRect::from_xywh(
        units::convert_attr(node, AId::X, units, state, Length::new(-10.0, Unit::Percent)),
        units::convert_attr(node, AId::Y, units, state, Length::new(-10.0, Unit::Percent)),
        units::convert_attr(node, AId::Width, units, state, Length::new(120.0, Unit::Percent)),
        units::convert_attr(node, AId::Height, units, state, Length::new(120.0, Unit::Percent)),
    );
    let mut rect =
        rect.log_none(|| log::warn!("Mask '{}' has an invalid size. Skipped.", node.element_id()))?;

    let mask_state = state.for_definition(node);
    let kind: MaskType = mask_state.style.get(AId::MaskType).unwrap_or_default();

    if units == Units::ObjectBoundingBox {
        if let Some(bbox) = object_bbox {
            rect = rect.bbox_transform(bbox)
        } else {
            // When mask units are `objectBoundingBox` and bbox is zero-sized - the whole
            // element should be masked.
            // Technically an UB, but this is what Chrome and Firefox do.
            return Some(Arc::new(Mask {
                id: node.element_id().to_string(),
                rect,
                kind,
                mask: None,
                root: Group::empty(),
            }));
        }
    }

    // Resolve linked mask.
    let mut mask = None;
    if let Some(link) = converter::style_link(&mask_state, AId::Mask) {
        let link = state.defs.masks.find(link).log_none(|| {
            log::warn!("Mask '{}' references an unknown mask.", node.element_id())
        })?;
        mask = convert(link, &mask_state, object_bbox, cache);

        // Linked `mask` must be valid.
        if mask.is_none() {
            return None;
        }
    }

    let mut mask = Mask {
        id: node.element_id().to_string(),
        rect,
        kind,
        mask,
        root: Group::empty(),
    };

    // To emulate content `objectBoundingBox` units we have to put
    // mask children into a group with a transform.
    let mut subroot = None;
    if content_units == Units::ObjectBoundingBox {
        let object_bbox = match object_bbox {
            Some(v) => v,
            None => {
                log::warn!("Masking of zero-sized shapes is not allowed.");
                return None;
            }
        };

        let mut g = Group::empty();
        g.transform = Transform::from_bbox(object_bbox);
        g.abs_transform = g.transform;

        subroot = Some(g);
    }

    {
        // Prefer `subroot` to `mask.root`.
        let real_root = subroot.as_mut().unwrap_or(&mut mask.root);
        converter::convert_children(node, &mask_state, cache, real_root);

        // A mask without children at this point is invalid.
        // Only masks with zero bbox and `objectBoundingBox` can be empty.
        if !real_root.has_children() {
            log::warn!("Mask '{}' has no valid children. Skipped.", node.element_id());
            return None;
        }
    }

    if let Some(mut subroot) = subroot {
        subroot.calculate_bounding_boxes();
        mask.root.children.push(Node::Group(Box::new(subroot)));
    }

    mask.root.calculate_bounding_boxes();

    let mask = Arc::new(mask);
    if cacheable {
        cache.masks.insert(node.element_id().to_string(), mask.clone());
    }
    Some(mask)
}
