// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use strict_num::PositiveF32;
use svgtypes::{Length, LengthUnit as Unit};

use super::context::State;
use super::converter::{self, Cache, SvgColorExt};
use super::defs::{self, Definitions};
use super::style::Styles;
use super::svgtree::{AId, EId, SvgNode, Units};
use super::{f32_bound, units, OptionLog};
use crate::*;

pub(crate) enum ServerOrColor {
    Server(PaintServer),
    Color { color: Color, opacity: Opacity },
}

/// A paint server with its coordinate systems not yet bound to a shape.
#[derive(Clone)]
pub(crate) struct PaintServer {
    pub paint: Paint,
    pub units: Units,
    pub content_units: Units,
}

impl PaintServer {
    fn new(paint: Paint, units: Units) -> Self {
        PaintServer {
            paint,
            units,
            content_units: Units::UserSpaceOnUse,
        }
    }

    /// Checks that the paint depends on the bounding box of the painted shape.
    pub fn is_object_bbox(&self) -> bool {
        self.units == Units::ObjectBoundingBox || self.content_units == Units::ObjectBoundingBox
    }

    /// Returns a paint in user space of the shape with the given bounding box.
    ///
    /// Paint servers in user space are shared between shapes, the rest are copied.
    pub fn to_user_coordinates(&self, bbox: Option<Rect>) -> Option<Paint> {
        if !self.is_object_bbox() {
            return Some(self.paint.clone());
        }

        let name = if matches!(self.paint, Paint::Pattern(_)) {
            "Pattern"
        } else {
            "Gradient"
        };
        let bbox = bbox
            .and_then(|r| r.to_non_zero_rect())
            .log_none(|| log::warn!("{} on zero-sized shapes is not allowed.", name))?;

        let paint = match self.paint {
            Paint::Color(c) => Paint::Color(c),
            Paint::LinearGradient(ref lg) => {
                let mut lg = LinearGradient::clone(lg);
                lg.base.transform = lg.base.transform.post_concat(Transform::from_bbox(bbox));
                Paint::LinearGradient(Arc::new(lg))
            }
            Paint::RadialGradient(ref rg) => {
                let mut rg = RadialGradient::clone(rg);
                rg.base.transform = rg.base.transform.post_concat(Transform::from_bbox(bbox));
                Paint::RadialGradient(Arc::new(rg))
            }
            Paint::Pattern(ref patt) => {
                let mut patt = Pattern::clone(patt);
                if self.units == Units::ObjectBoundingBox {
                    patt.rect = patt.rect.bbox_transform(bbox);
                }

                if self.content_units == Units::ObjectBoundingBox && patt.view_box.is_none() {
                    // No need to shift patterns.
                    let transform = Transform::from_scale(bbox.width(), bbox.height());

                    let mut g = std::mem::replace(&mut patt.root, Group::empty());
                    g.transform = transform;
                    g.abs_transform = transform;

                    patt.root.children.push(Node::Group(Box::new(g)));
                    patt.root.calculate_bounding_boxes();
                }

                Paint::Pattern(Arc::new(patt))
            }
        };

        Some(paint)
    }
}

/// Converts a gradient or a pattern.
///
/// Gradients with less than two stops are converted into a plain color.
pub(crate) fn convert<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
) -> Option<ServerOrColor> {
    // Check for existing.
    if let Some(server) = cache.paint.get(node.element_id()) {
        return Some(ServerOrColor::Server(server.clone()));
    }

    let result = match node.tag_name()? {
        EId::LinearGradient => convert_linear(node, state),
        EId::RadialGradient => convert_radial(node, state),
        EId::Pattern => convert_pattern(node, state, cache),
        _ => None,
    };

    if let Some(ServerOrColor::Server(ref server)) = result {
        cache
            .paint
            .insert(node.element_id().to_string(), server.clone());
    }

    result
}

#[inline(never)]
fn convert_linear(node: SvgNode, state: &State) -> Option<ServerOrColor> {
    let chain = Definitions::href_chain(&state.defs.gradients, node.element_id())?;

    let stops = convert_stops(find_gradient_with_stops(&chain)?);
    if stops.len() < 2 {
        return stops_to_color(&stops);
    }

    let units = convert_units(&chain, AId::GradientUnits, Units::ObjectBoundingBox);
    let transform = state.resolve_transform(lookup(&chain, AId::GradientTransform), AId::GradientTransform);

    let gradient = LinearGradient {
        x1: resolve_number(&chain, AId::X1, units, state, Length::zero()),
        y1: resolve_number(&chain, AId::Y1, units, state, Length::zero()),
        x2: resolve_number(&chain, AId::X2, units, state, Length::new(100.0, Unit::Percent)),
        y2: resolve_number(&chain, AId::Y2, units, state, Length::zero()),
        base: BaseGradient {
            id: node.element_id().to_string(),
            transform,
            spread_method: convert_spread_method(&chain),
            stops,
        },
    };

    let paint = Paint::LinearGradient(Arc::new(gradient));
    Some(ServerOrColor::Server(PaintServer::new(paint, units)))
}

#[inline(never)]
fn convert_radial(node: SvgNode, state: &State) -> Option<ServerOrColor> {
    let chain = Definitions::href_chain(&state.defs.gradients, node.element_id())?;

    let stops = convert_stops(find_gradient_with_stops(&chain)?);
    if stops.len() < 2 {
        return stops_to_color(&stops);
    }

    let units = convert_units(&chain, AId::GradientUnits, Units::ObjectBoundingBox);
    let r = resolve_number(&chain, AId::R, units, state, Length::new(50.0, Unit::Percent));

    // 'A value of zero will cause the area to be painted as a single color
    // using the color and opacity of the last gradient stop.'
    //
    // https://www.w3.org/TR/SVG11/pservers.html#RadialGradientElementRAttribute
    if !r.is_valid_length() {
        let stop = stops.last()?;
        return Some(ServerOrColor::Color {
            color: stop.color,
            opacity: stop.opacity,
        });
    }

    let cx = resolve_number(&chain, AId::Cx, units, state, Length::new(50.0, Unit::Percent));
    let cy = resolve_number(&chain, AId::Cy, units, state, Length::new(50.0, Unit::Percent));
    let fx = resolve_number(&chain, AId::Fx, units, state, Length::new_number(cx as f64));
    let fy = resolve_number(&chain, AId::Fy, units, state, Length::new_number(cy as f64));
    let transform = state.resolve_transform(lookup(&chain, AId::GradientTransform), AId::GradientTransform);

    let gradient = RadialGradient {
        cx,
        cy,
        r: PositiveF32::new(r)?,
        fx,
        fy,
        base: BaseGradient {
            id: node.element_id().to_string(),
            transform,
            spread_method: convert_spread_method(&chain),
            stops,
        },
    };

    let paint = Paint::RadialGradient(Arc::new(gradient));
    Some(ServerOrColor::Server(PaintServer::new(paint, units)))
}

#[inline(never)]
fn convert_pattern<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
) -> Option<ServerOrColor> {
    let chain = Definitions::href_chain(&state.defs.patterns, node.element_id())?;
    let node_with_children = defs::find_with_children(&chain, |_| true)?;

    if state.def_chain.contains(&node_with_children) {
        log::warn!("Pattern '{}' references itself. Skipped.", node.element_id());
        return None;
    }

    let view_box = {
        let n1 = lookup(&chain, AId::ViewBox);
        let n2 = lookup(&chain, AId::PreserveAspectRatio);
        n1.parse_viewbox().map(|vb| ViewBox {
            rect: vb,
            aspect: n2.attribute(AId::PreserveAspectRatio).unwrap_or_default(),
        })
    };

    let units = convert_units(&chain, AId::PatternUnits, Units::ObjectBoundingBox);
    let content_units = convert_units(&chain, AId::PatternContentUnits, Units::UserSpaceOnUse);

    let transform = state.resolve_transform(lookup(&chain, AId::PatternTransform), AId::PatternTransform);

    let rect = NonZeroRect::from_xywh(
        resolve_number(&chain, AId::X, units, state, Length::zero()),
        resolve_number(&chain, AId::Y, units, state, Length::zero()),
        resolve_number(&chain, AId::Width, units, state, Length::zero()),
        resolve_number(&chain, AId::Height, units, state, Length::zero()),
    );
    let rect = rect.log_none(|| {
        log::warn!("Pattern '{}' has an invalid size. Skipped.", node.element_id())
    })?;

    let mut content_state = state.for_definition(node_with_children);
    if let Some(ref vb) = view_box {
        content_state.view_box = vb.rect;
    }

    let mut root = Group::empty();
    converter::convert_children(node_with_children, &content_state, cache, &mut root);
    if !root.has_children() {
        return None;
    }

    root.calculate_bounding_boxes();

    let patt = Pattern {
        id: node.element_id().to_string(),
        transform,
        rect,
        view_box,
        root,
    };

    Some(ServerOrColor::Server(PaintServer {
        paint: Paint::Pattern(Arc::new(patt)),
        units,
        content_units,
    }))
}

/// Returns the chain element that defines the attribute, or the first one.
fn lookup<'a>(chain: &[SvgNode<'a, 'a>], aid: AId) -> SvgNode<'a, 'a> {
    let first = chain[0];
    let found = if first.tag_name() == Some(EId::Pattern) {
        defs::resolve_attr(chain, aid, |tag| tag == EId::Pattern)
    } else {
        defs::resolve_gradient_attr(chain, aid)
    };

    found.unwrap_or(first)
}

fn find_gradient_with_stops<'a>(chain: &[SvgNode<'a, 'a>]) -> Option<SvgNode<'a, 'a>> {
    defs::find_with_children(chain, |n| n.tag_name() == Some(EId::Stop))
}

fn convert_spread_method(chain: &[SvgNode]) -> SpreadMethod {
    lookup(chain, AId::SpreadMethod)
        .attribute(AId::SpreadMethod)
        .unwrap_or_default()
}

pub(crate) fn convert_units(chain: &[SvgNode], aid: AId, def: Units) -> Units {
    lookup(chain, aid).attribute(aid).unwrap_or(def)
}

fn resolve_number(chain: &[SvgNode], aid: AId, units: Units, state: &State, def: Length) -> f32 {
    units::convert_attr(lookup(chain, aid), aid, units, state, def)
}

fn convert_stops(grad: SvgNode) -> Vec<Stop> {
    let mut stops = Vec::new();

    {
        let mut prev_offset = Length::zero();
        for stop in grad.element_children() {
            if stop.tag_name() != Some(EId::Stop) {
                log::warn!("Invalid gradient child: '{}'.", stop.local_name());
                continue;
            }

            // `number` can be either a number or a percentage.
            let offset = stop.attribute(AId::Offset).unwrap_or(prev_offset);
            let offset = match offset.unit {
                Unit::None => offset.number,
                Unit::Percent => offset.number / 100.0,
                _ => prev_offset.number,
            };
            prev_offset = Length::new_number(offset);
            let offset = f32_bound(0.0, offset as f32, 1.0);

            let style = Styles::computed(stop);
            let (color, opacity) = match style.raw(AId::StopColor) {
                Some("currentColor") => style
                    .get(AId::Color)
                    .unwrap_or_else(svgtypes::Color::black),
                Some(_) => style
                    .get(AId::StopColor)
                    .unwrap_or_else(svgtypes::Color::black),
                None => svgtypes::Color::black(),
            }
            .split_alpha();

            let stop_opacity = style
                .get::<Opacity>(AId::StopOpacity)
                .unwrap_or(Opacity::ONE);
            stops.push(Stop {
                offset: StopOffset::new_clamped(offset),
                color,
                opacity: opacity * stop_opacity,
            });
        }
    }

    // Remove stops with equal offset.
    //
    // Example:
    // offset="0.5"
    // offset="0.7"
    // offset="0.7" <-- this one should be removed
    // offset="0.7"
    // offset="0.9"
    if stops.len() >= 3 {
        let mut i = 0;
        while i < stops.len() - 2 {
            let offset1 = stops[i].offset.get();
            let offset2 = stops[i + 1].offset.get();
            let offset3 = stops[i + 2].offset.get();

            if offset1.approx_eq_ulps(&offset2, 4) && offset2.approx_eq_ulps(&offset3, 4) {
                // Remove offset in the middle.
                stops.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    // Remove zeros.
    //
    // From:
    // offset="0.0"
    // offset="0.0"
    // offset="0.7"
    //
    // To:
    // offset="0.0"
    // offset="0.00000001"
    // offset="0.7"
    if stops.len() >= 2 {
        let mut i = 0;
        while i < stops.len() - 1 {
            let offset1 = stops[i].offset.get();
            let offset2 = stops[i + 1].offset.get();

            if offset1.approx_eq_ulps(&0.0, 4) && offset2.approx_eq_ulps(&0.0, 4) {
                stops[i + 1].offset = StopOffset::new_clamped(offset1 + f32::EPSILON);
            }

            i += 1;
        }
    }

    // Shift equal offsets.
    //
    // From:
    // offset="0.5"
    // offset="0.7"
    // offset="0.7"
    //
    // To:
    // offset="0.5"
    // offset="0.699999999"
    // offset="0.7"
    {
        let mut i = 1;
        while i < stops.len() {
            let offset1 = stops[i - 1].offset.get();
            let offset2 = stops[i].offset.get();

            // Next offset must be smaller then previous.
            if offset1 > offset2 || offset1.approx_eq_ulps(&offset2, 4) {
                // Make previous offset a bit smaller.
                let new_offset = offset1 - f32::EPSILON;
                stops[i - 1].offset = StopOffset::new_clamped(new_offset);
                stops[i].offset = StopOffset::new_clamped(offset1);
            }

            i += 1;
        }
    }

    stops
}

fn stops_to_color(stops: &[Stop]) -> Option<ServerOrColor> {
    let stop = stops.first()?;
    Some(ServerOrColor::Color {
        color: stop.color,
        opacity: stop.opacity,
    })
}
