// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgtypes::Length;

use super::context::State;
use super::converter::{Cache, SvgColorExt};
use super::paint_server::{self, ServerOrColor};
use super::svgtree::AId;
use super::units;
use crate::{
    ApproxEqUlps, Color, Fill, NonZeroPositiveF32, Opacity, Paint, Rect, Stroke, StrokeMiterlimit,
};

/// Resolves the `fill` of a shape with the given bounding box.
pub(crate) fn resolve_fill(state: &State, bbox: Option<Rect>, cache: &mut Cache) -> Option<Fill> {
    if state.in_clip_path {
        // A `clipPath` child can be filled only with a black color.
        return Some(Fill {
            paint: Paint::Color(Color::black()),
            opacity: Opacity::ONE,
            rule: state.style.get(AId::ClipRule).unwrap_or_default(),
        });
    }

    let mut sub_opacity = Opacity::ONE;
    let paint = match state.style.raw(AId::Fill) {
        Some(value) => convert_paint(value, AId::Fill, bbox, state, &mut sub_opacity, cache)?,
        None => Paint::Color(Color::black()),
    };

    let fill_opacity = state
        .style
        .get::<Opacity>(AId::FillOpacity)
        .unwrap_or(Opacity::ONE);

    Some(Fill {
        paint,
        opacity: sub_opacity * fill_opacity,
        rule: state.style.get(AId::FillRule).unwrap_or_default(),
    })
}

/// Resolves the `stroke` of a shape with the given bounding box.
pub(crate) fn resolve_stroke(
    state: &State,
    bbox: Option<Rect>,
    cache: &mut Cache,
) -> Option<Stroke> {
    if state.in_clip_path {
        // A `clipPath` child cannot be stroked.
        return None;
    }

    let mut sub_opacity = Opacity::ONE;
    let value = state.style.raw(AId::Stroke)?;
    let paint = convert_paint(value, AId::Stroke, bbox, state, &mut sub_opacity, cache)?;

    let width = units::convert_style_length(AId::StrokeWidth, state, Length::new_number(1.0));
    let width = NonZeroPositiveF32::new(width)?;

    // Must be bigger than 1.
    let miterlimit = state.style.get(AId::StrokeMiterlimit).unwrap_or(4.0);
    let miterlimit = if miterlimit < 1.0 { 1.0 } else { miterlimit };
    let miterlimit = StrokeMiterlimit::new(miterlimit);

    let stroke_opacity = state
        .style
        .get::<Opacity>(AId::StrokeOpacity)
        .unwrap_or(Opacity::ONE);

    let stroke = Stroke {
        paint,
        dasharray: conv_dasharray(state),
        dashoffset: units::convert_style_length(AId::StrokeDashoffset, state, Length::zero()),
        miterlimit,
        opacity: sub_opacity * stroke_opacity,
        width,
        linecap: state.style.get(AId::StrokeLinecap).unwrap_or_default(),
        linejoin: state.style.get(AId::StrokeLinejoin).unwrap_or_default(),
    };

    Some(stroke)
}

fn convert_paint(
    value: &str,
    aid: AId,
    bbox: Option<Rect>,
    state: &State,
    opacity: &mut Opacity,
    cache: &mut Cache,
) -> Option<Paint> {
    let paint = match svgtypes::Paint::from_str(value) {
        Ok(v) => v,
        Err(_) => {
            if aid == AId::Fill {
                log::warn!("Failed to parse fill value: '{}'. Fallback to black.", value);
                svgtypes::Paint::Color(svgtypes::Color::black())
            } else {
                log::warn!("Failed to parse stroke value: '{}'. Fallback to no stroke.", value);
                return None;
            }
        }
    };

    match paint {
        svgtypes::Paint::None => None,
        // Already resolved by the cascade.
        svgtypes::Paint::Inherit => None,
        // Markers are not supported, so there is no context element.
        svgtypes::Paint::ContextFill | svgtypes::Paint::ContextStroke => None,
        svgtypes::Paint::CurrentColor => Some(current_color(state, opacity)),
        svgtypes::Paint::Color(svg_color) => {
            let (color, alpha) = svg_color.split_alpha();
            *opacity = alpha;
            Some(Paint::Color(color))
        }
        svgtypes::Paint::FuncIRI(func_iri, fallback) => {
            let link = state
                .defs
                .gradients
                .find(func_iri)
                .or_else(|| state.defs.patterns.find(func_iri));

            let link = match link {
                Some(v) => v,
                None => {
                    if let Some(n) = state.defs.elements.find(func_iri) {
                        log::warn!("'{}' cannot be used to {} a shape.", n.local_name(), aid);
                        return None;
                    }

                    log::warn!("Paint server '{}' is not defined.", func_iri);
                    return from_fallback(state, fallback, opacity);
                }
            };

            match paint_server::convert(link, state, cache) {
                Some(ServerOrColor::Server(server)) => {
                    // We can use a paint server node with ObjectBoundingBox units
                    // for painting only when the shape itself has a bbox.
                    //
                    // See SVG 1.1, section 7.11 for details.
                    match server.to_user_coordinates(bbox) {
                        Some(paint) => Some(paint),
                        None => from_fallback(state, fallback, opacity),
                    }
                }
                Some(ServerOrColor::Color { color, opacity: so }) => {
                    *opacity = so;
                    Some(Paint::Color(color))
                }
                None => from_fallback(state, fallback, opacity),
            }
        }
    }
}

fn current_color(state: &State, opacity: &mut Opacity) -> Paint {
    let svg_color: svgtypes::Color = state
        .style
        .get(AId::Color)
        .unwrap_or_else(svgtypes::Color::black);
    let (color, alpha) = svg_color.split_alpha();
    *opacity = alpha;
    Paint::Color(color)
}

fn from_fallback(
    state: &State,
    fallback: Option<svgtypes::PaintFallback>,
    opacity: &mut Opacity,
) -> Option<Paint> {
    match fallback? {
        svgtypes::PaintFallback::None => None,
        svgtypes::PaintFallback::CurrentColor => Some(current_color(state, opacity)),
        svgtypes::PaintFallback::Color(svg_color) => {
            let (color, alpha) = svg_color.split_alpha();
            *opacity = alpha;
            Some(Paint::Color(color))
        }
    }
}

// Prepare the 'stroke-dasharray' according to:
// https://www.w3.org/TR/SVG11/painting.html#StrokeDasharrayProperty
fn conv_dasharray(state: &State) -> Option<Vec<f32>> {
    let value = state.style.raw(AId::StrokeDasharray)?;
    if value.trim() == "none" {
        return None;
    }

    let list = units::convert_list(value, AId::StrokeDasharray, state)?;

    // `A negative value is an error`
    if list.iter().any(|n| n.is_sign_negative()) {
        return None;
    }

    // `If the sum of the values is zero, then the stroke is rendered
    // as if a value of none were specified.`
    let sum: f32 = list.iter().sum();
    if sum.approx_eq_ulps(&0.0, 4) {
        return None;
    }

    // `If an odd number of values is provided, then the list of values
    // is repeated to yield an even number of values.`
    if list.len() % 2 != 0 {
        let mut tmp_list = list.clone();
        tmp_list.extend_from_slice(&list);
        return Some(tmp_list);
    }

    Some(list)
}
