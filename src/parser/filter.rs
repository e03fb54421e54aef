// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A collection of SVG filters.

use std::collections::HashSet;
use std::sync::Arc;

use strict_num::PositiveF32;
use svgtypes::{Length, LengthUnit as Unit};

use super::context::State;
use super::converter::{Cache, SvgColorExt};
use super::defs::{self, Definitions};
use super::style::Styles;
use super::svgtree::{AId, EId, FromValue, SvgNode, Units};
use super::{f32_bound, units, OptionLog};
use crate::filter::*;
use crate::{ApproxZeroUlps, BBox, Color, NonZeroRect, Opacity, Size};

impl<'a> FromValue<'a> for ColorInterpolation {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "sRGB" => Some(ColorInterpolation::SRGB),
            "linearRGB" => Some(ColorInterpolation::LinearRGB),
            _ => None,
        }
    }
}

/// Converts the `filter` property of an element.
///
/// Every entry of a filter list becomes a stage of a single filter.
/// `Err` means that the property references filters and none of them is valid.
pub(crate) fn convert<'a>(
    value: &str,
    state: &State<'a>,
    object_bbox: Option<NonZeroRect>,
    cache: &mut Cache,
) -> Result<Option<Arc<Filter>>, ()> {
    if value.trim() == "none" {
        return Ok(None);
    }

    let mut has_invalid_urls = false;
    let mut stages = Vec::new();

    for func in svgtypes::FilterValueListParser::from(value) {
        let func = match func {
            Ok(v) => v,
            Err(e) => {
                // Skip the whole list on error.
                log::warn!("Failed to parse a filter value cause {}. Skipping.", e);
                return Ok(None);
            }
        };

        let kind = match func {
            svgtypes::FilterValue::Blur(std_dev) => convert_blur_function(std_dev, state),
            svgtypes::FilterValue::DropShadow {
                color,
                dx,
                dy,
                std_dev,
            } => convert_drop_shadow_function(color, dx, dy, std_dev, state),
            svgtypes::FilterValue::Brightness(amount) => convert_brightness_function(amount),
            svgtypes::FilterValue::Contrast(amount) => convert_contrast_function(amount),
            svgtypes::FilterValue::Grayscale(amount) => convert_grayscale_function(amount),
            svgtypes::FilterValue::HueRotate(angle) => convert_hue_rotate_function(angle),
            svgtypes::FilterValue::Invert(amount) => convert_invert_function(amount),
            svgtypes::FilterValue::Opacity(amount) => convert_opacity_function(amount),
            svgtypes::FilterValue::Sepia(amount) => convert_sepia_function(amount),
            svgtypes::FilterValue::Saturate(amount) => convert_saturate_function(amount),
            svgtypes::FilterValue::Url(url) => {
                match convert_url(url, state, object_bbox, cache) {
                    Ok(Some(filter)) => stages.push(filter),
                    Ok(None) => {}
                    Err(()) => has_invalid_urls = true,
                }
                continue;
            }
        };

        match create_function_filter(kind, object_bbox) {
            Some(filter) => stages.push(Arc::new(filter)),
            None => log::warn!("Filter functions on zero-sized shapes are not allowed."),
        }
    }

    // An invalid url is an error only when nothing else is left.
    if stages.is_empty() && has_invalid_urls {
        return Err(());
    }

    Ok(chain_stages(stages))
}

// Filter functions have no filter region, so a fairly large one is used.
fn create_function_filter(kind: Kind, object_bbox: Option<NonZeroRect>) -> Option<Filter> {
    let rect = match kind {
        Kind::DropShadow(_) | Kind::GaussianBlur(_) => NonZeroRect::from_xywh(-0.5, -0.5, 2.0, 2.0),
        _ => NonZeroRect::from_xywh(-0.1, -0.1, 1.2, 1.2),
    }?;

    let rect = rect.bbox_transform(object_bbox?);

    Some(Filter {
        id: String::new(),
        rect,
        primitives: vec![Primitive {
            rect,
            // Unlike `filter` elements, filter functions use sRGB colors by default.
            color_interpolation: ColorInterpolation::SRGB,
            result: "result".to_string(),
            kind,
        }],
    })
}

/// Joins filters into one, feeding the result of each stage into the next one.
fn chain_stages(stages: Vec<Arc<Filter>>) -> Option<Arc<Filter>> {
    if stages.len() < 2 {
        return stages.into_iter().next();
    }

    let mut bbox = BBox::default();
    let mut primitives: Vec<Primitive> = Vec::new();
    for (i, stage) in stages.iter().enumerate() {
        bbox = bbox.expand(stage.rect);

        let prev = primitives.last().map(|p| p.result.clone());
        let prefix = if i == 0 {
            String::new()
        } else {
            format!("stage{}-", i)
        };

        // A later stage sees the alpha of the previous stage output.
        let mut prev_alpha = None;
        if let Some(ref name) = prev {
            let reads_alpha = stage
                .primitives
                .iter()
                .any(|fe| fe.kind.has_input(&Input::SourceAlpha));
            if reads_alpha {
                let alpha = alpha_of(name, format!("{}source-alpha", prefix), stage.rect);
                prev_alpha = Some(alpha.result.clone());
                primitives.push(alpha);
            }
        }

        for fe in &stage.primitives {
            let mut fe = fe.clone();
            fe.result = format!("{}{}", prefix, fe.result);
            for input in fe.kind.inputs_mut() {
                let renamed = match &*input {
                    Input::SourceGraphic => match prev {
                        Some(ref name) => Input::Reference(name.clone()),
                        None => Input::SourceGraphic,
                    },
                    Input::SourceAlpha => match prev_alpha {
                        Some(ref name) => Input::Reference(name.clone()),
                        None => Input::SourceAlpha,
                    },
                    Input::Reference(name) => Input::Reference(format!("{}{}", prefix, name)),
                };
                *input = renamed;
            }

            primitives.push(fe);
        }
    }

    let id = stages
        .iter()
        .map(|f| f.id.as_str())
        .find(|id| !id.is_empty())
        .unwrap_or_default()
        .to_string();

    Some(Arc::new(Filter {
        id,
        rect: bbox.to_non_zero_rect()?,
        primitives,
    }))
}

/// Keeps only the alpha channel of a named result.
fn alpha_of(input: &str, result: String, rect: NonZeroRect) -> Primitive {
    #[rustfmt::skip]
    let matrix = vec![
        0.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ];

    Primitive {
        rect,
        color_interpolation: ColorInterpolation::SRGB,
        result,
        kind: Kind::ColorMatrix(ColorMatrix {
            input: Input::Reference(input.to_string()),
            kind: ColorMatrixKind::Matrix(matrix),
        }),
    }
}

fn convert_url<'a>(
    url: &str,
    state: &State<'a>,
    object_bbox: Option<NonZeroRect>,
    cache: &mut Cache,
) -> Result<Option<Arc<Filter>>, ()> {
    let chain = match Definitions::href_chain(&state.defs.filters, url) {
        Some(v) => v,
        None => {
            if let Some(n) = state.defs.elements.find(url) {
                log::warn!("'{}' cannot be used as a filter.", n.local_name());
            } else {
                log::warn!("Filter '{}' is not defined.", url);
            }

            return Err(());
        }
    };

    let units = convert_units(&chain, AId::FilterUnits, Units::ObjectBoundingBox);
    let primitive_units = convert_units(&chain, AId::PrimitiveUnits, Units::UserSpaceOnUse);

    // Only `userSpaceOnUse` filters can be shared,
    // because `objectBoundingBox` one will be converted into user one
    // and will become node-specific.
    let cacheable = units == Units::UserSpaceOnUse && primitive_units == Units::UserSpaceOnUse;
    if cacheable {
        if let Some(filter) = cache.filters.get(url) {
            return Ok(Some(filter.clone()));
        }
    }

    let rect = NonZeroRect::from_xywh(
        resolve_number(&chain, AId::X, units, state, Length::new(-10.0, Unit::Percent)),
        resolve_number(&chain, AId::Y, units, state, Length::new(-10.0, Unit::Percent)),
        resolve_number(&chain, AId::Width, units, state, Length::new(120.0, Unit::Percent)),
        resolve_number(&chain, AId::Height, units, state, Length::new(120.0, Unit::Percent)),
    );

    let mut rect = rect
        .log_none(|| log::warn!("Filter '{}' has an invalid region. Skipped.", url))
        .ok_or(())?;

    if units == Units::ObjectBoundingBox {
        if let Some(object_bbox) = object_bbox {
            rect = rect.bbox_transform(object_bbox);
        } else {
            log::warn!("Filters on zero-sized shapes are not allowed.");
            return Err(());
        }
    }

    let children = defs::merge_primitives(&chain);
    let primitives = collect_children(&children, primitive_units, state, object_bbox, rect);
    if primitives.is_empty() {
        log::warn!("Filter '{}' has no valid primitives. Skipped.", url);
        return Err(());
    }

    let filter = Arc::new(Filter {
        id: url.to_string(),
        rect,
        primitives,
    });

    if cacheable {
        cache.filters.insert(url.to_string(), filter.clone());
    }

    Ok(Some(filter))
}

fn lookup<'a>(chain: &[SvgNode<'a, 'a>], aid: AId) -> Option<SvgNode<'a, 'a>> {
    defs::resolve_attr(chain, aid, |tag| tag == EId::Filter).or_else(|| chain.first().copied())
}

fn convert_units(chain: &[SvgNode], aid: AId, def: Units) -> Units {
    lookup(chain, aid)
        .and_then(|n| n.attribute(aid))
        .unwrap_or(def)
}

fn resolve_number(chain: &[SvgNode], aid: AId, units: Units, state: &State, def: Length) -> f32 {
    match lookup(chain, aid) {
        Some(node) => units::convert_attr(node, aid, units, state, def),
        None => units::convert_units(def, aid, units, state),
    }
}

struct FilterResults {
    names: HashSet<String>,
    idx: usize,
}

fn collect_children(
    children: &[SvgNode],
    units: Units,
    state: &State,
    object_bbox: Option<NonZeroRect>,
    filter_region: NonZeroRect,
) -> Vec<Primitive> {
    let mut primitives = Vec::new();

    let mut results = FilterResults {
        names: HashSet::new(),
        idx: 1,
    };

    let scale = if units == Units::ObjectBoundingBox {
        if let Some(object_bbox) = object_bbox {
            object_bbox.size()
        } else {
            log::warn!("Filter primitives on zero-sized shapes are not allowed.");
            return Vec::new();
        }
    } else {
        match Size::from_wh(1.0, 1.0) {
            Some(v) => v,
            None => return Vec::new(),
        }
    };

    for child in children.iter().copied() {
        let tag_name = match child.tag_name() {
            Some(v) => v,
            None => continue,
        };

        let kind = match tag_name {
            EId::FeDropShadow => convert_drop_shadow(child, scale, &primitives),
            EId::FeGaussianBlur => convert_gaussian_blur(child, scale, &primitives),
            EId::FeOffset => convert_offset(child, scale, &primitives),
            EId::FeBlend => convert_blend(child, &primitives),
            EId::FeFlood => convert_flood(child),
            EId::FeComposite => convert_composite(child, &primitives),
            EId::FeMerge => convert_merge(child, &primitives),
            EId::FeTile => convert_tile(child, &primitives),
            EId::FeComponentTransfer => convert_component_transfer(child, &primitives),
            EId::FeColorMatrix => convert_color_matrix(child, &primitives),
            EId::FeMorphology => convert_morphology(child, scale, &primitives),
            _ => {
                log::warn!("Filter primitive '{}' is not supported. Skipped.", child.local_name());
                continue;
            }
        };

        if let Some(fe) = convert_primitive(
            child,
            kind,
            units,
            state,
            object_bbox,
            filter_region,
            &mut results,
        ) {
            primitives.push(fe);
        }
    }

    primitives
}

fn convert_primitive(
    fe: SvgNode,
    kind: Kind,
    units: Units,
    state: &State,
    bbox: Option<NonZeroRect>,
    filter_region: NonZeroRect,
    results: &mut FilterResults,
) -> Option<Primitive> {
    let rect = resolve_primitive_region(fe, &kind, units, state, bbox, filter_region)?;

    let color_interpolation = Styles::computed(fe)
        .get(AId::ColorInterpolationFilters)
        .unwrap_or_default();

    Some(Primitive {
        rect,
        color_interpolation,
        result: gen_result(fe, results),
        kind,
    })
}

fn resolve_primitive_region(
    fe: SvgNode,
    kind: &Kind,
    units: Units,
    state: &State,
    bbox: Option<NonZeroRect>,
    filter_region: NonZeroRect,
) -> Option<NonZeroRect> {
    let length = |aid| {
        fe.attribute::<Length>(aid)
            .map(|l| units::convert_units(l, aid, units, state))
    };

    let x = length(AId::X);
    let y = length(AId::Y);
    let width = length(AId::Width);
    let height = length(AId::Height);

    if units == Units::ObjectBoundingBox {
        let subregion = NonZeroRect::from_xywh(
            x.unwrap_or(0.0),
            y.unwrap_or(0.0),
            width.unwrap_or(1.0),
            height.unwrap_or(1.0),
        )?;

        // `feFlood` is sized by the object itself.
        if let Kind::Flood(..) = kind {
            return Some(subregion.bbox_transform(bbox?));
        }

        Some(filter_region.bbox_transform(subregion))
    } else {
        NonZeroRect::from_xywh(
            x.unwrap_or(filter_region.x()),
            y.unwrap_or(filter_region.y()),
            width.unwrap_or(filter_region.width()),
            height.unwrap_or(filter_region.height()),
        )
    }
}

fn resolve_input(node: SvgNode, aid: AId, primitives: &[Primitive]) -> Input {
    let fallback = || match primitives.last() {
        // The input of a primitive without `in` is the result of the previous one.
        Some(prev) => Input::Reference(prev.result.clone()),
        None => Input::SourceGraphic,
    };

    match node.attribute::<&str>(aid) {
        Some(s) => {
            let input = parse_in(s);

            // An unknown `result` falls back to the previous result or `SourceGraphic`.
            if let Input::Reference(ref name) = input {
                if !primitives.iter().any(|p| p.result == *name) {
                    return fallback();
                }
            }

            input
        }
        None => fallback(),
    }
}

fn parse_in(s: &str) -> Input {
    match s {
        "SourceGraphic" => Input::SourceGraphic,
        "SourceAlpha" => Input::SourceAlpha,
        "BackgroundImage" | "BackgroundAlpha" | "FillPaint" | "StrokePaint" => {
            log::warn!("{} filter input isn't supported.", s);
            Input::SourceGraphic
        }
        _ => Input::Reference(s.to_string()),
    }
}

fn gen_result(node: SvgNode, results: &mut FilterResults) -> String {
    match node.attribute::<&str>(AId::Result) {
        Some(s) => {
            results.names.insert(s.to_string());
            results.idx += 1;

            s.to_string()
        }
        None => loop {
            let name = format!("result{}", results.idx);
            results.idx += 1;

            if !results.names.contains(&name) {
                return name;
            }
        },
    }
}

fn flood_color(fe: SvgNode) -> (Color, Opacity) {
    let style = Styles::computed(fe);

    let color = match style.raw(AId::FloodColor).map(str::trim) {
        Some("currentColor") => style.get(AId::Color),
        Some(_) => style.get(AId::FloodColor),
        None => None,
    };

    let (color, opacity) = color.unwrap_or_else(svgtypes::Color::black).split_alpha();
    let flood_opacity = style
        .get::<Opacity>(AId::FloodOpacity)
        .unwrap_or(Opacity::ONE);

    (color, opacity * flood_opacity)
}

fn convert_blend(fe: SvgNode, primitives: &[Primitive]) -> Kind {
    Kind::Blend(Blend {
        input1: resolve_input(fe, AId::In, primitives),
        input2: resolve_input(fe, AId::In2, primitives),
        mode: fe.attribute(AId::Mode).unwrap_or_default(),
    })
}

fn convert_color_matrix(fe: SvgNode, primitives: &[Primitive]) -> Kind {
    Kind::ColorMatrix(ColorMatrix {
        input: resolve_input(fe, AId::In, primitives),
        kind: convert_color_matrix_kind(fe).unwrap_or_default(),
    })
}

fn convert_color_matrix_kind(fe: SvgNode) -> Option<ColorMatrixKind> {
    let values = fe.attribute::<Vec<f32>>(AId::Values);
    match fe.attribute(AId::Type) {
        Some("saturate") => {
            let n = values?.first().map(|n| f32_bound(0.0, *n, 1.0)).unwrap_or(1.0);
            Some(ColorMatrixKind::Saturate(PositiveF32::new(n)?))
        }
        Some("hueRotate") => {
            let n = values?.first().copied().unwrap_or(0.0);
            Some(ColorMatrixKind::HueRotate(n))
        }
        Some("luminanceToAlpha") => Some(ColorMatrixKind::LuminanceToAlpha),
        // Fallback to `matrix`.
        _ => values
            .filter(|list| list.len() == 20)
            .map(ColorMatrixKind::Matrix),
    }
}

fn convert_component_transfer(fe: SvgNode, primitives: &[Primitive]) -> Kind {
    let mut kind = ComponentTransfer {
        input: resolve_input(fe, AId::In, primitives),
        func_r: TransferFunction::Identity,
        func_g: TransferFunction::Identity,
        func_b: TransferFunction::Identity,
        func_a: TransferFunction::Identity,
    };

    for child in fe.element_children() {
        if let Some(func) = convert_transfer_function(child) {
            match child.tag_name() {
                Some(EId::FeFuncR) => kind.func_r = func,
                Some(EId::FeFuncG) => kind.func_g = func,
                Some(EId::FeFuncB) => kind.func_b = func,
                Some(EId::FeFuncA) => kind.func_a = func,
                _ => {}
            }
        }
    }

    Kind::ComponentTransfer(kind)
}

fn convert_transfer_function(node: SvgNode) -> Option<TransferFunction> {
    match node.attribute(AId::Type)? {
        "identity" => Some(TransferFunction::Identity),
        "table" => Some(TransferFunction::Table(
            node.attribute(AId::TableValues).unwrap_or_default(),
        )),
        "discrete" => Some(TransferFunction::Discrete(
            node.attribute(AId::TableValues).unwrap_or_default(),
        )),
        "linear" => Some(TransferFunction::Linear {
            slope: node.attribute(AId::Slope).unwrap_or(1.0),
            intercept: node.attribute(AId::Intercept).unwrap_or(0.0),
        }),
        "gamma" => Some(TransferFunction::Gamma {
            amplitude: node.attribute(AId::Amplitude).unwrap_or(1.0),
            exponent: node.attribute(AId::Exponent).unwrap_or(1.0),
            offset: node.attribute(AId::Offset).unwrap_or(0.0),
        }),
        _ => None,
    }
}

fn convert_composite(fe: SvgNode, primitives: &[Primitive]) -> Kind {
    let operator = match fe.attribute(AId::Operator).unwrap_or("over") {
        "in" => CompositeOperator::In,
        "out" => CompositeOperator::Out,
        "atop" => CompositeOperator::Atop,
        "xor" => CompositeOperator::Xor,
        "arithmetic" => CompositeOperator::Arithmetic {
            k1: fe.attribute(AId::K1).unwrap_or(0.0),
            k2: fe.attribute(AId::K2).unwrap_or(0.0),
            k3: fe.attribute(AId::K3).unwrap_or(0.0),
            k4: fe.attribute(AId::K4).unwrap_or(0.0),
        },
        _ => CompositeOperator::Over,
    };

    Kind::Composite(Composite {
        input1: resolve_input(fe, AId::In, primitives),
        input2: resolve_input(fe, AId::In2, primitives),
        operator,
    })
}

fn convert_drop_shadow(fe: SvgNode, scale: Size, primitives: &[Primitive]) -> Kind {
    let (std_dev_x, std_dev_y) = convert_std_dev_attr(fe, scale, "2 2");
    let (color, opacity) = flood_color(fe);

    Kind::DropShadow(DropShadow {
        input: resolve_input(fe, AId::In, primitives),
        dx: fe.attribute(AId::Dx).unwrap_or(2.0) * scale.width(),
        dy: fe.attribute(AId::Dy).unwrap_or(2.0) * scale.height(),
        std_dev_x,
        std_dev_y,
        color,
        opacity,
    })
}

fn convert_flood(fe: SvgNode) -> Kind {
    let (color, opacity) = flood_color(fe);
    Kind::Flood(Flood { color, opacity })
}

fn convert_gaussian_blur(fe: SvgNode, scale: Size, primitives: &[Primitive]) -> Kind {
    let (std_dev_x, std_dev_y) = convert_std_dev_attr(fe, scale, "0 0");
    Kind::GaussianBlur(GaussianBlur {
        input: resolve_input(fe, AId::In, primitives),
        std_dev_x,
        std_dev_y,
    })
}

fn convert_std_dev_attr(fe: SvgNode, scale: Size, default: &str) -> (PositiveF32, PositiveF32) {
    let text = fe.attribute(AId::StdDeviation).unwrap_or(default);
    let mut parser = svgtypes::NumberListParser::from(text);

    let n1 = parser.next().and_then(|n| n.ok());
    let n2 = parser.next().and_then(|n| n.ok());
    // No more than two values are allowed.
    let n3 = parser.next().and_then(|n| n.ok());

    let (std_dev_x, std_dev_y) = match (n1, n2, n3) {
        (Some(n1), Some(n2), None) => (n1, n2),
        (Some(n1), None, None) => (n1, n1),
        _ => (0.0, 0.0),
    };

    let std_dev_x = (std_dev_x as f32) * scale.width();
    let std_dev_y = (std_dev_y as f32) * scale.height();

    (
        PositiveF32::new(std_dev_x).unwrap_or(PositiveF32::ZERO),
        PositiveF32::new(std_dev_y).unwrap_or(PositiveF32::ZERO),
    )
}

fn convert_merge(fe: SvgNode, primitives: &[Primitive]) -> Kind {
    let inputs = fe
        .element_children()
        .filter(|n| n.tag_name() == Some(EId::FeMergeNode))
        .map(|n| resolve_input(n, AId::In, primitives))
        .collect();

    Kind::Merge(Merge { inputs })
}

fn convert_morphology(fe: SvgNode, scale: Size, primitives: &[Primitive]) -> Kind {
    let operator = match fe.attribute(AId::Operator).unwrap_or("erode") {
        "dilate" => MorphologyOperator::Dilate,
        _ => MorphologyOperator::Erode,
    };

    let mut rx = 1.0;
    let mut ry = 1.0;
    if let Some(list) = fe.attribute::<Vec<f32>>(AId::Radius) {
        let (x, y) = match list.as_slice() {
            [x, y] => (*x, *y),
            [x] => (*x, *x),
            _ => (0.0, 0.0),
        };

        // A zero radius is reset to 1, like browsers do.
        let x = if x.approx_zero_ulps(4) { 1.0 } else { x };
        let y = if y.approx_zero_ulps(4) { 1.0 } else { y };

        // Both values must be positive.
        if x.is_sign_positive() && y.is_sign_positive() {
            rx = x;
            ry = y;
        }
    }

    Kind::Morphology(Morphology {
        input: resolve_input(fe, AId::In, primitives),
        operator,
        radius_x: PositiveF32::new(rx * scale.width()).unwrap_or(PositiveF32::ZERO),
        radius_y: PositiveF32::new(ry * scale.height()).unwrap_or(PositiveF32::ZERO),
    })
}

fn convert_offset(fe: SvgNode, scale: Size, primitives: &[Primitive]) -> Kind {
    Kind::Offset(Offset {
        input: resolve_input(fe, AId::In, primitives),
        dx: fe.attribute(AId::Dx).unwrap_or(0.0) * scale.width(),
        dy: fe.attribute(AId::Dy).unwrap_or(0.0) * scale.height(),
    })
}

fn convert_tile(fe: SvgNode, primitives: &[Primitive]) -> Kind {
    Kind::Tile(Tile {
        input: resolve_input(fe, AId::In, primitives),
    })
}

fn convert_grayscale_function(amount: f64) -> Kind {
    let a = 1.0 - amount.min(1.0) as f32;
    Kind::ColorMatrix(ColorMatrix {
        input: Input::SourceGraphic,
        kind: ColorMatrixKind::Matrix(vec![
            0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a, 0.0, 0.0,
            0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a, 0.0, 0.0,
            0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    })
}

fn convert_sepia_function(amount: f64) -> Kind {
    let a = 1.0 - amount.min(1.0) as f32;
    Kind::ColorMatrix(ColorMatrix {
        input: Input::SourceGraphic,
        kind: ColorMatrixKind::Matrix(vec![
            0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a, 0.0, 0.0,
            0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a, 0.0, 0.0,
            0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    })
}

fn convert_saturate_function(amount: f64) -> Kind {
    Kind::ColorMatrix(ColorMatrix {
        input: Input::SourceGraphic,
        kind: ColorMatrixKind::Saturate(
            PositiveF32::new(amount as f32).unwrap_or(PositiveF32::ZERO),
        ),
    })
}

fn convert_hue_rotate_function(angle: svgtypes::Angle) -> Kind {
    Kind::ColorMatrix(ColorMatrix {
        input: Input::SourceGraphic,
        kind: ColorMatrixKind::HueRotate(angle.to_degrees() as f32),
    })
}

fn convert_invert_function(amount: f64) -> Kind {
    let amount = amount.min(1.0) as f32;
    let table = || TransferFunction::Table(vec![amount, 1.0 - amount]);
    Kind::ComponentTransfer(ComponentTransfer {
        input: Input::SourceGraphic,
        func_r: table(),
        func_g: table(),
        func_b: table(),
        func_a: TransferFunction::Identity,
    })
}

fn convert_opacity_function(amount: f64) -> Kind {
    let amount = amount.min(1.0) as f32;
    Kind::ComponentTransfer(ComponentTransfer {
        input: Input::SourceGraphic,
        func_r: TransferFunction::Identity,
        func_g: TransferFunction::Identity,
        func_b: TransferFunction::Identity,
        func_a: TransferFunction::Table(vec![0.0, amount]),
    })
}

fn convert_brightness_function(amount: f64) -> Kind {
    linear_transfer(amount as f32, 0.0)
}

fn convert_contrast_function(amount: f64) -> Kind {
    let amount = amount as f32;
    linear_transfer(amount, -(0.5 * amount) + 0.5)
}

fn linear_transfer(slope: f32, intercept: f32) -> Kind {
    let func = || TransferFunction::Linear { slope, intercept };
    Kind::ComponentTransfer(ComponentTransfer {
        input: Input::SourceGraphic,
        func_r: func(),
        func_g: func(),
        func_b: func(),
        func_a: TransferFunction::Identity,
    })
}

fn convert_blur_function(std_dev: Length, state: &State) -> Kind {
    let std_dev = units::convert_units(std_dev, AId::Dx, Units::UserSpaceOnUse, state);
    let std_dev = PositiveF32::new(std_dev).unwrap_or(PositiveF32::ZERO);
    Kind::GaussianBlur(GaussianBlur {
        input: Input::SourceGraphic,
        std_dev_x: std_dev,
        std_dev_y: std_dev,
    })
}

fn convert_drop_shadow_function(
    color: Option<svgtypes::Color>,
    dx: Length,
    dy: Length,
    std_dev: Length,
    state: &State,
) -> Kind {
    let std_dev = units::convert_units(std_dev, AId::Dx, Units::UserSpaceOnUse, state);
    let std_dev = PositiveF32::new(std_dev).unwrap_or(PositiveF32::ZERO);

    let (color, opacity) = color
        .unwrap_or_else(|| state.style.get(AId::Color).unwrap_or_else(svgtypes::Color::black))
        .split_alpha();

    Kind::DropShadow(DropShadow {
        input: Input::SourceGraphic,
        dx: units::convert_units(dx, AId::Dx, Units::UserSpaceOnUse, state),
        dy: units::convert_units(dy, AId::Dy, Units::UserSpaceOnUse, state),
        std_dev_x: std_dev,
        std_dev_y: std_dev,
        color,
        opacity,
    })
}

#[cfg(test)]
mod tests {
    use crate::filter::{ColorInterpolation, Filter, Input, Kind};
    use crate::{Node, Tree};

    fn filter_of(svg: &str, id: &str) -> std::sync::Arc<Filter> {
        let tree = Tree::from_str(svg, &crate::Options::default()).unwrap();
        let node = tree.node_by_id(id).unwrap();
        node.effects().filter.clone().unwrap()
    }

    #[test]
    fn implicit_inputs_chain() {
        let filter = filter_of(
            r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <filter id="f" filterUnits="userSpaceOnUse" x="0" y="0" width="100" height="100">
                    <feGaussianBlur stdDeviation="2"/>
                    <feOffset dx="3" dy="4"/>
                    <feBlend in2="SourceGraphic" in="missing"/>
                </filter>
                <rect id="r" width="10" height="10" filter="url(#f)"/>
            </svg>
            "#,
            "r",
        );

        assert_eq!(filter.id, "f");
        assert_eq!(filter.primitives.len(), 3);
        assert_eq!(filter.primitives[0].result, "result1");
        assert_eq!(filter.primitives[1].result, "result2");
        assert_eq!(
            filter.primitives[0].color_interpolation,
            ColorInterpolation::LinearRGB
        );

        match filter.primitives[1].kind {
            Kind::Offset(ref fe) => {
                assert_eq!(fe.input, Input::Reference("result1".to_string()));
                assert_eq!(fe.dx, 3.0);
            }
            _ => panic!("expected an offset"),
        }

        match filter.primitives[2].kind {
            Kind::Blend(ref fe) => {
                assert_eq!(fe.input1, Input::Reference("result2".to_string()));
                assert_eq!(fe.input2, Input::SourceGraphic);
            }
            _ => panic!("expected a blend"),
        }
    }

    #[test]
    fn unsupported_primitive_is_skipped() {
        let filter = filter_of(
            r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <filter id="f">
                    <feTurbulence baseFrequency="0.1"/>
                    <feFlood flood-color="red" flood-opacity="0.5"/>
                </filter>
                <rect id="r" width="10" height="10" filter="url(#f)"/>
            </svg>
            "#,
            "r",
        );

        assert_eq!(filter.primitives.len(), 1);
        match filter.primitives[0].kind {
            Kind::Flood(ref fe) => {
                assert_eq!(fe.color, crate::Color::new_rgb(255, 0, 0));
                assert_eq!(fe.opacity.get(), 0.5);
            }
            _ => panic!("expected a flood"),
        }
    }

    #[test]
    fn object_bbox_region() {
        let filter = filter_of(
            r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <filter id="f"><feOffset/></filter>
                <rect id="r" x="10" y="20" width="50" height="100" filter="url(#f)"/>
            </svg>
            "#,
            "r",
        );

        let near = |a: f32, b: f32| (a - b).abs() < 1e-4;
        assert!(near(filter.rect.x(), 5.0));
        assert!(near(filter.rect.y(), 10.0));
        assert!(near(filter.rect.width(), 60.0));
        assert!(near(filter.rect.height(), 120.0));
    }

    #[test]
    fn primitives_inherited_by_index() {
        let filter = filter_of(
            r##"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <filter id="base">
                    <feOffset dx="1"/>
                    <feTile/>
                </filter>
                <filter id="f" xlink:href="#base" xmlns:xlink="http://www.w3.org/1999/xlink">
                    <feFlood/>
                </filter>
                <rect id="r" width="10" height="10" filter="url(#f)"/>
            </svg>
            "##,
            "r",
        );

        assert_eq!(filter.primitives.len(), 2);
        assert!(matches!(filter.primitives[0].kind, Kind::Flood(..)));
        assert!(matches!(filter.primitives[1].kind, Kind::Tile(..)));
    }

    #[test]
    fn filter_list_is_chained() {
        let filter = filter_of(
            r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <filter id="f"><feOffset dx="2"/></filter>
                <rect id="r" width="10" height="10" filter="url(#f) blur(2)"/>
            </svg>
            "#,
            "r",
        );

        assert_eq!(filter.id, "f");
        assert_eq!(filter.primitives.len(), 2);
        assert_eq!(filter.primitives[1].result, "stage1-result");
        match filter.primitives[1].kind {
            Kind::GaussianBlur(ref fe) => {
                assert_eq!(fe.input, Input::Reference("result1".to_string()));
                assert_eq!(fe.std_dev_x.get(), 2.0);
            }
            _ => panic!("expected a blur"),
        }
    }

    #[test]
    fn chained_source_alpha() {
        let filter = filter_of(
            r##"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <filter id="a"><feOffset dx="2" result="moved"/></filter>
                <filter id="b"><feGaussianBlur in="SourceAlpha" stdDeviation="1"/></filter>
                <rect id="r" width="10" height="10" filter="url(#a) url(#b)"/>
            </svg>
            "##,
            "r",
        );

        assert_eq!(filter.primitives.len(), 3);
        assert!(filter.primitives[0].kind.has_input(&Input::SourceGraphic));
        match filter.primitives[1].kind {
            Kind::ColorMatrix(ref fe) => {
                assert_eq!(fe.input, Input::Reference("moved".to_string()));
            }
            _ => panic!("expected a color matrix"),
        }
        assert_eq!(filter.primitives[1].result, "stage1-source-alpha");
        let alpha = Input::Reference("stage1-source-alpha".to_string());
        assert!(filter.primitives[2].kind.has_input(&alpha));
        assert!(!filter.primitives[2].kind.has_input(&Input::SourceAlpha));
    }

    #[test]
    fn first_stage_keeps_source_alpha() {
        let filter = filter_of(
            r##"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <filter id="b"><feGaussianBlur in="SourceAlpha" stdDeviation="1"/></filter>
                <rect id="r" width="10" height="10" filter="url(#b) blur(1)"/>
            </svg>
            "##,
            "r",
        );

        assert_eq!(filter.primitives.len(), 2);
        assert!(filter.primitives[0].kind.has_input(&Input::SourceAlpha));
    }

    #[test]
    fn unknown_filter_is_ignored() {
        let tree = Tree::from_str(
            r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <rect id="r" width="10" height="10" filter="url(#missing)"/>
            </svg>
            "#,
            &crate::Options::default(),
        )
        .unwrap();

        match tree.node_by_id("r") {
            Some(Node::Path(ref path)) => assert!(path.effects.filter.is_none()),
            _ => panic!("expected a path"),
        }
    }
}
