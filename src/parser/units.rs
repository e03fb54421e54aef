// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Length and unit resolution.

use std::str::FromStr;

use svgtypes::{Length, LengthUnit as Unit};

use super::context::State;
use super::svgtree::{AId, SvgNode, Units};
use crate::Size;

/// A dimension of the reference box used to resolve percentages.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    /// Width of the reference box.
    Horizontal,
    /// Height of the reference box.
    Vertical,
    /// Normalized diagonal of the reference box, `sqrt((w² + h²) / 2)`.
    Diagonal,
}

/// Values needed to convert absolute and font-relative units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Settings {
    /// Pixels per inch.
    pub dpi: f32,
    /// Font size used by `em` and `ex`.
    pub font_size: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dpi: 96.0,
            font_size: 12.0,
        }
    }
}

/// Converts a length into document units.
///
/// Percentages are resolved against the `reference` dimension selected by `axis`.
pub fn convert_length(length: Length, axis: Axis, reference: Size, settings: Settings) -> f32 {
    let n = length.number as f32;
    let dpi = settings.dpi;
    match length.unit {
        Unit::None | Unit::Px => n,
        Unit::Em => n * settings.font_size,
        Unit::Ex => n * settings.font_size / 2.0,
        Unit::In => n * dpi,
        Unit::Cm => n * dpi / 2.54,
        Unit::Mm => n * dpi / 25.4,
        Unit::Pt => n * dpi / 72.0,
        Unit::Pc => n * dpi / 6.0,
        Unit::Percent => {
            let base = match axis {
                Axis::Horizontal => reference.width(),
                Axis::Vertical => reference.height(),
                Axis::Diagonal => {
                    let len = reference.width().powi(2) + reference.height().powi(2);
                    (len / 2.0).sqrt()
                }
            };

            base * n / 100.0
        }
    }
}

/// Parses a length.
///
/// A number followed by an unknown alphabetic suffix is accepted
/// as a plain number. Any other malformed text is an error.
pub fn parse_length(text: &str) -> Option<Length> {
    if let Ok(length) = Length::from_str(text) {
        return Some(length);
    }

    let text = text.trim();
    let number = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &text[number.len()..];
    if suffix.is_empty() {
        return None;
    }

    let n = svgtypes::Number::from_str(number).ok()?;
    log::warn!("Unknown unit '{}' in '{}'. Treated as user units.", suffix, text);
    Some(Length::new_number(n.0))
}

/// Parses and converts a length into document units.
pub fn resolve_length(text: &str, axis: Axis, reference: Size, settings: Settings) -> Option<f32> {
    parse_length(text).map(|length| convert_length(length, axis, reference, settings))
}

/// Returns the percentage axis of a geometry attribute.
pub(crate) fn axis_for(aid: AId) -> Axis {
    match aid {
        AId::Cx
        | AId::Dx
        | AId::Fx
        | AId::RefX
        | AId::Rx
        | AId::Width
        | AId::X
        | AId::X1
        | AId::X2 => Axis::Horizontal,
        AId::Cy
        | AId::Dy
        | AId::Fy
        | AId::Height
        | AId::RefY
        | AId::Ry
        | AId::Y
        | AId::Y1
        | AId::Y2 => Axis::Vertical,
        _ => Axis::Diagonal,
    }
}

/// Converts a length using the current viewport, or as a bbox fraction.
pub(crate) fn convert_units(length: Length, aid: AId, units: Units, state: &State) -> f32 {
    if units == Units::ObjectBoundingBox && length.unit == Unit::Percent {
        return length.number as f32 / 100.0;
    }

    convert_length(length, axis_for(aid), state.view_box.size(), state.settings())
}

/// Resolves an attribute length in user space.
///
/// Missing or malformed values fall back to `def`.
pub(crate) fn convert_user_length(node: SvgNode, aid: AId, state: &State, def: Length) -> f32 {
    convert_attr(node, aid, Units::UserSpaceOnUse, state, def)
}

pub(crate) fn convert_attr(
    node: SvgNode,
    aid: AId,
    units: Units,
    state: &State,
    def: Length,
) -> f32 {
    let length = node.attribute(aid).unwrap_or(def);
    convert_units(length, aid, units, state)
}

/// Resolves a length style property.
pub(crate) fn convert_style_length(aid: AId, state: &State, def: Length) -> f32 {
    let length = state.style.get(aid).unwrap_or(def);
    convert_units(length, aid, Units::UserSpaceOnUse, state)
}

/// Resolves a list of lengths, like `stroke-dasharray`.
pub(crate) fn convert_list(text: &str, aid: AId, state: &State) -> Option<Vec<f32>> {
    let mut list = Vec::new();
    for length in svgtypes::LengthListParser::from(text) {
        let length = length.ok()?;
        list.push(convert_units(length, aid, Units::UserSpaceOnUse, state));
    }

    Some(list)
}

/// Computes `font-size` relative to the parent one.
pub(crate) fn resolve_font_size(value: &str, parent_font_size: f32, dpi: f32) -> f32 {
    let length = match Length::from_str(value) {
        Ok(v) => v,
        Err(_) => return convert_named_font_size(value, parent_font_size),
    };

    let n = length.number as f32;
    match length.unit {
        Unit::None | Unit::Px => n,
        Unit::Em => n * parent_font_size,
        Unit::Ex => n * parent_font_size / 2.0,
        Unit::In => n * dpi,
        Unit::Cm => n * dpi / 2.54,
        Unit::Mm => n * dpi / 25.4,
        Unit::Pt => n * dpi / 72.0,
        Unit::Pc => n * dpi / 6.0,
        // Relative to the parent `font-size`.
        Unit::Percent => n * parent_font_size * 0.01,
    }
}

fn convert_named_font_size(name: &str, parent_font_size: f32) -> f32 {
    let factor = match name {
        "xx-small" => -3,
        "x-small" => -2,
        "small" => -1,
        "medium" => 0,
        "large" => 1,
        "x-large" => 2,
        "xx-large" => 3,
        "smaller" => -1,
        "larger" => 1,
        _ => {
            log::warn!("Invalid 'font-size' value: '{}'.", name);
            0
        }
    };

    // 'On a computer screen a scaling factor of 1.2 is suggested between adjacent indexes.'
    parent_font_size * 1.2f32.powi(factor)
}
