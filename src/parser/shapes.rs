// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use svgtypes::Length;
use tiny_skia_path::{Path, PathBuilder};

use super::context::State;
use super::svgtree::{AId, EId, SvgNode, Units};
use super::units;
use crate::{ApproxEqUlps, IsValidLength, Rect, ShapeKind};

/// Builds the geometry of a basic shape or a `path` element.
///
/// Returns `None` and logs a warning when the geometry is invalid.
pub(crate) fn convert(node: SvgNode, state: &State) -> Option<(ShapeKind, Arc<Path>)> {
    let (kind, path) = match node.tag_name()? {
        EId::Rect => convert_rect(node, state)?,
        EId::Circle => convert_circle(node, state)?,
        EId::Ellipse => convert_ellipse(node, state)?,
        EId::Line => convert_line(node, state)?,
        EId::Polyline => (ShapeKind::Polyline, points_to_path(node, "Polyline")?.finish()?),
        EId::Polygon => {
            let mut builder = points_to_path(node, "Polygon")?;
            builder.close();
            (ShapeKind::Polygon, builder.finish()?)
        }
        EId::Path => (ShapeKind::Path, convert_path(node)?),
        _ => return None,
    };

    Some((kind, Arc::new(path)))
}

fn convert_path(node: SvgNode) -> Option<Path> {
    let value: &str = node.attribute(AId::D)?;
    let mut builder = PathBuilder::new();
    for segment in svgtypes::SimplifyingPathParser::from(value) {
        // Everything up to the first error is still rendered.
        let segment = match segment {
            Ok(v) => v,
            Err(_) => break,
        };

        match segment {
            svgtypes::SimplePathSegment::MoveTo { x, y } => {
                builder.move_to(x as f32, y as f32);
            }
            svgtypes::SimplePathSegment::LineTo { x, y } => {
                builder.line_to(x as f32, y as f32);
            }
            svgtypes::SimplePathSegment::Quadratic { x1, y1, x, y } => {
                builder.quad_to(x1 as f32, y1 as f32, x as f32, y as f32);
            }
            svgtypes::SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                builder.cubic_to(
                    x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
                );
            }
            svgtypes::SimplePathSegment::ClosePath => {
                builder.close();
            }
        }
    }

    let path = builder.finish();
    if path.is_none() {
        log::warn!("Path '{}' has an invalid 'd' value. Skipped.", node.element_id());
    }

    path
}

fn convert_rect(node: SvgNode, state: &State) -> Option<(ShapeKind, Path)> {
    // 'width' and 'height' attributes must be positive and non-zero.
    let width = units::convert_user_length(node, AId::Width, state, Length::zero());
    let height = units::convert_user_length(node, AId::Height, state, Length::zero());
    if !width.is_valid_length() {
        log::warn!("Rect '{}' has an invalid 'width' value. Skipped.", node.element_id());
        return None;
    }
    if !height.is_valid_length() {
        log::warn!("Rect '{}' has an invalid 'height' value. Skipped.", node.element_id());
        return None;
    }

    let x = units::convert_user_length(node, AId::X, state, Length::zero());
    let y = units::convert_user_length(node, AId::Y, state, Length::zero());

    let (rx, ry) = resolve_rx_ry(node, state);
    // Clamped only after resolving.
    let rx = rx.min(width / 2.0);
    let ry = ry.min(height / 2.0);

    let path = if rx.approx_eq_ulps(&0.0, 4) || ry.approx_eq_ulps(&0.0, 4) {
        PathBuilder::from_rect(Rect::from_xywh(x, y, width, height)?)
    } else {
        let mut builder = PathBuilder::new();
        builder.move_to(x + rx, y);

        builder.line_to(x + width - rx, y);
        builder.arc_to(rx, ry, 0.0, false, true, x + width, y + ry);

        builder.line_to(x + width, y + height - ry);
        builder.arc_to(rx, ry, 0.0, false, true, x + width - rx, y + height);

        builder.line_to(x + rx, y + height);
        builder.arc_to(rx, ry, 0.0, false, true, x, y + height - ry);

        builder.line_to(x, y + ry);
        builder.arc_to(rx, ry, 0.0, false, true, x + rx, y);

        builder.close();

        builder.finish()?
    };

    let kind = ShapeKind::Rect {
        x,
        y,
        width,
        height,
        rx,
        ry,
    };

    Some((kind, path))
}

/// Resolves `rx`/`ry`, where a missing or negative one copies the other.
fn resolve_rx_ry(node: SvgNode, state: &State) -> (f32, f32) {
    let positive = |aid| {
        node.attribute::<Length>(aid)
            .filter(|v| !v.number.is_sign_negative())
            .map(|v| units::convert_units(v, aid, Units::UserSpaceOnUse, state))
    };

    match (positive(AId::Rx), positive(AId::Ry)) {
        (None, None) => (0.0, 0.0),
        (Some(rx), None) => (rx, rx),
        (None, Some(ry)) => (ry, ry),
        (Some(rx), Some(ry)) => (rx, ry),
    }
}

fn convert_line(node: SvgNode, state: &State) -> Option<(ShapeKind, Path)> {
    let x1 = units::convert_user_length(node, AId::X1, state, Length::zero());
    let y1 = units::convert_user_length(node, AId::Y1, state, Length::zero());
    let x2 = units::convert_user_length(node, AId::X2, state, Length::zero());
    let y2 = units::convert_user_length(node, AId::Y2, state, Length::zero());

    let mut builder = PathBuilder::new();
    builder.move_to(x1, y1);
    builder.line_to(x2, y2);
    let path = builder.finish()?;

    Some((ShapeKind::Line { x1, y1, x2, y2 }, path))
}

fn points_to_path(node: SvgNode, eid: &str) -> Option<PathBuilder> {
    let mut builder = PathBuilder::new();
    match node.attribute::<&str>(AId::Points) {
        Some(text) => {
            for (x, y) in svgtypes::PointsParser::from(text) {
                if builder.is_empty() {
                    builder.move_to(x as f32, y as f32);
                } else {
                    builder.line_to(x as f32, y as f32);
                }
            }
        }
        _ => {
            log::warn!("{} '{}' has an invalid 'points' value. Skipped.", eid, node.element_id());
            return None;
        }
    };

    // 'polyline' and 'polygon' elements must contain at least 2 points.
    if builder.len() < 2 {
        log::warn!("{} '{}' has less than 2 points. Skipped.", eid, node.element_id());
        return None;
    }

    Some(builder)
}

fn convert_circle(node: SvgNode, state: &State) -> Option<(ShapeKind, Path)> {
    let cx = units::convert_user_length(node, AId::Cx, state, Length::zero());
    let cy = units::convert_user_length(node, AId::Cy, state, Length::zero());
    let r = units::convert_user_length(node, AId::R, state, Length::zero());

    if !r.is_valid_length() {
        log::warn!("Circle '{}' has an invalid 'r' value. Skipped.", node.element_id());
        return None;
    }

    let path = ellipse_to_path(cx, cy, r, r)?;
    Some((ShapeKind::Circle { cx, cy, r }, path))
}

fn convert_ellipse(node: SvgNode, state: &State) -> Option<(ShapeKind, Path)> {
    let cx = units::convert_user_length(node, AId::Cx, state, Length::zero());
    let cy = units::convert_user_length(node, AId::Cy, state, Length::zero());
    let (rx, ry) = resolve_rx_ry(node, state);

    if !rx.is_valid_length() {
        log::warn!("Ellipse '{}' has an invalid 'rx' value. Skipped.", node.element_id());
        return None;
    }

    if !ry.is_valid_length() {
        log::warn!("Ellipse '{}' has an invalid 'ry' value. Skipped.", node.element_id());
        return None;
    }

    let path = ellipse_to_path(cx, cy, rx, ry)?;
    Some((ShapeKind::Ellipse { cx, cy, rx, ry }, path))
}

fn ellipse_to_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let mut builder = PathBuilder::new();
    builder.move_to(cx + rx, cy);
    builder.arc_to(rx, ry, 0.0, false, true, cx, cy + ry);
    builder.arc_to(rx, ry, 0.0, false, true, cx - rx, cy);
    builder.arc_to(rx, ry, 0.0, false, true, cx, cy - ry);
    builder.arc_to(rx, ry, 0.0, false, true, cx + rx, cy);
    builder.close();
    builder.finish()
}

trait PathBuilderExt {
    #[allow(clippy::too_many_arguments)]
    fn arc_to(
        &mut self,
        rx: f32,
        ry: f32,
        x_axis_rotation: f32,
        large_arc: bool,
        sweep: bool,
        x: f32,
        y: f32,
    );
}

impl PathBuilderExt for PathBuilder {
    fn arc_to(
        &mut self,
        rx: f32,
        ry: f32,
        x_axis_rotation: f32,
        large_arc: bool,
        sweep: bool,
        x: f32,
        y: f32,
    ) {
        let prev = match self.last_point() {
            Some(v) => v,
            None => return,
        };

        let svg_arc = kurbo::SvgArc {
            from: kurbo::Point::new(prev.x as f64, prev.y as f64),
            to: kurbo::Point::new(x as f64, y as f64),
            radii: kurbo::Vec2::new(rx as f64, ry as f64),
            x_rotation: (x_axis_rotation as f64).to_radians(),
            large_arc,
            sweep,
        };

        match kurbo::Arc::from_svg_arc(&svg_arc) {
            Some(arc) => {
                arc.to_cubic_beziers(0.1, |p1, p2, p| {
                    self.cubic_to(
                        p1.x as f32,
                        p1.y as f32,
                        p2.x as f32,
                        p2.y as f32,
                        p.x as f32,
                        p.y as f32,
                    );
                });
            }
            None => {
                self.line_to(x, y);
            }
        }
    }
}
