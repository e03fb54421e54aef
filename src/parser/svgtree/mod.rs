// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use tiny_skia_path::Transform;

#[rustfmt::skip] mod names;

use crate::{BlendMode, Opacity, SpreadMethod, Visibility};
pub use names::{AId, EId};

pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub(crate) const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub(crate) const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A coordinate system selector.
///
/// `gradientUnits`, `clipPathUnits` and friends in SVG.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum Units {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

/// An SVG view over a `roxmltree` node.
///
/// Only elements in the SVG namespace have a tag name.
#[derive(Clone, Copy)]
pub struct SvgNode<'a, 'input: 'a>(roxmltree::Node<'a, 'input>);

impl Eq for SvgNode<'_, '_> {}

impl PartialEq for SvgNode<'_, '_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl std::hash::Hash for SvgNode<'_, '_> {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id().hash(state);
    }
}

impl<'a, 'input: 'a> SvgNode<'a, 'input> {
    #[inline]
    pub(crate) fn new(node: roxmltree::Node<'a, 'input>) -> Self {
        SvgNode(node)
    }

    /// Checks if the current node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        self.0.is_element()
    }

    /// Checks if the current node is a text.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.0.is_text()
    }

    /// Returns element's tag name.
    ///
    /// `None` for text nodes, unknown elements and elements outside the SVG namespace.
    #[inline]
    pub fn tag_name(&self) -> Option<EId> {
        if !self.0.is_element() {
            return None;
        }

        let tag = self.0.tag_name();
        if tag.namespace() != Some(SVG_NS) {
            return None;
        }

        EId::from_str(tag.name())
    }

    /// Returns element's local name, regardless of its namespace.
    #[inline]
    pub fn local_name(&self) -> &'a str {
        self.0.tag_name().name()
    }

    /// Returns element's `id` attribute value.
    ///
    /// Returns an empty string otherwise.
    #[inline]
    pub fn element_id(&self) -> &'a str {
        self.raw_attribute(AId::Id).unwrap_or("")
    }

    /// Returns a raw attribute value.
    pub fn raw_attribute(&self, aid: AId) -> Option<&'a str> {
        match aid {
            AId::Href => self
                .0
                .attribute((XLINK_NS, "href"))
                .or_else(|| self.0.attribute("href")),
            AId::Space => self.0.attribute((XML_NS, "space")),
            _ => self.0.attribute(aid.to_str()),
        }
    }

    /// Returns an attribute value.
    pub fn attribute<T: FromValue<'a>>(&self, aid: AId) -> Option<T> {
        let value = self.raw_attribute(aid)?;
        match T::parse(aid, value) {
            Some(v) => Some(v),
            None => {
                log::warn!("Failed to parse {} value: '{}'.", aid, value);
                None
            }
        }
    }

    /// Checks if an attribute is present.
    #[inline]
    pub fn has_attribute(&self, aid: AId) -> bool {
        self.raw_attribute(aid).is_some()
    }

    /// Returns all known attributes in document order.
    ///
    /// Attributes from foreign namespaces are ignored.
    pub fn attributes(&self) -> impl Iterator<Item = (AId, &'a str)> + 'a {
        self.0.attributes().filter_map(|attr| {
            let aid = match attr.namespace() {
                None | Some(SVG_NS) => AId::from_str(attr.name())?,
                Some(XLINK_NS) if attr.name() == "href" => AId::Href,
                Some(XML_NS) if attr.name() == "space" => AId::Space,
                _ => return None,
            };

            Some((aid, attr.value()))
        })
    }

    /// Returns the element id referenced by `xlink:href` or `href`.
    ///
    /// Only local references (`#id`) are supported.
    pub fn href_id(&self) -> Option<&'a str> {
        let value = self.raw_attribute(AId::Href)?;
        svgtypes::IRI::from_str(value).ok().map(|v| v.0)
    }

    /// Returns the element id referenced by a `url(#id)` attribute.
    pub fn func_iri(&self, aid: AId) -> Option<&'a str> {
        let value = self.raw_attribute(aid)?;
        svgtypes::FuncIRI::from_str(value).ok().map(|v| v.0)
    }

    /// Returns node's text.
    ///
    /// Text nodes only.
    #[inline]
    pub fn text(&self) -> Option<&'a str> {
        if self.0.is_text() {
            self.0.text()
        } else {
            None
        }
    }

    /// Returns the parent element.
    #[inline]
    pub fn parent_element(&self) -> Option<Self> {
        self.0.parent_element().map(SvgNode)
    }

    /// Returns an iterator over ancestor elements starting at this node.
    #[inline]
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        self.0.ancestors().filter(|n| n.is_element()).map(SvgNode)
    }

    /// Returns an iterator over children nodes.
    #[inline]
    pub fn children(&self) -> impl DoubleEndedIterator<Item = Self> {
        self.0.children().map(SvgNode)
    }

    /// Returns an iterator over children elements.
    #[inline]
    pub fn element_children(&self) -> impl Iterator<Item = Self> {
        self.0.children().filter(|n| n.is_element()).map(SvgNode)
    }

    /// Returns an iterator over this node and its descendants.
    #[inline]
    pub fn descendants(&self) -> impl Iterator<Item = Self> {
        self.0.descendants().map(SvgNode)
    }

    /// Checks that the `transform` attribute, if present, is invertible.
    pub(crate) fn has_valid_transform(&self, aid: AId) -> bool {
        // Do not use `SvgNode::attribute::<Transform>`, because it will always
        // return a valid transform.

        let attr = match self.raw_attribute(aid) {
            Some(attr) => attr,
            None => return true,
        };

        let ts = match svgtypes::Transform::from_str(attr) {
            Ok(v) => v,
            Err(_) => return true,
        };

        let ts = Transform::from_row(
            ts.a as f32,
            ts.b as f32,
            ts.c as f32,
            ts.d as f32,
            ts.e as f32,
            ts.f as f32,
        );
        ts.is_valid()
    }

    /// Parses the `viewBox` attribute.
    pub(crate) fn parse_viewbox(&self) -> Option<crate::NonZeroRect> {
        let vb: svgtypes::ViewBox = self.attribute(AId::ViewBox)?;
        crate::NonZeroRect::from_xywh(vb.x as f32, vb.y as f32, vb.w as f32, vb.h as f32)
    }
}

impl std::fmt::Debug for SvgNode<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self.tag_name() {
            Some(tag) => write!(f, "Element {{ tag_name: {}, id: {:?} }}", tag, self.element_id()),
            None if self.is_text() => write!(f, "Text({:?})", self.0.text().unwrap_or("")),
            None => write!(f, "Node({:?})", self.local_name()),
        }
    }
}

impl EId {
    /// Checks if this is a definition that is never rendered directly.
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            EId::ClipPath
                | EId::Defs
                | EId::Filter
                | EId::LinearGradient
                | EId::Marker
                | EId::Mask
                | EId::Pattern
                | EId::RadialGradient
                | EId::Symbol
        )
    }

    /// Checks if this is a filter primitive element.
    pub fn is_filter_primitive(&self) -> bool {
        matches!(
            self,
            EId::FeBlend
                | EId::FeColorMatrix
                | EId::FeComponentTransfer
                | EId::FeComposite
                | EId::FeConvolveMatrix
                | EId::FeDiffuseLighting
                | EId::FeDisplacementMap
                | EId::FeDropShadow
                | EId::FeFlood
                | EId::FeGaussianBlur
                | EId::FeImage
                | EId::FeMerge
                | EId::FeMorphology
                | EId::FeOffset
                | EId::FeSpecularLighting
                | EId::FeTile
                | EId::FeTurbulence
        )
    }
}

impl AId {
    /// Checks if the attribute is a style property.
    ///
    /// Only properties take part in the cascade and can be set via `style`.
    pub(crate) fn is_presentation(&self) -> bool {
        matches!(
            self,
            AId::ClipPath
                | AId::ClipRule
                | AId::Color
                | AId::ColorInterpolationFilters
                | AId::Display
                | AId::Fill
                | AId::FillOpacity
                | AId::FillRule
                | AId::Filter
                | AId::FloodColor
                | AId::FloodOpacity
                | AId::FontFamily
                | AId::FontSize
                | AId::Mask
                | AId::MaskType
                | AId::Opacity
                | AId::Overflow
                | AId::StopColor
                | AId::StopOpacity
                | AId::Stroke
                | AId::StrokeDasharray
                | AId::StrokeDashoffset
                | AId::StrokeLinecap
                | AId::StrokeLinejoin
                | AId::StrokeMiterlimit
                | AId::StrokeOpacity
                | AId::StrokeWidth
                | AId::TextAnchor
                | AId::Visibility
        )
    }

    /// Checks if the property is passed down to children.
    pub(crate) fn is_inheritable(&self) -> bool {
        self.is_presentation() && !is_non_inheritable(*self)
    }
}

fn is_non_inheritable(id: AId) -> bool {
    matches!(
        id,
        AId::ClipPath
            | AId::Display
            | AId::Filter
            | AId::FloodColor
            | AId::FloodOpacity
            | AId::Mask
            | AId::MaskType
            | AId::Opacity
            | AId::Overflow
            | AId::StopColor
            | AId::StopOpacity
    )
}

/// A trait for parsing attribute values.
pub trait FromValue<'a>: Sized {
    /// Parses an attribute value.
    ///
    /// When `None` is returned, the attribute value will be logged as a parsing failure.
    fn parse(aid: AId, value: &'a str) -> Option<Self>;
}

impl<'a> FromValue<'a> for &'a str {
    fn parse(_: AId, value: &'a str) -> Option<Self> {
        Some(value)
    }
}

impl<'a> FromValue<'a> for f32 {
    fn parse(_: AId, value: &str) -> Option<Self> {
        svgtypes::Number::from_str(value).ok().map(|v| v.0 as f32)
    }
}

impl<'a> FromValue<'a> for svgtypes::Length {
    fn parse(_: AId, value: &str) -> Option<Self> {
        super::units::parse_length(value)
    }
}

impl<'a> FromValue<'a> for Opacity {
    fn parse(_: AId, value: &str) -> Option<Self> {
        let length = svgtypes::Length::from_str(value).ok()?;
        if length.unit == svgtypes::LengthUnit::Percent {
            Some(Opacity::new_clamped(length.number as f32 / 100.0))
        } else if length.unit == svgtypes::LengthUnit::None {
            Some(Opacity::new_clamped(length.number as f32))
        } else {
            None
        }
    }
}

impl<'a> FromValue<'a> for Transform {
    fn parse(_: AId, value: &str) -> Option<Self> {
        let ts = match svgtypes::Transform::from_str(value) {
            Ok(v) => v,
            Err(_) => return None,
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
            Some(ts)
        } else {
            Some(Transform::default())
        }
    }
}

impl<'a> FromValue<'a> for svgtypes::TransformOrigin {
    fn parse(_: AId, value: &str) -> Option<Self> {
        Self::from_str(value).ok()
    }
}

impl<'a> FromValue<'a> for svgtypes::ViewBox {
    fn parse(_: AId, value: &str) -> Option<Self> {
        Self::from_str(value).ok()
    }
}

impl<'a> FromValue<'a> for Units {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "userSpaceOnUse" => Some(Units::UserSpaceOnUse),
            "objectBoundingBox" => Some(Units::ObjectBoundingBox),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for svgtypes::AspectRatio {
    fn parse(_: AId, value: &str) -> Option<Self> {
        Self::from_str(value).ok()
    }
}

impl<'a> FromValue<'a> for svgtypes::Color {
    fn parse(_: AId, value: &str) -> Option<Self> {
        Self::from_str(value).ok()
    }
}

impl<'a> FromValue<'a> for Vec<f32> {
    fn parse(_: AId, value: &str) -> Option<Self> {
        let mut list = Vec::new();
        for n in svgtypes::NumberListParser::from(value) {
            list.push(n.ok()? as f32);
        }

        Some(list)
    }
}

impl<'a> FromValue<'a> for Visibility {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "visible" => Some(Visibility::Visible),
            "hidden" => Some(Visibility::Hidden),
            "collapse" => Some(Visibility::Collapse),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for SpreadMethod {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "pad" => Some(SpreadMethod::Pad),
            "reflect" => Some(SpreadMethod::Reflect),
            "repeat" => Some(SpreadMethod::Repeat),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for BlendMode {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "normal" => Some(BlendMode::Normal),
            "multiply" => Some(BlendMode::Multiply),
            "screen" => Some(BlendMode::Screen),
            "overlay" => Some(BlendMode::Overlay),
            "darken" => Some(BlendMode::Darken),
            "lighten" => Some(BlendMode::Lighten),
            "color-dodge" => Some(BlendMode::ColorDodge),
            "color-burn" => Some(BlendMode::ColorBurn),
            "hard-light" => Some(BlendMode::HardLight),
            "soft-light" => Some(BlendMode::SoftLight),
            "difference" => Some(BlendMode::Difference),
            "exclusion" => Some(BlendMode::Exclusion),
            "hue" => Some(BlendMode::Hue),
            "saturation" => Some(BlendMode::Saturation),
            "color" => Some(BlendMode::Color),
            "luminosity" => Some(BlendMode::Luminosity),
            _ => None,
        }
    }
}
