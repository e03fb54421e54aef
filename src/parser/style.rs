// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use super::svgtree::{AId, FromValue, SvgNode};
use crate::{FillRule, LineCap, LineJoin, MaskType, TextAnchor};

impl<'a> FromValue<'a> for LineCap {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "butt" => Some(LineCap::Butt),
            "round" => Some(LineCap::Round),
            "square" => Some(LineCap::Square),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for LineJoin {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "miter" => Some(LineJoin::Miter),
            "miter-clip" => Some(LineJoin::MiterClip),
            "round" => Some(LineJoin::Round),
            "bevel" => Some(LineJoin::Bevel),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for FillRule {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "nonzero" => Some(FillRule::NonZero),
            "evenodd" => Some(FillRule::EvenOdd),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for MaskType {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "luminance" => Some(MaskType::Luminance),
            "alpha" => Some(MaskType::Alpha),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for TextAnchor {
    fn parse(_: AId, value: &str) -> Option<Self> {
        match value {
            "start" => Some(TextAnchor::Start),
            "middle" => Some(TextAnchor::Middle),
            "end" => Some(TextAnchor::End),
            _ => None,
        }
    }
}

/// Collects style declarations set on the element itself.
///
/// Presentation attributes come first, followed by the `style` attribute
/// declarations, so the latter win when applied in order.
/// `!important` is not supported and is treated as a regular declaration.
pub(crate) fn declarations<'a>(node: SvgNode<'a, '_>) -> Vec<(AId, &'a str)> {
    let mut list: Vec<(AId, &'a str)> = node
        .attributes()
        .filter(|(aid, _)| aid.is_presentation())
        .collect();

    if let Some(value) = node.raw_attribute(AId::Style) {
        for declaration in simplecss::DeclarationTokenizer::from(value) {
            match AId::from_str(declaration.name) {
                Some(aid) if aid.is_presentation() => list.push((aid, declaration.value)),
                _ => log::debug!("Unsupported style property '{}'.", declaration.name),
            }
        }
    }

    list
}

/// A resolved style mapping of an element.
///
/// Stores raw property values. Parsing happens on access.
#[derive(Clone, Default, Debug)]
pub(crate) struct Styles<'a> {
    values: HashMap<AId, &'a str>,
}

impl<'a> Styles<'a> {
    /// Applies element's own declarations on top of the values inherited from the parent.
    ///
    /// Non-inherited properties are reset unless set explicitly or via `inherit`.
    pub fn cascade(parent: &Styles<'a>, declarations: &[(AId, &'a str)]) -> Self {
        let mut values: HashMap<AId, &'a str> = parent
            .values
            .iter()
            .filter(|(aid, _)| aid.is_inheritable())
            .map(|(aid, value)| (*aid, *value))
            .collect();

        for (aid, value) in declarations {
            if value.trim() == "inherit" {
                match parent.values.get(aid) {
                    Some(v) => values.insert(*aid, *v),
                    None => values.remove(aid),
                };
            } else {
                values.insert(*aid, *value);
            }
        }

        Styles { values }
    }

    /// Resolves the style of an arbitrary element by cascading over its ancestors.
    pub fn computed(node: SvgNode<'a, '_>) -> Self {
        let nodes: Vec<_> = node.ancestors().collect();
        let mut style = Styles::default();
        for n in nodes.iter().rev() {
            style = Styles::cascade(&style, &declarations(*n));
        }

        style
    }

    /// Returns a raw property value.
    pub fn raw(&self, aid: AId) -> Option<&'a str> {
        self.values.get(&aid).copied()
    }

    /// Checks that a property is set.
    pub fn has(&self, aid: AId) -> bool {
        self.values.contains_key(&aid)
    }

    /// Returns a parsed property value.
    ///
    /// Logs a warning when the value is malformed.
    pub fn get<T: FromValue<'a>>(&self, aid: AId) -> Option<T> {
        let value = self.raw(aid)?;
        match T::parse(aid, value) {
            Some(v) => Some(v),
            None => {
                log::warn!("Failed to parse {} value: '{}'.", aid, value);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Opacity;

    fn with_doc(text: &str, f: impl FnOnce(&roxmltree::Document)) {
        let doc = roxmltree::Document::parse(text).unwrap();
        f(&doc)
    }

    fn find<'a, 'input>(doc: &'a roxmltree::Document<'input>, id: &str) -> SvgNode<'a, 'input> {
        SvgNode::new(doc.descendants().find(|n| n.attribute("id") == Some(id)).unwrap())
    }

    #[test]
    fn inline_style_wins() {
        with_doc(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <rect id="r" fill="red" style="fill:green; stroke : blue"/>
            </svg>"#,
            |doc| {
                let style = Styles::computed(find(doc, "r"));
                assert_eq!(style.raw(AId::Fill), Some("green"));
                assert_eq!(style.raw(AId::Stroke), Some("blue"));
            },
        );
    }

    #[test]
    fn inherited_and_reset() {
        with_doc(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <g fill="red" opacity="0.5">
                    <rect id="r"/>
                </g>
            </svg>"#,
            |doc| {
                let style = Styles::computed(find(doc, "r"));
                assert_eq!(style.raw(AId::Fill), Some("red"));
                assert!(!style.has(AId::Opacity));
            },
        );
    }

    #[test]
    fn inherit_keyword() {
        with_doc(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <g fill="red" opacity="0.5">
                    <g id="g" fill="blue">
                        <rect id="r" fill="inherit" opacity="inherit"/>
                    </g>
                </g>
            </svg>"#,
            |doc| {
                let style = Styles::computed(find(doc, "r"));
                assert_eq!(style.raw(AId::Fill), Some("blue"));
                // The direct parent has no opacity.
                assert!(!style.has(AId::Opacity));
            },
        );
    }

    #[test]
    fn important_is_ignored() {
        with_doc(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <rect id="r" style="fill:red !important; fill:green"/>
            </svg>"#,
            |doc| {
                let style = Styles::computed(find(doc, "r"));
                assert_eq!(style.raw(AId::Fill), Some("green"));
            },
        );
    }

    #[test]
    fn unknown_properties_are_skipped() {
        with_doc(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <rect id="r" style="qwe:1;fill-opacity:0.5"/>
            </svg>"#,
            |doc| {
                let style = Styles::computed(find(doc, "r"));
                assert_eq!(style.get::<Opacity>(AId::FillOpacity), Some(Opacity::new_clamped(0.5)));
            },
        );
    }

    #[test]
    fn typed_access() {
        with_doc(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <rect id="r" stroke-linecap="round" stroke-linejoin="qwe"/>
            </svg>"#,
            |doc| {
                let style = Styles::computed(find(doc, "r"));
                assert_eq!(style.get::<LineCap>(AId::StrokeLinecap), Some(LineCap::Round));
                assert_eq!(style.get::<LineJoin>(AId::StrokeLinejoin), None);
            },
        );
    }
}
