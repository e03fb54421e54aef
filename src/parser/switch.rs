// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::context::State;
use super::converter::{self, Cache};
use super::svgtree::{AId, SvgNode};
use super::Options;
use crate::{Group, Transform};

// Full list can be found here: https://www.w3.org/TR/SVG11/feature.html
static FEATURES: &[&str] = &[
    "http://www.w3.org/TR/SVG11/feature#SVGDOM-static",
    "http://www.w3.org/TR/SVG11/feature#SVG-static",
    "http://www.w3.org/TR/SVG11/feature#CoreAttribute", // no xml:base and xml:lang
    "http://www.w3.org/TR/SVG11/feature#Structure",
    "http://www.w3.org/TR/SVG11/feature#BasicStructure",
    "http://www.w3.org/TR/SVG11/feature#ConditionalProcessing",
    "http://www.w3.org/TR/SVG11/feature#Image",
    "http://www.w3.org/TR/SVG11/feature#Style",
    "http://www.w3.org/TR/SVG11/feature#ViewportAttribute",
    "http://www.w3.org/TR/SVG11/feature#Shape",
    "http://www.w3.org/TR/SVG11/feature#BasicText",
    "http://www.w3.org/TR/SVG11/feature#BasicPaintAttribute",
    "http://www.w3.org/TR/SVG11/feature#OpacityAttribute",
    "http://www.w3.org/TR/SVG11/feature#BasicGraphicsAttribute",
    "http://www.w3.org/TR/SVG11/feature#Gradient",
    "http://www.w3.org/TR/SVG11/feature#Pattern",
    "http://www.w3.org/TR/SVG11/feature#Clip",
    "http://www.w3.org/TR/SVG11/feature#BasicClip",
    "http://www.w3.org/TR/SVG11/feature#Mask",
    "http://www.w3.org/TR/SVG11/feature#BasicFilter",
    "http://www.w3.org/TR/SVG11/feature#XlinkAttribute", // only xlink:href
];

/// Converts a `switch` element.
///
/// Only the first direct child that passes the conditional processing is rendered.
pub(crate) fn convert<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) {
    let child = match node
        .element_children()
        .find(|n| is_condition_passed(*n, state.opt))
    {
        Some(v) => v,
        None => {
            log::debug!("Switch '{}' has no matching children.", node.element_id());
            return;
        }
    };

    converter::convert_group(node, state, Transform::default(), cache, parent, &|cache, g| {
        converter::convert_element(child, state, cache, g);
    });
}

/// Evaluates `requiredExtensions`, `requiredFeatures` and `systemLanguage`.
pub(crate) fn is_condition_passed(node: SvgNode, opt: &Options) -> bool {
    if !node.is_element() {
        return false;
    }

    // No extensions are supported.
    if node.has_attribute(AId::RequiredExtensions) {
        return false;
    }

    // All of the listed features must be supported.
    if let Some(features) = node.attribute::<&str>(AId::RequiredFeatures) {
        if !features.split_whitespace().all(|f| FEATURES.contains(&f)) {
            return false;
        }
    }

    is_valid_sys_lang(node, opt)
}

// Only simple BCP 47 values, like `en` or `en-US`, are supported.
fn is_valid_sys_lang(node: SvgNode, opt: &Options) -> bool {
    let langs = match node.attribute::<&str>(AId::SystemLanguage) {
        Some(v) => v,
        None => return true,
    };

    for lang in langs.split(',').map(str::trim) {
        // An exact match.
        if opt.languages.iter().any(|v| v == lang) {
            return true;
        }

        // A user language that equals a prefix followed by `-`.
        if let Some(idx) = lang.find('-') {
            let prefix = &lang[..idx];
            if opt.languages.iter().any(|v| v == prefix) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passed(attrs: &str, languages: &[&str]) -> bool {
        let text = format!(
            "<svg xmlns='http://www.w3.org/2000/svg'><rect {}/></svg>",
            attrs
        );
        let doc = roxmltree::Document::parse(&text).unwrap();
        let node = SvgNode::new(doc.root_element().first_element_child().unwrap());
        let opt = Options {
            languages: languages.iter().map(|s| s.to_string()).collect(),
            ..Options::default()
        };

        is_condition_passed(node, &opt)
    }

    #[test]
    fn no_conditions() {
        assert!(passed("", &["en"]));
    }

    #[test]
    fn exact_language() {
        assert!(passed("systemLanguage='ru, en'", &["en"]));
        assert!(!passed("systemLanguage='ru'", &["en"]));
    }

    #[test]
    fn language_prefix() {
        assert!(passed("systemLanguage='en-US'", &["en"]));
        assert!(!passed("systemLanguage='en'", &["en-US"]));
    }

    #[test]
    fn required_extensions() {
        assert!(!passed("requiredExtensions=''", &["en"]));
    }

    #[test]
    fn required_features() {
        assert!(passed(
            "requiredFeatures='http://www.w3.org/TR/SVG11/feature#Shape'",
            &["en"]
        ));
        assert!(!passed(
            "requiredFeatures='http://www.w3.org/TR/SVG11/feature#Font'",
            &["en"]
        ));
    }
}
