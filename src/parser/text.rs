// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::context::State;
use super::converter::{self, Cache};
use super::svgtree::{AId, SvgNode};
use super::{paint, units};
use crate::{Effects, Group, NonZeroPositiveF32, Node, Text, TextAnchor, Transform, Visibility};

#[derive(Clone, Copy, PartialEq, Debug)]
enum XmlSpace {
    Default,
    Preserve,
}

/// Converts a `text` element into an unshaped [`Text`] node.
pub(crate) fn convert<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) {
    let content = collect_text(node);
    if content.is_empty() {
        log::debug!("Text '{}' has no content. Skipped.", node.element_id());
        return;
    }

    let font_size = match NonZeroPositiveF32::new(state.font_size) {
        Some(v) => v,
        None => {
            log::warn!("Text '{}' has an invalid font size. Skipped.", node.element_id());
            return;
        }
    };

    let x = first_coordinate(node, AId::X, state);
    let y = first_coordinate(node, AId::Y, state);

    let font_family = state
        .style
        .raw(AId::FontFamily)
        .and_then(first_font_family)
        .unwrap_or_else(|| state.opt.font_family.clone());

    let anchor: TextAnchor = state.style.get(AId::TextAnchor).unwrap_or_default();

    // Text has no layout, so object bounding box paint cannot be resolved.
    let fill = paint::resolve_fill(state, None, cache);
    let stroke = paint::resolve_stroke(state, None, cache);
    let mut visibility: Visibility = state.style.get(AId::Visibility).unwrap_or_default();
    if fill.is_none() && stroke.is_none() {
        visibility = Visibility::Hidden;
    }

    let mut text = Node::Text(Box::new(Text {
        id: String::new(),
        transform: state.transform,
        abs_transform: state.abs_transform,
        effects: Effects::default(),
        visibility,
        x,
        y,
        content,
        font_family,
        font_size,
        anchor,
        fill,
        stroke,
    }));

    if converter::apply_style(node, &mut text, Transform::default(), state, cache) {
        text.set_id(converter::unique_id(node, state, cache));
        parent.children.push(text);
    }
}

fn first_coordinate(node: SvgNode, aid: AId, state: &State) -> f32 {
    node.raw_attribute(aid)
        .and_then(|value| units::convert_list(value, aid, state))
        .and_then(|list| list.first().copied())
        .unwrap_or(0.0)
}

fn first_font_family(value: &str) -> Option<String> {
    let name = value
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn xml_space(node: SvgNode) -> XmlSpace {
    // `xml:space` is inherited.
    for n in node.ancestors() {
        match n.raw_attribute(AId::Space) {
            Some("preserve") => return XmlSpace::Preserve,
            Some("default") => return XmlSpace::Default,
            _ => {}
        }
    }

    XmlSpace::Default
}

/// Collects the content of all descendant text nodes.
fn collect_text(node: SvgNode) -> String {
    let mut content = String::new();
    for child in node.descendants() {
        let text = match child.text() {
            Some(v) => v,
            None => continue,
        };

        let space = child.parent_element().map(xml_space).unwrap_or(XmlSpace::Default);
        match space {
            XmlSpace::Preserve => {
                content.extend(text.chars().map(|c| match c {
                    '\n' | '\r' | '\t' => ' ',
                    c => c,
                }));
            }
            XmlSpace::Default => {
                for c in text.chars() {
                    match c {
                        '\n' | '\r' => {}
                        '\t' | ' ' => {
                            if !content.is_empty() && !content.ends_with(' ') {
                                content.push(' ');
                            }
                        }
                        c => content.push(c),
                    }
                }
            }
        }
    }

    if xml_space(node) == XmlSpace::Default {
        let len = content.trim_end().len();
        content.truncate(len);
    }

    content
}

#[cfg(test)]
mod tests {
    use crate::{Color, Options, Paint, Tree};

    use super::*;

    fn find_text(group: &crate::Group) -> Option<Text> {
        group.children.iter().find_map(|node| match node {
            Node::Text(ref text) => Some((**text).clone()),
            Node::Group(ref g) => find_text(g),
            _ => None,
        })
    }

    fn first_text(svg: &str) -> Text {
        let tree = Tree::from_str(svg, &Options::default()).unwrap();
        find_text(&tree.root).expect("expected a text")
    }

    #[test]
    fn whitespace_is_collapsed() {
        let text = first_text(
            "<svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>\
                <text x='10 20 30' y='15'>\n  Some   \t <tspan>inner</tspan>  text  </text>\
            </svg>",
        );

        assert_eq!(text.content, "Some inner text");
        assert_eq!(text.x, 10.0);
        assert_eq!(text.y, 15.0);
    }

    #[test]
    fn whitespace_is_preserved() {
        let text = first_text(
            "<svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>\
                <text xml:space='preserve'> a\tb  </text>\
            </svg>",
        );

        assert_eq!(text.content, " a b  ");
    }

    #[test]
    fn style_is_resolved() {
        let text = first_text(
            "<svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>\
                <g font-size='20' fill='red'>\
                    <text font-family=\"'Noto Sans', serif\" text-anchor='middle'>A</text>\
                </g>\
            </svg>",
        );

        assert_eq!(text.font_family, "Noto Sans");
        assert_eq!(text.font_size.get(), 20.0);
        assert_eq!(text.anchor, TextAnchor::Middle);
        assert_eq!(
            text.fill.map(|f| f.paint),
            Some(Paint::Color(Color::new_rgb(255, 0, 0)))
        );
    }

    #[test]
    fn default_font() {
        let text = first_text(
            "<svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>\
                <text>A</text>\
            </svg>",
        );

        assert_eq!(text.font_family, "Times New Roman");
        assert_eq!(text.font_size.get(), 12.0);
    }

    #[test]
    fn empty_text_is_skipped() {
        let tree = Tree::from_str(
            "<svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>\
                <text>  \n </text>\
            </svg>",
            &Options::default(),
        )
        .unwrap();

        assert!(!tree.root.has_children());
    }
}
