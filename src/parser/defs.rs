// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Id-keyed definition tables and `href` chain resolution.

use std::collections::{HashMap, HashSet};

use super::svgtree::{AId, EId, SvgNode};

/// The maximum number of `href` links followed in a single chain.
pub(crate) const MAX_HREF_DEPTH: usize = 16;

/// An id-keyed registry of definition elements.
#[derive(Default, Debug)]
pub(crate) struct SymbolTable<'a> {
    nodes: HashMap<&'a str, SvgNode<'a, 'a>>,
}

impl<'a> SymbolTable<'a> {
    /// Registers a definition.
    ///
    /// A duplicated id replaces the previous definition and logs a warning.
    pub fn insert(&mut self, id: &'a str, node: SvgNode<'a, 'a>) {
        if self.replace(id, node) {
            log::warn!("Element with ID '{}' already exists. The last one will be used.", id);
        }
    }

    /// Looks up a definition by id.
    pub fn find(&self, id: &str) -> Option<SvgNode<'a, 'a>> {
        self.nodes.get(id).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    fn replace(&mut self, id: &'a str, node: SvgNode<'a, 'a>) -> bool {
        self.nodes.insert(id, node).is_some()
    }
}

/// All definitions of a document.
#[derive(Default, Debug)]
pub(crate) struct Definitions<'a> {
    /// `linearGradient` and `radialGradient` elements.
    pub gradients: SymbolTable<'a>,
    pub patterns: SymbolTable<'a>,
    pub filters: SymbolTable<'a>,
    pub clip_paths: SymbolTable<'a>,
    pub masks: SymbolTable<'a>,
    /// Every element with an `id`. Used by `use`.
    pub elements: SymbolTable<'a>,
}

impl<'a> Definitions<'a> {
    /// Scans the whole subtree and registers every element with an id.
    ///
    /// References can point forward, so this has to run before the tree walk.
    pub fn collect(root: SvgNode<'a, 'a>) -> Self {
        let mut defs = Definitions::default();
        for node in root.descendants().filter(|n| n.is_element()) {
            let id = node.element_id();
            if id.is_empty() {
                continue;
            }

            defs.elements.insert(id, node);

            // Duplicates were already reported above.
            let table = match node.tag_name() {
                Some(EId::LinearGradient) | Some(EId::RadialGradient) => &mut defs.gradients,
                Some(EId::Pattern) => &mut defs.patterns,
                Some(EId::Filter) => &mut defs.filters,
                Some(EId::ClipPath) => &mut defs.clip_paths,
                Some(EId::Mask) => &mut defs.masks,
                _ => continue,
            };
            table.replace(id, node);
        }

        defs
    }

    /// Returns a definition followed by all the definitions it inherits from.
    ///
    /// Only links inside the same table are followed, and a link to an unknown id
    /// ends the chain. Cycles and chains longer than `MAX_HREF_DEPTH` links
    /// produce `None`.
    pub fn href_chain(table: &SymbolTable<'a>, id: &str) -> Option<Vec<SvgNode<'a, 'a>>> {
        let mut chain = vec![table.find(id)?];
        loop {
            let last = chain[chain.len() - 1];
            let link = match last.href_id() {
                Some(v) => v,
                None => break,
            };

            let next = match table.find(link) {
                Some(v) => v,
                None => {
                    log::warn!("'{}' references an unknown element '{}'.", last.element_id(), link);
                    break;
                }
            };

            if chain.contains(&next) {
                log::warn!("'{}' has a recursive 'xlink:href'. Skipped.", id);
                return None;
            }

            if chain.len() > MAX_HREF_DEPTH {
                log::warn!("'{}' has a too long 'xlink:href' chain. Skipped.", id);
                return None;
            }

            chain.push(next);
        }

        Some(chain)
    }

    /// Returns the number of elements in a subtree with every `use` instantiated.
    ///
    /// Recursive references add nothing, since they are never instantiated.
    /// The result saturates at `usize::MAX`.
    pub fn expanded_len(&self, root: SvgNode<'a, 'a>) -> usize {
        let mut sizes = HashMap::new();
        let mut stack = HashSet::new();
        self.expanded_len_impl(root, &mut sizes, &mut stack)
    }

    fn expanded_len_impl(
        &self,
        node: SvgNode<'a, 'a>,
        sizes: &mut HashMap<SvgNode<'a, 'a>, usize>,
        stack: &mut HashSet<SvgNode<'a, 'a>>,
    ) -> usize {
        if let Some(len) = sizes.get(&node) {
            return *len;
        }

        if !stack.insert(node) {
            return 0;
        }

        let mut len = 1usize;
        for child in node.element_children() {
            len = len.saturating_add(self.expanded_len_impl(child, sizes, stack));
        }

        if node.tag_name() == Some(EId::Use) {
            if let Some(linked) = node.href_id().and_then(|id| self.elements.find(id)) {
                len = len.saturating_add(self.expanded_len_impl(linked, sizes, stack));
            }
        }

        stack.remove(&node);
        sizes.insert(node, len);
        len
    }
}

/// Returns the first element in a chain that has the attribute.
///
/// `accept` limits the lookup to compatible elements. The chain stops at the first
/// element it rejects.
pub(crate) fn resolve_attr<'a>(
    chain: &[SvgNode<'a, 'a>],
    aid: AId,
    accept: impl Fn(EId) -> bool,
) -> Option<SvgNode<'a, 'a>> {
    for (i, node) in chain.iter().enumerate() {
        // The first element is always accepted.
        if i != 0 && !node.tag_name().map(&accept).unwrap_or(false) {
            break;
        }

        if node.has_attribute(aid) {
            return Some(*node);
        }
    }

    None
}

/// Resolves a gradient attribute.
///
/// Coordinates are taken only from gradients of the same kind,
/// everything else from any gradient.
pub(crate) fn resolve_gradient_attr<'a>(
    chain: &[SvgNode<'a, 'a>],
    aid: AId,
) -> Option<SvgNode<'a, 'a>> {
    let kind = chain.first()?.tag_name()?;
    let is_coordinate = matches!(
        aid,
        AId::X1 | AId::Y1 | AId::X2 | AId::Y2 | AId::Cx | AId::Cy | AId::R | AId::Fx | AId::Fy
    );

    resolve_attr(chain, aid, |tag| !is_coordinate || tag == kind)
}

/// Returns the first element in a chain with element children matching the predicate.
pub(crate) fn find_with_children<'a>(
    chain: &[SvgNode<'a, 'a>],
    predicate: impl Fn(SvgNode) -> bool,
) -> Option<SvgNode<'a, 'a>> {
    chain
        .iter()
        .find(|node| node.element_children().any(|n| predicate(n)))
        .copied()
}

/// Merges filter primitives along a chain.
///
/// Primitives of a filter override the inherited ones with the same index,
/// the remaining inherited ones are kept.
pub(crate) fn merge_primitives<'a>(chain: &[SvgNode<'a, 'a>]) -> Vec<SvgNode<'a, 'a>> {
    let mut primitives: Vec<SvgNode<'a, 'a>> = Vec::new();
    for filter in chain.iter().rev() {
        let own = filter
            .element_children()
            .filter(|n| n.tag_name().map(|t| t.is_filter_primitive()).unwrap_or(false));

        for (i, node) in own.enumerate() {
            if i < primitives.len() {
                primitives[i] = node;
            } else {
                primitives.push(node);
            }
        }
    }

    primitives
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<'a>(doc: &'a roxmltree::Document<'a>) -> Definitions<'a> {
        Definitions::collect(SvgNode::new(doc.root_element()))
    }

    fn gradient_chain(count: usize) -> String {
        let mut text = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg"><defs>"#);
        for i in 0..count - 1 {
            text.push_str(&format!(r##"<linearGradient id="lg{}" href="#lg{}"/>"##, i, i + 1));
        }
        text.push_str(&format!(
            r#"<linearGradient id="lg{}"><stop offset="0"/><stop offset="1"/></linearGradient>"#,
            count - 1
        ));
        text.push_str("</defs></svg>");
        text
    }

    #[test]
    fn duplicated_id_last_wins() {
        let doc = roxmltree::Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <rect id="r" width="1"/>
                <rect id="r" width="2"/>
            </svg>"#,
        )
        .unwrap();
        let defs = collect(&doc);
        let node = defs.elements.find("r").unwrap();
        assert_eq!(node.raw_attribute(AId::Width), Some("2"));
    }

    #[test]
    fn tables_by_kind() {
        let doc = roxmltree::Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <rect id="lg1" fill="url(#lg1)"/>
                <defs>
                    <radialGradient id="rg1"/>
                    <clipPath id="clip1"/>
                    <mask id="mask1"/>
                    <pattern id="patt1"/>
                    <filter id="filter1"/>
                </defs>
            </svg>"#,
        )
        .unwrap();
        let defs = collect(&doc);
        assert_eq!(defs.gradients.len(), 1);
        assert!(defs.gradients.find("lg1").is_none());
        assert!(defs.gradients.find("rg1").is_some());
        assert!(defs.clip_paths.find("clip1").is_some());
        assert!(defs.masks.find("mask1").is_some());
        assert!(defs.patterns.find("patt1").is_some());
        assert!(defs.filters.find("filter1").is_some());
        assert_eq!(defs.elements.len(), 6);
    }

    #[test]
    fn chain_of_16_links() {
        let text = gradient_chain(17);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let defs = collect(&doc);
        let chain = Definitions::href_chain(&defs.gradients, "lg0").unwrap();
        assert_eq!(chain.len(), 17);
    }

    #[test]
    fn chain_of_17_links() {
        let text = gradient_chain(18);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let defs = collect(&doc);
        assert!(Definitions::href_chain(&defs.gradients, "lg0").is_none());
        // A shorter tail of the same chain is fine.
        assert!(Definitions::href_chain(&defs.gradients, "lg1").is_some());
    }

    #[test]
    fn expanded_len_counts_instances() {
        let doc = roxmltree::Document::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <g id="g"><rect width="1" height="1"/></g>
                <use href="#g"/>
                <use href="#g"/>
                <use href="#missing"/>
            </svg>"##,
        )
        .unwrap();
        let defs = collect(&doc);
        let root = SvgNode::new(doc.root_element());
        // svg + g(2) + 2 * (use + g(2)) + use
        assert_eq!(defs.expanded_len(root), 10);
    }

    #[test]
    fn expanded_len_skips_recursion() {
        let doc = roxmltree::Document::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <g id="g"><use href="#g"/></g>
            </svg>"##,
        )
        .unwrap();
        let defs = collect(&doc);
        let root = SvgNode::new(doc.root_element());
        assert_eq!(defs.expanded_len(root), 3);
    }

    #[test]
    fn recursive_chain() {
        let doc = roxmltree::Document::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
                <linearGradient id="lg1" xlink:href="#lg2"/>
                <linearGradient id="lg2" xlink:href="#lg3"/>
                <linearGradient id="lg3" xlink:href="#lg1"/>
                <linearGradient id="lg4" xlink:href="#lg4"/>
            </svg>"##,
        )
        .unwrap();
        let defs = collect(&doc);
        assert!(Definitions::href_chain(&defs.gradients, "lg1").is_none());
        assert!(Definitions::href_chain(&defs.gradients, "lg4").is_none());
    }

    #[test]
    fn unknown_link_ends_chain() {
        let doc = roxmltree::Document::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <linearGradient id="lg1" href="#lg2"/>
                <linearGradient id="lg2" href="#missing"/>
            </svg>"##,
        )
        .unwrap();
        let defs = collect(&doc);
        let chain = Definitions::href_chain(&defs.gradients, "lg1").unwrap();
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn gradient_coordinates_from_same_kind() {
        let doc = roxmltree::Document::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <linearGradient id="lg1" href="#rg1"/>
                <radialGradient id="rg1" href="#lg2" cx="5" gradientUnits="userSpaceOnUse"/>
                <linearGradient id="lg2" x1="10"/>
            </svg>"##,
        )
        .unwrap();
        let defs = collect(&doc);
        let chain = Definitions::href_chain(&defs.gradients, "lg1").unwrap();
        let units = resolve_gradient_attr(&chain, AId::GradientUnits).unwrap();
        assert_eq!(units.element_id(), "rg1");
        // Coordinates are not resolved through a gradient of a different kind.
        assert!(resolve_gradient_attr(&chain, AId::X1).is_none());
    }

    #[test]
    fn filter_primitives_merge() {
        let doc = roxmltree::Document::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <filter id="f1" href="#f2">
                    <feOffset result="a"/>
                </filter>
                <filter id="f2">
                    <feFlood result="b"/>
                    <feGaussianBlur result="c"/>
                </filter>
            </svg>"##,
        )
        .unwrap();
        let defs = collect(&doc);
        let chain = Definitions::href_chain(&defs.filters, "f1").unwrap();
        let list: Vec<_> = merge_primitives(&chain)
            .iter()
            .map(|n| n.raw_attribute(AId::Result).unwrap())
            .collect();
        assert_eq!(list, vec!["a", "c"]);
    }
}
