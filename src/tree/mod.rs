// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod filter;
pub(crate) mod geom;

use std::sync::Arc;

pub use strict_num::{self, ApproxEqUlps, NonZeroPositiveF32, NormalizedF32, PositiveF32};
pub use svgtypes::{Align, AspectRatio};

pub use tiny_skia_path;

pub use self::geom::*;

/// An alias to `NormalizedF32`.
pub type Opacity = NormalizedF32;

/// An alias to `NormalizedF32`.
pub type StopOffset = NormalizedF32;

/// An alias to `NonZeroPositiveF32`.
pub type StrokeWidth = NonZeroPositiveF32;

/// A visibility property.
///
/// `visibility` attribute in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// A blending mode property.
///
/// `mode` attribute of `feBlend` in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

/// A spread method.
///
/// `spreadMethod` attribute in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

/// A generic gradient.
#[derive(Clone, Debug)]
pub struct BaseGradient {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    pub id: String,

    /// Gradient transform.
    ///
    /// `gradientTransform` in SVG. When the gradient used `objectBoundingBox` units,
    /// the mapping onto the shape's bounding box is already applied.
    pub transform: Transform,

    /// Gradient spreading method.
    ///
    /// `spreadMethod` in SVG.
    pub spread_method: SpreadMethod,

    /// A list of `stop` elements.
    ///
    /// Always has at least two stops.
    pub stops: Vec<Stop>,
}

/// A linear gradient.
///
/// `linearGradient` element in SVG.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub struct LinearGradient {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,

    /// Base gradient data.
    pub base: BaseGradient,
}

impl std::ops::Deref for LinearGradient {
    type Target = BaseGradient;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// A radial gradient.
///
/// `radialGradient` element in SVG.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub struct RadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub r: PositiveF32,
    pub fx: f32,
    pub fy: f32,

    /// Base gradient data.
    pub base: BaseGradient,
}

impl std::ops::Deref for RadialGradient {
    type Target = BaseGradient;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// Gradient's stop element.
///
/// `stop` element in SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug)]
pub struct Stop {
    pub offset: StopOffset,
    pub color: Color,
    pub opacity: Opacity,
}

/// A pattern element.
///
/// `pattern` element in SVG.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    pub id: String,

    /// Pattern transform.
    ///
    /// `patternTransform` in SVG.
    pub transform: Transform,

    /// Pattern tile rectangle in user space.
    ///
    /// `x`, `y`, `width` and `height` in SVG.
    pub rect: NonZeroRect,

    /// Pattern viewbox.
    pub view_box: Option<ViewBox>,

    /// Pattern children.
    pub root: Group,
}

/// A stroke-miterlimit value.
///
/// Just like `f32` but immutable and guarantee to be >=1.0.
#[derive(Clone, Copy, Debug)]
pub struct StrokeMiterlimit(f32);

impl StrokeMiterlimit {
    /// Creates a new `StrokeMiterlimit` value.
    #[inline]
    pub fn new(n: f32) -> Self {
        debug_assert!(n.is_finite());
        debug_assert!(n >= 1.0);

        let n = if !(n >= 1.0) { 1.0 } else { n };

        StrokeMiterlimit(n)
    }

    /// Returns an underlying value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.0
    }
}

impl Default for StrokeMiterlimit {
    #[inline]
    fn default() -> Self {
        StrokeMiterlimit::new(4.0)
    }
}

impl PartialEq for StrokeMiterlimit {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.approx_eq_ulps(&other.0, 4)
    }
}

/// A line cap.
///
/// `stroke-linecap` attribute in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// A line join.
///
/// `stroke-linejoin` attribute in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    MiterClip,
    Round,
    Bevel,
}

/// A stroke style.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub struct Stroke {
    pub paint: Paint,
    pub dasharray: Option<Vec<f32>>,
    pub dashoffset: f32,
    pub miterlimit: StrokeMiterlimit,
    pub opacity: Opacity,
    pub width: StrokeWidth,
    pub linecap: LineCap,
    pub linejoin: LineJoin,
}

/// A fill rule.
///
/// `fill-rule` attribute in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// A fill style.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub struct Fill {
    pub paint: Paint,
    pub opacity: Opacity,
    pub rule: FillRule,
}

impl Default for Fill {
    fn default() -> Self {
        Fill {
            paint: Paint::Color(Color::black()),
            opacity: Opacity::ONE,
            rule: FillRule::default(),
        }
    }
}

/// A 8-bit RGB color.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Constructs a new `Color` from RGB values.
    #[inline]
    pub fn new_rgb(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue }
    }

    /// Constructs a new `Color` set to black.
    #[inline]
    pub fn black() -> Color {
        Color::new_rgb(0, 0, 0)
    }

    /// Constructs a new `Color` set to white.
    #[inline]
    pub fn white() -> Color {
        Color::new_rgb(255, 255, 255)
    }
}

/// A paint style.
///
/// `paint` value type in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub enum Paint {
    Color(Color),
    LinearGradient(Arc<LinearGradient>),
    RadialGradient(Arc<RadialGradient>),
    Pattern(Arc<Pattern>),
}

impl PartialEq for Paint {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Color(lc), Self::Color(rc)) => lc == rc,
            (Self::LinearGradient(ref lg1), Self::LinearGradient(ref lg2)) => Arc::ptr_eq(lg1, lg2),
            (Self::RadialGradient(ref rg1), Self::RadialGradient(ref rg2)) => Arc::ptr_eq(rg1, rg2),
            (Self::Pattern(ref p1), Self::Pattern(ref p2)) => Arc::ptr_eq(p1, p2),
            _ => false,
        }
    }
}

/// A clip-path element.
///
/// `clipPath` element in SVG.
#[derive(Clone, Debug)]
pub struct ClipPath {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    pub id: String,

    /// Clip path transform.
    ///
    /// Maps the clip content into the coordinate system of the clipped shape.
    /// Includes `transform` and `objectBoundingBox` mapping.
    pub transform: Transform,

    /// Additional clip path.
    ///
    /// `clip-path` in SVG.
    pub clip_path: Option<Arc<ClipPath>>,

    /// Clip path children.
    pub root: Group,
}

/// A mask type.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum MaskType {
    /// Indicates that the luminance values of the mask should be used.
    #[default]
    Luminance,
    /// Indicates that the alpha values of the mask should be used.
    Alpha,
}

/// A mask element.
///
/// `mask` element in SVG.
#[derive(Clone, Debug)]
pub struct Mask {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    pub id: String,

    /// Mask rectangle in the coordinate system of the masked shape.
    ///
    /// `x`, `y`, `width` and `height` in SVG.
    pub rect: NonZeroRect,

    /// Mask type.
    ///
    /// `mask-type` in SVG.
    pub kind: MaskType,

    /// Additional mask.
    ///
    /// `mask` in SVG.
    pub mask: Option<Arc<Mask>>,

    /// Mask children.
    pub root: Group,
}

/// Opacity, clipping, masking and filtering bound to a single shape.
#[derive(Clone, Debug)]
pub struct Effects {
    /// Shape opacity.
    ///
    /// `opacity` in SVG.
    pub opacity: Opacity,

    /// Shape clip path.
    ///
    /// `clip-path` in SVG.
    pub clip_path: Option<Arc<ClipPath>>,

    /// Shape mask.
    ///
    /// `mask` in SVG.
    pub mask: Option<Arc<Mask>>,

    /// Shape filter.
    ///
    /// `filter` in SVG.
    pub filter: Option<Arc<filter::Filter>>,
}

impl Default for Effects {
    fn default() -> Self {
        Effects {
            opacity: Opacity::ONE,
            clip_path: None,
            mask: None,
            filter: None,
        }
    }
}

impl Effects {
    /// Checks that no effect is set.
    pub fn is_empty(&self) -> bool {
        self.opacity == Opacity::ONE
            && self.clip_path.is_none()
            && self.mask.is_none()
            && self.filter.is_none()
    }
}

/// Node's kind.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub enum Node {
    Group(Box<Group>),
    Path(Box<Path>),
    Image(Box<Image>),
    Text(Box<Text>),
}

impl Node {
    /// Returns node's ID.
    pub fn id(&self) -> &str {
        match self {
            Node::Group(ref e) => e.id.as_str(),
            Node::Path(ref e) => e.id.as_str(),
            Node::Image(ref e) => e.id.as_str(),
            Node::Text(ref e) => e.id.as_str(),
        }
    }

    /// Returns node's transform relative to its parent.
    pub fn transform(&self) -> Transform {
        match self {
            Node::Group(ref e) => e.transform,
            Node::Path(ref e) => e.transform,
            Node::Image(ref e) => e.transform,
            Node::Text(ref e) => e.transform,
        }
    }

    /// Returns node's absolute transform.
    ///
    /// Contains all ancestors transforms including the node's own.
    pub fn abs_transform(&self) -> Transform {
        match self {
            Node::Group(ref e) => e.abs_transform,
            Node::Path(ref e) => e.abs_transform,
            Node::Image(ref e) => e.abs_transform,
            Node::Text(ref e) => e.abs_transform,
        }
    }

    /// Returns node's effects.
    pub fn effects(&self) -> &Effects {
        match self {
            Node::Group(ref e) => &e.effects,
            Node::Path(ref e) => &e.effects,
            Node::Image(ref e) => &e.effects,
            Node::Text(ref e) => &e.effects,
        }
    }

    pub(crate) fn effects_mut(&mut self) -> &mut Effects {
        match self {
            Node::Group(ref mut e) => &mut e.effects,
            Node::Path(ref mut e) => &mut e.effects,
            Node::Image(ref mut e) => &mut e.effects,
            Node::Text(ref mut e) => &mut e.effects,
        }
    }

    pub(crate) fn set_id(&mut self, id: String) {
        match self {
            Node::Group(ref mut e) => e.id = id,
            Node::Path(ref mut e) => e.id = id,
            Node::Image(ref mut e) => e.id = id,
            Node::Text(ref mut e) => e.id = id,
        }
    }

    /// Returns node's bounding box in its own coordinates.
    ///
    /// `None` for empty groups.
    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Node::Group(ref group) => group.bounding_box,
            Node::Path(ref path) => Some(path.bounding_box),
            Node::Image(ref image) => Some(image.view_box.rect.to_rect()),
            Node::Text(ref text) => text.bounding_box(),
        }
    }

    /// Returns node's bounding box in canvas coordinates.
    pub fn abs_bounding_box(&self) -> Option<Rect> {
        geom::transform_rect(self.bounding_box()?, self.abs_transform())
    }
}

/// A group container.
///
/// Groups are never flattened, so the source structure is preserved.
///
/// `g`, `use`, `switch` and nested `svg` elements in SVG.
#[derive(Clone, Debug)]
pub struct Group {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    /// Can be empty.
    pub id: String,

    /// Element's transform relative to the parent.
    pub transform: Transform,

    /// Element's absolute transform.
    pub abs_transform: Transform,

    /// Opacity, clip path, mask and filter.
    pub effects: Effects,

    /// Union of the children bounding boxes in group coordinates.
    ///
    /// `None` when the group has no children with a bounding box.
    pub bounding_box: Option<Rect>,

    /// Group's children.
    pub children: Vec<Node>,
}

impl Group {
    pub(crate) fn empty() -> Self {
        Group {
            id: String::new(),
            transform: Transform::default(),
            abs_transform: Transform::default(),
            effects: Effects::default(),
            bounding_box: None,
            children: Vec::new(),
        }
    }

    /// Checks if the current group has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the first node with the given ID, in depth-first order.
    ///
    /// The group itself is included. Clip paths, masks and patterns are not searched.
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        for child in &self.children {
            if child.id() == id {
                return Some(child);
            }

            if let Node::Group(ref g) = child {
                if let Some(n) = g.node_by_id(id) {
                    return Some(n);
                }
            }
        }

        None
    }

    /// Recalculates the bounding box of this group and all of its subgroups.
    pub(crate) fn calculate_bounding_boxes(&mut self) {
        let mut bbox = BBox::default();
        for child in &mut self.children {
            if let Node::Group(ref mut g) = child {
                g.calculate_bounding_boxes();
            }

            if let Some(r) = child.bounding_box() {
                if let Some(r) = geom::transform_rect(r, child.transform()) {
                    bbox = bbox.expand(r);
                }
            }
        }

        self.bounding_box = bbox.to_rect();
    }
}

/// A shape primitive a path was built from.
///
/// Keeps the editable parameters of basic shapes, resolved to user units.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ShapeKind {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rx: f32,
        ry: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
    },
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Polyline,
    Polygon,
    Path,
}

/// A path element.
#[derive(Clone, Debug)]
pub struct Path {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    /// Can be empty.
    pub id: String,

    /// Element's transform relative to the parent.
    pub transform: Transform,

    /// Element's absolute transform.
    pub abs_transform: Transform,

    /// Opacity, clip path, mask and filter.
    pub effects: Effects,

    /// Element visibility.
    pub visibility: Visibility,

    /// The shape this path was built from.
    pub kind: ShapeKind,

    /// Fill style.
    pub fill: Option<Fill>,

    /// Stroke style.
    pub stroke: Option<Stroke>,

    /// Segments list in the element's own coordinates.
    pub data: Arc<tiny_skia_path::Path>,

    /// Element's object bounding box in its own coordinates.
    ///
    /// `objectBoundingBox` in SVG terms.
    pub bounding_box: Rect,
}

/// An embedded image kind.
#[derive(Clone)]
pub enum ImageKind {
    /// A reference to raw JPEG data. Should be decoded by the caller.
    JPEG(Arc<Vec<u8>>),
    /// A reference to raw PNG data. Should be decoded by the caller.
    PNG(Arc<Vec<u8>>),
    /// A reference to raw GIF data. Should be decoded by the caller.
    GIF(Arc<Vec<u8>>),
    /// A reference to raw WebP data. Should be decoded by the caller.
    WEBP(Arc<Vec<u8>>),
    /// A preprocessed SVG tree.
    SVG(Tree),
}

impl std::fmt::Debug for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ImageKind::JPEG(_) => f.write_str("ImageKind::JPEG(..)"),
            ImageKind::PNG(_) => f.write_str("ImageKind::PNG(..)"),
            ImageKind::GIF(_) => f.write_str("ImageKind::GIF(..)"),
            ImageKind::WEBP(_) => f.write_str("ImageKind::WEBP(..)"),
            ImageKind::SVG(_) => f.write_str("ImageKind::SVG(..)"),
        }
    }
}

/// A raster image element.
///
/// `image` element in SVG.
#[derive(Clone, Debug)]
pub struct Image {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    /// Can be empty.
    pub id: String,

    /// Element's transform relative to the parent.
    pub transform: Transform,

    /// Element's absolute transform.
    pub abs_transform: Transform,

    /// Opacity, clip path, mask and filter.
    pub effects: Effects,

    /// Element visibility.
    pub visibility: Visibility,

    /// An image rectangle in which it should be fit.
    ///
    /// Combination of the `x`, `y`, `width`, `height` and `preserveAspectRatio`
    /// attributes.
    pub view_box: ViewBox,

    /// Image data.
    pub kind: ImageKind,
}

/// A text anchor.
///
/// `text-anchor` attribute in the SVG.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// A text element.
///
/// Text is not laid out, only its content and style are resolved.
///
/// `text` element in SVG.
#[derive(Clone, Debug)]
pub struct Text {
    /// Element's ID.
    ///
    /// Taken from the SVG itself.
    /// Can be empty.
    pub id: String,

    /// Element's transform relative to the parent.
    pub transform: Transform,

    /// Element's absolute transform.
    pub abs_transform: Transform,

    /// Opacity, clip path, mask and filter.
    pub effects: Effects,

    /// Element visibility.
    pub visibility: Visibility,

    /// Anchor X position.
    pub x: f32,

    /// Anchor Y position.
    pub y: f32,

    /// Text content with whitespace already processed.
    pub content: String,

    /// Font family.
    ///
    /// `font-family` in SVG.
    pub font_family: String,

    /// Font size.
    ///
    /// `font-size` in SVG.
    pub font_size: NonZeroPositiveF32,

    /// Text anchor.
    pub anchor: TextAnchor,

    /// Fill style.
    pub fill: Option<Fill>,

    /// Stroke style.
    pub stroke: Option<Stroke>,
}

impl Text {
    /// Returns a zero-sized rectangle at the anchor position.
    pub fn bounding_box(&self) -> Option<Rect> {
        Rect::from_xywh(self.x, self.y, 0.0, 0.0)
    }
}

/// A parsed SVG document.
///
/// Contains the document size and the scene of top-level shapes.
#[derive(Clone, Debug)]
pub struct Tree {
    /// Document size.
    ///
    /// `None` when neither the root element nor its content define a valid size.
    pub size: Option<Size>,

    /// Document view box.
    ///
    /// The root `viewBox` or the bounding box of the content.
    pub view_box: Option<ViewBox>,

    /// The root group.
    ///
    /// Its transform maps the view box onto the document size.
    pub root: Group,
}

impl Tree {
    /// Returns the top-level shapes.
    pub fn shapes(&self) -> &[Node] {
        &self.root.children
    }

    /// Returns the first node with the given ID.
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        if id.is_empty() {
            return None;
        }

        self.root.node_by_id(id)
    }
}
