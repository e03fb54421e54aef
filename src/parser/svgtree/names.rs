// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

macro_rules! svg_names {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $text:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[allow(missing_docs)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Parses a name from its SVG spelling.
            pub fn from_str(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Returns the SVG spelling of the name.
            pub fn to_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.to_str())
            }
        }
    };
}

svg_names! {
    /// An SVG element name.
    EId {
        A = "a",
        Circle = "circle",
        ClipPath = "clipPath",
        Defs = "defs",
        Desc = "desc",
        Ellipse = "ellipse",
        FeBlend = "feBlend",
        FeColorMatrix = "feColorMatrix",
        FeComponentTransfer = "feComponentTransfer",
        FeComposite = "feComposite",
        FeConvolveMatrix = "feConvolveMatrix",
        FeDiffuseLighting = "feDiffuseLighting",
        FeDisplacementMap = "feDisplacementMap",
        FeDistantLight = "feDistantLight",
        FeDropShadow = "feDropShadow",
        FeFlood = "feFlood",
        FeFuncA = "feFuncA",
        FeFuncB = "feFuncB",
        FeFuncG = "feFuncG",
        FeFuncR = "feFuncR",
        FeGaussianBlur = "feGaussianBlur",
        FeImage = "feImage",
        FeMerge = "feMerge",
        FeMergeNode = "feMergeNode",
        FeMorphology = "feMorphology",
        FeOffset = "feOffset",
        FePointLight = "fePointLight",
        FeSpecularLighting = "feSpecularLighting",
        FeSpotLight = "feSpotLight",
        FeTile = "feTile",
        FeTurbulence = "feTurbulence",
        Filter = "filter",
        G = "g",
        Image = "image",
        Line = "line",
        LinearGradient = "linearGradient",
        Marker = "marker",
        Mask = "mask",
        Metadata = "metadata",
        Path = "path",
        Pattern = "pattern",
        Polygon = "polygon",
        Polyline = "polyline",
        RadialGradient = "radialGradient",
        Rect = "rect",
        Script = "script",
        Stop = "stop",
        Style = "style",
        Svg = "svg",
        Switch = "switch",
        Symbol = "symbol",
        Text = "text",
        TextPath = "textPath",
        Title = "title",
        Tref = "tref",
        Tspan = "tspan",
        Use = "use",
    }
}

svg_names! {
    /// An SVG attribute name.
    AId {
        Amplitude = "amplitude",
        ClipPath = "clip-path",
        ClipPathUnits = "clipPathUnits",
        ClipRule = "clip-rule",
        Color = "color",
        ColorInterpolationFilters = "color-interpolation-filters",
        Cx = "cx",
        Cy = "cy",
        D = "d",
        Display = "display",
        Dx = "dx",
        Dy = "dy",
        Exponent = "exponent",
        Fill = "fill",
        FillOpacity = "fill-opacity",
        FillRule = "fill-rule",
        Filter = "filter",
        FilterUnits = "filterUnits",
        FloodColor = "flood-color",
        FloodOpacity = "flood-opacity",
        FontFamily = "font-family",
        FontSize = "font-size",
        Fx = "fx",
        Fy = "fy",
        GradientTransform = "gradientTransform",
        GradientUnits = "gradientUnits",
        Height = "height",
        Href = "href",
        Id = "id",
        In = "in",
        In2 = "in2",
        Intercept = "intercept",
        K1 = "k1",
        K2 = "k2",
        K3 = "k3",
        K4 = "k4",
        Mask = "mask",
        MaskContentUnits = "maskContentUnits",
        MaskType = "mask-type",
        MaskUnits = "maskUnits",
        Mode = "mode",
        Offset = "offset",
        Opacity = "opacity",
        Operator = "operator",
        Overflow = "overflow",
        PatternContentUnits = "patternContentUnits",
        PatternTransform = "patternTransform",
        PatternUnits = "patternUnits",
        Points = "points",
        PreserveAspectRatio = "preserveAspectRatio",
        PrimitiveUnits = "primitiveUnits",
        R = "r",
        Radius = "radius",
        RefX = "refX",
        RefY = "refY",
        RequiredExtensions = "requiredExtensions",
        RequiredFeatures = "requiredFeatures",
        Result = "result",
        Rx = "rx",
        Ry = "ry",
        Slope = "slope",
        Space = "space",
        SpreadMethod = "spreadMethod",
        StdDeviation = "stdDeviation",
        StopColor = "stop-color",
        StopOpacity = "stop-opacity",
        Stroke = "stroke",
        StrokeDasharray = "stroke-dasharray",
        StrokeDashoffset = "stroke-dashoffset",
        StrokeLinecap = "stroke-linecap",
        StrokeLinejoin = "stroke-linejoin",
        StrokeMiterlimit = "stroke-miterlimit",
        StrokeOpacity = "stroke-opacity",
        StrokeWidth = "stroke-width",
        Style = "style",
        SystemLanguage = "systemLanguage",
        TableValues = "tableValues",
        TextAnchor = "text-anchor",
        Transform = "transform",
        TransformOrigin = "transform-origin",
        Type = "type",
        Values = "values",
        ViewBox = "viewBox",
        Visibility = "visibility",
        Width = "width",
        X = "x",
        X1 = "x1",
        X2 = "x2",
        Y = "y",
        Y1 = "y1",
        Y2 = "y2",
    }
}
