use once_cell::sync::Lazy;

use svgscene::{Color, Node, NonZeroRect, Paint, Rect, ShapeKind, Size, Transform, Tree};

static OPTIONS: Lazy<svgscene::Options> = Lazy::new(svgscene::Options::default);

fn parse(svg: &str) -> Tree {
    Tree::from_str(svg, &OPTIONS).unwrap()
}

fn path(node: &Node) -> &svgscene::Path {
    match node {
        Node::Path(ref path) => path,
        n => panic!("expected a path, got {:?}", n),
    }
}

fn group(node: &Node) -> &svgscene::Group {
    match node {
        Node::Group(ref group) => group,
        n => panic!("expected a group, got {:?}", n),
    }
}

fn assert_rect_approx(a: Option<Rect>, b: Option<Rect>) {
    let (a, b) = (a.unwrap(), b.unwrap());
    let eq = |x: f32, y: f32| (x - y).abs() < 0.001;
    assert!(
        eq(a.x(), b.x()) && eq(a.y(), b.y()) && eq(a.width(), b.width()) && eq(a.height(), b.height()),
        "{:?} != {:?}",
        a,
        b
    );
}

fn fill_color(path: &svgscene::Path) -> Option<Color> {
    match path.fill.as_ref()?.paint {
        Paint::Color(c) => Some(c),
        _ => None,
    }
}

#[test]
fn percentage_rect() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 200 100'>
        <rect x='10' y='10' width='50%' height='20' fill='#ff0000'/>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(tree.shapes().len(), 1);
    let rect = path(&tree.shapes()[0]);
    match rect.kind {
        ShapeKind::Rect { x, y, width, height, .. } => {
            assert_eq!((x, y), (10.0, 10.0));
            assert_eq!(width, 100.0);
            assert_eq!(height, 20.0);
        }
        k => panic!("expected a rect, got {:?}", k),
    }
    assert_eq!(fill_color(rect), Some(Color::new_rgb(255, 0, 0)));
}

#[test]
fn translated_circle() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <circle transform='translate(10 20)' cx='5' cy='5' r='5'/>
    </svg>
    ";

    let tree = parse(svg);
    let node = &tree.root.children[0];
    assert_eq!(node.transform(), Transform::from_translate(10.0, 20.0));
    assert_rect_approx(node.bounding_box(), Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    assert_rect_approx(node.abs_bounding_box(), Rect::from_xywh(10.0, 20.0, 10.0, 10.0));
}

#[test]
fn circle_in_translated_group() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <g transform='translate(10,10)'>
            <circle cx='0' cy='0' r='5'/>
        </g>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(tree.shapes().len(), 1);
    let g = group(&tree.shapes()[0]);
    assert_eq!(g.children.len(), 1);

    let circle = &g.children[0];
    assert!(matches!(path(circle).kind, ShapeKind::Circle { cx, cy, r } if cx == 0.0 && cy == 0.0 && r == 5.0));

    let mut center = [svgscene::tiny_skia_path::Point::from_xy(0.0, 0.0)];
    circle.abs_transform().map_points(&mut center);
    assert_eq!((center[0].x, center[0].y), (10.0, 10.0));
    assert_rect_approx(circle.abs_bounding_box(), Rect::from_xywh(5.0, 5.0, 10.0, 10.0));
}

#[test]
fn nested_transforms_are_local() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <g transform='translate(10 0)'>
            <rect transform='scale(2)' width='1' height='1'/>
        </g>
    </svg>
    ";

    let tree = parse(svg);
    let g = group(&tree.root.children[0]);
    let rect = &g.children[0];
    assert_eq!(rect.transform(), Transform::from_scale(2.0, 2.0));
    assert_eq!(
        rect.abs_transform(),
        Transform::from_row(2.0, 0.0, 0.0, 2.0, 10.0, 0.0)
    );
}

#[test]
fn forward_gradient_reference() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='10' height='10' fill='url(#lg)'/>
        <linearGradient id='lg'>
            <stop offset='0' stop-color='white'/>
            <stop offset='1' stop-color='black'/>
        </linearGradient>
    </svg>
    ";

    let tree = parse(svg);
    let rect = path(&tree.root.children[0]);
    assert!(matches!(
        rect.fill.as_ref().map(|f| &f.paint),
        Some(Paint::LinearGradient(_))
    ));
}

#[test]
fn gradient_inherits_stops() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <linearGradient id='base'>
            <stop offset='0' stop-color='white'/>
            <stop offset='1' stop-color='black'/>
        </linearGradient>
        <linearGradient id='lg' xlink:href='#base' x1='0.5'
                        xmlns:xlink='http://www.w3.org/1999/xlink'/>
        <rect width='10' height='10' fill='url(#lg)'/>
    </svg>
    ";

    let tree = parse(svg);
    let rect = path(&tree.root.children[0]);
    match rect.fill.as_ref().map(|f| &f.paint) {
        Some(Paint::LinearGradient(ref lg)) => {
            assert_eq!(lg.stops.len(), 2);
            assert_eq!(lg.x1, 0.5);
        }
        p => panic!("expected a linear gradient, got {:?}", p),
    }
}

#[test]
fn recursive_gradient() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <linearGradient id='lg1' href='#lg2'>
            <stop offset='0' stop-color='white'/>
            <stop offset='1' stop-color='black'/>
        </linearGradient>
        <linearGradient id='lg2' href='#lg1'/>
        <rect width='10' height='10' fill='url(#lg1)'/>
    </svg>
    ";

    let tree = parse(svg);
    let rect = path(&tree.root.children[0]);
    assert!(rect.fill.is_none());
}

fn gradient_chain(links: usize) -> String {
    let mut svg = String::from("<svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>");
    for i in 0..links {
        svg.push_str(&format!("<linearGradient id='lg{}' href='#lg{}'/>", i, i + 1));
    }
    svg.push_str(&format!(
        "<linearGradient id='lg{}'>\
            <stop offset='0' stop-color='white'/>\
            <stop offset='1' stop-color='black'/>\
        </linearGradient>",
        links
    ));
    svg.push_str("<rect width='10' height='10' fill='url(#lg0)'/></svg>");
    svg
}

#[test]
fn href_chain_limit() {
    let tree = parse(&gradient_chain(16));
    assert!(path(&tree.root.children[0]).fill.is_some());

    let tree = parse(&gradient_chain(17));
    assert!(path(&tree.root.children[0]).fill.is_none());
}

#[test]
fn undefined_use() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <use href='#missing'/>
        <rect width='10' height='10'/>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(tree.root.children.len(), 1);
}

#[test]
fn self_recursive_use() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <use id='u' href='#u'/>
        <g id='g'>
            <use href='#g'/>
        </g>
    </svg>
    ";

    let tree = parse(svg);
    let g = group(&tree.root.children[0]);
    assert!(!g.has_children());
}

#[test]
fn use_offset() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <defs>
            <rect id='r' width='10' height='10'/>
        </defs>
        <use href='#r' x='5' y='7'/>
    </svg>
    ";

    let tree = parse(svg);
    let g = group(&tree.root.children[0]);
    assert_eq!(g.transform, Transform::from_translate(5.0, 7.0));
    // Instantiated content has no ids.
    assert_eq!(g.children[0].id(), "");
    assert!(tree.node_by_id("r").is_none());
}

#[test]
fn absolute_units() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='200' height='200'>
        <rect width='1in' height='2.54cm'/>
    </svg>
    ";

    let tree = parse(svg);
    match path(&tree.root.children[0]).kind {
        ShapeKind::Rect { width, height, .. } => {
            assert_eq!(width, 96.0);
            assert!((height - 96.0).abs() < 0.001);
        }
        k => panic!("expected a rect, got {:?}", k),
    }
}

#[test]
fn font_relative_units() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='200' height='200'>
        <g font-size='20'>
            <rect width='2em' height='1ex'/>
        </g>
    </svg>
    ";

    let tree = parse(svg);
    let g = group(&tree.root.children[0]);
    match path(&g.children[0]).kind {
        ShapeKind::Rect { width, height, .. } => {
            assert_eq!(width, 40.0);
            assert_eq!(height, 10.0);
        }
        k => panic!("expected a rect, got {:?}", k),
    }
}

#[test]
fn style_inheritance() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <g fill='red' opacity='0.5'>
            <rect width='10' height='10'/>
            <rect width='10' height='10' style='fill:green'/>
            <rect width='10' height='10' fill='blue' style='fill:inherit'/>
        </g>
    </svg>
    ";

    let tree = parse(svg);
    let g = group(&tree.root.children[0]);
    assert_eq!(g.effects.opacity.get(), 0.5);

    assert_eq!(fill_color(path(&g.children[0])), Some(Color::new_rgb(255, 0, 0)));
    assert_eq!(fill_color(path(&g.children[1])), Some(Color::new_rgb(0, 128, 0)));
    assert_eq!(fill_color(path(&g.children[2])), Some(Color::new_rgb(255, 0, 0)));

    // `opacity` is not inherited.
    assert_eq!(g.children[0].effects().opacity.get(), 1.0);
}

#[test]
fn duplicated_id() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect id='r' width='10' height='10'/>
        <rect id='r' width='20' height='20'/>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(tree.root.children[0].id(), "r");
    assert_eq!(tree.root.children[1].id(), "");
}

#[test]
fn display_none() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <g style='display:none'>
            <rect width='10' height='10'/>
        </g>
        <rect width='10' height='10' display='none'/>
    </svg>
    ";

    let tree = parse(svg);
    assert!(!tree.root.has_children());
}

#[test]
fn invisible_shape_is_kept() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='10' height='10' fill='none'/>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(
        path(&tree.root.children[0]).visibility,
        svgscene::Visibility::Hidden
    );
}

#[test]
fn switch_picks_first_valid_child() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <switch>
            <rect systemLanguage='ru' width='10' height='10'/>
            <circle r='5'/>
            <ellipse rx='5' ry='5'/>
        </switch>
    </svg>
    ";

    let tree = parse(svg);
    let g = group(&tree.root.children[0]);
    assert_eq!(g.children.len(), 1);
    assert!(matches!(path(&g.children[0]).kind, ShapeKind::Circle { .. }));
}

#[test]
fn clip_path() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <clipPath id='clip'>
            <rect width='5' height='5'/>
        </clipPath>
        <rect width='10' height='10' clip-path='url(#clip)'/>
    </svg>
    ";

    let tree = parse(svg);
    let clip = tree.root.children[0].effects().clip_path.clone().unwrap();
    assert_eq!(clip.id, "clip");
    assert_eq!(clip.root.children.len(), 1);
}

#[test]
fn clip_path_with_invalid_child() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 1 1'>
        <clipPath id='clip1'>
            <rect/>
        </clipPath>
        <rect clip-path='url(#clip1)' width='10' height='10'/>
    </svg>
    ";

    let tree = parse(svg);
    // clipPath is invalid and should be removed together with rect.
    assert!(!tree.root.has_children());
}

#[test]
fn undefined_clip_path_is_ignored() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='10' height='10' clip-path='url(#missing)'/>
    </svg>
    ";

    let tree = parse(svg);
    assert!(tree.root.children[0].effects().clip_path.is_none());
}

#[test]
fn mask() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <mask id='m' maskUnits='userSpaceOnUse' x='0' y='0' width='50' height='50'>
            <rect width='5' height='5' fill='white'/>
        </mask>
        <rect width='10' height='10' mask='url(#m)'/>
    </svg>
    ";

    let tree = parse(svg);
    let mask = tree.root.children[0].effects().mask.clone().unwrap();
    assert_eq!(mask.rect, NonZeroRect::from_xywh(0.0, 0.0, 50.0, 50.0).unwrap());
}

#[test]
fn filter_primitives_from_href() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <filter id='f1'>
            <feGaussianBlur stdDeviation='2'/>
        </filter>
        <filter id='f2' href='#f1' filterUnits='userSpaceOnUse'/>
        <rect width='10' height='10' filter='url(#f2)'/>
    </svg>
    ";

    let tree = parse(svg);
    let filter = tree.root.children[0].effects().filter.clone().unwrap();
    assert_eq!(filter.primitives.len(), 1);
    assert!(matches!(
        filter.primitives[0].kind,
        svgscene::filter::Kind::GaussianBlur(_)
    ));
}

#[test]
fn nested_svg_is_clipped() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <svg x='10' y='10' width='20' height='20' viewBox='0 0 10 10'>
            <rect width='100' height='100'/>
        </svg>
    </svg>
    ";

    let tree = parse(svg);
    let outer = group(&tree.root.children[0]);
    let viewport = group(&outer.children[0]);
    assert_eq!(viewport.transform, Transform::from_row(2.0, 0.0, 0.0, 2.0, 10.0, 10.0));
    assert!(viewport.effects.clip_path.is_some());
}

#[test]
fn symbol_instance() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <symbol id='s' viewBox='0 0 10 10'>
            <rect width='10' height='10'/>
        </symbol>
        <use href='#s' width='20' height='20'/>
    </svg>
    ";

    let tree = parse(svg);
    let instance = group(&tree.root.children[0]);
    let viewport = group(&instance.children[0]);
    assert_eq!(viewport.transform, Transform::from_scale(2.0, 2.0));
}

fn pattern(path: &svgscene::Path) -> &svgscene::Pattern {
    match path.fill.as_ref().map(|f| &f.paint) {
        Some(Paint::Pattern(ref patt)) => patt,
        p => panic!("expected a pattern, got {:?}", p),
    }
}

#[test]
fn pattern_tile_uses_own_bbox() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <pattern id='patt' width='0.5' height='0.25'>
            <rect width='5' height='5'/>
        </pattern>
        <rect width='10' height='20' fill='url(#patt)'/>
        <rect x='10' y='10' width='40' height='40' fill='url(#patt)'/>
    </svg>
    ";

    let tree = parse(svg);
    let small = pattern(path(&tree.root.children[0]));
    let large = pattern(path(&tree.root.children[1]));
    assert_eq!(small.id, "patt");
    assert_rect_approx(Some(small.rect.to_rect()), Rect::from_xywh(0.0, 0.0, 5.0, 5.0));
    assert_rect_approx(Some(large.rect.to_rect()), Rect::from_xywh(10.0, 10.0, 20.0, 10.0));
    // Content is in user space.
    assert_eq!(small.root.children[0].transform(), Transform::default());
}

#[test]
fn pattern_content_in_object_bbox() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <pattern id='patt' patternUnits='userSpaceOnUse' patternContentUnits='objectBoundingBox'
                 width='10' height='10'>
            <rect width='0.5' height='0.5'/>
        </pattern>
        <rect width='40' height='20' fill='url(#patt)'/>
        <rect width='10' height='30' fill='url(#patt)'/>
    </svg>
    ";

    let tree = parse(svg);
    let first = pattern(path(&tree.root.children[0]));
    let second = pattern(path(&tree.root.children[1]));

    // The tile itself stays in user space.
    assert_rect_approx(Some(first.rect.to_rect()), Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    assert_rect_approx(Some(second.rect.to_rect()), Rect::from_xywh(0.0, 0.0, 10.0, 10.0));

    // Content is scaled by the bbox of each shape.
    let content = group(&first.root.children[0]);
    assert_eq!(content.transform, Transform::from_scale(40.0, 20.0));
    let content = group(&second.root.children[0]);
    assert_eq!(content.transform, Transform::from_scale(10.0, 30.0));
    match path(&content.children[0]).kind {
        ShapeKind::Rect { width, height, .. } => assert_eq!((width, height), (0.5, 0.5)),
        k => panic!("expected a rect, got {:?}", k),
    }
}

#[test]
fn svgz() {
    use std::io::Write;

    let svg = "<svg xmlns='http://www.w3.org/2000/svg' width='10' height='20'/>";
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(svg.as_bytes()).unwrap();
    let data = encoder.finish().unwrap();

    let tree = Tree::from_data(&data, &OPTIONS).unwrap();
    assert_eq!(tree.size, Size::from_wh(10.0, 20.0));
}

fn nested_uses(levels: usize) -> String {
    let mut svg = String::from("<svg xmlns='http://www.w3.org/2000/svg' width='10' height='10'><defs>");
    svg.push_str("<rect id='l0' width='1' height='1'/>");
    for i in 1..=levels {
        svg.push_str(&format!("<g id='l{}'>", i));
        for _ in 0..10 {
            svg.push_str(&format!("<use href='#l{}'/>", i - 1));
        }
        svg.push_str("</g>");
    }
    svg.push_str(&format!("</defs><use href='#l{}'/></svg>", levels));
    svg
}

#[test]
fn use_expansion_limit() {
    // 70 elements that expand into more than two million nodes.
    let res = Tree::from_str(&nested_uses(6), &OPTIONS);
    assert!(matches!(res, Err(svgscene::Error::ElementsLimitReached)));
}

#[test]
fn use_expansion_below_limit() {
    let tree = parse(&nested_uses(2));
    let top = group(&tree.root.children[0]);
    let level2 = group(&top.children[0]);
    assert_eq!(level2.children.len(), 10);
}

#[test]
fn size_detection_1() {
    let svg = "<svg viewBox='0 0 10 20' xmlns='http://www.w3.org/2000/svg'/>";
    let tree = parse(svg);
    assert_eq!(tree.size, Size::from_wh(10.0, 20.0));
}

#[test]
fn size_detection_2() {
    let svg =
        "<svg width='30' height='40' viewBox='0 0 10 20' xmlns='http://www.w3.org/2000/svg'/>";
    let tree = parse(svg);
    assert_eq!(tree.size, Size::from_wh(30.0, 40.0));
}

#[test]
fn size_detection_3() {
    let svg =
        "<svg width='50%' height='100%' viewBox='0 0 10 20' xmlns='http://www.w3.org/2000/svg'/>";
    let tree = parse(svg);
    assert_eq!(tree.size, Size::from_wh(5.0, 20.0));
}

#[test]
fn size_detection_4() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg'>
        <circle cx='18' cy='18' r='18'/>
    </svg>
    ";
    let tree = parse(svg);
    let size = tree.size.unwrap();
    assert_rect_approx(Rect::from_xywh(0.0, 0.0, size.width(), size.height()), Rect::from_xywh(0.0, 0.0, 36.0, 36.0));
    assert_rect_approx(
        tree.view_box.map(|vb| vb.rect.to_rect()),
        Rect::from_xywh(0.0, 0.0, 36.0, 36.0),
    );
}

#[test]
fn size_detection_5() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg'/>";
    let tree = parse(svg);
    assert_eq!(tree.size, None);
    assert!(tree.view_box.is_none());
}

#[test]
fn resolution_replaces_default_size() {
    let opt = svgscene::Options {
        resolution: Some(svgscene::Resolution {
            bounds_in_pixels: NonZeroRect::from_xywh(0.0, 0.0, 400.0, 200.0).unwrap(),
            pixels_per_inch: 192.0,
        }),
        ..svgscene::Options::default()
    };

    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='50%' height='50%'>
        <rect width='1in' height='1in'/>
    </svg>
    ";

    let tree = Tree::from_str(svg, &opt).unwrap();
    assert_eq!(tree.size, Size::from_wh(200.0, 100.0));
    match path(&tree.root.children[0]).kind {
        ShapeKind::Rect { width, .. } => assert_eq!(width, 192.0),
        k => panic!("expected a rect, got {:?}", k),
    }
}

#[test]
fn public_length_api() {
    let settings = svgscene::Settings::default();
    let reference = Size::from_wh(200.0, 100.0).unwrap();

    assert_eq!(
        svgscene::resolve_length("50%", svgscene::Axis::Horizontal, reference, settings),
        Some(100.0)
    );
    assert_eq!(
        svgscene::resolve_length("1in", svgscene::Axis::Vertical, reference, settings),
        Some(96.0)
    );
    assert_eq!(
        svgscene::resolve_length("abc", svgscene::Axis::Vertical, reference, settings),
        None
    );
}

#[test]
fn rect_radius_is_clamped() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='20' height='10' rx='15'/>
    </svg>
    ";

    let tree = parse(svg);
    match path(&tree.root.children[0]).kind {
        ShapeKind::Rect { rx, ry, .. } => {
            assert_eq!(rx, 10.0);
            assert_eq!(ry, 5.0);
        }
        k => panic!("expected a rect, got {:?}", k),
    }
}

#[test]
fn invalid_shapes_are_skipped() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='-10' height='10'/>
        <circle r='0'/>
        <polyline points='10 10'/>
        <ellipse rx='5'/>
        <path d=''/>
    </svg>
    ";

    let tree = parse(svg);
    // `ellipse` copies `rx` into a missing `ry`.
    assert_eq!(tree.root.children.len(), 1);
    assert!(matches!(
        path(&tree.root.children[0]).kind,
        ShapeKind::Ellipse { rx, ry, .. } if rx == 5.0 && ry == 5.0
    ));
}

#[test]
fn path_is_parsed_up_to_an_error() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <path d='M 10 20 L 30 40 L 50 x'/>
    </svg>
    ";

    let tree = parse(svg);
    let p = path(&tree.root.children[0]);
    assert_eq!(p.kind, ShapeKind::Path);
    assert_eq!(p.data.len(), 2);
}

#[test]
fn stroke_properties() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='10' height='10' fill='none' stroke='#00f8'
              stroke-width='2' stroke-dasharray='1 2 3' stroke-miterlimit='0.5'/>
    </svg>
    ";

    let tree = parse(svg);
    let p = path(&tree.root.children[0]);
    assert!(p.fill.is_none());

    let stroke = p.stroke.as_ref().unwrap();
    assert_eq!(stroke.paint, Paint::Color(Color::new_rgb(0, 0, 255)));
    assert!((stroke.opacity.get() - 0x88 as f32 / 255.0).abs() < 0.01);
    assert_eq!(stroke.width.get(), 2.0);
    assert_eq!(stroke.dasharray, Some(vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]));
    assert_eq!(stroke.miterlimit.get(), 1.0);
}

#[test]
fn paint_fallback() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='10' height='10' fill='url(#missing) green'/>
        <rect width='10' height='10' fill='url(#missing)'/>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(fill_color(path(&tree.root.children[0])), Some(Color::new_rgb(0, 128, 0)));
    assert!(path(&tree.root.children[1]).fill.is_none());
}

#[test]
fn current_color() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <g color='blue'>
            <rect width='10' height='10' fill='currentColor'/>
        </g>
    </svg>
    ";

    let tree = parse(svg);
    let g = group(&tree.root.children[0]);
    assert_eq!(fill_color(path(&g.children[0])), Some(Color::new_rgb(0, 0, 255)));
}

#[test]
fn single_stop_gradient_is_a_color() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <linearGradient id='lg'>
            <stop offset='0' stop-color='red' stop-opacity='0.5'/>
        </linearGradient>
        <rect width='10' height='10' fill='url(#lg)'/>
    </svg>
    ";

    let tree = parse(svg);
    let p = path(&tree.root.children[0]);
    assert_eq!(fill_color(p), Some(Color::new_rgb(255, 0, 0)));
    assert_eq!(p.fill.as_ref().unwrap().opacity.get(), 0.5);
}

#[test]
fn object_bbox_gradient_on_empty_bbox() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <linearGradient id='lg'>
            <stop offset='0' stop-color='white'/>
            <stop offset='1' stop-color='black'/>
        </linearGradient>
        <line x2='10' stroke='url(#lg) red'/>
    </svg>
    ";

    let tree = parse(svg);
    let stroke = path(&tree.root.children[0]).stroke.as_ref().unwrap();
    assert_eq!(stroke.paint, Paint::Color(Color::new_rgb(255, 0, 0)));
}

#[test]
fn unknown_elements_are_skipped() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' xmlns:x='http://example.com' width='100' height='100'>
        <title>Title</title>
        <x:shape/>
        <unknown/>
        <rect width='10' height='10'/>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(tree.root.children.len(), 1);
}

#[test]
fn non_invertible_transform_skips_element() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='100' height='100'>
        <rect width='10' height='10' transform='scale(0)'/>
    </svg>
    ";

    let tree = parse(svg);
    assert!(!tree.root.has_children());
}

#[test]
fn root_view_box_transform() {
    let svg = "
    <svg xmlns='http://www.w3.org/2000/svg' width='200' height='100' viewBox='0 0 20 10'>
        <rect width='10' height='10'/>
    </svg>
    ";

    let tree = parse(svg);
    assert_eq!(tree.root.transform, Transform::from_scale(10.0, 10.0));
    assert_eq!(
        tree.root.children[0].abs_transform(),
        Transform::from_scale(10.0, 10.0)
    );
}
