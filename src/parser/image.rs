// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use svgtypes::Length;

use super::context::State;
use super::converter::{self, Cache};
use super::svgtree::{AId, SvgNode};
use super::{units, FileFetcher, OptionLog, Options};
use crate::{Effects, Group, Image, ImageKind, Node, NonZeroRect, Size, Tree, ViewBox, Visibility};

#[derive(Clone, Copy, PartialEq, Debug)]
enum ImageFormat {
    PNG,
    JPEG,
    GIF,
    WEBP,
    SVG,
}

pub(crate) fn convert<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) {
    let _ = convert_impl(node, state, cache, parent);
}

fn convert_impl<'a>(
    node: SvgNode<'a, 'a>,
    state: &State<'a>,
    cache: &mut Cache,
    parent: &mut Group,
) -> Option<()> {
    let href = node
        .raw_attribute(AId::Href)
        .log_none(|| log::warn!("Image lacks the 'xlink:href' attribute. Skipped."))?;

    let kind = get_href_data(href, state.opt)?;

    let visibility: Visibility = state.style.get(AId::Visibility).unwrap_or_default();

    let actual_size = match kind {
        ImageKind::JPEG(ref data)
        | ImageKind::PNG(ref data)
        | ImageKind::GIF(ref data)
        | ImageKind::WEBP(ref data) => imagesize::blob_size(data)
            .ok()
            .and_then(|size| Size::from_wh(size.width as f32, size.height as f32))
            .log_none(|| log::warn!("Image has an invalid size. Skipped."))?,
        ImageKind::SVG(ref svg) => svg
            .size
            .log_none(|| log::warn!("Nested SVG image has no size. Skipped."))?,
    };

    let x = units::convert_user_length(node, AId::X, state, Length::zero());
    let y = units::convert_user_length(node, AId::Y, state, Length::zero());
    let mut width = units::convert_user_length(
        node,
        AId::Width,
        state,
        Length::new_number(actual_size.width() as f64),
    );
    let mut height = units::convert_user_length(
        node,
        AId::Height,
        state,
        Length::new_number(actual_size.height() as f64),
    );

    // A missing dimension keeps the intrinsic aspect.
    match (
        node.has_attribute(AId::Width),
        node.has_attribute(AId::Height),
    ) {
        (true, false) => height = actual_size.height() * (width / actual_size.width()),
        (false, true) => width = actual_size.width() * (height / actual_size.height()),
        _ => {}
    }

    let rect = NonZeroRect::from_xywh(x, y, width, height)
        .log_none(|| log::warn!("Image has an invalid size. Skipped."))?;

    let view_box = ViewBox {
        rect,
        aspect: node.attribute(AId::PreserveAspectRatio).unwrap_or_default(),
    };

    let mut image = Node::Image(Box::new(Image {
        id: String::new(),
        transform: state.transform,
        abs_transform: state.abs_transform,
        effects: Effects::default(),
        visibility,
        view_box,
        kind,
    }));

    if converter::apply_style(node, &mut image, crate::Transform::default(), state, cache) {
        image.set_id(converter::unique_id(node, state, cache));
        parent.children.push(image);
    }

    Some(())
}

fn get_href_data(href: &str, opt: &Options) -> Option<ImageKind> {
    if let Ok(url) = data_url::DataUrl::process(href) {
        if !opt.file_fetcher.allow_data_urls {
            log::warn!("Data URLs are not allowed. Image skipped.");
            return None;
        }

        let (data, _) = url.decode_to_vec().ok()?;
        let mime = format!(
            "{}/{}",
            url.mime_type().type_.as_str(),
            url.mime_type().subtype.as_str()
        );

        return match mime.as_str() {
            "image/jpg" | "image/jpeg" => Some(ImageKind::JPEG(Arc::new(data))),
            "image/png" => Some(ImageKind::PNG(Arc::new(data))),
            "image/gif" => Some(ImageKind::GIF(Arc::new(data))),
            "image/webp" => Some(ImageKind::WEBP(Arc::new(data))),
            "image/svg+xml" => load_sub_svg(&data, opt),
            "text/plain" => match get_image_data_format(&data) {
                Some(format) => make_kind(format, data, opt),
                None => load_sub_svg(&data, opt),
            },
            _ => {
                log::warn!("Unsupported image type '{}'. Skipped.", mime);
                None
            }
        };
    }

    let path = opt.get_abs_path(std::path::Path::new(href));
    let data = (opt.file_fetcher.fetch)(&path.to_string_lossy())?;
    match get_image_file_format(&path, &data) {
        Some(format) => make_kind(format, data, opt),
        None => {
            log::warn!("'{}' is not a PNG, JPEG, GIF, WebP or SVG(Z) image.", href);
            None
        }
    }
}

fn make_kind(format: ImageFormat, data: Vec<u8>, opt: &Options) -> Option<ImageKind> {
    match format {
        ImageFormat::JPEG => Some(ImageKind::JPEG(Arc::new(data))),
        ImageFormat::PNG => Some(ImageKind::PNG(Arc::new(data))),
        ImageFormat::GIF => Some(ImageKind::GIF(Arc::new(data))),
        ImageFormat::WEBP => Some(ImageKind::WEBP(Arc::new(data))),
        ImageFormat::SVG => load_sub_svg(&data, opt),
    }
}

/// Checks the magic bytes first, then the SVG(Z) extension.
fn get_image_file_format(path: &std::path::Path, data: &[u8]) -> Option<ImageFormat> {
    if let Some(format) = get_image_data_format(data) {
        return Some(format);
    }

    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
    if ext == "svg" || ext == "svgz" {
        return Some(ImageFormat::SVG);
    }

    None
}

fn get_image_data_format(data: &[u8]) -> Option<ImageFormat> {
    match imagesize::image_type(data).ok()? {
        imagesize::ImageType::Gif => Some(ImageFormat::GIF),
        imagesize::ImageType::Jpeg => Some(ImageFormat::JPEG),
        imagesize::ImageType::Png => Some(ImageFormat::PNG),
        imagesize::ImageType::Webp => Some(ImageFormat::WEBP),
        _ => None,
    }
}

/// Loads an SVG(Z) image as a nested tree.
///
/// The nested document cannot load any images of its own.
fn load_sub_svg(data: &[u8], opt: &Options) -> Option<ImageKind> {
    let sub_opt = Options {
        resources_dir: None,
        dpi: opt.dpi,
        font_family: opt.font_family.clone(),
        font_size: opt.font_size,
        languages: opt.languages.clone(),
        default_size: opt.default_size,
        resolution: None,
        file_fetcher: FileFetcher::disabled(),
    };

    match Tree::from_data(data, &sub_opt) {
        Ok(tree) => Some(ImageKind::SVG(tree)),
        Err(e) => {
            log::warn!("Failed to load a nested SVG image cause {}.", e);
            None
        }
    }
}
