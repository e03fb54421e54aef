// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use pico_args::Arguments;

const HELP: &str = "\
svgscene parses an SVG file and prints the resulting scene graph.

USAGE:
  svgscene [OPTIONS] <in-svg>   # from file
  svgscene [OPTIONS] -          # from stdin

OPTIONS:
  -h, --help                        Prints help information
  -V, --version                     Prints version information

  --dpi DPI                         Sets the resolution
                                    [default: 96] [possible values: 10..4000 (inclusive)]
  --languages LANG                  Sets a comma-separated list of languages that
                                    will be used during the 'systemLanguage'
                                    attribute resolving
                                    Examples: 'en-US', 'en-US, ru-RU', 'en, ru'
                                    [default: en]
  --resources-dir DIR               Sets a directory that will be used during
                                    relative paths resolving.
                                    [default: input file directory
                                    or none when reading from stdin]
  --font-family FAMILY              Sets the default font family that will be
                                    used when no 'font-family' is present
                                    [default: Times New Roman]
  --font-size SIZE                  Sets the default font size that will be
                                    used when no 'font-size' is present
                                    [default: 12] [possible values: 1..192 (inclusive)]
  --default-width LENGTH            Sets the default width of the SVG viewport
                                    used when there is no viewBox and
                                    document width or height are relative.
                                    [default: 100]
  --default-height LENGTH           Sets the default height of the SVG viewport
                                    [default: 100]
  --quiet                           Disables warnings

ARGS:
  <in-svg>                          Input file
";

#[derive(Debug)]
struct Args {
    dpi: u32,
    languages: Vec<String>,
    resources_dir: Option<PathBuf>,
    font_family: Option<String>,
    font_size: u32,
    default_width: u32,
    default_height: u32,
    quiet: bool,
    input: String,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    Ok(Args {
        dpi: input.opt_value_from_fn("--dpi", parse_dpi)?.unwrap_or(96),
        languages: input
            .opt_value_from_fn("--languages", parse_languages)?
            .unwrap_or_else(|| vec!["en".to_string()]),
        resources_dir: input.opt_value_from_str("--resources-dir")?,
        font_family: input.opt_value_from_str("--font-family")?,
        font_size: input
            .opt_value_from_fn("--font-size", parse_font_size)?
            .unwrap_or(12),
        default_width: input
            .opt_value_from_fn("--default-width", parse_length)?
            .unwrap_or(100),
        default_height: input
            .opt_value_from_fn("--default-height", parse_length)?
            .unwrap_or(100),
        quiet: input.contains("--quiet"),
        input: input.free_from_str()?,
    })
}

fn parse_dpi(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| "invalid number")?;

    if (10..=4000).contains(&n) {
        Ok(n)
    } else {
        Err("DPI out of bounds".to_string())
    }
}

fn parse_font_size(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| "invalid number")?;

    if n > 0 && n <= 192 {
        Ok(n)
    } else {
        Err("font size out of bounds".to_string())
    }
}

fn parse_languages(s: &str) -> Result<Vec<String>, String> {
    let langs: Vec<String> = s
        .split(',')
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .collect();

    if langs.is_empty() {
        return Err("languages list cannot be empty".to_string());
    }

    Ok(langs)
}

fn parse_length(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| "invalid length")?;

    if n > 0 {
        Ok(n)
    } else {
        Err("LENGTH cannot be zero".to_string())
    }
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        process::exit(1);
    }
}

fn process(args: Args) -> Result<(), String> {
    let from_stdin = args.input == "-";

    let resources_dir = match args.resources_dir {
        Some(v) => Some(v),
        None if from_stdin => None,
        // Get input file absolute directory.
        None => std::fs::canonicalize(&args.input)
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf())),
    };

    let default_size = svgscene::Size::from_wh(args.default_width as f32, args.default_height as f32)
        .ok_or("invalid default size")?;

    let opt = svgscene::Options {
        resources_dir,
        dpi: args.dpi as f32,
        font_family: args
            .font_family
            .unwrap_or_else(|| "Times New Roman".to_string()),
        font_size: args.font_size as f32,
        languages: args.languages,
        default_size,
        ..svgscene::Options::default()
    };

    let input_svg = if from_stdin {
        load_stdin()?
    } else {
        std::fs::read(&args.input).map_err(|e| e.to_string())?
    };

    let tree = svgscene::Tree::from_data(&input_svg, &opt).map_err(|e| e.to_string())?;

    let mut out = String::new();
    match tree.size {
        Some(size) => {
            let _ = writeln!(out, "size: {}x{}", size.width(), size.height());
        }
        None => out.push_str("size: none\n"),
    }
    dump_group(&tree.root, 0, &mut out);

    io::stdout()
        .write_all(out.as_bytes())
        .map_err(|_| "failed to write to the stdout".to_string())
}

fn dump_group(group: &svgscene::Group, depth: usize, out: &mut String) {
    for node in &group.children {
        let indent = "  ".repeat(depth);
        let id = if node.id().is_empty() {
            String::new()
        } else {
            format!(" #{}", node.id())
        };

        let effects = node.effects();
        let mut flags = String::new();
        if effects.clip_path.is_some() {
            flags.push_str(" clip");
        }
        if effects.mask.is_some() {
            flags.push_str(" mask");
        }
        if effects.filter.is_some() {
            flags.push_str(" filter");
        }

        let kind = match node {
            svgscene::Node::Group(_) => "group".to_string(),
            svgscene::Node::Path(ref path) => format!("path {:?}", path.kind),
            svgscene::Node::Image(ref image) => format!("image {:?}", image.kind),
            svgscene::Node::Text(ref text) => format!("text {:?}", text.content),
        };

        let _ = writeln!(out, "{}{}{}{}", indent, kind, id, flags);

        if let svgscene::Node::Group(ref g) = node {
            dump_group(g, depth + 1, out);
        }
    }
}

fn load_stdin() -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    handle
        .read_to_end(&mut buf)
        .map_err(|_| "failed to read from stdin".to_string())?;

    Ok(buf)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
