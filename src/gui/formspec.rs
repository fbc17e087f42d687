//! Form description parser
//!
//! Menu scripts describe their UI as a string of elements:
//!
//! ```text
//! size[8,5]label[0.5,0.5;Pick a world]button[1,2;3,1;btn_play;Play]button_exit[4,2;3,1;btn_quit;Quit]
//! ```
//!
//! Parameters are separated by `;`, values inside a parameter by `,`.
//! A backslash escapes `]`, `;`, `,` and itself.

use log::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Label {
        pos: (f32, f32),
        text: String,
    },
    Button {
        pos: (f32, f32),
        size: (f32, f32),
        name: String,
        label: String,
        /// Also reports `quit` when pressed
        exit: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSpec {
    /// Form size in units; `None` until a `size[]` element is seen
    pub size: Option<(f32, f32)>,
    pub widgets: Vec<Widget>,
}

/// Splits on `sep` outside of backslash escapes. Escapes are kept.
fn split_escaped(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Largest coordinate or size accepted, in form units
const MAX_UNITS: f32 = 1000.0;

fn parse_unit(value: &str) -> Option<f32> {
    let v: f32 = value.trim().parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(v.clamp(-MAX_UNITS, MAX_UNITS))
}

fn parse_pair(param: &str) -> Option<(f32, f32)> {
    let values = split_escaped(param, ',');
    if values.len() != 2 {
        return None;
    }
    Some((parse_unit(values[0])?, parse_unit(values[1])?))
}

fn parse_element(kind: &str, body: &str) -> Result<Widget, String> {
    let params = split_escaped(body, ';');
    match kind {
        "label" => {
            if params.len() != 2 {
                return Err(format!("label expects 2 parameters, got {}", params.len()));
            }
            let pos = parse_pair(params[0]).ok_or("invalid label position")?;
            Ok(Widget::Label {
                pos,
                text: unescape(params[1]),
            })
        }
        "button" | "button_exit" => {
            if params.len() != 4 {
                return Err(format!("{} expects 4 parameters, got {}", kind, params.len()));
            }
            let pos = parse_pair(params[0]).ok_or("invalid button position")?;
            let size = parse_pair(params[1]).ok_or("invalid button size")?;
            Ok(Widget::Button {
                pos,
                size,
                name: unescape(params[2]),
                label: unescape(params[3]),
                exit: kind == "button_exit",
            })
        }
        _ => Err(format!("unsupported element \"{}\"", kind)),
    }
}

/// Parses a form description. Malformed or unknown elements are logged and skipped.
pub fn parse(source: &str) -> FormSpec {
    let mut spec = FormSpec::default();

    for element in split_escaped(source, ']') {
        let element = element.trim();
        if element.is_empty() {
            continue;
        }
        let Some((kind, body)) = element.split_once('[') else {
            warn!("Form element without parameters: \"{}\"", element);
            continue;
        };
        let kind = kind.trim();

        if kind == "size" {
            match parse_pair(body) {
                Some(size) => spec.size = Some(size),
                None => warn!("Invalid form size \"{}\"", body),
            }
            continue;
        }

        match parse_element(kind, body) {
            Ok(widget) => spec.widgets.push(widget),
            Err(e) => warn!("Skipping form element \"{}\": {}", element, e),
        }
    }

    spec
}
