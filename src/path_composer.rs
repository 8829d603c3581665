//! Path algebra for operation paths.
//!
//! Every path produced here starts with `/` and never ends with `/` unless it
//! is exactly `/`. Segments are joined with exactly one `/` at each junction.

use indexmap::IndexMap;

/// Composes the absolute path of an operation from the inherited parent path,
/// the class-level path and the method-level path.
///
/// Returns `None` when neither the class nor the method declares a path: such
/// a method is not routable.
pub fn compose(parent_path: &str, class_path: Option<&str>, method_path: Option<&str>) -> Option<String> {
    if class_path.is_none() && method_path.is_none() {
        return None;
    }

    let mut path = String::new();
    if !parent_path.is_empty() && parent_path != "/" {
        if !parent_path.starts_with('/') {
            path.push('/');
        }
        path.push_str(parent_path.strip_suffix('/').unwrap_or(parent_path));
    }

    if let Some(class_path) = class_path {
        append_segment(&mut path, class_path);
    }

    if let Some(method_path) = method_path.filter(|p| *p != "/") {
        append_segment(&mut path, method_path.strip_suffix('/').unwrap_or(method_path));
    }

    Some(normalize(&path))
}

fn append_segment(path: &mut String, segment: &str) {
    if segment.is_empty() {
        return;
    }
    match (path.ends_with('/'), segment.starts_with('/')) {
        (true, true) => path.push_str(&segment[1..]),
        (false, false) if !path.is_empty() => {
            path.push('/');
            path.push_str(segment);
        }
        _ => path.push_str(segment),
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut output = String::with_capacity(trimmed.len() + 1);
    output.push('/');
    output.push_str(trimmed);
    if output.len() > 1 && output.ends_with('/') {
        output.pop();
    }
    output
}

/// Rewrites regex-constrained templates (`{id: [0-9]+}`) into plain `{id}`
/// and returns the regex of each constrained template by parameter name.
/// Unconstrained templates pass through unchanged.
pub fn extract_path_parameters(path: &str) -> (String, IndexMap<String, String>) {
    let mut output = String::with_capacity(path.len());
    let mut regexes = IndexMap::new();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let template = &rest[start..];
        let Some(end) = matching_brace(template) else {
            output.push_str(template);
            rest = "";
            break;
        };

        let inner = &template[1..end];
        match inner.split_once(':') {
            Some((name, regex)) => {
                let name = name.trim();
                regexes.insert(name.to_string(), regex.trim().to_string());
                output.push('{');
                output.push_str(name);
                output.push('}');
            }
            None => output.push_str(&template[..=end]),
        }
        rest = &template[end + 1..];
    }
    output.push_str(rest);

    (output, regexes)
}

/// Byte offset of the `}` closing the `{` at offset 0, honouring nested
/// braces inside regexes such as `{id:[0-9]{1,3}}`.
fn matching_brace(template: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, byte) in template.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
