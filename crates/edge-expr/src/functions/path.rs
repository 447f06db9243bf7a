//! Path decomposition over `/`-separated paths.
//!
//! These are purely lexical and behave the same on every platform, since the
//! inputs are request paths rather than filesystem paths.

use crate::registry::{Args, Arity, FunctionDef};
use crate::sentinel::Sentinel;

pub(crate) const PATH_BASE: FunctionDef = FunctionDef::new(
    "path_base",
    Arity::exactly(1),
    "Last element of a path",
    path_base_fn,
);

pub(crate) const PATH_DIR: FunctionDef = FunctionDef::new(
    "path_dir",
    Arity::exactly(1),
    "Everything but the last element of a path",
    path_dir_fn,
);

pub(crate) const PATH_EXT: FunctionDef = FunctionDef::new(
    "path_ext",
    Arity::exactly(1),
    "Extension of the last element, including the dot",
    path_ext_fn,
);

fn path_base_fn(args: &Args<'_>) -> Result<String, Sentinel> {
    Ok(path_base(args.str(0)))
}

fn path_dir_fn(args: &Args<'_>) -> Result<String, Sentinel> {
    Ok(path_dir(args.str(0)))
}

fn path_ext_fn(args: &Args<'_>) -> Result<String, Sentinel> {
    Ok(path_ext(args.str(0)).to_string())
}

/// Last element of `path`.
///
/// Trailing slashes are ignored. An empty path yields `.` and a path of only
/// slashes yields `/`.
pub fn path_base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rfind('/') {
        Some(i) => trimmed[i + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// All but the last element of `path`, cleaned. `.` when there is no parent.
pub fn path_dir(path: &str) -> String {
    let dir = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    };
    clean_path(dir)
}

/// Extension of the last element, starting at its final dot; `""` if none.
pub fn path_ext(path: &str) -> &str {
    for (i, b) in path.bytes().enumerate().rev() {
        match b {
            b'/' => break,
            b'.' => return &path[i..],
            _ => {}
        }
    }
    ""
}

/// Shortest lexically equivalent path.
///
/// Repeated slashes collapse, `.` elements drop, `..` removes the preceding
/// element, and `..` above the root of an absolute path is discarded. The
/// empty result is `.`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut elements: Vec<&str> = Vec::new();
    for element in path.split('/') {
        match element {
            "" | "." => {}
            ".." => match elements.last() {
                Some(&last) if last != ".." => {
                    elements.pop();
                }
                _ if rooted => {}
                _ => elements.push(".."),
            },
            other => elements.push(other),
        }
    }

    let joined = elements.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_base() {
        assert_eq!(path_base("/static/img/logo.png"), "logo.png");
        assert_eq!(path_base("/static/img/"), "img");
        assert_eq!(path_base("logo.png"), "logo.png");
        assert_eq!(path_base(""), ".");
        assert_eq!(path_base("///"), "/");
    }

    #[test]
    fn test_path_dir() {
        assert_eq!(path_dir("/static/img/logo.png"), "/static/img");
        assert_eq!(path_dir("/logo.png"), "/");
        assert_eq!(path_dir("logo.png"), ".");
        assert_eq!(path_dir("a//b/../c/d"), "a/c");
        assert_eq!(path_dir(""), ".");
    }

    #[test]
    fn test_path_ext() {
        assert_eq!(path_ext("/static/app.min.js"), ".js");
        assert_eq!(path_ext("/static.d/README"), "");
        assert_eq!(path_ext(".bashrc"), ".bashrc");
        assert_eq!(path_ext(""), "");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/../a/./b/"), "/a/b");
        assert_eq!(clean_path("../../a"), "../../a");
        assert_eq!(clean_path("a/.."), ".");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn test_path_functions_arity() {
        let none: Vec<std::borrow::Cow<'_, str>> = Vec::new();
        assert_eq!(PATH_BASE.invoke(&Args::new(&none)), "<ARGN>");
        assert_eq!(PATH_DIR.invoke(&Args::new(&none)), "<ARGN>");
        assert_eq!(PATH_EXT.invoke(&Args::new(&none)), "<ARGN>");
    }
}
