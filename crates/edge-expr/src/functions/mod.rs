//! Builtin functions.

mod path;
mod strings;

use crate::registry::FunctionDef;

pub use path::{clean_path, path_base, path_dir, path_ext};

/// Every builtin, registered by [`crate::FunctionRegistry::builtin`].
pub(crate) const BUILTINS: &[FunctionDef] = &[
    strings::SUBSTR,
    strings::SELECT,
    strings::LOWER,
    strings::UPPER,
    strings::LEN,
    path::PATH_BASE,
    path::PATH_DIR,
    path::PATH_EXT,
];
