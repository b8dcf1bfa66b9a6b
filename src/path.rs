//! Path helpers over a flat namespace.
//!
//! There is no directory tree on disk. A directory is just an entry whose name ends
//! with DIR_SEPARATOR, and "bin/prog" is simply a file whose name contains one.
//! These helpers group names for display, nothing more.

use crate::config::DIR_SEPARATOR;

/// Whether `name` denotes a directory.
pub fn is_dir_name(name: &str) -> bool {
    name.ends_with(DIR_SEPARATOR)
}

/// Appends a trailing separator if `name` does not have one yet.
pub fn dir_name(name: &str) -> String {
    if is_dir_name(name) {
        name.to_string()
    } else {
        format!("{}{}", name, DIR_SEPARATOR)
    }
}

/// Builds the stored name for `path` as seen from `cwd`.
/// Stored names have no leading separator: "/bin/prog" and "prog" in "/bin" both
/// become "bin/prog". A leading "./" is ignored.
pub fn resolve(cwd: &str, path: &str) -> String {
    if let Some(absolute) = path.strip_prefix(DIR_SEPARATOR) {
        return absolute.to_string();
    }
    let path = path.strip_prefix("./").unwrap_or(path);
    let cwd = cwd.trim_matches(DIR_SEPARATOR);
    if cwd.is_empty() {
        path.to_string()
    } else {
        format!("{}{}{}", cwd, DIR_SEPARATOR, path)
    }
}

/// Name of `entry_name` relative to directory `dir`, if it sits directly inside it.
/// `dir` may be "", "/" (root), "bin", "/bin" or "bin/". Sub-directories are direct
/// children too and keep their trailing separator.
pub fn child_name<'a>(dir: &str, entry_name: &'a str) -> Option<&'a str> {
    let dir = dir.trim_matches(DIR_SEPARATOR);
    let rest = if dir.is_empty() {
        entry_name
    } else {
        entry_name
            .strip_prefix(dir)?
            .strip_prefix(DIR_SEPARATOR)?
    };
    let stem = rest.strip_suffix(DIR_SEPARATOR).unwrap_or(rest);
    if stem.is_empty() || stem.contains(DIR_SEPARATOR) {
        return None;
    }
    Some(rest)
}
