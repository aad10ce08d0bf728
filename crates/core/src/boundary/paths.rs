//! POSIX-style repository path helpers.
//!
//! Paths are repository-root-relative and compared textually. The repository root
//! itself is the empty string, which contains every path.

/// Normalize separators: backslashes become `/`, empty and `.` segments are dropped,
/// a trailing `/` is removed. A leading `/` is preserved; `/` alone becomes `""`.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let leading = unified.starts_with('/');
    let joined = unified.split('/').filter(|s| !s.is_empty() && *s != ".").collect::<Vec<_>>().join("/");
    if joined.is_empty() {
        String::new()
    } else if leading {
        format!("/{joined}")
    } else {
        joined
    }
}

/// True when `path` equals `root` or lies below it on a separator boundary.
///
/// `/svc-ab/x` is not under `/svc-a`.
pub fn is_under(path: &str, root: &str) -> bool {
    if root.is_empty() {
        return true;
    }
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// True when `path` lies below `root` and is not `root` itself.
pub fn is_strictly_under(path: &str, root: &str) -> bool {
    path != root && is_under(path, root)
}

/// Directory portion of a path (`""` for top-level entries).
pub fn parent_dir(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind('/') {
        Some(idx) => normalize_path(&normalized[..idx]),
        None => String::new(),
    }
}

/// Last segment of a path.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(|c| c == '/' || c == '\\');
    trimmed.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(trimmed)
}
