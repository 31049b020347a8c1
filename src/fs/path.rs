use crate::fs::consts::MAX_PATH_LEN;
use crate::fs::error::{FsError, FsResult};

// Leading slash, no empty components, no trailing slash except for the root.
fn collapse(path: &str) -> String {
    let parts: Vec<&str> = components(path).collect();
    format!("/{}", parts.join("/"))
}

/// Canonical absolute form as the filesystem walks it. `.` and `..` are left
/// in place; they resolve through the on-disk entries. Paths longer than
/// `MAX_PATH_LEN - 1` bytes are `InvalidName`.
pub fn normalize(path: &str) -> FsResult<String> {
    let out = collapse(path);
    if out.len() > MAX_PATH_LEN - 1 {
        return Err(FsError::InvalidName);
    }
    Ok(out)
}

pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

/// Splits a normalized path into its parent and final component.
/// The root has no final component.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind('/')?;
    let name = &path[idx + 1..];
    if name.is_empty() {
        return None;
    }
    let parent = if idx == 0 { "/" } else { &path[..idx] };
    Some((parent, name))
}

/// Resolves `path` against `cwd` when relative.
/// No length check; the filesystem rejects overlong results.
pub fn join(cwd: &str, path: &str) -> String {
    if path.starts_with('/') {
        collapse(path)
    } else {
        collapse(&format!("{cwd}/{path}"))
    }
}

/// Lexical clean-up for display: drops `.` and applies `..` against the
/// preceding component, clamped at the root.
pub fn canonical(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for comp in components(path) {
        match comp {
            "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}
