//! Path utilities for the virtual tree.
//!
//! Paths are plain `/`-separated strings compared by exact equality. The
//! helpers follow posix `dirname`/`basename` semantics so that relative and
//! absolute keys behave the same way a build tool's own path module would.

/// Get the parent path of a given path.
///
/// `dirname("/a/b") == "/a"`, `dirname("/a") == "/"`, `dirname("a") == "."`.
/// The root (`/`) and the current directory (`.`) are their own parents.
pub fn dirname(path: &str) -> String {
    if path.is_empty() {
        return String::from(".");
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return String::from("/");
    }

    match trimmed.rfind('/') {
        None => String::from("."),
        Some(pos) => {
            let parent = trimmed[..pos].trim_end_matches('/');
            if parent.is_empty() {
                String::from("/")
            } else {
                String::from(parent)
            }
        }
    }
}

/// Get the last component of a path, ignoring trailing separators.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Get the file name without its final extension.
///
/// A leading dot does not start an extension (`.env` stays `.env`).
pub fn stem(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

/// Whether `dirname` of this path is the path itself.
///
/// Recursive folder creation stops here regardless of what the real
/// filesystem reports.
pub fn is_root(path: &str) -> bool {
    dirname(path) == path
}

/// Whether the path starts at the filesystem root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Join path segments and normalize the result.
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        return normalize(name);
    }
    if name.is_empty() {
        return normalize(base);
    }
    normalize(&format!("{}/{}", base, name))
}

/// Normalize a path by resolving `.` and `..` components and removing
/// redundant slashes.
///
/// `..` never climbs above `/`; on relative paths leading `..` components are
/// kept. A trailing separator is preserved and the empty path becomes `.`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return String::from(".");
    }

    let absolute = is_absolute(path);
    let trailing = path.len() > 1 && path.ends_with('/');
    let mut components: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => match components.last() {
                Some(&last) if last != ".." => {
                    components.pop();
                }
                _ if absolute => {}
                _ => components.push(".."),
            },
            c => components.push(c),
        }
    }

    let mut result = components.join("/");
    if absolute {
        result.insert(0, '/');
    }
    if result.is_empty() {
        return String::from(".");
    }
    if trailing && result != "/" {
        result.push('/');
    }
    result
}

/// Normalize a directory path and drop any trailing separator.
///
/// `dir/` and `dir` name the same folder; `/` stays `/`.
pub fn normalize_dir(path: &str) -> String {
    let mut result = normalize(path);
    if result.len() > 1 && result.ends_with('/') {
        result.pop();
    }
    result
}
