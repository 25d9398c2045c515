//! Remote path resolution. Pure string work against POSIX paths; nothing
//! here talks to the server.

/// Resolves `path` against the working directory `cwd`.
///
/// Absolute paths are kept as given apart from a trailing `/`. Relative
/// paths are joined onto `cwd` with `.` and empty segments dropped and `..`
/// applied lexically, never climbing above `/`.
pub fn resolve(cwd: &str, path: &str) -> String {
    if path.starts_with('/') {
        return strip_trailing(path);
    }

    if path == "." {
        return strip_trailing(cwd);
    }

    normalize(&format!("{}/{}", cwd, path))
}

fn strip_trailing(path: &str) -> String {
    match path.trim_end_matches('/') {
        "" => "/".to_owned(),
        trimmed => trimmed.to_owned(),
    }
}

fn normalize(path: &str) -> String {
    let mut segments = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let _ = segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::resolve;

    const CWD: &str = "/home/sftp";

    #[test]
    fn absolute_path_is_kept() {
        assert_eq!(resolve(CWD, "/srv/list-test"), "/srv/list-test");
        assert_eq!(resolve(CWD, "/srv/list-test/"), "/srv/list-test");
        assert_eq!(resolve(CWD, "/"), "/");
        assert_eq!(resolve(CWD, "///"), "/");
    }

    #[test]
    fn dot_is_working_directory() {
        assert_eq!(resolve(CWD, "."), CWD);
        assert_eq!(resolve("/home/sftp/", "."), CWD);
        assert_eq!(resolve("/", "."), "/");
    }

    #[test]
    fn relative_path_joins_working_directory() {
        assert_eq!(resolve(CWD, "list-test"), "/home/sftp/list-test");
        assert_eq!(resolve(CWD, "./testServer"), "/home/sftp/testServer");
        assert_eq!(resolve(CWD, "a//b/"), "/home/sftp/a/b");
        assert_eq!(resolve("/", "list-test"), "/list-test");
        assert_eq!(resolve(CWD, ""), CWD);
    }

    #[test]
    fn parent_segments_stop_at_root() {
        assert_eq!(resolve(CWD, "../other"), "/home/other");
        assert_eq!(resolve(CWD, "../../../.."), "/");
        assert_eq!(resolve(CWD, "a/../b/./c"), "/home/sftp/b/c");
    }
}
