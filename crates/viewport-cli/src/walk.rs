use anyhow::Context;
use globset::{Glob, GlobMatcher};
use std::path::{Component, Path, PathBuf};
use viewport::SourceFile;
use walkdir::WalkDir;

/// Leading path components of `pattern` that contain no glob syntax. An
/// absolute pattern keeps its root.
fn literal_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    for component in Path::new(pattern).components() {
        if let Component::Normal(segment) = component
            && segment.to_string_lossy().contains(['*', '?', '[', '{'])
        {
            break;
        }
        root.push(component);
    }

    if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root
    }
}

fn is_match(matcher: &GlobMatcher, path: &Path) -> bool {
    matcher.is_match(path) || matcher.is_match(path.strip_prefix(".").unwrap_or(path))
}

/// Files and directories matching `glob`, in file-name order. Directories
/// come out as null entries.
pub fn collect(glob: &Glob) -> anyhow::Result<Vec<SourceFile>> {
    let matcher = glob.compile_matcher();
    let root = literal_root(glob.glob());

    WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| is_match(&matcher, e.path()))
        .map(|e| {
            SourceFile::from_disk(e.path())
                .with_context(|| format!("Failed to stat {}", e.path().display()))
        })
        .collect()
}

pub fn collect_all(patterns: &[String]) -> anyhow::Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid glob '{pattern}'"))?;
        files.extend(collect(&glob)?);
    }
    Ok(files)
}
