//! Maps local files onto remote resource locations.
//!
//! Each side is either a directory root or a single file, decided purely
//! syntactically by [`looks_like_file`]:
//!
//! * a file-like `target_path` sends every file to that one location,
//! * a file-like `source_base` makes every entry read its contents from that
//!   one file,
//! * otherwise the file keeps its position below `source_base`.

use crate::config::Config;
use crate::source::SourceFile;
use relative_path::{RelativePath, RelativePathBuf};
use std::path::{Path, PathBuf};

/// A queued upload: where it goes and where its bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub location: RelativePathBuf,
    pub source: PathBuf,
}

impl FileEntry {
    pub fn file_name(&self) -> &str {
        self.location.file_name().unwrap_or("file")
    }
}

/// True when the last path segment has an extension (a dot followed by a
/// word character).
pub fn looks_like_file(path: &str) -> bool {
    let last = path.rsplit(['/', '\\']).next().unwrap_or_default();
    last.match_indices('.').any(|(i, _)| {
        last[i + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Slash-normalized, root-relative form of a local path.
pub fn to_slash(path: &str) -> RelativePathBuf {
    let unified = path.replace('\\', "/");
    RelativePath::new(unified.trim_start_matches('/')).normalize()
}

/// `path` anchored at `cwd` when relative, in the slash form of [`to_slash`].
/// Two anchored paths compare equal exactly when they name the same place.
fn anchored(path: &str, cwd: &Path) -> RelativePathBuf {
    let unified = path.replace('\\', "/");
    if Path::new(&unified).is_absolute() {
        to_slash(&unified)
    } else {
        to_slash(&path_str(cwd)).join_normalized(to_slash(&unified))
    }
}

fn strip_base(path: &RelativePath, base: &RelativePath) -> Option<RelativePathBuf> {
    let mut rest = path.iter();
    for segment in base.iter() {
        if rest.next() != Some(segment) {
            return None;
        }
    }

    let mut stripped = RelativePathBuf::new();
    for segment in rest {
        stripped.push(segment);
    }
    Some(stripped)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Remote location of `local` (the file's original path). Relative paths
/// are taken from the current directory.
pub fn remote_location(local: &Path, config: &Config) -> RelativePathBuf {
    let cwd = std::env::current_dir().unwrap_or_default();
    remote_location_from(local, config, &cwd)
}

fn remote_location_from(local: &Path, config: &Config, cwd: &Path) -> RelativePathBuf {
    if looks_like_file(&config.target_path) {
        return to_slash(&config.target_path);
    }

    let local = path_str(local);
    let absolute = anchored(&local, cwd);
    let relative = strip_base(&absolute, &anchored(&config.source_base, cwd))
        .or_else(|| strip_base(&absolute, &to_slash(&path_str(cwd))))
        .unwrap_or_else(|| to_slash(&local));

    strip_base(&relative, &to_slash(&config.target_path)).unwrap_or(relative)
}

/// Local file the contents of `file` are read from.
pub fn content_source(file: &SourceFile, config: &Config) -> PathBuf {
    if looks_like_file(&config.source_base) {
        PathBuf::from(&config.source_base)
    } else {
        file.path().to_path_buf()
    }
}

/// Maps one stream entry. Null entries produce nothing.
pub fn map_file(file: &SourceFile, config: &Config) -> Option<FileEntry> {
    if file.is_null() {
        return None;
    }

    Some(FileEntry {
        location: remote_location(file.original_path(), config),
        source: content_source(file, config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NoProfiles, Options, resolve};

    fn config(source_base: &str, target_path: &str) -> Config {
        let options = Options::new()
            .theme_id("1")
            .source_base(source_base)
            .target_path(target_path);
        resolve(&Options::new(), &NoProfiles, &options, &Options::new()).unwrap()
    }

    #[test]
    fn file_detection() {
        assert!(looks_like_file("build/css/main.css"));
        assert!(looks_like_file("main.js"));
        assert!(looks_like_file("C:\\build\\main.css"));
        assert!(!looks_like_file("src/assets"));
        assert!(!looks_like_file("./"));
        assert!(!looks_like_file("build/css/"));
        assert!(!looks_like_file("weird./"));
        assert!(!looks_like_file("trailing."));
    }

    #[test]
    fn directory_mode_keeps_position_below_source_base() {
        let config = config("src/assets", "build");
        let entry = map_file(&SourceFile::new("src/assets/img/logo.png"), &config).unwrap();

        assert_eq!(entry.location.as_str(), "img/logo.png");
        assert_eq!(entry.source, PathBuf::from("src/assets/img/logo.png"));
        assert_eq!(entry.file_name(), "logo.png");
    }

    #[test]
    fn default_roots_keep_full_path() {
        let config = config("./", "./");
        let entry = map_file(&SourceFile::new("./templates/page.vm"), &config).unwrap();
        assert_eq!(entry.location.as_str(), "templates/page.vm");
    }

    #[test]
    fn file_target_collects_everything_in_one_location() {
        let config = config("./", "build/css/main.css");
        let locations: Vec<_> = ["styles/a.less", "styles/b.less"]
            .into_iter()
            .map(|path| map_file(&SourceFile::new(path), &config).unwrap().location)
            .collect();

        assert_eq!(locations, vec![RelativePathBuf::from("build/css/main.css"); 2]);
    }

    #[test]
    fn file_source_base_reads_single_artifact() {
        let config = config("build/css/main.css", "css/main.css");

        for path in ["src/styles/a.less", "src/styles/nested/b.less"] {
            let entry = map_file(&SourceFile::new(path), &config).unwrap();
            assert_eq!(entry.source, PathBuf::from("build/css/main.css"));
            assert_eq!(entry.location.as_str(), "css/main.css");
        }
    }

    #[test]
    fn location_uses_original_path_and_contents_current_path() {
        let config = config("src", "./");
        let file = SourceFile::new("src/assets/fonts/a.woff")
            .transformed("build/fonts/a.woff", std::time::SystemTime::UNIX_EPOCH);
        let entry = map_file(&file, &config).unwrap();

        assert_eq!(entry.location.as_str(), "assets/fonts/a.woff");
        assert_eq!(entry.source, PathBuf::from("build/fonts/a.woff"));
    }

    #[test]
    fn backslashes_are_normalized() {
        let config = config("src\\assets", "./");
        let entry = map_file(&SourceFile::new("src\\assets\\img\\logo.png"), &config).unwrap();
        assert_eq!(entry.location.as_str(), "img/logo.png");
    }

    #[test]
    fn files_outside_source_base_keep_their_path() {
        let config = config("src", "./");
        let entry = map_file(&SourceFile::new("vendor/lib.js"), &config).unwrap();
        assert_eq!(entry.location.as_str(), "vendor/lib.js");
    }

    #[test]
    fn absolute_file_below_relative_source_base() {
        let config = config("src/assets", "./");
        let cwd = Path::new("/work/site");
        let location =
            remote_location_from(Path::new("/work/site/src/assets/img/logo.png"), &config, cwd);
        assert_eq!(location.as_str(), "img/logo.png");
    }

    #[test]
    fn relative_file_below_absolute_source_base() {
        let config = config("/work/site/src/assets", "./");
        let cwd = Path::new("/work/site");
        let location = remote_location_from(Path::new("./src/assets/img/logo.png"), &config, cwd);
        assert_eq!(location.as_str(), "img/logo.png");
    }

    #[test]
    fn absolute_file_outside_source_base_is_relative_to_cwd() {
        let config = config("src", "./");
        let cwd = Path::new("/work/site");
        let location = remote_location_from(Path::new("/work/site/vendor/lib.js"), &config, cwd);
        assert_eq!(location.as_str(), "vendor/lib.js");
    }

    #[test]
    fn mixed_paths_against_current_directory() {
        let cwd = std::env::current_dir().unwrap();
        let config = config("src/assets", "./");
        let file = SourceFile::new(cwd.join("src/assets/img/logo.png"));
        let entry = map_file(&file, &config).unwrap();
        assert_eq!(entry.location.as_str(), "img/logo.png");
    }

    #[test]
    fn null_entries_are_not_mapped() {
        let config = config("./", "./");
        assert!(map_file(&SourceFile::null("src/assets"), &config).is_none());
    }
}
