use std::path::{Path, PathBuf};

/// Returns the platform file name for a library base name (e.g. libfoo.so,
/// foo.dll, libfoo.dylib).
pub fn resolve_library_filename(name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.dll", name)
    } else if cfg!(target_os = "macos") {
        format!("lib{}.dylib", name)
    } else {
        format!("lib{}.so", name)
    }
}

/// Combines the folder and resolved filename into a full path.
pub fn resolve_library_path(folder: impl AsRef<Path>, name: &str) -> PathBuf {
    folder.as_ref().join(resolve_library_filename(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_follows_platform_convention() {
        let filename = resolve_library_filename("plugin_dynamic");
        if cfg!(target_os = "windows") {
            assert_eq!(filename, "plugin_dynamic.dll");
        } else if cfg!(target_os = "macos") {
            assert_eq!(filename, "libplugin_dynamic.dylib");
        } else {
            assert_eq!(filename, "libplugin_dynamic.so");
        }
    }

    #[test]
    fn path_joins_folder() {
        let path = resolve_library_path("bin", "plugin_dynamic");
        assert_eq!(path.parent(), Some(Path::new("bin")));
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some(resolve_library_filename("plugin_dynamic").as_str())
        );
    }
}
