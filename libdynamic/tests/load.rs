mod common;

use std::path::{Path, PathBuf};

use common::{alt_fixture, fixture, IntNullary, MockPlatform, ARTIFACTS};
use libdynamic::{Binding, DynamicLibrary, LoaderConfig, Scope};

#[test]
fn loads_a_valid_library() {
    let library = DynamicLibrary::new(fixture()).unwrap();
    assert!(library.is_loaded());
    assert_eq!(library.path(), Some(fixture().as_path()));
    assert!(library.native_handle().is_some());
}

#[test]
fn missing_file_is_a_load_error() {
    let path = Path::new(ARTIFACTS).join("no_such_library.so");
    let error = DynamicLibrary::new(&path).unwrap_err();

    assert_eq!(error.path, path);
    assert!(!error.reason.is_empty());
    let message = error.to_string();
    assert!(message.starts_with("Failed to load library: "));
    assert!(message.contains("no_such_library.so"));
}

#[test]
fn interior_nul_path_is_a_load_error() {
    let error = DynamicLibrary::new("a\0b").unwrap_err();
    assert_eq!(error.path, PathBuf::from("a\0b"));
    assert!(!error.reason.is_empty());
    assert!(error.to_string().starts_with("Failed to load library: "));

    let mut library = DynamicLibrary::new(fixture()).unwrap();
    assert!(library.reload("lib\0dynamic.so").is_err());
    assert!(!library.is_loaded());
}

#[test]
fn empty_path_never_reaches_the_platform() {
    let platform = MockPlatform::new();
    let error = DynamicLibrary::with_platform(platform.clone(), "").unwrap_err();

    assert_eq!(error.reason, "empty library path");
    assert_eq!(platform.counters.failed_opens(), 0);
    assert_eq!(platform.counters.opened(), 0);

    assert!(DynamicLibrary::new("").is_err());
}

#[test]
fn default_handle_is_empty() {
    let mut library = DynamicLibrary::<MockPlatform>::default();
    assert!(!library.is_loaded());
    assert_eq!(library.path(), None);
    assert!(library.native_handle().is_none());

    library.unload();
    library.unload();
    assert!(!library.is_loaded());
    assert_eq!(library.platform().counters.closed(), 0);
}

#[test]
fn unload_is_idempotent() {
    let platform = MockPlatform::new();
    let mut library = DynamicLibrary::with_platform(platform.clone(), "alpha").unwrap();

    library.unload();
    assert!(!library.is_loaded());
    assert_eq!(library.path(), None);
    library.unload();
    drop(library);

    assert_eq!(platform.counters.opened(), 1);
    assert_eq!(platform.counters.closed(), 1);
}

#[test]
fn construct_and_drop_cycles_do_not_leak() {
    let platform = MockPlatform::new();

    for round in 0..25 {
        let path = if round % 3 == 0 { "missing" } else { "alpha" };
        match DynamicLibrary::with_platform(platform.clone(), path) {
            Ok(library) => assert!(library.is_loaded()),
            Err(error) => assert!(error.reason.contains("no such mock module")),
        }
        assert_eq!(platform.counters.live(), 0);
    }

    assert_eq!(platform.counters.failed_opens(), 9);
    assert_eq!(platform.counters.opened(), 16);
    assert_eq!(platform.counters.closed(), 16);
}

#[test]
fn with_config_applies_open_flags() {
    let config = LoaderConfig {
        binding: Binding::Now,
        scope: Scope::Local,
        ..LoaderConfig::default()
    };
    let library = DynamicLibrary::with_config(fixture(), &config).unwrap();
    assert_eq!(library.platform().flags(), config.open_flags());

    let id = unsafe { library.invoke::<IntNullary>("libraryId", ()) }.unwrap();
    assert_eq!(id, 1);
}

#[test]
fn open_named_searches_configured_paths() {
    let config = LoaderConfig {
        search_paths: vec![PathBuf::from("/definitely/not/here"), PathBuf::from(ARTIFACTS)],
        ..LoaderConfig::default()
    };

    let library = DynamicLibrary::open_named("plugin_dynamic_alt", &config).unwrap();
    assert_eq!(library.path(), Some(alt_fixture().as_path()));
    assert_eq!(unsafe { library.invoke::<IntNullary>("libraryId", ()) }.unwrap(), 2);

    let error = DynamicLibrary::open_named("plugin_that_does_not_exist", &config).unwrap_err();
    assert!(error.to_string().contains("plugin_that_does_not_exist"));
}

#[test]
fn config_file_drives_loading() {
    let file = std::env::temp_dir().join(format!("libdynamic-load-{}.toml", std::process::id()));
    std::fs::write(
        &file,
        format!(
            "[loader]\nbinding = \"now\"\nsearch_paths = [{:?}]\n",
            ARTIFACTS
        ),
    )
    .unwrap();

    let config = LoaderConfig::from_file(&file).unwrap();
    std::fs::remove_file(&file).unwrap();

    let library = DynamicLibrary::open_named("plugin_dynamic", &config).unwrap();
    assert_eq!(library.platform().flags().binding, Binding::Now);
    assert!(library.is_loaded());
}
