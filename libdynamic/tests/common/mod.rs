#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::{c_char, c_double, c_int, c_void};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use libdynamic::library_utils::resolve_library_path;
use libdynamic::{Platform, RawSymbol};

/// Directory the build script compiled the fixture libraries into.
pub const ARTIFACTS: &str = env!("TEST_ARTIFACTS");

pub fn fixture() -> PathBuf {
    resolve_library_path(ARTIFACTS, "plugin_dynamic")
}

pub fn alt_fixture() -> PathBuf {
    resolve_library_path(ARTIFACTS, "plugin_dynamic_alt")
}

pub type IntBinary = extern "C" fn(c_int, c_int) -> c_int;
pub type IntNullary = extern "C" fn() -> c_int;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: c_double,
    pub y: c_double,
    pub z: c_double,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub id: c_int,
    pub name: [c_char; 64],
    pub min: Point,
    pub max: Point,
}

/// Reads a NUL-terminated string out of a fixed buffer.
pub fn c_buffer_to_string(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

extern "C" fn alpha_answer() -> c_int {
    1
}

extern "C" fn beta_answer() -> c_int {
    2
}

extern "C" fn mock_add(a: c_int, b: c_int) -> c_int {
    a + b
}

static ALPHA_VERSION: c_int = 100;

/// Counts every call the loader makes into the platform.
#[derive(Debug, Default)]
pub struct Counters {
    opened: AtomicUsize,
    failed_opens: AtomicUsize,
    closed: AtomicUsize,
    resolutions: Mutex<HashMap<String, usize>>,
    last_error: Mutex<Option<String>>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn failed_opens(&self) -> usize {
        self.failed_opens.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Modules opened and not yet closed.
    pub fn live(&self) -> usize {
        self.opened() - self.closed()
    }

    pub fn resolutions(&self, name: &str) -> usize {
        self.resolutions.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn set_error(&self, message: String) {
        *self.last_error.lock().unwrap() = Some(message);
    }
}

/// In-memory platform exposing two modules, `alpha` and `beta`.
///
/// Both export `answer` (returning 1 and 2) and `add`; `alpha` also exports
/// the data symbol `version`.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    pub counters: Arc<Counters>,
}

#[derive(Debug)]
pub struct MockHandle {
    module: &'static str,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for MockPlatform {
    type Handle = MockHandle;

    fn open(&self, path: &Path) -> Option<MockHandle> {
        let module = match path.to_str() {
            Some("alpha") => "alpha",
            Some("beta") => "beta",
            _ => {
                self.counters.failed_opens.fetch_add(1, Ordering::SeqCst);
                self.counters
                    .set_error(format!("{}: no such mock module", path.display()));
                return None;
            }
        };
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Some(MockHandle { module })
    }

    fn close(&self, handle: MockHandle) {
        assert!(self.counters.live() > 0, "closed {} with nothing open", handle.module);
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn resolve(&self, handle: &MockHandle, name: &str) -> Option<RawSymbol> {
        *self
            .counters
            .resolutions
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert(0) += 1;

        let address = match (handle.module, name) {
            ("alpha", "answer") => alpha_answer as *mut c_void,
            ("beta", "answer") => beta_answer as *mut c_void,
            (_, "add") => mock_add as *mut c_void,
            ("alpha", "version") => &ALPHA_VERSION as *const c_int as *mut c_void,
            _ => {
                self.counters
                    .set_error(format!("{}: undefined symbol: {}", handle.module, name));
                return None;
            }
        };
        RawSymbol::new(address)
    }

    fn last_error(&self) -> String {
        self.counters
            .last_error
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}
