//! The system loader, reached through `libloading`.
//!
//! `dlopen`/`dlsym`/`dlclose` on unix, `LoadLibraryExW`/`GetProcAddress`/
//! `FreeLibrary` on Windows. libloading already serialises and resets the
//! platform's own error state around each call; the text of the last failure
//! is kept per thread so [`Platform::last_error`] has `dlerror` semantics on
//! every platform.

use std::cell::RefCell;
use std::error::Error as _;
use std::ffi::c_void;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::{Platform, RawSymbol};
use crate::logging::log_warn;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn record_error(message: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

fn clear_error() {
    take_error();
}

fn take_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

/// Flattens an error and its sources into one line. On Windows the OS text
/// lives in the source, not in libloading's own message.
fn describe(error: &libloading::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// When symbol references inside the module are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    /// Resolve function references on first call (`RTLD_LAZY`).
    #[default]
    Lazy,
    /// Resolve everything while opening (`RTLD_NOW`).
    Now,
}

/// Whether the module's symbols become available to modules opened later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Local,
    Global,
}

impl<'de> Deserialize<'de> for Binding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "lazy" => Ok(Binding::Lazy),
            "now" => Ok(Binding::Now),
            _ => Err(serde::de::Error::unknown_variant(&s, &["lazy", "now"])),
        }
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "local" => Ok(Scope::Local),
            "global" => Ok(Scope::Global),
            _ => Err(serde::de::Error::unknown_variant(&s, &["local", "global"])),
        }
    }
}

/// Flags passed to the platform when opening a module. Ignored on Windows,
/// where the loader has no equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    pub binding: Binding,
    pub scope: Scope,
}

/// [`Platform`] implementation for the running operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePlatform {
    flags: OpenFlags,
}

impl NativePlatform {
    pub fn new(flags: OpenFlags) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }
}

#[cfg(unix)]
unsafe fn open_library(path: &Path, flags: OpenFlags) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_LAZY, RTLD_LOCAL, RTLD_NOW};

    let binding = match flags.binding {
        Binding::Lazy => RTLD_LAZY,
        Binding::Now => RTLD_NOW,
    };
    let scope = match flags.scope {
        Scope::Local => RTLD_LOCAL,
        Scope::Global => RTLD_GLOBAL,
    };
    Library::open(Some(path), binding | scope).map(Into::into)
}

#[cfg(windows)]
unsafe fn open_library(path: &Path, _flags: OpenFlags) -> Result<libloading::Library, libloading::Error> {
    libloading::Library::new(path)
}

impl Platform for NativePlatform {
    type Handle = libloading::Library;

    fn open(&self, path: &Path) -> Option<Self::Handle> {
        clear_error();
        // SAFETY: opening a library runs its initialisers. Choosing to load a
        // particular file is the caller's trust decision; nothing in this
        // process is borrowed across the call.
        match unsafe { open_library(path, self.flags) } {
            Ok(library) => Some(library),
            Err(e) => {
                record_error(describe(&e));
                None
            }
        }
    }

    fn close(&self, handle: Self::Handle) {
        if let Err(e) = handle.close() {
            log_warn!(&format!("Failed to close library: {}", describe(&e)));
        }
    }

    fn resolve(&self, handle: &Self::Handle, name: &str) -> Option<RawSymbol> {
        clear_error();
        // SAFETY: the symbol is requested as an untyped address and never
        // called or dereferenced here.
        let symbol = unsafe { handle.get::<*mut c_void>(name.as_bytes()) };
        match symbol {
            Ok(symbol) => {
                let raw = RawSymbol::new(*symbol);
                if raw.is_none() {
                    record_error(format!("{}: symbol resolved to a null address", name));
                }
                raw
            }
            Err(e) => {
                record_error(describe(&e));
                None
            }
        }
    }

    fn last_error(&self) -> String {
        take_error().unwrap_or_else(|| "Unknown error".to_string())
    }
}
