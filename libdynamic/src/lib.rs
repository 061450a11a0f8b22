//! Explicit, run-time loading of shared libraries.
//!
//! [`DynamicLibrary`] owns one loaded module (`.so`, `.dylib` or `.dll`),
//! resolves exported functions and variables by name, and calls functions
//! through a per-library cache so repeated calls skip the platform lookup.
//! The module is closed when the handle is unloaded, reloaded or dropped.
//!
//! ```no_run
//! use libdynamic::{DynamicLibrary, LoaderConfig};
//!
//! let config = LoaderConfig::from_file("app_config.toml")?;
//! let library = DynamicLibrary::open_named("plugin_dynamic", &config)?;
//!
//! let sum = unsafe { library.invoke::<extern "C" fn(i32, i32) -> i32>("intAdd", (2, 3))? };
//! assert_eq!(sum, 5);
//! # Ok::<(), libdynamic::Error>(())
//! ```
//!
//! Everything that re-types an address is `unsafe`: the loader cannot check
//! that a name really has the signature the caller claims.

mod cache;
pub mod config;
pub mod error;
pub mod library;
pub mod library_utils;
mod logging;
pub mod platform;
pub mod symbol;

pub use config::LoaderConfig;
pub use error::{ConfigError, Error, LoadError, Result, SymbolError};
pub use library::DynamicLibrary;
pub use platform::{Binding, NativePlatform, OpenFlags, Platform, RawSymbol, Scope};
pub use symbol::{FnPointer, Symbol, SymbolPointer};
