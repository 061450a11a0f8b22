use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::cache::SymbolCache;
use crate::config::LoaderConfig;
use crate::error::{LoadError, SymbolError};
use crate::library_utils::resolve_library_filename;
use crate::logging::{log_debug, log_info};
use crate::platform::{NativePlatform, Platform, RawSymbol};
use crate::symbol::{FnPointer, Symbol, SymbolPointer};

/// Owning handle to one explicitly loaded shared library.
///
/// At most one module is open per handle, and it is closed exactly once: on
/// [`unload`](Self::unload), [`reload`](Self::reload) or drop. The handle is
/// not `Clone`; ownership moves with the value, and [`take`](Self::take)
/// moves it out while leaving an empty handle behind.
///
/// Functions called through [`invoke`](Self::invoke) are resolved once and
/// remembered by name until the module is unloaded.
pub struct DynamicLibrary<P: Platform = NativePlatform> {
    platform: P,
    handle: Option<P::Handle>,
    path: Option<PathBuf>,
    cache: SymbolCache,
}

impl DynamicLibrary<NativePlatform> {
    /// Opens the library at `path` with lazy binding and local scope.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::with_platform(NativePlatform::default(), path)
    }

    /// Opens the library at `path` with the flags from `config`.
    pub fn with_config(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Self, LoadError> {
        Self::with_platform(config.platform(), path)
    }

    /// Opens a library by base name (`"plugin_dynamic"` rather than
    /// `"libplugin_dynamic.so"`).
    ///
    /// The configured search paths are tried first. If none of them holds
    /// the file, the bare platform file name is handed to the system loader
    /// and its own search rules apply.
    pub fn open_named(name: &str, config: &LoaderConfig) -> Result<Self, LoadError> {
        let path = config
            .locate(name)
            .unwrap_or_else(|| PathBuf::from(resolve_library_filename(name)));
        Self::with_config(path, config)
    }
}

impl<P: Platform> DynamicLibrary<P> {
    pub fn with_platform(platform: P, path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let mut library = Self::empty(platform);
        library.load(path.as_ref())?;
        Ok(library)
    }

    /// A handle with nothing loaded.
    pub fn empty(platform: P) -> Self {
        DynamicLibrary {
            platform,
            handle: None,
            path: None,
            cache: SymbolCache::new(),
        }
    }

    fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        // An empty name makes dlopen hand back the main program.
        if path.as_os_str().is_empty() {
            return Err(LoadError {
                path: path.to_path_buf(),
                reason: "empty library path".to_string(),
            });
        }

        match self.platform.open(path) {
            Some(handle) => {
                log_info!(&format!("Loaded library {}", path.display()));
                self.handle = Some(handle);
                self.path = Some(path.to_path_buf());
                Ok(())
            }
            None => {
                let error = LoadError {
                    path: path.to_path_buf(),
                    reason: self.platform.last_error(),
                };
                log_debug!(&error.to_string());
                Err(error)
            }
        }
    }

    /// Moves the module and its cache out, leaving `self` empty.
    pub fn take(&mut self) -> Self
    where
        P: Clone,
    {
        let empty = Self::empty(self.platform.clone());
        mem::replace(self, empty)
    }

    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Closes the module and forgets every cached symbol. Does nothing on an
    /// empty handle.
    pub fn unload(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.platform.close(handle);
            if let Some(path) = &self.path {
                log_info!(&format!("Unloaded library {}", path.display()));
            }
        }
        self.cache.clear();
        self.path = None;
    }

    /// Unloads the current module and loads `path` in its place. On failure
    /// the handle is left empty, not pointing at the old module.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.unload();
        self.load(path.as_ref())
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Path the current module was opened from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The platform's own handle: for [`NativePlatform`] the
    /// `libloading::Library` wrapping the `dlopen`/`LoadLibraryExW` module,
    /// so further lookups can go through libloading directly. libloading only
    /// exposes the raw OS handle by consuming the `Library`, which this
    /// handle owns, so the raw value is not offered. The module must not be
    /// closed or otherwise released through this reference.
    pub fn native_handle(&self) -> Option<&P::Handle> {
        self.handle.as_ref()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn resolve(&self, name: &str) -> Result<RawSymbol, SymbolError> {
        let handle = self.handle.as_ref().ok_or_else(|| SymbolError::NotLoaded {
            symbol: name.to_string(),
        })?;

        match self.platform.resolve(handle, name) {
            Some(raw) => {
                log_debug!(&format!("Resolved symbol {} at {:?}", name, raw));
                Ok(raw)
            }
            None => {
                let error = SymbolError::NotFound {
                    symbol: name.to_string(),
                    reason: self.platform.last_error(),
                };
                log_debug!(&error.to_string());
                Err(error)
            }
        }
    }

    /// Resolves `name` and reinterprets it as `T`.
    ///
    /// Every call asks the platform again; nothing is cached.
    ///
    /// # Safety
    ///
    /// `T` must be the real type of the export: the exact signature and ABI
    /// for a function, or a pointer to the real type for data. A mismatch is
    /// undefined behaviour and is not detected.
    ///
    /// The returned [`Symbol`] borrows the library, but a pointer copied out
    /// of it (through `Deref` or [`Symbol::into_inner`]) does not. Such a
    /// pointer must not be used after the library is unloaded, reloaded or
    /// dropped.
    pub unsafe fn get<T: SymbolPointer>(&self, name: &str) -> Result<Symbol<'_, T>, SymbolError> {
        let raw = self.resolve(name)?;
        Ok(Symbol::new(T::from_raw(raw)))
    }

    /// Like [`get`](Self::get), but `None` on any failure, including an
    /// empty handle.
    ///
    /// # Safety
    ///
    /// As for [`get`](Self::get), including the rule for pointers copied out
    /// of the returned [`Symbol`].
    pub unsafe fn try_get<T: SymbolPointer>(&self, name: &str) -> Option<Symbol<'_, T>> {
        self.get(name).ok()
    }

    /// Whether the module exports `name`. Says nothing about its type.
    pub fn has_symbol(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Borrows an exported variable as a `T`.
    ///
    /// # Safety
    ///
    /// The export must be data of type `T`, and nothing may mutate it for as
    /// long as the reference lives.
    pub unsafe fn get_variable<T>(&self, name: &str) -> Result<&T, SymbolError> {
        let raw = self.resolve(name)?;
        Ok(&*raw.as_ptr().cast::<T>())
    }

    /// Address of an exported variable, or `None` when it cannot be
    /// resolved. Unlike [`get_variable`](Self::get_variable) this allows
    /// writes into the module's data.
    ///
    /// # Safety
    ///
    /// The export must be data of type `T`. The pointer dangles once the
    /// module is unloaded.
    pub unsafe fn try_get_variable<T>(&self, name: &str) -> Option<NonNull<T>> {
        let raw = self.resolve(name).ok()?;
        Some(NonNull::from_raw(raw))
    }

    /// Calls the exported function `name` with `args`, resolving it on first
    /// use and reusing the cached address afterwards.
    ///
    /// The cache lock is released before the platform is asked and before the
    /// function runs, so a callee may call back into this library. Failed
    /// lookups are not cached.
    ///
    /// ```no_run
    /// # use libdynamic::DynamicLibrary;
    /// let library = DynamicLibrary::new("./bin/libplugin_dynamic.so")?;
    /// let sum = unsafe { library.invoke::<extern "C" fn(i32, i32) -> i32>("intAdd", (2, 3))? };
    /// assert_eq!(sum, 5);
    /// # Ok::<(), libdynamic::Error>(())
    /// ```
    ///
    /// # Safety
    ///
    /// `F` must be the exact signature and ABI of the export. The cache keys
    /// on the name alone, so calling one name with two different `F`s is just
    /// as undefined as calling it with one wrong `F`.
    pub unsafe fn invoke<F: FnPointer>(&self, name: &str, args: F::Args) -> Result<F::Output, SymbolError> {
        let raw = match self.cache.lookup(name) {
            Some(raw) => raw,
            None => {
                let resolved = self.resolve(name)?;
                log_debug!(&format!("Caching symbol {}", name));
                self.cache.insert(name, resolved)
            }
        };
        Ok(F::from_raw(raw).call(args))
    }

    /// Resolves and calls `name` without reading or filling the cache.
    ///
    /// # Safety
    ///
    /// As for [`invoke`](Self::invoke).
    pub unsafe fn invoke_uncached<F: FnPointer>(&self, name: &str, args: F::Args) -> Result<F::Output, SymbolError> {
        let function = self.get::<F>(name)?;
        Ok(function.into_inner().call(args))
    }

    /// Number of names currently in the invoke cache.
    pub fn cached_symbols(&self) -> usize {
        self.cache.len()
    }
}

impl<P: Platform + Default> Default for DynamicLibrary<P> {
    fn default() -> Self {
        Self::empty(P::default())
    }
}

impl<P: Platform> Drop for DynamicLibrary<P> {
    fn drop(&mut self) {
        self.unload();
    }
}

impl<P: Platform> fmt::Debug for DynamicLibrary<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicLibrary")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .field("cached_symbols", &self.cached_symbols())
            .finish()
    }
}
