//! Platform primitive layer.
//!
//! The loader core talks to the operating system only through [`Platform`]:
//! open a module, close it, resolve a name inside it, and describe the last
//! failure. [`NativePlatform`] is the implementation backed by the system
//! loader; tests substitute recording doubles.

use std::ffi::c_void;
use std::fmt;
use std::path::Path;
use std::ptr::NonNull;

mod native;

pub use native::{Binding, NativePlatform, OpenFlags, Scope};

/// Capability set every platform backend provides.
///
/// None of the methods may panic on bad input. Failures are reported as
/// `None`, after which [`Platform::last_error`] on the same thread describes
/// what went wrong.
pub trait Platform {
    /// An open module. Owned by exactly one `DynamicLibrary` at a time.
    type Handle: Send + Sync;

    fn open(&self, path: &Path) -> Option<Self::Handle>;

    /// Releases the module. Consuming the handle makes a double close
    /// unrepresentable.
    fn close(&self, handle: Self::Handle);

    /// Looks up `name` exactly as exported. Any error state left over from
    /// earlier calls must not influence the result.
    fn resolve(&self, handle: &Self::Handle, name: &str) -> Option<RawSymbol>;

    /// Diagnostic for the most recent failure on the calling thread, or
    /// `"Unknown error"` when nothing was recorded.
    fn last_error(&self) -> String;
}

/// Type-erased address of a resolved symbol.
///
/// This is the value stored in the symbol cache. It carries no type
/// information; [`crate::SymbolPointer::from_raw`] turns it back into a usable
/// pointer under the caller's guarantee about the real type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSymbol(NonNull<c_void>);

// An address inside a loaded module is plain data; the module, not the
// address, is what needs synchronised ownership.
unsafe impl Send for RawSymbol {}
unsafe impl Sync for RawSymbol {}

impl RawSymbol {
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(RawSymbol)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

impl fmt::Debug for RawSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSymbol({:p})", self.0)
    }
}
