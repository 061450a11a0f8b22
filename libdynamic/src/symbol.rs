//! Symbol-pointer adapter.
//!
//! Resolution always produces an untyped [`RawSymbol`]. The traits here
//! describe which Rust types such an address may be reinterpreted as, and how
//! a function pointer is called with a tuple of forwarded arguments.
//!
//! Function exports are named as `extern "C" fn(..) -> R` or
//! `unsafe extern "C" fn(..) -> R` with up to twelve parameters; data exports
//! as `*const T`, `*mut T` or `NonNull<T>`.

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

use crate::platform::RawSymbol;

/// A pointer type a resolved symbol can be reinterpreted as.
///
/// # Safety
///
/// Implementors must be exactly pointer-sized and valid for every non-null
/// address bit pattern.
pub unsafe trait SymbolPointer: Copy {
    /// Reinterprets `raw` as `Self`.
    ///
    /// # Safety
    ///
    /// `raw` must really be a `Self`: a function with exactly this signature
    /// and ABI, or data of the pointed-to type. Nothing checks this.
    unsafe fn from_raw(raw: RawSymbol) -> Self;

    fn as_raw(self) -> *const c_void;
}

/// A function pointer that can be called with its arguments packed in a
/// tuple.
///
/// # Safety
///
/// `call` must invoke the pointer with exactly the arguments given.
pub unsafe trait FnPointer: SymbolPointer {
    type Args;
    type Output;

    /// # Safety
    ///
    /// The pointer must refer to a live function of this signature.
    unsafe fn call(self, args: Self::Args) -> Self::Output;
}

unsafe impl<T> SymbolPointer for *const T {
    unsafe fn from_raw(raw: RawSymbol) -> Self {
        raw.as_ptr() as *const T
    }

    fn as_raw(self) -> *const c_void {
        self.cast()
    }
}

unsafe impl<T> SymbolPointer for *mut T {
    unsafe fn from_raw(raw: RawSymbol) -> Self {
        raw.as_ptr().cast()
    }

    fn as_raw(self) -> *const c_void {
        self as *const c_void
    }
}

unsafe impl<T> SymbolPointer for NonNull<T> {
    unsafe fn from_raw(raw: RawSymbol) -> Self {
        // SAFETY: RawSymbol is never null.
        NonNull::new_unchecked(raw.as_ptr().cast())
    }

    fn as_raw(self) -> *const c_void {
        self.as_ptr() as *const c_void
    }
}

macro_rules! impl_fn_pointer {
    ($($ty:ident $arg:ident),*) => {
        impl_fn_pointer!(@abi [extern "C" fn] $($ty $arg),*);
        impl_fn_pointer!(@abi [unsafe extern "C" fn] $($ty $arg),*);
    };

    (@abi [$($fn_ty:tt)+] $($ty:ident $arg:ident),*) => {
        unsafe impl<R, $($ty),*> SymbolPointer for $($fn_ty)+($($ty),*) -> R {
            unsafe fn from_raw(raw: RawSymbol) -> Self {
                std::mem::transmute_copy::<*mut c_void, Self>(&raw.as_ptr())
            }

            fn as_raw(self) -> *const c_void {
                self as *const c_void
            }
        }

        unsafe impl<R, $($ty),*> FnPointer for $($fn_ty)+($($ty),*) -> R {
            type Args = ($($ty,)*);
            type Output = R;

            #[allow(clippy::unused_unit)]
            unsafe fn call(self, ($($arg,)*): Self::Args) -> R {
                (self)($($arg),*)
            }
        }
    };
}

impl_fn_pointer!();
impl_fn_pointer!(A0 a0);
impl_fn_pointer!(A0 a0, A1 a1);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9, A10 a10);
impl_fn_pointer!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9, A10 a10, A11 a11);

/// A typed symbol borrowed from a [`crate::DynamicLibrary`].
///
/// The borrow keeps the module loaded while the `Symbol` itself is alive:
/// `unload`, `reload` and drop all need the library mutably or by value. A
/// pointer copied out of it is not tracked.
pub struct Symbol<'lib, T> {
    pointer: T,
    _library: PhantomData<&'lib ()>,
}

impl<'lib, T: SymbolPointer> Symbol<'lib, T> {
    pub(crate) fn new(pointer: T) -> Self {
        Symbol {
            pointer,
            _library: PhantomData,
        }
    }

    pub fn as_raw(&self) -> *const c_void {
        self.pointer.as_raw()
    }

    /// Detaches the pointer from the library borrow. Copying it out through
    /// `Deref` does the same; either way the pointer dangles once the library
    /// is unloaded, reloaded or dropped, which the caller of
    /// [`crate::DynamicLibrary::get`] agreed to.
    pub fn into_inner(self) -> T {
        self.pointer
    }
}

impl<T> Deref for Symbol<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.pointer
    }
}

impl<T: SymbolPointer> fmt::Debug for Symbol<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:p})", self.as_raw())
    }
}
