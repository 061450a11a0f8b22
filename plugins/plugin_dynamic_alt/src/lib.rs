//! Drop-in replacement for `plugin_dynamic`'s identity symbols.
//!
//! Exports a subset of the same names with different values so a host can
//! tell which of the two libraries a handle currently refers to.

#![allow(non_snake_case, non_upper_case_globals)]

use std::ffi::{c_char, c_int};

#[repr(transparent)]
pub struct StaticCStr(*const c_char);

unsafe impl Sync for StaticCStr {}

#[no_mangle]
pub static g_version: StaticCStr = StaticCStr(c"v2.0.0".as_ptr());

#[no_mangle]
pub extern "C" fn libraryId() -> c_int {
    2
}

#[no_mangle]
pub extern "C" fn intAdd(a: c_int, b: c_int) -> c_int {
    a.wrapping_add(b)
}

#[no_mangle]
pub extern "C" fn intMul(a: c_int, b: c_int) -> c_int {
    a.wrapping_mul(b)
}
