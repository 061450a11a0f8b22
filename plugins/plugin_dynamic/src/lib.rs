//! Sample shared library for libdynamic.
//!
//! Everything here is exported with C linkage and unmangled names, the way a
//! library without Rust bindings would be consumed: plain functions, functions
//! taking and returning `repr(C)` structs, exported data, and a process-wide
//! callback registry.

#![allow(non_snake_case, non_upper_case_globals)]

use std::ffi::{c_char, c_double, c_float, c_int, c_uint, CStr};
use std::sync::{Mutex, PoisonError};

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
    /// NUL-terminated, fixed length
    pub name: [c_char; 64],
    pub min: Point,
    pub max: Point,
}

/// A `const char*` that can live in an exported static.
#[repr(transparent)]
pub struct StaticCStr(*const c_char);

unsafe impl Sync for StaticCStr {}

#[no_mangle]
pub static g_version: StaticCStr = StaticCStr(c"v1.2.3".as_ptr());

#[no_mangle]
pub static mut g_counter: c_int = 42;

#[no_mangle]
pub static mut g_counter_ptr: *mut c_int = std::ptr::addr_of_mut!(g_counter);

#[no_mangle]
pub static mut g_point: Point = Point { x: 9.0, y: 99.0, z: 999.0 };

#[no_mangle]
pub static mut g_point_ptr: *mut Point = std::ptr::addr_of_mut!(g_point);

#[no_mangle]
pub extern "C" fn sayHello() {
    println!("hello, I am from dynamicLib.");
}

#[no_mangle]
pub extern "C" fn libraryId() -> c_int {
    1
}

#[no_mangle]
pub extern "C" fn intAdd(a: c_int, b: c_int) -> c_int {
    a.wrapping_add(b)
}

#[no_mangle]
pub extern "C" fn floatAdd(a: c_float, b: c_float) -> c_float {
    a + b
}

#[no_mangle]
pub extern "C" fn doubleAdd(a: c_double, b: c_double) -> c_double {
    a + b
}

#[no_mangle]
pub extern "C" fn getPoint() -> Point {
    Point { x: 1.0, y: 2.0, z: 3.0 }
}

#[no_mangle]
pub extern "C" fn printPoint(arg: Point) {
    print!("{{x: {:.6} y: {:.6} z: {:.6}}}", arg.x, arg.y, arg.z);
}

#[no_mangle]
pub extern "C" fn getHelloString() -> *const c_char {
    c"Hello World from DynamicLib!".as_ptr()
}

#[no_mangle]
pub extern "C" fn getBox() -> BoundingBox {
    BoundingBox {
        id: 42,
        name: fixed_name("Box Object id = 42"),
        min: Point { x: 123.0, y: 1234.0, z: 12345.0 },
        max: Point { x: 777.0, y: 888.0, z: 999.0 },
    }
}

/// Writes a description of `arg` into `buf`, truncated to `max_size` bytes
/// including the terminating NUL.
#[no_mangle]
pub extern "C" fn box2String(arg: BoundingBox, buf: *mut c_char, max_size: c_uint) {
    // SAFETY: `name` is always NUL-terminated by `fixed_name`; callers that
    // build boxes themselves must uphold the same.
    let name = unsafe { CStr::from_ptr(arg.name.as_ptr()) }.to_string_lossy();
    let text = format!(
        "box_t {{ id={}, name='{}', min=({:.6},{:.6},{:.6}), max=({:.6},{:.6},{:.6}) }}",
        arg.id, name, arg.min.x, arg.min.y, arg.min.z, arg.max.x, arg.max.y, arg.max.z
    );
    write_c_string(&text, buf, max_size);
}

#[no_mangle]
pub extern "C" fn point2String(arg: *const Point, buf: *mut c_char, max_size: c_uint) {
    if arg.is_null() {
        return;
    }
    let point = unsafe { *arg };
    let text = format!("point_t {{ x={:.6}, y={:.6}, z={:.6} }}", point.x, point.y, point.z);
    write_c_string(&text, buf, max_size);
}

fn fixed_name(text: &str) -> [c_char; 64] {
    let mut name = [0 as c_char; 64];
    for (slot, byte) in name.iter_mut().zip(text.bytes().take(63)) {
        *slot = byte as c_char;
    }
    name
}

fn write_c_string(text: &str, buf: *mut c_char, max_size: c_uint) {
    if buf.is_null() || max_size == 0 {
        return;
    }
    let len = text.len().min(max_size as usize - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(text.as_ptr().cast::<c_char>(), buf, len);
        *buf.add(len) = 0;
    }
}

pub type DoubleCallback = extern "C" fn(c_double, c_double, c_double);
pub type PointCallback = extern "C" fn(Point);
pub type BoxCallback = extern "C" fn(*mut BoundingBox);

static DOUBLE_CALLBACK: Mutex<Option<DoubleCallback>> = Mutex::new(None);
static POINT_CALLBACK: Mutex<Option<PointCallback>> = Mutex::new(None);
static BOX_CALLBACK: Mutex<Option<BoxCallback>> = Mutex::new(None);

fn registered<T: Copy>(slot: &Mutex<Option<T>>) -> Option<T> {
    *slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn register<T>(slot: &Mutex<Option<T>>, callback: Option<T>) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = callback;
}

/// Passing null clears the registration.
#[no_mangle]
pub extern "C" fn register_double_callback(cb: Option<DoubleCallback>) {
    register(&DOUBLE_CALLBACK, cb);
}

#[no_mangle]
pub extern "C" fn register_point_callback(cb: Option<PointCallback>) {
    register(&POINT_CALLBACK, cb);
}

#[no_mangle]
pub extern "C" fn register_box_callback(cb: Option<BoxCallback>) {
    register(&BOX_CALLBACK, cb);
}

/// Fires the registered callbacks selected by the bits of `n`:
/// bit 0 double, bit 1 point, bit 2 box.
#[no_mangle]
pub extern "C" fn trigger_callbacks(n: c_int) {
    if n & 1 != 0 {
        if let Some(cb) = registered(&DOUBLE_CALLBACK) {
            cb(1.1, 2.2, 3.3);
        }
    }

    if n & 2 != 0 {
        if let Some(cb) = registered(&POINT_CALLBACK) {
            cb(Point { x: 10.0, y: 20.0, z: 30.0 });
        }
    }

    if n & 4 != 0 {
        if let Some(cb) = registered(&BOX_CALLBACK) {
            let mut example = BoundingBox {
                id: 100,
                name: fixed_name("Example Box With Callback"),
                min: Point { x: 0.1, y: 0.2, z: 0.3 },
                max: Point { x: 9.9, y: 8.8, z: 7.7 },
            };
            cb(&mut example);
        }
    }
}
