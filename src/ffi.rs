//! LCD Smartie plugin exports.
//!
//! The host loads the DLL, calls `SmartieInit` once, polls `function1` /
//! `function2` no faster than `GetMinRefreshInterval`, and calls
//! `SmartieFini` on exit. All strings cross the boundary as NUL-terminated
//! ANSI. A returned pointer stays valid until the next query call.

use std::ffi::{c_char, c_int, CStr, CString};
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::core::config::PluginConfig;
use crate::core::metrics::Domain;
use crate::core::plugin::SensorPlugin;
use crate::core::router::{parse_show_units, MAX_RESULT_CHARS};

/// Returned when a query panics; never aliases the session buffer
static PANIC_TEXT: &[u8] = b"Plugin error\0";

/// A host session: the plugin context plus the buffer handed back to the host
struct HostSession {
    plugin: SensorPlugin,
    last_result: CString,
}

impl HostSession {
    fn new(plugin: SensorPlugin) -> Self {
        Self {
            plugin,
            last_result: CString::default(),
        }
    }

    fn load() -> Self {
        let config = PluginConfig::load();
        crate::init_logging(config.log_filter());
        Self::new(SensorPlugin::with_platform_defaults(config))
    }

    /// Keep `text` alive for the host and return a pointer to it
    fn store(&mut self, text: &str) -> *const c_char {
        self.last_result = encode_ansi(text);
        self.last_result.as_ptr()
    }
}

static SESSION: Lazy<Mutex<Option<HostSession>>> = Lazy::new(|| Mutex::new(None));

/// Whether a host session is currently live
pub fn has_session() -> bool {
    SESSION.lock().is_some()
}

/// Encode for the host's ANSI code page
///
/// Characters outside Latin-1 become `?`; interior NULs become spaces. The
/// result is capped at [`MAX_RESULT_CHARS`] bytes.
pub fn encode_ansi(text: &str) -> CString {
    let bytes: Vec<u8> = text
        .chars()
        .take(MAX_RESULT_CHARS)
        .map(|c| match u32::from(c) {
            0 => b' ',
            code @ 1..=0xFF => code as u8,
            _ => b'?',
        })
        .collect();

    // No NUL bytes remain after the mapping above
    CString::new(bytes).unwrap_or_default()
}

/// Decode an ANSI string from the host
pub fn decode_ansi(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Read a host string argument; null reads as empty
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_param(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    decode_ansi(CStr::from_ptr(ptr).to_bytes())
}

fn guarded<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            log::error!("Panic caught at plugin boundary");
            fallback
        }
    }
}

fn host_query(domain: Domain, name: &str, units: &str) -> *const c_char {
    guarded(PANIC_TEXT.as_ptr() as *const c_char, || {
        let mut slot = SESSION.lock();
        let session = slot.get_or_insert_with(HostSession::load);
        let text = session.plugin.query(domain, name, parse_show_units(units));
        session.store(&text)
    })
}

/// Initialize the plugin: privilege check, NVML init, hardware tree open
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn SmartieInit() {
    guarded((), || {
        let mut slot = SESSION.lock();
        let session = slot.get_or_insert_with(HostSession::load);
        session.plugin.initialize();
    });
}

/// Release NVML and the hardware tree
///
/// The session survives if NVML never came up, matching the host-visible
/// behavior of earlier releases.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn SmartieFini() {
    guarded((), || {
        let mut slot = SESSION.lock();
        if let Some(session) = slot.as_mut() {
            if session.plugin.shutdown() {
                *slot = None;
            }
        }
    });
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn GetMinRefreshInterval() -> c_int {
    guarded(crate::core::config::DEFAULT_MIN_REFRESH_INTERVAL_MS as c_int, || {
        let mut slot = SESSION.lock();
        let session = slot.get_or_insert_with(HostSession::load);
        c_int::try_from(session.plugin.min_refresh_interval_ms()).unwrap_or(c_int::MAX)
    })
}

/// CPU query: `Load`, `Power`, `Temp`, `Fan_RPM`, `Fan`, `Clock`
///
/// # Safety
/// Both arguments must be null or NUL-terminated strings.
#[no_mangle]
pub unsafe extern "system" fn function1(
    param1: *const c_char,
    param2: *const c_char,
) -> *const c_char {
    let name = read_param(param1);
    let units = read_param(param2);
    host_query(Domain::Cpu, &name, &units)
}

/// GPU query: `Load`, `Power`, `Limit`, `Temp`, `Fan`, `Clock`, `Mem_Clock`,
/// `Mem_Alloc`, `Mem_Usage`
///
/// # Safety
/// Both arguments must be null or NUL-terminated strings.
#[no_mangle]
pub unsafe extern "system" fn function2(
    param1: *const c_char,
    param2: *const c_char,
) -> *const c_char {
    let name = read_param(param1);
    let units = read_param(param2);
    host_query(Domain::Gpu, &name, &units)
}
