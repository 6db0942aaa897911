//! C ABI over the plugin registry.
//!
//! Strings returned by `ctl_describe_json` are owned by the caller and must be
//! released with `ctl_string_free`. Identifier strings are static. Failures
//! return null and leave a message readable through `ctl_last_error` on the
//! calling thread.

use std::cell::RefCell;
use std::ffi::{c_char, c_int, CStr, CString};
use std::ptr;
use std::sync::OnceLock;

use camera_localizer::plugin_registry;
use camera_localizer_core::ContextKind;

pub const CTL_CONTEXT_FILTER: c_int = 0;
pub const CTL_CONTEXT_GENERAL: c_int = 1;
pub const CTL_CONTEXT_PAINT: c_int = 2;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: impl Into<String>) {
    let message = message.into();
    log::warn!("{message}");
    // Interior NULs would truncate the message; replace them.
    let c = CString::new(message.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(c));
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

fn context_from_code(code: c_int) -> Option<ContextKind> {
    match code {
        CTL_CONTEXT_FILTER => Some(ContextKind::Filter),
        CTL_CONTEXT_GENERAL => Some(ContextKind::General),
        CTL_CONTEXT_PAINT => Some(ContextKind::Paint),
        _ => None,
    }
}

fn identifiers() -> &'static [CString] {
    static IDS: OnceLock<Vec<CString>> = OnceLock::new();
    IDS.get_or_init(|| {
        plugin_registry()
            .plugin_ids()
            .into_iter()
            .filter_map(|id| CString::new(id).ok())
            .collect()
    })
}

/// Number of registered plugins.
#[no_mangle]
pub extern "C" fn ctl_plugin_count() -> usize {
    identifiers().len()
}

/// Identifier of plugin `index`, or null when out of range. The string is
/// static and must not be freed.
#[no_mangle]
pub extern "C" fn ctl_plugin_identifier(index: usize) -> *const c_char {
    match identifiers().get(index) {
        Some(id) => {
            clear_last_error();
            id.as_ptr()
        }
        None => {
            set_last_error(format!("plugin index {index} is out of range"));
            ptr::null()
        }
    }
}

fn describe_json(identifier: &str, context: c_int) -> Result<String, String> {
    let context =
        context_from_code(context).ok_or_else(|| format!("unknown context code {context}"))?;
    let desc = plugin_registry()
        .describe_plugin(identifier, context)
        .map_err(|err| err.to_string())?;
    serde_json::to_string(&desc).map_err(|err| err.to_string())
}

/// Validated descriptor of plugin `identifier` in `context`, as JSON.
///
/// Returns null on failure. Release the result with [`ctl_string_free`].
///
/// # Safety
///
/// `identifier` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ctl_describe_json(
    identifier: *const c_char,
    context: c_int,
) -> *mut c_char {
    if identifier.is_null() {
        set_last_error("identifier is null");
        return ptr::null_mut();
    }
    // SAFETY: non-null and NUL-terminated per the contract above.
    let identifier = match unsafe { CStr::from_ptr(identifier) }.to_str() {
        Ok(id) => id,
        Err(_) => {
            set_last_error("identifier is not valid UTF-8");
            return ptr::null_mut();
        }
    };

    match describe_json(identifier, context).and_then(|json| {
        CString::new(json).map_err(|_| "descriptor JSON contains a NUL byte".to_owned())
    }) {
        Ok(json) => {
            clear_last_error();
            json.into_raw()
        }
        Err(message) => {
            set_last_error(message);
            ptr::null_mut()
        }
    }
}

/// Release a string returned by this library. Null is ignored.
///
/// # Safety
///
/// `s` must be null or a pointer returned by [`ctl_describe_json`] that was
/// not freed yet.
#[no_mangle]
pub unsafe extern "C" fn ctl_string_free(s: *mut c_char) {
    if !s.is_null() {
        // SAFETY: `s` came from `CString::into_raw` per the contract above.
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Message of the last failure on this thread, or null. Valid until the next
/// call into this library on the same thread.
#[no_mangle]
pub extern "C" fn ctl_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |message| message.as_ptr())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_codes() {
        assert_eq!(context_from_code(0), Some(ContextKind::Filter));
        assert_eq!(context_from_code(2), Some(ContextKind::Paint));
        assert_eq!(context_from_code(3), None);
    }

    #[test]
    fn last_error_is_per_call() {
        assert!(ctl_plugin_identifier(99).is_null());
        assert!(!ctl_last_error().is_null());
        assert!(!ctl_plugin_identifier(0).is_null());
        assert!(ctl_last_error().is_null());
    }
}
