//! C-ABI wrapper around `serato-sdk`.
//!
//! # Overview
//! Lets any language with a C FFI validate an SDK configuration, inspect the
//! normalized result, manage credentials and build service requests. The
//! host executes the HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The configuration bag arrives as a JSON document, so a transport
//!   override cannot be supplied from C.
//! - The C caller owns all returned pointers and must call the matching
//!   `serato_free_*` / `serato_sdk_free` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serato_sdk::{HttpMethod, Sdk, SdkArgs, ServiceClient, ServiceName};

use types::*;

/// Borrow a C string as `&str`. Null and invalid UTF-8 map to `None`.
fn c_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// SDK lifecycle
// ---------------------------------------------------------------------------

/// Validate `config_json` and create an `Sdk`.
///
/// `app_id` and `app_password` may be null, meaning empty. Returns null on
/// failure. When `out_error` is non-null it always receives the outcome;
/// a non-null `message` must be freed with `serato_free_string`.
/// The caller must free the returned pointer with `serato_sdk_free`.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_new(
    config_json: *const c_char,
    app_id: *const c_char,
    app_password: *const c_char,
    out_error: *mut FfiConfigError,
) -> *mut FfiSdk {
    let outcome = catch_unwind(|| {
        let Some(raw) = c_str(config_json) else {
            return Err(FfiConfigError::new(FFI_NULL_ARG, "null argument: config_json"));
        };
        let document: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| FfiConfigError::new(FFI_INVALID_JSON, format!("invalid JSON: {e}")))?;
        let app_id = c_str(app_id).unwrap_or_default();
        let app_password = c_str(app_password).unwrap_or_default();
        Sdk::new(SdkArgs::from_json(&document), app_id, app_password)
            .map_err(|e| FfiConfigError::from_config(&e))
    })
    .unwrap_or_else(|_| Err(FfiConfigError::new(FFI_PANIC, "panic in serato_sdk_new")));

    let (sdk, error) = match outcome {
        Ok(inner) => (Box::into_raw(Box::new(FfiSdk { inner })), FfiConfigError::ok()),
        Err(error) => (std::ptr::null_mut(), error),
    };
    if out_error.is_null() {
        free_c_string(error.message);
    } else {
        unsafe { out_error.write(error) };
    }
    sdk
}

/// Free an `Sdk` created by `serato_sdk_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_free(sdk: *mut FfiSdk) {
    if !sdk.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(sdk) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Configuration and credentials
// ---------------------------------------------------------------------------

/// Configured request timeout in seconds. NaN if `sdk` is null.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_timeout(sdk: *const FfiSdk) -> f64 {
    catch_unwind(AssertUnwindSafe(|| {
        if sdk.is_null() {
            return f64::NAN;
        }
        unsafe { &*sdk }.inner.config().timeout
    }))
    .unwrap_or(f64::NAN)
}

/// Base URI configured for `service`.
///
/// Returns null if `sdk` is null. Free with `serato_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_base_uri(sdk: *const FfiSdk, service: FfiServiceName) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if sdk.is_null() {
            return std::ptr::null_mut();
        }
        let sdk = unsafe { &*sdk };
        let uri = sdk.inner.config().base_uri.get(service.into()).to_string();
        into_c_string(uri).unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Current application id. Returns null if `sdk` is null.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_app_id(sdk: *const FfiSdk) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if sdk.is_null() {
            return std::ptr::null_mut();
        }
        let sdk = unsafe { &*sdk };
        into_c_string(sdk.inner.app_id().to_string()).unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Current application password. Returns null if `sdk` is null.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_app_password(sdk: *const FfiSdk) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if sdk.is_null() {
            return std::ptr::null_mut();
        }
        let sdk = unsafe { &*sdk };
        into_c_string(sdk.inner.app_password().to_string()).unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Replace the application id. Returns false if an argument is null or not
/// valid UTF-8. Requests built earlier keep the old value.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_set_app_id(sdk: *mut FfiSdk, app_id: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(app_id) = c_str(app_id) else {
            return false;
        };
        if sdk.is_null() {
            return false;
        }
        unsafe { &mut *sdk }.inner.set_app_id(app_id);
        true
    }))
    .unwrap_or(false)
}

/// Replace the application password. Returns false if an argument is null
/// or not valid UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_set_app_password(sdk: *mut FfiSdk, app_password: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(app_password) = c_str(app_password) else {
            return false;
        };
        if sdk.is_null() {
            return false;
        }
        unsafe { &mut *sdk }.inner.set_app_password(app_password);
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Build a request for `path` on `service` using a freshly created client.
///
/// Returns null if `sdk` or `path` is null.
/// The caller must free the returned pointer with `serato_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn serato_sdk_build_request(
    sdk: *const FfiSdk,
    service: FfiServiceName,
    method: FfiHttpMethod,
    path: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(path) = c_str(path) else {
            return std::ptr::null_mut();
        };
        if sdk.is_null() {
            return std::ptr::null_mut();
        }
        let sdk = &unsafe { &*sdk }.inner;
        let method = HttpMethod::from(method);
        let req = match ServiceName::from(service) {
            ServiceName::Id => sdk.create_identity_client().build_request(method, path),
            ServiceName::License => sdk.create_license_client().build_request(method, path),
            ServiceName::Profile => sdk.create_profile_client().build_request(method, path),
            ServiceName::Ecom => sdk.create_ecom_client().build_request(method, path),
        };
        FfiHttpRequest::from_core(req)
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `serato_sdk_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn serato_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn serato_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
