//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use serato_sdk::{ConfigError, HttpMethod, ServiceName};

/// Opaque handle to an `Sdk`. C callers receive a pointer to this and pass
/// it back into every FFI function.
pub struct FfiSdk {
    pub(crate) inner: serato_sdk::Sdk,
}

/// Service selector as a C enum.
#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiServiceName {
    Id = 0,
    License = 1,
    Profile = 2,
    Ecom = 3,
}

impl From<FfiServiceName> for ServiceName {
    fn from(s: FfiServiceName) -> Self {
        match s {
            FfiServiceName::Id => ServiceName::Id,
            FfiServiceName::License => ServiceName::License,
            FfiServiceName::Profile => ServiceName::Profile,
            FfiServiceName::Ecom => ServiceName::Ecom,
        }
    }
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Patch => HttpMethod::Patch,
            FfiHttpMethod::Delete => HttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `serato_sdk_build_request`. The C caller executes the request
/// itself and frees it with `serato_free_request`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    ///
    /// Returns null if any string contains an interior NUL byte.
    pub(crate) fn from_core(req: serato_sdk::HttpRequest) -> *mut Self {
        let Some(url) = into_c_string(req.url) else {
            return std::ptr::null_mut();
        };
        let body = match req.body.map(into_c_string) {
            None => std::ptr::null_mut(),
            Some(Some(b)) => b,
            Some(None) => {
                free_c_string(url);
                return std::ptr::null_mut();
            }
        };

        let Some(ffi_headers) = headers_into_c(req.headers) else {
            free_c_string(url);
            free_c_string(body);
            return std::ptr::null_mut();
        };
        let headers_len = ffi_headers.len() as u32;
        let headers = if ffi_headers.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(ffi_headers).cast::<FfiHeader>()
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

/// Convert every header, or none: on an interior NUL the strings already
/// moved to the C heap are freed and `None` is returned.
fn headers_into_c(headers: Vec<(String, String)>) -> Option<Box<[FfiHeader]>> {
    let mut out = Vec::with_capacity(headers.len());
    for (key, value) in headers {
        let pair = into_c_string(key).and_then(|k| match into_c_string(value) {
            Some(v) => Some(FfiHeader { key: k, value: v }),
            None => {
                free_c_string(k);
                None
            }
        });
        let Some(header) = pair else {
            for FfiHeader { key, value } in out {
                free_c_string(key);
                free_c_string(value);
            }
            return None;
        };
        out.push(header);
    }
    Some(out.into_boxed_slice())
}

/// Status codes written to `FfiConfigError::code`. Values at or above
/// 1000 are configuration error codes from the core crate.
pub const FFI_OK: u16 = 0;
pub const FFI_NULL_ARG: u16 = 1;
pub const FFI_INVALID_JSON: u16 = 2;
pub const FFI_PANIC: u16 = 3;

/// Outcome of `serato_sdk_new`, filled in by the library.
///
/// On success `code` is `FFI_OK` and `message` is null. On failure
/// `message` is a C string the caller frees with `serato_free_string`.
#[repr(C)]
pub struct FfiConfigError {
    pub code: u16,
    pub message: *mut c_char,
}

impl FfiConfigError {
    pub(crate) fn ok() -> Self {
        Self {
            code: FFI_OK,
            message: std::ptr::null_mut(),
        }
    }

    pub(crate) fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: into_c_string(message.into()).unwrap_or(std::ptr::null_mut()),
        }
    }

    pub(crate) fn from_config(err: &ConfigError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Move a Rust string onto the C heap. `None` on interior NUL bytes.
pub(crate) fn into_c_string(s: String) -> Option<*mut c_char> {
    CString::new(s).ok().map(CString::into_raw)
}

pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn request(headers: Vec<(&str, &str)>) -> serato_sdk::HttpRequest {
        serato_sdk::HttpRequest {
            method: HttpMethod::Post,
            url: "https://id.serato.com/api/v1/me".to_string(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Some("{}".to_string()),
        }
    }

    #[test]
    fn headers_are_copied_in_order() {
        let req = FfiHttpRequest::from_core(request(vec![
            ("accept", "application/json"),
            ("content-type", "application/json"),
        ]));
        assert!(!req.is_null());
        let r = unsafe { &*req };
        assert_eq!(r.headers_len, 2);
        let headers = unsafe { std::slice::from_raw_parts(r.headers, r.headers_len as usize) };
        for h in headers {
            assert!(!h.key.is_null());
            assert!(!h.value.is_null());
        }
        assert_eq!(unsafe { CStr::from_ptr(headers[1].key) }.to_str().unwrap(), "content-type");
        crate::serato_free_request(req);
    }

    #[test]
    fn nul_in_header_value_rejects_the_request() {
        let req = FfiHttpRequest::from_core(request(vec![
            ("accept", "application/json"),
            ("x-trace", "a\0b"),
        ]));
        assert!(req.is_null());
    }

    #[test]
    fn nul_in_header_key_rejects_the_request() {
        let req = FfiHttpRequest::from_core(request(vec![("x\0key", "v")]));
        assert!(req.is_null());
    }

    #[test]
    fn no_headers_gives_null_array() {
        let req = FfiHttpRequest::from_core(request(Vec::new()));
        assert!(!req.is_null());
        assert!(unsafe { &*req }.headers.is_null());
        assert_eq!(unsafe { &*req }.headers_len, 0);
        crate::serato_free_request(req);
    }
}
