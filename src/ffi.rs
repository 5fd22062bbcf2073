//! C ABI for embedding the formatter in native hosts
//!
//! Clipboard managers, editor plugins and browser helpers written in C, C++
//! or Swift link the `staticlib`/`cdylib` build and call the functions below.
//!
//! # Boundary Contract
//!
//! ## String Representation
//!
//! **All strings are UTF-8 bytes + length, never NUL-terminated.**
//!
//! Every string field is a pointer (`*mut u8` / `*const u8`) paired with a
//! `_len` field holding the exact byte count. C code must use the length
//! field and must not call `strlen()` on these pointers.
//!
//! ## Memory Management
//!
//! - Rust allocates every output buffer as a `Box<[u8]>`
//! - C must release a populated result with `link_formatter_result_free()`
//! - C must release a handle with `link_formatter_free()`
//! - Never pass these pointers to C's `free()`
//!
//! ```rust
//! use link_formatter::ffi::{FormatResultFfi, link_formatter_result_free};
//!
//! let text = String::from("See this paper[1].");
//! let text_len = text.len();
//! let mut result = FormatResultFfi::empty();
//! result.plain_text = Box::into_raw(text.into_bytes().into_boxed_slice()) as *mut u8;
//! result.plain_text_len = text_len;
//!
//! unsafe { link_formatter_result_free(&mut result) };
//! assert!(result.plain_text.is_null());
//! assert_eq!(result.plain_text_len, 0);
//! ```
//!
//! ## Error Handling
//!
//! - Success: `error_code == 0`, `error_message == NULL`, output fields set
//! - Error: `error_code != 0` (see `ERROR_*`), `error_message` set, all
//!   output fields NULL
//! - Every entry point runs inside `catch_unwind`; a panic becomes
//!   `ERROR_INTERNAL` and never unwinds into C
//!
//! ## Thread Safety
//!
//! A handle holds configuration only, but it is not synchronized: do not
//! use one handle from several threads at once. Separate handles are
//! independent.

use std::any::Any;
use std::panic;
use std::ptr;
use std::slice;

use crate::error::FormatError;
use crate::formatter::{FormatOptions, FormattedOutput, Formatter};
use crate::serializer::MarkupScope;

// ============================================================================
// Error Code Constants
// ============================================================================

/// Success - no error occurred
pub const ERROR_SUCCESS: u32 = 0;

/// Input could not be interpreted as markup
pub const ERROR_PARSE: u32 = 1;

/// Input bytes could not be decoded (invalid bytes, unknown charset)
pub const ERROR_ENCODING: u32 = 2;

/// Rewritten markup could not be serialized
pub const ERROR_SERIALIZE: u32 = 3;

/// Invalid input data (NULL pointers, invalid parameters)
pub const ERROR_INVALID_INPUT: u32 = 5;

/// Internal error (unexpected condition, panic caught)
pub const ERROR_INTERNAL: u32 = 99;

// ============================================================================
// FFI Data Structures
// ============================================================================

/// Per-call options passed from C
///
/// Flags are `0` (off) or non-zero (on).
///
/// ```c
/// const char *flavor = "text/html;charset=utf-8";
/// link_formatter_options_t options = {
///     .strip_metadata = 1,
///     .append_reference_list = 0,
///     .body_only = 1,
///     .mime_type = (const uint8_t *)flavor,
///     .mime_type_len = strlen(flavor),
/// };
/// ```
#[repr(C)]
pub struct FormatOptionsFfi {
    /// Remove `<meta>` tags and inline `style` attributes: 0=no, 1=yes
    pub strip_metadata: u8,
    /// Append a `References:` list to the plain text: 0=no, 1=yes
    pub append_reference_list: u8,
    /// Serialize only the children of `<body>`: 0=no, 1=yes
    pub body_only: u8,
    /// MIME type of the input for charset detection (UTF-8 bytes, can be NULL)
    pub mime_type: *const u8,
    /// Length of mime_type in bytes (0 if NULL)
    pub mime_type_len: usize,
}

/// Result returned from Rust to C
///
/// # State Invariants
///
/// **Success (`error_code == 0`):** the three text buffers are non-NULL
/// (possibly zero-length), `reference_count` holds the number of recorded
/// references, `error_message` is NULL.
///
/// **Error (`error_code != 0`):** all text buffers are NULL with length 0,
/// `reference_count` is 0, `error_message` points to a UTF-8 description.
#[repr(C)]
pub struct FormatResultFfi {
    /// Plain text with reference markers (UTF-8, NOT NUL-terminated)
    pub plain_text: *mut u8,
    /// Length of plain_text in bytes
    pub plain_text_len: usize,
    /// Plain text without blank lines (UTF-8, NOT NUL-terminated)
    pub compact_text: *mut u8,
    /// Length of compact_text in bytes
    pub compact_text_len: usize,
    /// Footnote-rewritten markup (UTF-8, NOT NUL-terminated)
    pub markup: *mut u8,
    /// Length of markup in bytes
    pub markup_len: usize,
    /// Number of references recorded while rendering plain_text
    pub reference_count: usize,
    /// Error code: 0=success, non-zero=error (see ERROR_* constants)
    pub error_code: u32,
    /// Error message (UTF-8 bytes, NULL on success)
    pub error_message: *mut u8,
    /// Length of error_message in bytes
    pub error_message_len: usize,
}

impl FormatResultFfi {
    /// A result with every pointer NULL and every length zero
    pub fn empty() -> Self {
        Self {
            plain_text: ptr::null_mut(),
            plain_text_len: 0,
            compact_text: ptr::null_mut(),
            compact_text_len: 0,
            markup: ptr::null_mut(),
            markup_len: 0,
            reference_count: 0,
            error_code: ERROR_SUCCESS,
            error_message: ptr::null_mut(),
            error_message_len: 0,
        }
    }
}

impl Default for FormatResultFfi {
    fn default() -> Self {
        Self::empty()
    }
}

/// Opaque formatter handle
///
/// 1. Create: `link_formatter_new()`
/// 2. Use: `link_formatter_format()`, any number of times
/// 3. Destroy: `link_formatter_free()`
pub struct FormatterHandle {
    defaults: FormatOptions,
}

fn reset_result(result: &mut FormatResultFfi) {
    *result = FormatResultFfi::empty();
}

fn into_buffer(text: String) -> (*mut u8, usize) {
    let bytes = text.into_bytes().into_boxed_slice();
    let len = bytes.len();
    (Box::into_raw(bytes) as *mut u8, len)
}

fn set_error_result(result: &mut FormatResultFfi, error: &FormatError) {
    let (message, message_len) = into_buffer(error.to_string());
    result.error_code = error.code();
    result.error_message = message;
    result.error_message_len = message_len;
}

fn set_success_result(result: &mut FormatResultFfi, output: FormattedOutput) {
    result.reference_count = output.references.len();
    (result.plain_text, result.plain_text_len) = into_buffer(output.plain_text);
    (result.compact_text, result.compact_text_len) = into_buffer(output.compact_text);
    (result.markup, result.markup_len) = into_buffer(output.markup);
    result.error_code = ERROR_SUCCESS;
    result.error_message = ptr::null_mut();
    result.error_message_len = 0;
}

/// Turn a caught panic payload into the error reported over the ABI
fn panic_error(payload: &(dyn Any + Send)) -> FormatError {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    FormatError::InternalError(format!("panic during formatting: {detail}"))
}

fn required_ref<'a, T>(ptr: *const T, name: &str) -> Result<&'a T, FormatError> {
    if ptr.is_null() {
        return Err(FormatError::InvalidInput(format!("{name} pointer is NULL")));
    }

    // SAFETY: Caller provided a non-NULL pointer and accepts the contract
    // that it points to a valid, properly aligned value.
    Ok(unsafe { &*ptr })
}

fn required_bytes<'a>(ptr: *const u8, len: usize, name: &str) -> Result<&'a [u8], FormatError> {
    if len == 0 {
        return Ok(&[]);
    }

    if ptr.is_null() {
        return Err(FormatError::InvalidInput(format!("{name} pointer is NULL")));
    }

    // SAFETY: Pointer was validated as non-NULL above; caller guarantees `len`
    // bytes are valid and readable for the duration of this call.
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

fn optional_utf8<'a>(
    ptr: *const u8,
    len: usize,
    field_name: &str,
) -> Result<Option<&'a str>, FormatError> {
    if len == 0 {
        return Ok(None);
    }

    if ptr.is_null() {
        return Err(FormatError::InvalidInput(format!(
            "{field_name}_len > 0 with NULL {field_name} pointer"
        )));
    }

    // SAFETY: Pointer is non-NULL and caller guarantees `len` readable bytes.
    let bytes = unsafe { slice::from_raw_parts(ptr, len) };

    Ok(std::str::from_utf8(bytes).ok())
}

fn format_inner(
    handle_ref: &FormatterHandle,
    input: &[u8],
    options_ref: Option<&FormatOptionsFfi>,
) -> Result<FormattedOutput, FormatError> {
    let Some(options_ref) = options_ref else {
        return Formatter::with_options(handle_ref.defaults.clone()).format_bytes(input, None);
    };

    let mime_type = optional_utf8(options_ref.mime_type, options_ref.mime_type_len, "mime_type")?;

    let options = FormatOptions {
        strip_metadata: options_ref.strip_metadata != 0,
        append_reference_list: options_ref.append_reference_list != 0,
        markup_scope: if options_ref.body_only != 0 {
            MarkupScope::Body
        } else {
            MarkupScope::Document
        },
        ..handle_ref.defaults.clone()
    };

    Formatter::with_options(options).format_bytes(input, mime_type)
}

fn free_buffer(ptr_field: &mut *mut u8, len_field: &mut usize) {
    if (*ptr_field).is_null() {
        return;
    }

    let raw = ptr::slice_from_raw_parts_mut(*ptr_field, *len_field);
    // SAFETY: `raw` was allocated by `Box<[u8]>` via `Box::into_raw`.
    let _ = unsafe { Box::from_raw(raw) };
    *ptr_field = ptr::null_mut();
    *len_field = 0;
}

// ============================================================================
// FFI Functions
// ============================================================================

/// Create a formatter handle with default options
///
/// Returns NULL if initialization panicked.
///
/// ```c
/// link_formatter_t *formatter = link_formatter_new();
/// if (formatter == NULL) {
///     return -1;
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn link_formatter_new() -> *mut FormatterHandle {
    let result = panic::catch_unwind(|| {
        Box::into_raw(Box::new(FormatterHandle {
            defaults: FormatOptions::default(),
        }))
    });

    result.unwrap_or(ptr::null_mut())
}

/// Format one input document
///
/// # Parameters
///
/// - `handle`: from `link_formatter_new()`, non-NULL
/// - `input` / `input_len`: markup bytes; `input` may be NULL only when
///   `input_len == 0` (empty input formats to empty text)
/// - `options`: per-call options, or NULL for the handle's defaults
///   (metadata stripped, no reference list, whole document, UTF-8 unless the
///   markup declares otherwise)
/// - `result`: populated in place; previous contents are overwritten, not
///   freed
///
/// # Error Codes
///
/// - `ERROR_INVALID_INPUT` (5): NULL handle, or NULL buffer with non-zero length
/// - `ERROR_ENCODING` (2): bytes invalid for the detected charset
/// - `ERROR_SERIALIZE` (3): rewritten markup could not be serialized
/// - `ERROR_INTERNAL` (99): panic caught
///
/// ```c
/// link_formatter_result_t result;
/// link_formatter_format(formatter, html, html_len, &options, &result);
/// if (result.error_code == 0) {
///     set_clipboard_text(result.plain_text, result.plain_text_len);
/// } else {
///     log_error(result.error_code, result.error_message, result.error_message_len);
/// }
/// link_formatter_result_free(&result);
/// ```
///
/// # Safety
///
/// Non-NULL pointers must be valid for the stated lengths and types. Using a
/// freed handle, or one handle from several threads at once, is undefined
/// behavior.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn link_formatter_format(
    handle: *mut FormatterHandle,
    input: *const u8,
    input_len: usize,
    options: *const FormatOptionsFfi,
    result: *mut FormatResultFfi,
) {
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    reset_result(result_ref);

    let panic_result = panic::catch_unwind(|| -> Result<FormattedOutput, FormatError> {
        let handle_ref = required_ref(handle.cast_const(), "Formatter handle")?;
        let input_slice = required_bytes(input, input_len, "Input")?;
        // SAFETY: a non-NULL `options` points to a valid struct per contract.
        let options_ref = unsafe { options.as_ref() };
        format_inner(handle_ref, input_slice, options_ref)
    });

    match panic_result {
        Ok(Ok(output)) => set_success_result(result_ref, output),
        Ok(Err(e)) => set_error_result(result_ref, &e),
        Err(payload) => set_error_result(result_ref, &panic_error(&*payload)),
    }
}

/// Release every buffer of a result
///
/// NULL `result` and NULL fields are no-ops, so calling this twice on the
/// same result is harmless: the first call clears every pointer.
///
/// # Safety
///
/// The buffers must have been allocated by `link_formatter_format()`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn link_formatter_result_free(result: *mut FormatResultFfi) {
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    free_buffer(&mut result_ref.plain_text, &mut result_ref.plain_text_len);
    free_buffer(&mut result_ref.compact_text, &mut result_ref.compact_text_len);
    free_buffer(&mut result_ref.markup, &mut result_ref.markup_len);
    free_buffer(&mut result_ref.error_message, &mut result_ref.error_message_len);
    result_ref.reference_count = 0;
    result_ref.error_code = ERROR_SUCCESS;
}

/// Destroy a formatter handle
///
/// NULL is a no-op.
///
/// # Safety
///
/// `handle` must come from `link_formatter_new()` and must not be used
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn link_formatter_free(handle: *mut FormatterHandle) {
    if handle.is_null() {
        return;
    }

    // SAFETY: `handle` is non-NULL and was created by `Box::into_raw` in
    // `link_formatter_new`.
    unsafe { drop(Box::from_raw(handle)) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constants_match_error_codes() {
        assert_eq!(FormatError::ParseError(String::new()).code(), ERROR_PARSE);
        assert_eq!(FormatError::EncodingError(String::new()).code(), ERROR_ENCODING);
        assert_eq!(FormatError::SerializeError(String::new()).code(), ERROR_SERIALIZE);
        assert_eq!(FormatError::InvalidInput(String::new()).code(), ERROR_INVALID_INPUT);
        assert_eq!(FormatError::InternalError(String::new()).code(), ERROR_INTERNAL);
    }

    #[test]
    fn test_optional_utf8_rejects_null_with_length() {
        let result = optional_utf8(ptr::null(), 3, "mime_type");
        assert!(matches!(result, Err(FormatError::InvalidInput(_))));
        assert!(matches!(optional_utf8(ptr::null(), 0, "mime_type"), Ok(None)));
    }

    #[test]
    fn test_optional_utf8_ignores_invalid_utf8() {
        let bytes = [0xFFu8, 0xFE];
        let result = optional_utf8(bytes.as_ptr(), bytes.len(), "mime_type");
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let payload = panic::catch_unwind(|| panic!("tree walk failed")).expect_err("panicked");
        let error = panic_error(&*payload);
        assert!(matches!(error, FormatError::InternalError(_)));
        assert_eq!(error.code(), ERROR_INTERNAL);
        assert_eq!(
            error.to_string(),
            "Internal error: panic during formatting: tree walk failed"
        );

        let unknown: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(
            panic_error(&*unknown).to_string(),
            "Internal error: panic during formatting: unknown cause"
        );
    }

    #[test]
    fn test_error_result_carries_code_and_message() {
        let mut result = FormatResultFfi::empty();
        set_error_result(&mut result, &panic_error(&"boom"));
        assert_eq!(result.error_code, ERROR_INTERNAL);
        // SAFETY: the buffer was just allocated by `set_error_result`.
        let message =
            unsafe { slice::from_raw_parts(result.error_message, result.error_message_len) };
        assert_eq!(message, b"Internal error: panic during formatting: boom");
        free_buffer(&mut result.error_message, &mut result.error_message_len);
    }

    #[test]
    fn test_free_buffer_clears_fields() {
        let (mut pointer, mut len) = into_buffer("abc".to_string());
        assert_eq!(len, 3);
        free_buffer(&mut pointer, &mut len);
        assert!(pointer.is_null());
        assert_eq!(len, 0);
        free_buffer(&mut pointer, &mut len);
    }
}
