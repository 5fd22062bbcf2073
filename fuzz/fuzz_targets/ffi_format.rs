#![no_main]

use libfuzzer_sys::fuzz_target;
use link_formatter::ffi::{
    FormatOptionsFfi, FormatResultFfi, link_formatter_format, link_formatter_free,
    link_formatter_new, link_formatter_result_free,
};

/// # Safety
///
/// `pointer` must come from a successful `link_formatter_format` call.
unsafe fn buffer_text<'a>(pointer: *const u8, len: usize) -> &'a str {
    let bytes = unsafe { std::slice::from_raw_parts(pointer, len) };
    std::str::from_utf8(bytes).expect("FFI output must be valid UTF-8")
}

fuzz_target!(|data: &[u8]| {
    let Some((&flags, input)) = data.split_first() else {
        return;
    };

    let handle = link_formatter_new();
    let options = FormatOptionsFfi {
        strip_metadata: flags & 1,
        append_reference_list: flags & 2,
        body_only: flags & 4,
        mime_type: std::ptr::null(),
        mime_type_len: 0,
    };
    let mut result = FormatResultFfi::empty();

    unsafe {
        link_formatter_format(handle, input.as_ptr(), input.len(), &options, &mut result);
        assert!(result.error_code == 0 || result.plain_text.is_null());
        if result.error_code == 0 {
            let plain_text = buffer_text(result.plain_text, result.plain_text_len);
            let compact_text = buffer_text(result.compact_text, result.compact_text_len);
            assert!(!compact_text.contains("\n\n"), "compact text has a blank line");
            assert_eq!(compact_text, plain_text.replace("\n\n", "\n"));
        }
        link_formatter_result_free(&mut result);
        link_formatter_free(handle);
    }
});
