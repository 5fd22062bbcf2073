#![no_main]

use libfuzzer_sys::fuzz_target;
use link_formatter::Formatter;

fuzz_target!(|data: &[u8]| {
    let Ok(output) = Formatter::new().format_bytes(data, None) else {
        return;
    };

    assert!(!output.compact_text.contains("\n\n"));
    assert_eq!(output.compact_text, output.plain_text.replace("\n\n", "\n"));
    for (index, (id, _)) in output.references.iter().enumerate() {
        assert_eq!(id, index + 1);
    }
});
