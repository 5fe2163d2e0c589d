#![no_main]

use libfuzzer_sys::fuzz_target;

mod utils;

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };

    // Every entry point is total and lossless on arbitrary input.
    for result in [
        sable_syntax::parse(text),
        sable_syntax::parse_statement(text),
        sable_syntax::parse_member(text),
        sable_syntax::parse_expression(text),
    ] {
        assert_eq!(result.syntax().text().to_string(), text);
        for error in &result.errors {
            assert!(error.range.start <= error.range.end);
            assert!(error.range.end as usize <= text.len());
        }
    }

    let _ = sable_syntax::parse_with_options(text, &sable_syntax::ParseOptions::default());
});
