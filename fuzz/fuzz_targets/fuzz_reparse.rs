#![no_main]

use libfuzzer_sys::fuzz_target;
use sable_syntax::{TextEdit, TextRange};

mod utils;

const MAX_OLD_TEXT_BYTES: usize = 32 * 1024;
const MAX_REPLACEMENT_BYTES: usize = 4 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let Some(text) = utils::truncate_utf8(&data[8..]) else {
        return;
    };
    let start_raw = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let end_raw = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    // The same input supplies the old text and the replacement.
    let split = if text.is_empty() {
        0
    } else {
        ((start_raw ^ end_raw) as usize) % (text.len() + 1)
    };
    let split = utils::align_to_char_boundary(text, split);
    let old_text = &text[..utils::align_to_char_boundary(text, split.min(MAX_OLD_TEXT_BYTES))];
    let rest = &text[split..];
    let replacement = &rest[..utils::align_to_char_boundary(rest, MAX_REPLACEMENT_BYTES)];

    let len = old_text.len();
    let mut start = utils::align_to_char_boundary(old_text, (start_raw as usize) % (len + 1));
    let mut end = utils::align_to_char_boundary(old_text, (end_raw as usize) % (len + 1));
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    let edit = TextEdit::new(TextRange::new(start, end), replacement);
    let Ok(new_text) = edit.apply(old_text) else {
        return;
    };

    let old = sable_syntax::parse(old_text);
    let incremental = sable_syntax::reparse(&old, old_text, &edit, &new_text);

    assert_eq!(incremental.syntax().text().to_string(), new_text);

    let full = sable_syntax::parse(&new_text);
    assert_eq!(incremental.errors, full.errors);
});
