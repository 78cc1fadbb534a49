#![no_main]

use arena_avl::model::CursorEquivalenceInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: CursorEquivalenceInput| {
    arena_avl::model::run_cursor_equivalence(input.keys, input.ops);
});
