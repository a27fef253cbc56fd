mod common;
use common::*;

use pretty_assertions::assert_eq;

#[test]
fn n_undos_reach_the_empty_line() {
    let mut s = session(&["abc", "\x1f\x1f\x1f", "\r"]);
    assert_eq!(s.read(), "");
}

#[test]
fn redo_after_undo() {
    let mut s = session(&["abc", "\x1f\x1f", "\x1b/", "\r"]);
    assert_eq!(s.read(), "ab");
}

#[test]
fn undo_restores_killed_word() {
    let mut s = session(&["one two", "\x17", "\x1f", "\r"]);
    assert_eq!(s.read(), "one two");
}

#[test]
fn revert_line_returns_to_line_start() {
    let mut s = session(&["abc", "\x1br", "\r"]);
    assert_eq!(s.read(), "");
}

#[test]
fn motions_do_not_create_undo_steps() {
    // undo after a cursor move still removes the last typed rune
    let mut s = session(&["ab", "\x02", "\x1b[C", "\x1f", "\r"]);
    assert_eq!(s.read(), "a");
}

#[test]
fn recorded_macro_replays() {
    let mut s = session(&["\x18(", "ab", "\x18)", "\x18e", "\x18e", "\r"]);
    assert_eq!(s.read(), "ababab");
    assert_eq!(s.editor.macros().last_macro(), &['a', 'b']);
}

#[test]
fn meta_prefix_split_across_reads_records_once() {
    let mut s = session(&["one two three", "\x01", "\x18(", "\x1b", "f", "\x18)", "\x18e", "X", "\r"]);
    assert_eq!(s.read(), "one twoX three");
    assert_eq!(s.editor.macros().last_macro(), &['\x1b', 'f']);
}

#[test]
fn self_calling_macro_stops_at_recursion_limit() {
    let mut s = session(&["\x18(", "a", "\x18e", "\x18)", "\x18e", "\r"]);
    assert_eq!(s.read(), "a".repeat(17));
    assert_eq!(s.log.hints(), vec!["macro recursion limit reached (17 > 16)".to_string()]);
}

#[test]
fn recursion_limit_follows_config() {
    let mut s = session_with(
        &["\x18(", "a", "\x18e", "\x18)", "\x18e", "\r"],
        SharedHistory::default(),
        |cfg| cfg.file.macros.recursion_limit = 2,
    );
    assert_eq!(s.read(), "aaa");
}

#[test]
fn print_last_macro_uses_inputrc_notation() {
    let mut s = session(&["\x18(", "a\x01", "\x18)", "\x18p", "\r"]);
    assert_eq!(s.read(), "a");
    assert_eq!(s.log.notices(), vec!["a\\C-a".to_string()]);
}
