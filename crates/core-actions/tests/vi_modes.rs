mod common;
use common::*;

use core_state::Mode;
use pretty_assertions::assert_eq;

#[test]
fn escape_then_dw_deletes_first_word() {
    let mut s = vi_session(&["hello world", "\x1b", "0", "dw", "\r"]);
    assert_eq!(s.read(), "world");
}

#[test]
fn cw_changes_to_word_end() {
    let mut s = vi_session(&["hello world", "\x1b", "0", "cw", "bye", "\x1b", "\r"]);
    assert_eq!(s.read(), "bye world");
}

#[test]
fn dd_clears_line_into_kill_ring() {
    let mut s = vi_session(&["abc", "\x1b", "dd", "\r"]);
    assert_eq!(s.read(), "");
    let slots: Vec<&str> = s.editor.state().kill_ring.slots().collect();
    assert_eq!(slots, vec!["abc"]);
}

#[test]
fn count_applies_to_operator_motion() {
    let mut s = vi_session(&["a b c d", "\x1b", "0", "2dw", "\r"]);
    assert_eq!(s.read(), "c d");
}

#[test]
fn x_then_p_moves_a_rune() {
    let mut s = vi_session(&["abc", "\x1b", "0", "x", "p", "\r"]);
    assert_eq!(s.read(), "bac");
}

#[test]
fn replace_once_returns_to_command_mode() {
    let mut s = vi_session(&["abc", "\x1b", "0", "rz", "x", "\r"]);
    // r leaves the cursor on the replaced rune; x then deletes it
    assert_eq!(s.read(), "bc");
}

#[test]
fn replace_once_with_control_rune_lands_on_caret_form() {
    let mut s = vi_session(&["abc", "\x1b", "0", "r\x01", "x", "\r"]);
    // the caret form is two units wide; x removes its first one
    assert_eq!(s.read(), "Abc");
}

#[test]
fn delete_till_adjacent_rune_deletes_nothing() {
    let mut s = vi_session(&["abc", "\x1b", "0", "d", "t", "b", "\r"]);
    assert_eq!(s.read(), "abc");
}

#[test]
fn change_till_adjacent_rune_only_enters_insert() {
    let mut s = vi_session(&["abc", "\x1b", "0", "ctb", "X", "\x1b", "\r"]);
    assert_eq!(s.read(), "Xabc");
}

#[test]
fn delete_till_keeps_the_target() {
    let mut s = vi_session(&["abcd", "\x1b", "0", "dtd", "\r"]);
    assert_eq!(s.read(), "d");
}

#[test]
fn find_char_then_kill_to_end() {
    let mut s = vi_session(&["hello world", "\x1b", "0", "fo", "D", "\r"]);
    assert_eq!(s.read(), "hell");
}

#[test]
fn tilde_toggles_case_and_advances() {
    let mut s = vi_session(&["abc", "\x1b", "0", "~~", "\r"]);
    assert_eq!(s.read(), "ABc");
}

#[test]
fn change_inside_quotes() {
    let mut s = vi_session(&["say \"hi there\"", "\x1b", "0", "fh", "ci\"", "yo", "\x1b", "\r"]);
    assert_eq!(s.read(), "say \"yo\"");
}

#[test]
fn insert_and_append_entries() {
    let mut s = vi_session(&["b", "\x1b", "Ia", "\x1b", "Ac", "\r"]);
    assert_eq!(s.read(), "abc");
}

#[test]
fn undo_restores_deleted_rune() {
    let mut s = vi_session(&["abc", "\x1b", "x", "u", "\r"]);
    assert_eq!(s.read(), "abc");
}

#[test]
fn replace_many_until_escape() {
    let mut s = vi_session(&["abcd", "\x1b", "0", "Rxy", "\x1b", "\r"]);
    assert_eq!(s.read(), "xycd");
}

#[test]
fn yank_line_then_put_before() {
    let mut s = vi_session(&["ab", "\x1b", "yy", "P", "\r"]);
    assert_eq!(s.read(), "abab");
}

#[test]
fn escape_cancels_pending_operator() {
    let mut s = vi_session(&["abc", "\x1b", "d", "\x1b", "x", "\r"]);
    assert_eq!(s.read(), "ab");
}

#[test]
fn operator_waits_in_pending_mode() {
    let mut s = vi_session(&["abc", "\x1b", "d"]);
    assert!(s.editor.read_line().unwrap_err().is_eof());
    assert_eq!(s.editor.state().mode, Mode::ViDeletePending(core_state::PendingOp::Delete));
}

#[test]
fn history_keys_walk_and_restore_draft() {
    let history = SharedHistory::with(&["first", "second"]);
    let mut s = session_with(&["draft", "\x1b", "k", "k", "j", "j", "\r"], history, |cfg| {
        cfg.file.editing.mode = core_config::EditingStyle::Vi;
    });
    assert_eq!(s.read(), "draft");
    let rendered = s.log.rendered_lines();
    assert!(rendered.contains(&"first".to_string()));
    assert!(rendered.contains(&"second".to_string()));
}

#[test]
fn unbound_command_keys_are_ignored() {
    let mut s = vi_session(&["ab", "\x1b", "Q", "\r"]);
    assert_eq!(s.read(), "ab");
}

#[test]
fn ctrl_a_increments_number_under_cursor() {
    let mut s = vi_session(&["n 9", "\x1b", "\x01", "\r"]);
    assert_eq!(s.read(), "n 10");
}
