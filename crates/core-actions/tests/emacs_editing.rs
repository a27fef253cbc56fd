mod common;
use common::*;

use core_keymap::KeymapId;
use pretty_assertions::assert_eq;

#[test]
fn insert_after_backward_char() {
    let mut s = session(&["helo", "\x02", "l", "\r"]);
    assert_eq!(s.read(), "hello");
    assert_eq!(s.history.lines(), vec!["hello"]);
}

#[test]
fn meta_b_moves_to_word_start() {
    let mut s = session(&["world", "\x1bb", "hello ", "\r"]);
    assert_eq!(s.read(), "hello world");
}

#[test]
fn kill_line_after_forward_word() {
    let mut s = session(&["hello world", "\x01", "\x1bf", "\x0b", "\r"]);
    assert_eq!(s.read(), "hello");
    let slots: Vec<&str> = s.editor.state().kill_ring.slots().collect();
    assert_eq!(slots, vec![" world"]);
}

#[test]
fn yank_then_yank_pop_cycles_older_kills() {
    let mut s = session(&["one", "\x17", "two", "\x17", "\x19", "\x1by", "\r"]);
    assert_eq!(s.read(), "one");
}

#[test]
fn yank_pop_after_other_command_does_nothing() {
    let mut s = session(&["ab", "\x17", "\x19", "x", "\x1by", "\r"]);
    assert_eq!(s.read(), "abx");
}

#[test]
fn transpose_chars_at_end_swaps_last_two() {
    let mut s = session(&["ab", "\x14", "\r"]);
    assert_eq!(s.read(), "ba");
}

#[test]
fn transpose_words_swaps_around_cursor() {
    let mut s = session(&["one two", "\x1bt", "\r"]);
    assert_eq!(s.read(), "two one");
}

#[test]
fn case_words_from_line_start() {
    let mut s = session(&["hello world", "\x01", "\x1bu", "\r"]);
    assert_eq!(s.read(), "HELLO world");

    let mut s = session(&["hello world", "\x01", "\x1bc", "\r"]);
    assert_eq!(s.read(), "Hello world");
}

#[test]
fn backspace_removes_empty_bracket_pair() {
    let mut s = session(&["f()", "\x02", "\x7f", "\r"]);
    assert_eq!(s.read(), "f");
}

#[test]
fn insert_comment_accepts_line() {
    let mut s = session(&["ls", "\x1b#"]);
    assert_eq!(s.read(), "#ls");
    assert_eq!(s.history.lines(), vec!["#ls"]);
}

#[test]
fn quoted_insert_shows_control_in_caret_form() {
    let mut s = session(&["a", "\x16", "\x01", "\r"]);
    assert_eq!(s.read(), "a^A");
}

#[test]
fn overwrite_mode_replaces_runes() {
    let mut s = session(&["abc", "\x01", "\x1b[2~", "xy", "\r"]);
    assert_eq!(s.read(), "xyc");
}

#[test]
fn delete_horizontal_whitespace_joins_words() {
    let mut s = session(&["a   b", "\x02", "\x02", "\x1b\\", "\r"]);
    assert_eq!(s.read(), "ab");
}

#[test]
fn region_kill_between_mark_and_point() {
    // mark at 2, point at end
    let mut s = session(&["ab", "\x00", "cd", "\x1bW", "\r"]);
    assert_eq!(s.read(), "ab");
    let slots: Vec<&str> = s.editor.state().kill_ring.slots().collect();
    assert_eq!(slots, vec!["cd"]);
}

#[test]
fn clear_screen_reaches_renderer() {
    let mut s = session(&["a", "\x0c", "\r"]);
    assert_eq!(s.read(), "a");
    assert_eq!(s.log.count(&Event::ClearScreen), 1);
}

#[test]
fn insert_history_token_picks_nth_word() {
    let history = SharedHistory::with(&["git commit -m msg"]);
    let mut s = session_with(&["\x1b2", "\r"], history, |_| {});
    assert_eq!(s.read(), "commit");
}

#[test]
fn character_search_jumps_to_next_occurrence() {
    let mut s = session(&["a-b-c", "\x01", "\x1d", "-", "\x1d", "-", "X", "\r"]);
    assert_eq!(s.read(), "a-bX-c");
}

#[test]
fn keyword_increase_steps_number_before_cursor() {
    let mut s = session(&["x=41", "\x18+", "\r"]);
    assert_eq!(s.read(), "x=42");
}

#[test]
fn keyword_decrease_toggles_boolean_and_operator() {
    let mut s = session(&["flag=true", "\x18-", "\r"]);
    assert_eq!(s.read(), "flag=false");
    let mut s = session(&["a && b", "\x02\x02\x02", "\x18+", "\r"]);
    assert_eq!(s.read(), "a || b");
}

#[test]
fn keyword_switch_without_keyword_keeps_line() {
    let mut s = session(&["word", "\x18+", "\x1f", "\r"]);
    // no undo step was taken, so undo removes the last typed rune
    assert_eq!(s.read(), "wor");
}

#[test]
fn kill_buffer_feeds_kill_ring() {
    let mut s = session(&["one two", "\x18k", "\x19", "\x19", "\r"]);
    s.editor.bind_key(KeymapId::Emacs, "\x18k", "kill-buffer");
    assert_eq!(s.read(), "one twoone two");
}

#[test]
fn meta_tab_inserts_tab() {
    let mut s = session(&["a", "\x1b\t", "b", "\r"]);
    assert_eq!(s.read(), "a\tb");
}

#[test]
fn meta_uppercase_runs_lowercase_binding() {
    let mut s = session(&["hello", "\x01", "\x1bU", "\r"]);
    assert_eq!(s.read(), "HELLO");
}

#[test]
fn dump_variables_lists_settings() {
    let mut s = session(&["\x18v", "\r"]);
    s.editor.bind_key(KeymapId::Emacs, "\x18v", "dump-variables");
    assert_eq!(s.read(), "");
    let notices = s.log.notices();
    assert_eq!(notices.len(), 7);
    assert!(notices.contains(&"editing.mode is set to `emacs'".to_string()));
    assert!(notices.contains(&"macros.recursion_limit is set to `16'".to_string()));
}

#[test]
fn dump_functions_groups_keys_by_command() {
    let mut s = session(&["\x18f", "\r"]);
    s.editor.bind_key(KeymapId::Emacs, "\x18f", "dump-functions");
    s.read();
    let notices = s.log.notices();
    assert!(notices.contains(&"forward-word can be found on \"\\ef\".".to_string()));
    assert!(notices.contains(&"accept-line can be found on \"\\C-j\", \"\\C-m\".".to_string()));
}

#[test]
fn dump_macros_shows_replay_keys() {
    let mut s = session(&["\x18(", "ab", "\x18)", "\x18m", "\r"]);
    s.editor.bind_key(KeymapId::Emacs, "\x18m", "dump-macros");
    assert_eq!(s.read(), "ab");
    assert_eq!(s.log.notices(), vec!["\\C-xe outputs ab".to_string()]);
}
