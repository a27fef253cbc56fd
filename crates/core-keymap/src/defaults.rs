//! Default binding tables.

/// Escape sequences shared by every keymap.
const SPECIAL: &[(&str, &str)] = &[
    ("\x1b[A", "previous-history"),
    ("\x1b[B", "next-history"),
    ("\x1b[C", "forward-char"),
    ("\x1b[D", "backward-char"),
    ("\x1b[H", "beginning-of-line"),
    ("\x1b[F", "end-of-line"),
    ("\x1b[1~", "beginning-of-line"),
    ("\x1b[4~", "end-of-line"),
    ("\x1b[3~", "delete-char"),
    ("\x1b[Z", "menu-complete-backward"),
];

/// Control keys shared by emacs and vi insert.
const CONTROL: &[(&str, &str)] = &[
    ("\x01", "beginning-of-line"),
    ("\x02", "backward-char"),
    ("\x05", "end-of-line"),
    ("\x06", "completion-search"),
    ("\x07", "abort"),
    ("\x08", "backward-delete-char"),
    ("\t", "complete"),
    ("\n", "accept-line"),
    ("\r", "accept-line"),
    ("\x0b", "kill-line"),
    ("\x0c", "clear-screen"),
    ("\x0e", "next-history"),
    ("\x10", "previous-history"),
    ("\x11", "quoted-insert"),
    ("\x12", "history-search"),
    ("\x14", "transpose-chars"),
    ("\x15", "backward-kill-line"),
    ("\x16", "quoted-insert"),
    ("\x17", "unix-word-rubout"),
    ("\x19", "yank"),
    ("\x1d", "character-search"),
    ("\x1f", "undo"),
    ("\x7f", "backward-delete-char"),
];

const EMACS_ONLY: &[(&str, &str)] = &[
    ("\x1b", "prefix-meta"),
    ("\x00", "set-mark"),
    ("\x1b[2~", "overwrite-mode"),
    // C-x prefix
    ("\x18(", "start-kbd-macro"),
    ("\x18)", "end-kbd-macro"),
    ("\x18e", "call-last-kbd-macro"),
    ("\x18p", "print-last-kbd-macro"),
    ("\x18\x05", "edit-command-line"),
    ("\x18!", "edit-and-execute-command"),
    ("\x18\x15", "undo"),
    ("\x18\x18", "exchange-point-and-mark"),
    ("\x18\x7f", "backward-kill-line"),
    // Meta
    ("\x1bf", "forward-word"),
    ("\x1bb", "backward-word"),
    ("\x1bF", "shell-forward-word"),
    ("\x1bB", "shell-backward-word"),
    ("\x1bd", "kill-word"),
    ("\x1bD", "shell-kill-word"),
    ("\x1b\x7f", "backward-kill-word"),
    ("\x1b\x08", "shell-backward-kill-word"),
    ("\x1by", "yank-pop"),
    ("\x1bu", "upcase-word"),
    ("\x1bl", "downcase-word"),
    ("\x1bc", "capitalize-word"),
    ("\x1bt", "transpose-words"),
    ("\x1bT", "shell-transpose-words"),
    ("\x1bw", "copy-region-as-kill"),
    ("\x1bW", "kill-region"),
    ("\x1b\\", "delete-horizontal-whitespace"),
    ("\x1br", "revert-line"),
    ("\x1b/", "redo"),
    ("\x1b#", "insert-comment"),
    ("\x1b'", "quote-region"),
    ("\x1b\"", "quote-line"),
    ("\x1b.", "copy-prev-shell-word"),
    ("\x1b,", "copy-backward-word"),
    ("\x1b;", "copy-forward-word"),
    ("\x1bz", "delete-word"),
    ("\x1bk", "kill-whole-line"),
    ("\x1b\x1d", "character-search-backward"),
    ("\x1b\x04", "forward-backward-delete-char"),
    ("\x1b\x07", "abort"),
    ("\x1b\t", "tab-insert"),
    ("\x18+", "keyword-increase"),
    ("\x18-", "keyword-decrease"),
];

/// Meta-uppercase letters without a binding of their own. `O` stays free
/// for SS3 key sequences.
const DO_LOWERCASE: &[(&str, &str)] = &[
    ("\x1bA", "do-lowercase-version"),
    ("\x1bC", "do-lowercase-version"),
    ("\x1bE", "do-lowercase-version"),
    ("\x1bG", "do-lowercase-version"),
    ("\x1bH", "do-lowercase-version"),
    ("\x1bI", "do-lowercase-version"),
    ("\x1bJ", "do-lowercase-version"),
    ("\x1bK", "do-lowercase-version"),
    ("\x1bL", "do-lowercase-version"),
    ("\x1bM", "do-lowercase-version"),
    ("\x1bN", "do-lowercase-version"),
    ("\x1bP", "do-lowercase-version"),
    ("\x1bQ", "do-lowercase-version"),
    ("\x1bR", "do-lowercase-version"),
    ("\x1bS", "do-lowercase-version"),
    ("\x1bU", "do-lowercase-version"),
    ("\x1bV", "do-lowercase-version"),
    ("\x1bX", "do-lowercase-version"),
    ("\x1bY", "do-lowercase-version"),
    ("\x1bZ", "do-lowercase-version"),
];

const INSERT_HISTORY_TOKEN: &[(&str, &str)] = &[
    ("\x1b1", "insert-history-token"),
    ("\x1b2", "insert-history-token"),
    ("\x1b3", "insert-history-token"),
    ("\x1b4", "insert-history-token"),
    ("\x1b5", "insert-history-token"),
    ("\x1b6", "insert-history-token"),
    ("\x1b7", "insert-history-token"),
    ("\x1b8", "insert-history-token"),
    ("\x1b9", "insert-history-token"),
];

/// Emacs keymap.
pub static EMACS: std::sync::LazyLock<Vec<(&'static str, &'static str)>> =
    std::sync::LazyLock::new(|| {
        CONTROL
            .iter()
            .chain(SPECIAL.iter())
            .chain(EMACS_ONLY.iter())
            .chain(INSERT_HISTORY_TOKEN.iter())
            .chain(DO_LOWERCASE.iter())
            .copied()
            .collect()
    });

/// Vi insert keymap.
pub static VI_INSERT: std::sync::LazyLock<Vec<(&'static str, &'static str)>> =
    std::sync::LazyLock::new(|| {
        CONTROL
            .iter()
            .chain(SPECIAL.iter())
            .chain([("\x1b", "vi-command-mode")].iter())
            .copied()
            .collect()
    });

const VI_COMMAND_KEYS: &[(&str, &str)] = &[
    ("\x1b", "vi-command-mode"),
    ("\n", "accept-line"),
    ("\r", "accept-line"),
    ("\x7f", "backward-char"),
    ("\x08", "backward-char"),
    ("\x0c", "clear-screen"),
    ("\x12", "redo"),
    ("\x18e", "call-last-kbd-macro"),
    ("\x18\x05", "edit-command-line"),
    ("\x01", "keyword-increase"),
    ("\x18+", "keyword-increase"),
    ("\x18-", "keyword-decrease"),
    ("h", "backward-char"),
    ("l", "forward-char"),
    (" ", "forward-char"),
    ("w", "vi-forward-word"),
    ("W", "vi-forward-bigword"),
    ("b", "vi-backward-word"),
    ("B", "vi-backward-bigword"),
    ("e", "vi-end-word"),
    ("E", "vi-end-bigword"),
    ("0", "vi-zero"),
    ("^", "vi-first-print"),
    ("$", "end-of-line"),
    ("1", "digit-argument"),
    ("2", "digit-argument"),
    ("3", "digit-argument"),
    ("4", "digit-argument"),
    ("5", "digit-argument"),
    ("6", "digit-argument"),
    ("7", "digit-argument"),
    ("8", "digit-argument"),
    ("9", "digit-argument"),
    ("i", "vi-insert-mode"),
    ("a", "vi-append-mode"),
    ("I", "vi-insert-beg"),
    ("A", "vi-append-eol"),
    ("x", "vi-delete-char"),
    ("X", "vi-backward-delete-char"),
    ("d", "vi-delete-to"),
    ("c", "vi-change-to"),
    ("y", "vi-yank-to"),
    ("D", "vi-kill-eol"),
    ("C", "vi-change-eol"),
    ("r", "vi-replace-char"),
    ("R", "vi-overstrike"),
    ("p", "vi-put-after"),
    ("P", "vi-put-before"),
    ("u", "undo"),
    ("~", "vi-change-case"),
    ("s", "vi-subst"),
    ("S", "vi-change-line"),
    ("f", "vi-char-search-forward"),
    ("F", "vi-char-search-backward"),
    ("t", "vi-till-forward"),
    ("T", "vi-till-backward"),
];

const VI_HISTORY: &[(&str, &str)] = &[
    ("k", "previous-history"),
    ("j", "next-history"),
    ("#", "insert-comment"),
];

/// Vi command keymap.
pub static VI_COMMAND: std::sync::LazyLock<Vec<(&'static str, &'static str)>> =
    std::sync::LazyLock::new(|| {
        SPECIAL
            .iter()
            .chain(VI_COMMAND_KEYS.iter())
            .chain(VI_HISTORY.iter())
            .copied()
            .collect()
    });
