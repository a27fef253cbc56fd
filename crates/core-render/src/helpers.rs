//! Helper rows drawn below the edited line.
//!
//! Two stages, like a status line: `compose_helpers` turns the view into
//! ordered segments, `format_helpers` turns segments into display rows.

use core_state::{Menu, Mode, SearchKind, SubMode, View};

/// Candidate rows shown at most; the window follows the selection.
pub const MENU_ROWS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperSegment<'a> {
    Hint(&'a str),
    /// Vi mode marker for modes other than insert.
    ModeLabel(&'static str),
    SearchHeader { kind: SearchKind, filter: &'a str },
    Candidate { text: &'a str, selected: bool },
    /// Candidates above and below the visible window.
    MoreCandidates(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperRow {
    pub text: String,
    pub highlighted: bool,
}

fn mode_label(mode: Mode) -> Option<&'static str> {
    match mode {
        Mode::Insert => None,
        Mode::ViCommand => Some("-- COMMAND --"),
        Mode::ViDeletePending(_) => Some("-- PENDING --"),
        Mode::ReplaceOnce => Some("-- REPLACE ONE --"),
        Mode::ReplaceMany => Some("-- REPLACE --"),
    }
}

fn push_menu<'a>(segments: &mut Vec<HelperSegment<'a>>, menu: &'a Menu) {
    let total = menu.candidates.len();
    let first = menu.selected.saturating_sub(MENU_ROWS - 1).min(total.saturating_sub(MENU_ROWS));
    for (i, text) in menu.candidates.iter().enumerate().skip(first).take(MENU_ROWS) {
        segments.push(HelperSegment::Candidate {
            text,
            selected: i == menu.selected,
        });
    }
    let hidden = total.saturating_sub(MENU_ROWS);
    if hidden > 0 {
        segments.push(HelperSegment::MoreCandidates(hidden));
    }
}

pub fn compose_helpers<'a>(view: &'a View<'a>) -> Vec<HelperSegment<'a>> {
    let mut segments = Vec::new();
    if let Some(hint) = view.hint {
        segments.push(HelperSegment::Hint(hint));
    }
    if let Some(label) = mode_label(view.mode) {
        segments.push(HelperSegment::ModeLabel(label));
    }
    match view.sub_mode {
        SubMode::None => {}
        SubMode::Search { kind, filter, menu } => {
            segments.push(HelperSegment::SearchHeader {
                kind: *kind,
                filter,
            });
            push_menu(&mut segments, menu);
        }
        SubMode::Completion { menu, .. } => push_menu(&mut segments, menu),
    }
    segments
}

pub fn format_helpers(segments: &[HelperSegment<'_>]) -> Vec<HelperRow> {
    segments
        .iter()
        .map(|seg| {
            let (text, highlighted) = match seg {
                HelperSegment::Hint(h) => (h.to_string(), false),
                HelperSegment::ModeLabel(l) => (l.to_string(), false),
                HelperSegment::SearchHeader { kind, filter } => {
                    let what = match kind {
                        SearchKind::History => "history",
                        SearchKind::Completion => "completion",
                    };
                    (format!("{what} search: {filter}"), false)
                }
                HelperSegment::Candidate { text, selected } => (text.to_string(), *selected),
                HelperSegment::MoreCandidates(n) => (format!("({n} more)"), false),
            };
            HelperRow { text, highlighted }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view<'a>(line: &'a [char], hint: Option<&'a str>, mode: Mode, sub_mode: &'a SubMode) -> View<'a> {
        View {
            line,
            cursor: line.len(),
            hint,
            mode,
            selection: None,
            sub_mode,
        }
    }

    #[test]
    fn plain_insert_has_no_helpers() {
        let sub = SubMode::None;
        let v = view(&[], None, Mode::Insert, &sub);
        assert!(compose_helpers(&v).is_empty());
    }

    #[test]
    fn hint_precedes_mode_label() {
        let sub = SubMode::None;
        let v = view(&[], Some("careful"), Mode::ViCommand, &sub);
        assert_eq!(
            compose_helpers(&v),
            vec![HelperSegment::Hint("careful"), HelperSegment::ModeLabel("-- COMMAND --")]
        );
    }

    #[test]
    fn search_menu_highlights_selection() {
        let mut menu = Menu::new(vec!["git push".into(), "git status".into()]);
        menu.selected = 1;
        let sub = SubMode::Search {
            kind: SearchKind::History,
            filter: "git".into(),
            menu,
        };
        let v = view(&[], None, Mode::Insert, &sub);
        let rows = format_helpers(&compose_helpers(&v));
        assert_eq!(
            rows,
            vec![
                HelperRow { text: "history search: git".into(), highlighted: false },
                HelperRow { text: "git push".into(), highlighted: false },
                HelperRow { text: "git status".into(), highlighted: true },
            ]
        );
    }

    #[test]
    fn long_menu_window_follows_selection() {
        let mut menu = Menu::new((0..12).map(|i| format!("c{i}")).collect());
        menu.selected = 10;
        let sub = SubMode::Completion { menu, start: 0 };
        let v = view(&[], None, Mode::Insert, &sub);
        let segs = compose_helpers(&v);
        assert_eq!(segs.len(), MENU_ROWS + 1);
        assert_eq!(segs[0], HelperSegment::Candidate { text: "c3", selected: false });
        assert_eq!(segs[MENU_ROWS - 1], HelperSegment::Candidate { text: "c10", selected: true });
        assert_eq!(segs[MENU_ROWS], HelperSegment::MoreCandidates(4));
    }
}
