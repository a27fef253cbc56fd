use core_render::LineRenderer;
use core_state::{Menu, Mode, Renderer, SearchKind, SubMode, View};

fn runes(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn text(r: &LineRenderer<Vec<u8>>) -> String {
    String::from_utf8_lossy(r.output()).into_owned()
}

fn view<'a>(line: &'a [char], sub_mode: &'a SubMode) -> View<'a> {
    View {
        line,
        cursor: line.len(),
        hint: None,
        mode: Mode::Insert,
        selection: None,
        sub_mode,
    }
}

#[test]
fn prompt_and_line_reach_output() {
    let mut r = LineRenderer::new(Vec::new(), "$ ");
    let line = runes("echo hi");
    r.render(&view(&line, &SubMode::None));
    let out = text(&r);
    assert!(out.contains("$ "));
    assert!(out.contains("echo hi"));
}

#[test]
fn hint_is_drawn_on_its_own_row() {
    let mut r = LineRenderer::new(Vec::new(), "> ");
    let line = runes("x");
    let sub = SubMode::None;
    let mut v = view(&line, &sub);
    v.hint = Some("Editor error: boom");
    r.render(&v);
    assert!(text(&r).contains("\r\nEditor error: boom"));
}

#[test]
fn selected_candidate_uses_reverse_video() {
    let mut menu = Menu::new(vec!["install".into(), "inspect".into()]);
    menu.selected = 1;
    let sub = SubMode::Search {
        kind: SearchKind::Completion,
        filter: "ins".into(),
        menu,
    };
    let line = runes("ins");
    let mut r = LineRenderer::new(Vec::new(), "> ");
    r.render(&view(&line, &sub));
    let out = text(&r);
    assert!(out.contains("completion search: ins"));
    assert!(out.contains("\x1b[7minspect"));
}

#[test]
fn notice_keeps_preview_line_breaks() {
    let mut r = LineRenderer::new(Vec::new(), "> ");
    r.notice("a\r\nb");
    assert!(text(&r).contains("a\r\nb\r\n"));
}

#[test]
fn accept_ends_the_row() {
    let mut r = LineRenderer::new(Vec::new(), "> ");
    let line = runes("ls");
    r.render(&view(&line, &SubMode::None));
    r.accept("ls");
    assert!(text(&r).ends_with("\r\n\x1b[J"));
}

#[test]
fn tab_is_expanded_to_spaces() {
    let mut r = LineRenderer::new(Vec::new(), "");
    let line = runes("a\tb");
    r.render(&view(&line, &SubMode::None));
    assert!(text(&r).contains("a    b"));
}
