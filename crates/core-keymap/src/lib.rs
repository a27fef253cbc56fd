//! core-keymap: key sequence to command name resolution.
//!
//! - Pure and deterministic: resolution depends only on the key buffer.
//! - Each keymap is compiled into a trie; later bindings of the same
//!   sequence override earlier ones.
//! - No side effects: logging only at TRACE for traversal steps.

mod defaults;

use smallvec::SmallVec;
use tracing::trace;

pub use defaults::{EMACS, VI_COMMAND, VI_INSERT};

/// Keymap families selectable by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeymapId {
    Emacs,
    ViInsert,
    ViCommand,
}

/// Outcome of resolving a key buffer against one keymap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The first `consumed` keys form a complete binding. `ambiguous` is set
    /// when the whole buffer was consumed and longer bindings extend it.
    Matched {
        consumed: usize,
        command: &'a str,
        ambiguous: bool,
    },
    /// The whole buffer is a strict prefix of a binding. `longest` is the
    /// longest complete binding met on the way, if any.
    NeedMore { longest: Option<(usize, &'a str)> },
    /// No binding starts with the first key.
    NoMatch,
}

#[derive(Debug, Clone, Default)]
struct Node {
    edges: SmallVec<[(char, usize); 4]>,
    terminal: Option<usize>,
}

/// Compiled key sequence trie.
#[derive(Debug, Clone)]
pub struct MappingTrie {
    nodes: Vec<Node>,
    commands: Vec<String>,
}

impl Default for MappingTrie {
    fn default() -> Self {
        Self {
            nodes: vec![Node::default()],
            commands: Vec::new(),
        }
    }
}

impl MappingTrie {
    pub fn build<'s>(specs: impl IntoIterator<Item = (&'s str, &'s str)>) -> Self {
        let mut trie = Self::default();
        for (keys, command) in specs {
            trie.bind(keys, command);
        }
        trie
    }

    /// Bind `keys` to `command`, replacing any previous binding.
    pub fn bind(&mut self, keys: &str, command: &str) {
        if keys.is_empty() {
            return;
        }
        let mut cur = 0usize;
        for ch in keys.chars() {
            let next = match self.nodes[cur].edges.iter().find(|(c, _)| *c == ch) {
                Some(&(_, next)) => next,
                None => {
                    let new_idx = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[cur].edges.push((ch, new_idx));
                    new_idx
                }
            };
            cur = next;
        }
        if let Some(prev) = self.nodes[cur].terminal {
            trace!(target: "input.map", node = cur, previous = %self.commands[prev], "terminal_override");
        }
        self.commands.push(command.to_string());
        self.nodes[cur].terminal = Some(self.commands.len() - 1);
    }

    /// Every complete binding as `(keys, command)`, sorted by command and
    /// then by key sequence.
    pub fn bindings(&self) -> Vec<(Vec<char>, &str)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, Vec<char>)> = vec![(0, Vec::new())];
        while let Some((idx, keys)) = stack.pop() {
            let node = &self.nodes[idx];
            if let Some(ci) = node.terminal {
                out.push((keys.clone(), self.commands[ci].as_str()));
            }
            for &(ch, next) in &node.edges {
                let mut longer = keys.clone();
                longer.push(ch);
                stack.push((next, longer));
            }
        }
        out.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    pub fn resolve(&self, buffer: &[char]) -> Resolution<'_> {
        let mut node_idx = 0usize;
        let mut walked = 0usize;
        let mut last_terminal: Option<(usize, usize)> = None;
        for (i, ch) in buffer.iter().enumerate() {
            let Some(&(_, next)) = self.nodes[node_idx].edges.iter().find(|(c, _)| c == ch) else {
                break;
            };
            node_idx = next;
            walked = i + 1;
            trace!(target: "input.map", step = i, node = node_idx, "advance");
            if let Some(ci) = self.nodes[node_idx].terminal {
                last_terminal = Some((walked, ci));
            }
        }
        let extends = walked == buffer.len() && !self.nodes[node_idx].edges.is_empty();
        match (last_terminal, extends) {
            (Some((consumed, ci)), true) if consumed == buffer.len() => Resolution::Matched {
                consumed,
                command: &self.commands[ci],
                ambiguous: true,
            },
            (longest, true) if !buffer.is_empty() => Resolution::NeedMore {
                longest: longest.map(|(n, ci)| (n, self.commands[ci].as_str())),
            },
            (Some((consumed, ci)), _) => Resolution::Matched {
                consumed,
                command: &self.commands[ci],
                ambiguous: false,
            },
            _ => Resolution::NoMatch,
        }
    }
}

/// The three default keymaps, individually rebindable.
#[derive(Debug, Clone)]
pub struct Keymaps {
    emacs: MappingTrie,
    vi_insert: MappingTrie,
    vi_command: MappingTrie,
}

impl Default for Keymaps {
    fn default() -> Self {
        Self {
            emacs: MappingTrie::build(EMACS.iter().copied()),
            vi_insert: MappingTrie::build(VI_INSERT.iter().copied()),
            vi_command: MappingTrie::build(VI_COMMAND.iter().copied()),
        }
    }
}

impl Keymaps {
    pub fn get(&self, id: KeymapId) -> &MappingTrie {
        match id {
            KeymapId::Emacs => &self.emacs,
            KeymapId::ViInsert => &self.vi_insert,
            KeymapId::ViCommand => &self.vi_command,
        }
    }

    pub fn bind(&mut self, id: KeymapId, keys: &str, command: &str) {
        match id {
            KeymapId::Emacs => self.emacs.bind(keys, command),
            KeymapId::ViInsert => self.vi_insert.bind(keys, command),
            KeymapId::ViCommand => self.vi_command.bind(keys, command),
        }
    }

    pub fn resolve(&self, id: KeymapId, keys: &[char]) -> Resolution<'_> {
        self.get(id).resolve(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn sample() -> MappingTrie {
        MappingTrie::build([
            ("\x1b", "prefix-meta"),
            ("\x1b[A", "previous-history"),
            ("\x18(", "start-kbd-macro"),
            ("a", "self"),
        ])
    }

    #[test]
    fn single_key_match() {
        let trie = sample();
        assert_eq!(
            trie.resolve(&keys("a")),
            Resolution::Matched {
                consumed: 1,
                command: "self",
                ambiguous: false
            }
        );
    }

    #[test]
    fn need_more_for_prefix() {
        let trie = sample();
        assert_eq!(trie.resolve(&keys("\x18")), Resolution::NeedMore { longest: None });
        assert_eq!(
            trie.resolve(&keys("\x1b[")),
            Resolution::NeedMore {
                longest: Some((1, "prefix-meta"))
            }
        );
    }

    #[test]
    fn exact_match_that_is_also_a_prefix_is_ambiguous() {
        let trie = sample();
        assert_eq!(
            trie.resolve(&keys("\x1b")),
            Resolution::Matched {
                consumed: 1,
                command: "prefix-meta",
                ambiguous: true
            }
        );
    }

    #[test]
    fn multi_key_longest_match() {
        let trie = sample();
        assert_eq!(
            trie.resolve(&keys("\x1b[Ax")),
            Resolution::Matched {
                consumed: 3,
                command: "previous-history",
                ambiguous: false
            }
        );
        assert_eq!(
            trie.resolve(&keys("\x1bq")),
            Resolution::Matched {
                consumed: 1,
                command: "prefix-meta",
                ambiguous: false
            }
        );
    }

    #[test]
    fn no_match_and_overrides() {
        let mut trie = sample();
        assert_eq!(trie.resolve(&keys("zz")), Resolution::NoMatch);
        assert_eq!(trie.resolve(&keys("\x18x")), Resolution::NoMatch);
        assert_eq!(trie.resolve(&[]), Resolution::NoMatch);
        trie.bind("a", "other");
        assert_eq!(
            trie.resolve(&keys("a")),
            Resolution::Matched {
                consumed: 1,
                command: "other",
                ambiguous: false
            }
        );
    }

    #[test]
    fn bindings_list_overridden_sequences_once() {
        let mut trie = sample();
        trie.bind("\x18(", "other");
        assert_eq!(
            trie.bindings(),
            vec![
                (keys("\x18("), "other"),
                (keys("\x1b"), "prefix-meta"),
                (keys("\x1b[A"), "previous-history"),
                (keys("a"), "self"),
            ]
        );
    }

    #[test]
    fn default_tables_resolve_core_bindings() {
        let maps = Keymaps::default();
        let resolved = |id, s: &str| match maps.resolve(id, &keys(s)) {
            Resolution::Matched { command, .. } => Some(command.to_string()),
            _ => None,
        };
        assert_eq!(resolved(KeymapId::Emacs, "\x01").as_deref(), Some("beginning-of-line"));
        assert_eq!(resolved(KeymapId::Emacs, "\x1bf").as_deref(), Some("forward-word"));
        assert_eq!(resolved(KeymapId::Emacs, "\x1b[D").as_deref(), Some("backward-char"));
        assert_eq!(resolved(KeymapId::ViInsert, "\x1b").as_deref(), Some("vi-command-mode"));
        assert_eq!(resolved(KeymapId::ViCommand, "d").as_deref(), Some("vi-delete-to"));
        assert_eq!(resolved(KeymapId::ViCommand, "q"), None);
    }
}
