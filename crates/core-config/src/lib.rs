//! Configuration loading and parsing.
//!
//! Parses `rline.toml` (or an override path provided by the binary). Every
//! section and field is optional; absent values take the documented
//! defaults. A file that fails to parse is reported at `info` under the
//! `config` target and replaced by defaults. Unknown fields are ignored so
//! older binaries tolerate newer files.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "rline.toml";

/// Initial keymap family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingStyle {
    #[default]
    Emacs,
    Vi,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditingConfig {
    #[serde(default)]
    pub mode: EditingStyle,
    #[serde(default = "EditingConfig::default_kill_ring_max")]
    pub kill_ring_max: usize,
    #[serde(default = "EditingConfig::default_comment_begin")]
    pub comment_begin: String,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            mode: EditingStyle::default(),
            kill_ring_max: Self::default_kill_ring_max(),
            comment_begin: Self::default_comment_begin(),
        }
    }
}

impl EditingConfig {
    const fn default_kill_ring_max() -> usize {
        60
    }
    fn default_comment_begin() -> String {
        "#".to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default = "InputConfig::enabled")]
    pub cursor_query: bool,
    #[serde(default = "InputConfig::enabled")]
    pub confirm_multiline: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            cursor_query: Self::enabled(),
            confirm_multiline: Self::enabled(),
        }
    }
}

impl InputConfig {
    const fn enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MacroConfig {
    #[serde(default = "MacroConfig::default_recursion_limit")]
    pub recursion_limit: usize,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            recursion_limit: Self::default_recursion_limit(),
        }
    }
}

impl MacroConfig {
    const fn default_recursion_limit() -> usize {
        16
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_autowrite")]
    pub autowrite: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            autowrite: Self::default_autowrite(),
        }
    }
}

impl HistoryConfig {
    const fn default_autowrite() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editing: EditingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub macros: MacroConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl ConfigFile {
    /// Every setting as `(section.key, value)`, sorted by name.
    pub fn variables(&self) -> Vec<(&'static str, toml::Value)> {
        let mode = match self.editing.mode {
            EditingStyle::Emacs => "emacs",
            EditingStyle::Vi => "vi",
        };
        let count = |n: usize| toml::Value::Integer(i64::try_from(n).unwrap_or(i64::MAX));
        vec![
            ("editing.comment_begin", toml::Value::String(self.editing.comment_begin.clone())),
            ("editing.kill_ring_max", count(self.editing.kill_ring_max)),
            ("editing.mode", toml::Value::String(mode.to_string())),
            ("history.autowrite", toml::Value::Boolean(self.history.autowrite)),
            ("input.confirm_multiline", toml::Value::Boolean(self.input.confirm_multiline)),
            ("input.cursor_query", toml::Value::Boolean(self.input.cursor_query)),
            ("macros.recursion_limit", count(self.macros.recursion_limit)),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("rline").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(e) => {
            info!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Apply the `--vi` command line switch on top of the file value.
    pub fn with_style_override(mut self, vi: bool) -> Self {
        if vi {
            self.file.editing.mode = EditingStyle::Vi;
        }
        self
    }

    pub fn style(&self) -> EditingStyle {
        self.file.editing.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl Write for LockedWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file, ConfigFile::default());
        assert_eq!(cfg.style(), EditingStyle::Emacs);
        assert_eq!(cfg.file.editing.kill_ring_max, 60);
        assert_eq!(cfg.file.editing.comment_begin, "#");
        assert_eq!(cfg.file.macros.recursion_limit, 16);
        assert!(cfg.file.input.cursor_query);
        assert!(cfg.file.input.confirm_multiline);
        assert!(cfg.file.history.autowrite);
    }

    #[test]
    fn variables_reflect_parsed_values() {
        let file: ConfigFile = toml::from_str("[editing]\nmode = \"vi\"\n[macros]\nrecursion_limit = 3\n").unwrap();
        let vars = file.variables();
        let names: Vec<&str> = vars.iter().map(|(name, _)| *name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        let get = |wanted: &str| vars.iter().find(|(name, _)| *name == wanted).map(|(_, v)| v.to_string());
        assert_eq!(get("editing.mode").as_deref(), Some("\"vi\""));
        assert_eq!(get("macros.recursion_limit").as_deref(), Some("3"));
        assert_eq!(get("input.cursor_query").as_deref(), Some("true"));
    }

    #[test]
    fn parses_partial_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[editing]\nmode = \"vi\"\nkill_ring_max = 5\n[input]\nconfirm_multiline = false\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.style(), EditingStyle::Vi);
        assert_eq!(cfg.file.editing.kill_ring_max, 5);
        assert_eq!(cfg.file.editing.comment_begin, "#");
        assert!(cfg.file.input.cursor_query);
        assert!(!cfg.file.input.confirm_multiline);
        assert_eq!(cfg.file.macros.recursion_limit, 16);
    }

    #[test]
    fn parses_macro_and_history_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[macros]\nrecursion_limit = 4\n[history]\nautowrite = false\n[editing]\ncomment_begin = \"// \"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.macros.recursion_limit, 4);
        assert!(!cfg.file.history.autowrite);
        assert_eq!(cfg.file.editing.comment_begin, "// ");
    }

    #[test]
    fn vi_switch_overrides_file_mode() {
        let cfg = Config::default().with_style_override(true);
        assert_eq!(cfg.style(), EditingStyle::Vi);
        let cfg = Config::default().with_style_override(false);
        assert_eq!(cfg.style(), EditingStyle::Emacs);
    }

    #[test]
    fn parse_failure_falls_back_and_logs_under_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[editing]\nmode = \"nano\"\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf())).unwrap());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
        assert_eq!(cfg.style(), EditingStyle::Emacs);
        assert!(cfg.raw.is_none());
    }
}
