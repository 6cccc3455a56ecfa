//! Editor configuration embedded in the document itself.
//!
//! A document may carry a `"jsonedit"` object, either as a member of a root
//! object or as a member of the first element of a root array. It is read
//! with serde; unknown keys are ignored and a malformed object falls back to
//! the defaults.

use serde::Deserialize;
use serde_json::Value;

use crate::codec::DEFAULT_INDENT;
use crate::node::Node;
use crate::search::SearchOptions;

/// Member name of the embedded configuration object.
pub const CONFIG_KEY: &str = "jsonedit";

const BASE_TITLE: &str = "JSON Tree Editor";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    /// Indent step for pretty text.
    pub indent: usize,
    pub window_title: Option<String>,
    /// Maximum number of undo entries; unbounded when `None`.
    pub history_limit: Option<usize>,
    /// Edit string leaves as raw text rather than as quoted JSON.
    pub raw_string_editing: bool,
    pub search: SearchOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            indent: DEFAULT_INDENT,
            window_title: None,
            history_limit: None,
            raw_string_editing: false,
            search: SearchOptions::default(),
        }
    }
}

impl EditorConfig {
    /// Reads the embedded configuration of `root`, or the defaults when
    /// there is none or it does not deserialize.
    pub fn from_document(root: &Node) -> Self {
        let Some(embedded) = embedded_config(root) else {
            return EditorConfig::default();
        };
        match serde_json::from_value::<EditorConfig>(Value::from(embedded)) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed embedded editor config");
                EditorConfig::default()
            }
        }
    }

    /// Window title: the configured suffix wins over the file name.
    pub fn title(&self, file_name: Option<&str>) -> String {
        match (self.window_title.as_deref().map(str::trim), file_name) {
            (Some(suffix), _) if !suffix.is_empty() => format!("{BASE_TITLE}: {suffix}"),
            (_, Some(name)) => format!("{BASE_TITLE} — {name}"),
            _ => BASE_TITLE.to_owned(),
        }
    }
}

/// The embedded configuration object, if the document has one.
pub fn embedded_config(root: &Node) -> Option<&Node> {
    let holder = match root {
        Node::Object(_) => root,
        Node::Array(arr) => arr.first()?,
        _ => return None,
    };
    holder
        .as_object()?
        .get(CONFIG_KEY)
        .filter(|cfg| matches!(cfg, Node::Object(_)))
}
