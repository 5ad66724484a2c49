//! Named-operation dispatch: `call(tool, json arguments) -> json result`

use crate::filter::{FilterSpec, PageRequest};
use crate::queries::QueryTools;
use crate::search::SearchMode;
use notegraph_core::prelude::*;
use notegraph_core::{DEFAULT_MAX_BATCH_SIZE, DEFAULT_PAGE_LIMIT, DEFAULT_SIMILARITY_THRESHOLD};
use notegraph_graph::{GraphIndex, TraversalRequest};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::instrument;

/// Every tool the router answers, in help order
pub const TOOL_NAMES: &[&str] = &[
    "resolve_note",
    "resolve_notes",
    "read_note",
    "backlinks",
    "backlinks_batch",
    "forward_links",
    "traverse",
    "orphans",
    "missing_notes",
    "search",
    "notes_with_tag",
    "untagged_notes",
    "list_tags",
    "similar_names",
    "list_notes",
    "stats",
];

/// Limits applied by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    pub max_batch_size: usize,
    pub default_page_limit: usize,
    pub similarity_threshold: usize,
    pub default_traversal_depth: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            default_traversal_depth: 2,
        }
    }
}

impl From<&IndexConfig> for RouterSettings {
    fn from(config: &IndexConfig) -> Self {
        Self {
            max_batch_size: config.max_batch_size,
            default_page_limit: config.default_page_limit,
            similarity_threshold: config.similarity_threshold,
            ..Self::default()
        }
    }
}

mod args {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    pub struct Paging {
        pub limit: Option<usize>,
        pub offset: Option<usize>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Name {
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Names {
        pub names: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct NamePaged {
        pub name: String,
        #[serde(flatten)]
        pub filter: FilterSpec,
        #[serde(flatten)]
        pub paging: Paging,
    }

    #[derive(Debug, Deserialize)]
    pub struct NamesPaged {
        pub names: Vec<String>,
        #[serde(flatten)]
        pub filter: FilterSpec,
        #[serde(flatten)]
        pub paging: Paging,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Listing {
        #[serde(flatten)]
        pub filter: FilterSpec,
        #[serde(flatten)]
        pub paging: Paging,
    }

    #[derive(Debug, Deserialize)]
    pub struct Traverse {
        pub root: Option<String>,
        pub roots: Option<Vec<String>>,
        #[serde(alias = "depth", alias = "maxDepth")]
        pub max_depth: Option<usize>,
        #[serde(default, alias = "excludeFolders")]
        pub exclude_folders: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Search {
        pub query: String,
        #[serde(default)]
        pub mode: SearchMode,
        #[serde(default, alias = "includeNames")]
        pub include_names: bool,
        #[serde(flatten)]
        pub filter: FilterSpec,
        #[serde(flatten)]
        pub paging: Paging,
    }

    #[derive(Debug, Deserialize)]
    pub struct Tag {
        pub tag: String,
        #[serde(flatten)]
        pub filter: FilterSpec,
        #[serde(flatten)]
        pub paging: Paging,
    }

    #[derive(Debug, Deserialize)]
    pub struct Similar {
        pub name: String,
        #[serde(alias = "maxDistance")]
        pub max_distance: Option<usize>,
        #[serde(flatten)]
        pub filter: FilterSpec,
        #[serde(flatten)]
        pub paging: Paging,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Scope {
        #[serde(flatten)]
        pub filter: FilterSpec,
    }
}

/// Dispatches named tool calls against one index snapshot
#[derive(Debug, Clone, Copy)]
pub struct ToolRouter<'a> {
    tools: QueryTools<'a>,
    settings: RouterSettings,
}

impl<'a> ToolRouter<'a> {
    pub fn new(index: &'a GraphIndex, settings: RouterSettings) -> Self {
        Self {
            tools: QueryTools::new(index),
            settings,
        }
    }

    pub fn tool_names() -> &'static [&'static str] {
        TOOL_NAMES
    }

    /// Run a tool. Unknown tools and malformed arguments produce
    /// `{"error": "..."}`; so does a name that does not resolve.
    #[instrument(skip(self, arguments))]
    pub fn call(&self, tool: &str, arguments: Value) -> Value {
        match self.dispatch(tool, arguments) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Tool {} failed: {}", tool, e);
                json!({ "error": e.to_string() })
            }
        }
    }

    fn dispatch(&self, tool: &str, arguments: Value) -> Result<Value> {
        let t = &self.tools;
        match tool {
            "resolve_note" => {
                let a: args::Name = parse(tool, arguments)?;
                to_value(t.resolve_note(&a.name))
            }
            "resolve_notes" => {
                let a: args::Names = parse(tool, arguments)?;
                self.check_batch(a.names.len())?;
                to_value(t.resolve_notes(&a.names))
            }
            "read_note" => {
                let a: args::Name = parse(tool, arguments)?;
                to_value(t.read_note(&a.name))
            }
            "backlinks" => {
                let a: args::NamePaged = parse(tool, arguments)?;
                to_value(t.backlinks(&a.name, &a.filter, &self.page(&a.paging)))
            }
            "backlinks_batch" => {
                let a: args::NamesPaged = parse(tool, arguments)?;
                self.check_batch(a.names.len())?;
                to_value(t.backlinks_batch(&a.names, &a.filter, &self.page(&a.paging)))
            }
            "forward_links" => {
                let a: args::NamePaged = parse(tool, arguments)?;
                to_value(t.forward_links(&a.name, &self.page(&a.paging)))
            }
            "traverse" => {
                let a: args::Traverse = parse(tool, arguments)?;
                let request = self.traversal_request(a)?;
                to_value(t.traverse(&request))
            }
            "orphans" => {
                let a: args::Listing = parse(tool, arguments)?;
                to_value(t.orphans(&a.filter, &self.page(&a.paging)))
            }
            "missing_notes" => {
                let a: args::Listing = parse(tool, arguments)?;
                to_value(t.missing_notes(&a.filter, &self.page(&a.paging)))
            }
            "search" => {
                let a: args::Search = parse(tool, arguments)?;
                to_value(t.search(
                    &a.query,
                    a.mode,
                    a.include_names,
                    &a.filter,
                    &self.page(&a.paging),
                ))
            }
            "notes_with_tag" => {
                let a: args::Tag = parse(tool, arguments)?;
                to_value(t.notes_with_tag(&a.tag, &a.filter, &self.page(&a.paging)))
            }
            "untagged_notes" => {
                let a: args::Listing = parse(tool, arguments)?;
                to_value(t.untagged_notes(&a.filter, &self.page(&a.paging)))
            }
            "list_tags" => {
                let a: args::Listing = parse(tool, arguments)?;
                to_value(t.list_tags(&a.filter, &self.page(&a.paging)))
            }
            "similar_names" => {
                let a: args::Similar = parse(tool, arguments)?;
                let max_distance = a.max_distance.unwrap_or(self.settings.similarity_threshold);
                to_value(t.similar_names(
                    &a.name,
                    max_distance,
                    &a.filter,
                    &self.page(&a.paging),
                ))
            }
            "list_notes" => {
                let a: args::Listing = parse(tool, arguments)?;
                to_value(t.list_notes(&a.filter, &self.page(&a.paging)))
            }
            "stats" => {
                let a: args::Scope = parse(tool, arguments)?;
                to_value(t.stats(&a.filter))
            }
            _ => Err(Error::invalid_argument(format!("Unknown tool: {}", tool))),
        }
    }

    fn page(&self, paging: &args::Paging) -> PageRequest {
        PageRequest::new(
            paging.limit.unwrap_or(self.settings.default_page_limit),
            paging.offset.unwrap_or(0),
        )
    }

    fn check_batch(&self, len: usize) -> Result<()> {
        if len > self.settings.max_batch_size {
            return Err(Error::invalid_argument(format!(
                "Batch of {} names exceeds the limit of {}",
                len, self.settings.max_batch_size
            )));
        }
        Ok(())
    }

    fn traversal_request(&self, a: args::Traverse) -> Result<TraversalRequest> {
        let mut roots = a.roots.unwrap_or_default();
        if let Some(root) = a.root {
            roots.insert(0, root);
        }
        if roots.is_empty() {
            return Err(Error::invalid_argument("traverse needs `root` or `roots`"));
        }
        self.check_batch(roots.len())?;

        Ok(TraversalRequest {
            roots,
            max_depth: a.max_depth.unwrap_or(self.settings.default_traversal_depth),
            exclude_folders: a.exclude_folders,
        })
    }
}

/// Deserialize tool arguments; a missing or null payload counts as `{}`
fn parse<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| Error::invalid_argument(format!("{}: {}", tool, e)))
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::other(format!("Failed to serialize result: {}", e)))
}
