use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form component properties, passed through to factories untouched.
pub type Props = Map<String, Value>;

/// Declarative description of one page.
///
/// The required sections are optional at the type level so that a document missing one of them
/// still parses and `validate` can report every missing section at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_sources: Vec<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl PageDescriptor {
    /// Components in document order, empty when the section is absent.
    pub fn components(&self) -> &[ComponentDescriptor] {
        self.components.as_deref().unwrap_or_default()
    }

    /// Page title, if the `page` section is present.
    pub fn title(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.title.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub title: String,
    pub route: String,
    #[serde(default)]
    pub description: String,
}

/// Recognized `layout.type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Grid,
    Flex,
    Stack,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 3] = [Self::Grid, Self::Flex, Self::Stack];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(Self::Grid),
            "flex" => Some(Self::Flex),
            "stack" => Some(Self::Stack),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Flex => "flex",
            Self::Stack => "stack",
        }
    }
}

pub(crate) const DEFAULT_COLUMNS: u32 = 12;

fn default_columns() -> u32 {
    DEFAULT_COLUMNS
}

/// `layout` section. `type` stays a string so unknown kinds surface as validation errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            kind: LayoutKind::Grid.as_str().to_string(),
            columns: DEFAULT_COLUMNS,
            gap: None,
            padding: None,
        }
    }
}

impl LayoutSpec {
    pub fn kind(&self) -> Option<LayoutKind> {
        LayoutKind::parse(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub position: Position,
    #[serde(default)]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
}

impl ComponentDescriptor {
    /// Optional `props.group` tag used by subset filters.
    pub fn group(&self) -> Option<&str> {
        self.props.get("group").and_then(Value::as_str)
    }

    /// Optional `props.tags` list.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.props
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

fn default_span() -> u32 {
    1
}

/// Grid placement. `col` and `row` are 1-based like CSS grid lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub col: u32,
    pub row: u32,
    #[serde(default = "default_span")]
    pub span: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Position {
    pub fn at(col: u32, row: u32) -> Self {
        Self {
            col,
            row,
            span: 1,
            row_span: None,
            order: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    #[serde(default = "default_true")]
    pub show_sidebar: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_header: Option<String>,
    #[serde(default = "default_true")]
    pub breadcrumbs: bool,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            custom_header: None,
            breadcrumbs: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Refresh interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/descriptor/model.rs"]
mod tests;
