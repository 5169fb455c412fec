use crate::foundation::core::CssProperties;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// String-valued style table (`primary -> #112233`, `bold -> 700`).
///
/// Accepts numeric and boolean scalars on input so that `fontWeight: { bold: 700 }` works; they
/// are stored in their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleMap(pub BTreeMap<String, String>);

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Scalar {
            Str(String),
            Int(i64),
            Float(f64),
            Bool(bool),
        }

        let raw = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(k, v)| {
                    let v = match v {
                        Scalar::Str(s) => s,
                        Scalar::Int(i) => i.to_string(),
                        Scalar::Float(f) => f.to_string(),
                        Scalar::Bool(b) => b.to_string(),
                    };
                    (k, v)
                })
                .collect(),
        ))
    }
}

impl Deref for StyleMap {
    type Target = BTreeMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for StyleMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeCategory {
    Light,
    Dark,
    Colorful,
    Custom,
}

impl ThemeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Colorful => "colorful",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ThemeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<StyleMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<StyleMap>,
}

/// Read access to the styling sections shared by base themes and variations.
pub trait StyleSource {
    fn colors(&self) -> Option<&StyleMap>;
    fn typography(&self) -> Option<&Typography>;
    fn spacing(&self) -> Option<&StyleMap>;
    fn shadows(&self) -> Option<&StyleMap>;
    fn borders(&self) -> Option<&Borders>;
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Base theme, the root of the theme graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeRecord {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: ThemeCategory,
    pub colors: StyleMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl StyleSource for ThemeRecord {
    fn colors(&self) -> Option<&StyleMap> {
        Some(&self.colors)
    }
    fn typography(&self) -> Option<&Typography> {
        self.typography.as_ref()
    }
    fn spacing(&self) -> Option<&StyleMap> {
        self.spacing.as_ref()
    }
    fn shadows(&self) -> Option<&StyleMap> {
        self.shadows.as_ref()
    }
    fn borders(&self) -> Option<&Borders> {
        self.borders.as_ref()
    }
}

/// A styling derived from exactly one base theme.
///
/// Every styling section is the variation's own; nothing is inherited from the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeVariationRecord {
    pub id: String,
    pub parent_theme_id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,
    pub variation_depth: u32,
    #[serde(default)]
    pub lineage_path: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl StyleSource for ThemeVariationRecord {
    fn colors(&self) -> Option<&StyleMap> {
        self.colors.as_ref()
    }
    fn typography(&self) -> Option<&Typography> {
        self.typography.as_ref()
    }
    fn spacing(&self) -> Option<&StyleMap> {
        self.spacing.as_ref()
    }
    fn shadows(&self) -> Option<&StyleMap> {
        self.shadows.as_ref()
    }
    fn borders(&self) -> Option<&Borders> {
        self.borders.as_ref()
    }
}

impl ThemeVariationRecord {
    pub fn summary(&self) -> VariationSummary {
        VariationSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            page_id: self.page_id.clone(),
            created_at: self.created_at,
            variation_depth: self.variation_depth,
        }
    }
}

/// Lightweight variation entry attached to theme listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationSummary {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub page_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub variation_depth: u32,
}

/// One row of `list_themes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeListing {
    #[serde(flatten)]
    pub theme: ThemeRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<VariationSummary>,
}

/// Which theme a page uses. At most one row per page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageThemeAssignment {
    pub page_id: String,
    /// Base theme id; for variations this is the parent, kept for reference only.
    pub theme_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_variation_id: Option<String>,
    #[serde(default)]
    pub is_variation: bool,
}

/// Payload for `upsert_page_assignment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentUpsert {
    pub theme_id: String,
    pub theme_variation_id: Option<String>,
    pub is_variation: bool,
}

/// Input of `create_custom_theme`. Required fields are optional here so that missing ones can
/// be reported together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTheme {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<ThemeCategory>,
    #[serde(default)]
    pub colors: Option<StyleMap>,
    #[serde(default)]
    pub typography: Option<Typography>,
    #[serde(default)]
    pub spacing: Option<StyleMap>,
    #[serde(default)]
    pub shadows: Option<StyleMap>,
    #[serde(default)]
    pub borders: Option<Borders>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Partial update of a base theme. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemePatch {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<ThemeCategory>,
    #[serde(default)]
    pub colors: Option<StyleMap>,
    #[serde(default)]
    pub typography: Option<Typography>,
    #[serde(default)]
    pub spacing: Option<StyleMap>,
    #[serde(default)]
    pub shadows: Option<StyleMap>,
    #[serde(default)]
    pub borders: Option<Borders>,
}

impl ThemePatch {
    pub fn apply_to(self, theme: &mut ThemeRecord) {
        if let Some(v) = self.display_name {
            theme.display_name = v;
        }
        if let Some(v) = self.description {
            theme.description = Some(v);
        }
        if let Some(v) = self.category {
            theme.category = v;
        }
        if let Some(v) = self.colors {
            theme.colors = v;
        }
        if let Some(v) = self.typography {
            theme.typography = Some(v);
        }
        if let Some(v) = self.spacing {
            theme.spacing = Some(v);
        }
        if let Some(v) = self.shadows {
            theme.shadows = Some(v);
        }
        if let Some(v) = self.borders {
            theme.borders = Some(v);
        }
    }
}

/// Input of `create_theme_variation`. `name` is a base; a timestamp suffix is appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVariation {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub colors: Option<StyleMap>,
    #[serde(default)]
    pub typography: Option<Typography>,
    #[serde(default)]
    pub spacing: Option<StyleMap>,
    #[serde(default)]
    pub shadows: Option<StyleMap>,
    #[serde(default)]
    pub borders: Option<Borders>,
}

/// Fully formed variation handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationDraft {
    pub name: String,
    pub display_name: String,
    pub page_id: Option<String>,
    pub colors: Option<StyleMap>,
    pub typography: Option<Typography>,
    pub spacing: Option<StyleMap>,
    pub shadows: Option<StyleMap>,
    pub borders: Option<Borders>,
    pub variation_depth: u32,
    pub lineage_path: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fully formed base theme handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDraft {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: ThemeCategory,
    pub colors: StyleMap,
    pub typography: Option<Typography>,
    pub spacing: Option<StyleMap>,
    pub shadows: Option<StyleMap>,
    pub borders: Option<Borders>,
    pub author: Option<String>,
    pub is_system: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeThemeKind {
    Theme,
    Variation,
}

/// Derived, cacheable CSS representation of a resolved theme or variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeTheme {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub category: ThemeCategory,
    pub css_properties: CssProperties,
    #[serde(rename = "type")]
    pub kind: RuntimeThemeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_theme_id: Option<String>,
}

impl RuntimeTheme {
    pub fn is_variation(&self) -> bool {
        self.kind == RuntimeThemeKind::Variation
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/model.rs"]
mod tests;
