//! Content entities returned for internal routes.
//!
//! The CMS discriminates entities with a GraphQL `__typename`. Each
//! recognized typename maps to one [`Entity`] variant; anything else is an
//! [`ResolveError::UnknownEntityType`] so that a new content type never
//! renders as a blank page.
//!
//! Every renderable field is optional. A page without a title or body is
//! still a valid entity; what to show for it is the renderer's call.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ResolveError;

/// A typed content entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "contentType")]
pub enum Entity {
    /// `NodeArticle`
    Article(Article),
    /// `NodePage`
    Page(Page),
    /// `NodeProject`
    Project(Project),
}

impl Entity {
    /// Build an entity from the raw `entity` object of a `RouteInternal`.
    pub fn from_graph(value: serde_json::Value) -> Result<Self, ResolveError> {
        let typename = value
            .get("__typename")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ResolveError::malformed("entity has no __typename"))?
            .to_string();

        let decode_err =
            |e: serde_json::Error| ResolveError::malformed(format!("{typename}: {e}"));

        match typename.as_str() {
            "NodeArticle" => serde_json::from_value(value)
                .map(Self::Article)
                .map_err(decode_err),
            "NodePage" => serde_json::from_value(value)
                .map(Self::Page)
                .map_err(decode_err),
            "NodeProject" => serde_json::from_value(value)
                .map(Self::Project)
                .map_err(decode_err),
            other => Err(ResolveError::UnknownEntityType(other.to_string())),
        }
    }

    /// The `contentType` tag of this entity.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Article(_) => "Article",
            Self::Page(_) => "Page",
            Self::Project(_) => "Project",
        }
    }

    /// Entity title, if the CMS returned one.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Article(a) => a.title.as_deref(),
            Self::Page(p) => p.title.as_deref(),
            Self::Project(p) => p.title.as_deref(),
        }
    }

    /// Canonical path alias, if the CMS returned one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Article(a) => a.path.as_deref(),
            Self::Page(p) => p.path.as_deref(),
            Self::Project(p) => p.path.as_deref(),
        }
    }
}

/// A news/blog article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(
        default,
        rename(deserialize = "metatag"),
        deserialize_with = "deserialize_metatags"
    )]
    pub metatags: Vec<MetaTag>,
}

/// A basic page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub body: Option<TextBody>,
    #[serde(
        default,
        rename(deserialize = "metatag"),
        deserialize_with = "deserialize_metatags"
    )]
    pub metatags: Vec<MetaTag>,
}

/// A bounty project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Free-form duration, e.g. "2 weeks".
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub durations: Option<String>,
    /// Reward as entered in the CMS; may be numeric upstream.
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub reward: Option<String>,
    #[serde(default)]
    pub body: Option<TextBody>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub default_image: Option<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teams: Vec<Team>,
}

/// Formatted text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Taxonomy term for a project category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Media image reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A project team term with its members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_members: Vec<TeamMember>,
}

/// A user referenced from a team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
}

/// A head metatag attached to an article or page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MetaTag {
    /// `<link rel href>`
    Link { rel: String, href: String },
    /// `<meta name content>`
    Value { name: String, content: String },
    /// `<meta property content>` (Open Graph)
    Property { property: String, content: String },
}

#[derive(Deserialize)]
#[serde(tag = "__typename")]
enum RawMetaTag {
    MetaTagLink {
        attributes: LinkAttributes,
    },
    MetaTagValue {
        attributes: ValueAttributes,
    },
    MetaTagProperty {
        attributes: PropertyAttributes,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct LinkAttributes {
    rel: Option<String>,
    href: Option<String>,
}

#[derive(Deserialize)]
struct ValueAttributes {
    name: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
struct PropertyAttributes {
    property: Option<String>,
    content: Option<String>,
}

impl RawMetaTag {
    fn into_metatag(self) -> Option<MetaTag> {
        match self {
            Self::MetaTagLink { attributes } => Some(MetaTag::Link {
                rel: attributes.rel?,
                href: attributes.href?,
            }),
            Self::MetaTagValue { attributes } => Some(MetaTag::Value {
                name: attributes.name?,
                content: attributes.content?,
            }),
            Self::MetaTagProperty { attributes } => Some(MetaTag::Property {
                property: attributes.property?,
                content: attributes.content?,
            }),
            Self::Unsupported => None,
        }
    }
}

/// Metatags are hints for the document head; incomplete or unknown ones are dropped.
fn deserialize_metatags<'de, D>(deserializer: D) -> Result<Vec<MetaTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawMetaTag>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(RawMetaTag::into_metatag)
        .collect())
}

/// GraphQL returns `null` for empty lists as often as `[]`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept strings or numbers for free-form CMS fields.
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
