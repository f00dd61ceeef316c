//! Graph response types

use crate::error::{Error, Result};
use crate::types::Item;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key holding a collection page's items
pub const VALUE_KEY: &str = "value";

/// Key holding the next-page cursor
pub const NEXT_LINK_KEY: &str = "@odata.nextLink";

/// One page of a paginated collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Items in server order
    pub items: Vec<Item>,
    /// Absolute URL of the next page, if any
    pub next_link: Option<String>,
}

impl Page {
    /// Create a page
    pub fn new(items: Vec<Item>, next_link: Option<String>) -> Self {
        Self { items, next_link }
    }

    /// Extract a page from a decoded collection body.
    ///
    /// `value` must be an array. A missing, null, or empty `@odata.nextLink`
    /// means this is the last page.
    pub fn from_body(url: &str, body: Value) -> Result<Self> {
        let Value::Object(mut map) = body else {
            return Err(Error::malformed(url, "response body is not a JSON object"));
        };

        let items = match map.remove(VALUE_KEY) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(Error::malformed(
                    url,
                    format!("'{VALUE_KEY}' is not an array"),
                ))
            }
            None => return Err(Error::malformed(url, format!("missing '{VALUE_KEY}'"))),
        };

        let next_link = match map.remove(NEXT_LINK_KEY) {
            Some(Value::String(link)) if !link.is_empty() => Some(link),
            Some(Value::String(_) | Value::Null) | None => None,
            Some(_) => {
                return Err(Error::malformed(
                    url,
                    format!("'{NEXT_LINK_KEY}' is not a string"),
                ))
            }
        };

        Ok(Self { items, next_link })
    }

    /// Whether another page follows
    pub fn has_next(&self) -> bool {
        self.next_link.is_some()
    }
}

/// Site resource; only the internal id is used
#[derive(Debug, Clone, Deserialize)]
pub struct SiteResource {
    /// Internal site id
    pub id: String,
    /// Human-readable name
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

/// List resource as returned in a site's lists collection
#[derive(Debug, Clone, Deserialize)]
pub struct ListResource {
    /// Internal list id
    pub id: String,
    /// Display name shown in SharePoint
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Resolved site and list ids for one refresh session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    /// Internal site id
    pub site_id: String,
    /// Internal id of the target list
    pub list_id: String,
}

impl SiteDescriptor {
    /// Create a descriptor
    pub fn new(site_id: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            list_id: list_id.into(),
        }
    }
}
