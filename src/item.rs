//! Saved-item records.
//!
//! [`RawItem`] is what the remote listing hands us. [`Item`] is the numbered,
//! immutable record the rest of the application works with; its community is
//! derived from the permalink exactly once, when the item is built.
use serde::{Deserialize, Serialize};

/// A saved post as returned by the remote listing, before numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub permalink: String,
    pub url: String,
}

impl RawItem {
    pub fn new(
        title: impl Into<String>,
        permalink: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            permalink: permalink.into(),
            url: url.into(),
        }
    }
}

/// A single saved item inside one run's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredItem")]
pub struct Item {
    id: usize,
    title: String,
    permalink: String,
    url: String,
    #[serde(skip_serializing)]
    community: String,
}

/// On-disk shape of an [`Item`]; the community is never stored.
#[derive(Deserialize)]
struct StoredItem {
    #[serde(default)]
    id: usize,
    #[serde(default)]
    title: String,
    permalink: String,
    url: String,
}

impl From<StoredItem> for Item {
    fn from(stored: StoredItem) -> Self {
        Item::new(
            stored.id,
            RawItem {
                title: stored.title,
                permalink: stored.permalink,
                url: stored.url,
            },
        )
    }
}

impl Item {
    /// Builds an item from raw fields, deriving its community.
    pub fn new(id: usize, raw: RawItem) -> Self {
        let community = derive_community(&raw.permalink).to_string();
        Self {
            id,
            title: raw.title,
            permalink: raw.permalink,
            url: raw.url,
            community,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn community(&self) -> &str {
        &self.community
    }

    /// Strips the run-local id, keeping the persisted fields.
    pub fn into_raw(self) -> RawItem {
        RawItem {
            title: self.title,
            permalink: self.permalink,
            url: self.url,
        }
    }
}

/// Extracts the community name from a permalink such as
/// `/r/<community>/comments/...`.
///
/// Returns the segment after the first separator. A permalink without the
/// leading separator is accepted when it still has the `r/<name>` shape;
/// anything else yields an empty string.
pub fn derive_community(permalink: &str) -> &str {
    let mut segments = match permalink.strip_prefix('/') {
        Some(rest) => rest.split('/'),
        None => {
            // "r/foo/..." without the leading slash
            let mut parts = permalink.split('/');
            return match (parts.next(), parts.next()) {
                (Some("r" | "u" | "user"), Some(name)) => name,
                _ => "",
            };
        }
    };

    // skip the "r" in "/r/foo/..."
    match (segments.next(), segments.next()) {
        (Some(_prefix), Some(name)) => name,
        _ => "",
    }
}

/// The ordered, append-only collection of one run.
///
/// Ids are handed out from a single counter in append order, so they are
/// always `0..len` without gaps.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    items: Vec<Item>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Appends a freshly fetched item and returns its id.
    pub fn push_raw(&mut self, raw: RawItem) -> usize {
        let id = self.items.len();
        self.items.push(Item::new(id, raw));
        id
    }

    /// Appends a restored item under a fresh id and returns that id.
    pub fn push_restored(&mut self, item: Item) -> usize {
        self.push_raw(item.into_raw())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
