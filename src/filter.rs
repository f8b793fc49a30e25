use log::{debug, info};

use crate::{Collection, Item, Result, SavedError};

/// Selects the items matching the given criteria, in collection order.
///
/// Each criterion is a list of substrings; an item satisfies a criterion when
/// the field contains any one of them (case-sensitive). With both criteria an
/// item must satisfy both. An absent or empty list places no constraint.
///
/// Finding nothing is [`SavedError::NoMatches`], never an empty result.
pub fn filter<'a>(
    collection: &'a Collection,
    title_terms: Option<&[String]>,
    community_terms: Option<&[String]>,
) -> Result<Vec<&'a Item>> {
    let title_terms = title_terms.filter(|terms| !terms.is_empty());
    let community_terms = community_terms.filter(|terms| !terms.is_empty());

    let selected: Vec<&Item> = match (title_terms, community_terms) {
        // Case 1: community first, then title within that subset
        (Some(titles), Some(communities)) => collection
            .iter()
            .filter(|item| contains_any(item.community(), communities))
            .filter(|item| contains_any(item.title(), titles))
            .collect(),

        // Case 2: title only
        (Some(titles), None) => collection
            .iter()
            .filter(|item| contains_any(item.title(), titles))
            .collect(),

        // Case 3: community only
        (None, Some(communities)) => collection
            .iter()
            .filter(|item| contains_any(item.community(), communities))
            .collect(),

        // Case 4: no filters
        (None, None) => collection.iter().collect(),
    };

    debug!(
        "Filter kept {} of {} items (titles: {:?}, communities: {:?})",
        selected.len(),
        collection.len(),
        title_terms,
        community_terms
    );

    if selected.is_empty() {
        info!("No items matched the filter");
        return Err(SavedError::NoMatches);
    }

    Ok(selected)
}

fn contains_any(field: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| field.contains(term.as_str()))
}
