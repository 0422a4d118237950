//! Construction of store search requests.

use url::Url;

use crate::types::Category;

/// Number of results requested per search.
///
/// Searches are never paged, this is the only page.
pub const RESULT_LIMIT: u32 = 200;

/// Build the request target for a search of `term` within `category`.
///
/// `term` is percent-encoded as a URL component, so spaces and reserved
/// characters such as `&` or `+` cannot leak into the query structure.
/// The `entity` parameter is omitted for [`Category::All`].
/// Any query already present on `store_url` is replaced.
pub fn build_target(store_url: &Url, term: &str, category: Category) -> Url {
    let mut query = format!(
        "term={}&limit={RESULT_LIMIT}",
        url_escape::encode_component(term)
    );
    if let Some(entity) = category.entity() {
        query.push_str("&entity=");
        query.push_str(entity);
    }

    let mut target = store_url.clone();
    target.set_query(Some(&query));
    target
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn store_url() -> Url {
        Url::parse("https://store.example/search").unwrap()
    }

    fn query_param(target: &Url, key: &str) -> Option<String> {
        target
            .query_pairs()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }

    #[test]
    fn escapes_term_and_maps_music_entity() {
        let target = build_target(&store_url(), "rock & roll", Category::Music);
        let query = target.query().unwrap();

        assert!(query.contains("term=rock%20%26%20roll"), "{query}");
        assert!(query.contains("entity=musicTrack"), "{query}");
        assert!(query.contains("limit=200"), "{query}");
        assert_eq!(query_param(&target, "term").as_deref(), Some("rock & roll"));
    }

    #[test]
    fn unrestricted_search_has_no_entity() {
        let target = build_target(&store_url(), "abba", Category::All);
        assert_eq!(target.query(), Some("term=abba&limit=200"));
    }

    #[test]
    fn each_category_maps_to_its_entity() {
        for category in Category::ALL {
            let target = build_target(&store_url(), "x", category);
            assert_eq!(
                query_param(&target, "entity").as_deref(),
                category.entity(),
                "{category}"
            );
        }
    }

    #[test]
    fn plus_sign_is_not_read_back_as_space() {
        let target = build_target(&store_url(), "c++", Category::Software);
        assert_eq!(query_param(&target, "term").as_deref(), Some("c++"));
    }

    #[test]
    fn existing_query_is_replaced() {
        let base = Url::parse("https://store.example/search?country=us").unwrap();
        let target = build_target(&base, "abba", Category::All);
        assert_eq!(query_param(&target, "country"), None);
        assert_eq!(target.path(), "/search");
    }

    proptest! {
        #[test]
        fn term_survives_escaping(term in any::<String>(), index in 0..6_usize) {
            let category = Category::from_index(index);
            let target = build_target(&store_url(), &term, category);

            prop_assert_eq!(query_param(&target, "term"), Some(term));
            prop_assert_eq!(query_param(&target, "limit"), Some("200".to_string()));
            let entity = query_param(&target, "entity");
            prop_assert_eq!(entity.as_deref(), category.entity());
        }
    }
}
