//! Recipe list filters parsed from query parameters.

use super::validation::FieldErrors;
use super::{Error, UserId, Viewer};

/// Sort order for recipe listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeOrdering {
    PubDateAsc,
    /// Newest first; ties broken by id, newest first.
    #[default]
    PubDateDesc,
    NameAsc,
    NameDesc,
}

impl RecipeOrdering {
    /// Parse an `ordering` parameter; unknown values fall back to the default.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("pub_date") => Self::PubDateAsc,
            Some("name") => Self::NameAsc,
            Some("-name") => Self::NameDesc,
            _ => Self::PubDateDesc,
        }
    }
}

/// Membership filter driven by `is_favorited` or `is_in_shopping_cart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipFilter {
    /// Only recipes in the viewer's list.
    Only(UserId),
    /// Only recipes outside the viewer's list.
    Exclude(UserId),
}

fn membership(raw: Option<&str>, viewer: Viewer) -> Option<MembershipFilter> {
    let user = viewer.user_id()?;
    match raw? {
        "true" | "1" => Some(MembershipFilter::Only(user)),
        "false" | "0" => Some(MembershipFilter::Exclude(user)),
        _ => None,
    }
}

/// Raw recipe list parameters as received.
#[derive(Debug, Clone, Default)]
pub struct RecipeListParams {
    pub author: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// Validated recipe list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub author: Option<UserId>,
    /// Lower-cased substring matched against recipe names.
    pub search: Option<String>,
    pub ordering: RecipeOrdering,
    pub favorited: Option<MembershipFilter>,
    pub in_shopping_cart: Option<MembershipFilter>,
}

/// Message for an author filter that does not name a user.
pub fn invalid_author_message(raw: &str) -> String {
    format!("Select a valid choice. {raw} is not one of the available choices.")
}

impl RecipeListParams {
    /// Build a query for `viewer`. Membership filters are dropped for
    /// anonymous viewers; a non-numeric author is a field error.
    ///
    /// Whether the author exists is checked by the service.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::{RecipeListParams, RecipeOrdering, Viewer};
    ///
    /// let params = RecipeListParams {
    ///     ordering: Some("-name".into()),
    ///     is_favorited: Some("1".into()),
    ///     ..RecipeListParams::default()
    /// };
    /// let query = params.into_query(Viewer::Anonymous).expect("valid query");
    /// assert_eq!(query.ordering, RecipeOrdering::NameDesc);
    /// assert!(query.favorited.is_none());
    /// ```
    pub fn into_query(self, viewer: Viewer) -> Result<RecipeQuery, Error> {
        let author = match self.author.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<UserId>()
                    .map_err(|_| FieldErrors::single("author", invalid_author_message(raw)))?,
            ),
        };
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);
        Ok(RecipeQuery {
            author,
            search,
            ordering: RecipeOrdering::parse(self.ordering.as_deref()),
            favorited: membership(self.is_favorited.as_deref(), viewer),
            in_shopping_cart: membership(self.is_in_shopping_cart.as_deref(), viewer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, RecipeOrdering::PubDateDesc)]
    #[case(Some("pub_date"), RecipeOrdering::PubDateAsc)]
    #[case(Some("-pub_date"), RecipeOrdering::PubDateDesc)]
    #[case(Some("name"), RecipeOrdering::NameAsc)]
    #[case(Some("-name"), RecipeOrdering::NameDesc)]
    #[case(Some("cooking_time"), RecipeOrdering::PubDateDesc)]
    fn parses_ordering(#[case] raw: Option<&str>, #[case] expected: RecipeOrdering) {
        assert_eq!(RecipeOrdering::parse(raw), expected);
    }

    #[rstest]
    #[case("true", Some(MembershipFilter::Only(UserId::new(5))))]
    #[case("1", Some(MembershipFilter::Only(UserId::new(5))))]
    #[case("false", Some(MembershipFilter::Exclude(UserId::new(5))))]
    #[case("0", Some(MembershipFilter::Exclude(UserId::new(5))))]
    #[case("yes", None)]
    fn membership_flags_for_signed_in_viewer(
        #[case] raw: &str,
        #[case] expected: Option<MembershipFilter>,
    ) {
        let params = RecipeListParams {
            is_in_shopping_cart: Some(raw.into()),
            ..RecipeListParams::default()
        };
        let query = params
            .into_query(Viewer::User(UserId::new(5)))
            .expect("valid");
        assert_eq!(query.in_shopping_cart, expected);
    }

    #[test]
    fn non_numeric_author_is_a_field_error() {
        let params = RecipeListParams {
            author: Some("alice".into()),
            ..RecipeListParams::default()
        };
        let error = params.into_query(Viewer::Anonymous).expect_err("bad author");
        let fields = error
            .details()
            .and_then(|details| details.get("fields"))
            .expect("fields");
        assert!(fields.get("author").is_some());
    }

    #[test]
    fn search_is_trimmed_and_lower_cased() {
        let params = RecipeListParams {
            search: Some("  PanCake ".into()),
            author: Some(" 3 ".into()),
            ..RecipeListParams::default()
        };
        let query = params.into_query(Viewer::Anonymous).expect("valid");
        assert_eq!(query.search.as_deref(), Some("pancake"));
        assert_eq!(query.author, Some(UserId::new(3)));
    }
}
