//! Page-number query parameters and response envelopes.

use actix_web::HttpRequest;
use pagination::{PageRequest, PageSlice, Paginated};
use serde::Deserialize;
use url::Url;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::inbound::http::error::pagination_error;

/// `page` and `limit` query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size; defaults to 6, capped at 100.
    pub limit: Option<String>,
}

impl PageParams {
    pub fn request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_params(self.page.as_deref(), self.limit.as_deref())
            .map_err(|error| pagination_error(&error))
    }
}

/// Absolute URL of the current request, used to derive page links.
fn request_url(req: &HttpRequest) -> Result<Url, Error> {
    let info = req.connection_info();
    let raw = format!("{}://{}{}", info.scheme(), info.host(), req.uri());
    Url::parse(&raw).map_err(|error| Error::internal(format!("invalid request url {raw}: {error}")))
}

/// Wrap a page of rows in the `{count, next, previous, results}` envelope.
pub fn paginate<T, U>(
    req: &HttpRequest,
    slice: PageSlice<T>,
    request: PageRequest,
    convert: impl FnMut(T) -> U,
) -> Result<Paginated<U>, Error> {
    let url = request_url(req)?;
    Paginated::build(slice.map(convert), request, &url).map_err(|error| pagination_error(&error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    fn builds_absolute_links_from_the_request() {
        let req = TestRequest::get()
            .uri("/api/v1/users?page=2&limit=1")
            .insert_header(("host", "food.example"))
            .to_http_request();
        let params = PageParams {
            page: Some("2".into()),
            limit: Some("1".into()),
        };
        let request = params.request().expect("valid page");

        let page = paginate(&req, PageSlice::new(vec![1, 2], 3), request, |n| n * 10)
            .expect("in range");

        assert_eq!(page.count, 3);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(
            page.next.as_deref(),
            Some("http://food.example/api/v1/users?limit=1&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://food.example/api/v1/users?limit=1")
        );
    }

    #[rstest]
    #[case(Some("abc"))]
    #[case(Some("0"))]
    fn invalid_page_is_not_found(#[case] page: Option<&str>) {
        let params = PageParams {
            page: page.map(str::to_owned),
            limit: None,
        };
        let error = params.request().expect_err("invalid page");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Invalid page.");
    }

    #[rstest]
    fn page_past_the_end_is_not_found() {
        let req = TestRequest::get().uri("/api/v1/recipes?page=5").to_http_request();
        let request = PageRequest::new(5, 6).expect("valid");
        let error = paginate(&req, PageSlice::new(Vec::<i32>::new(), 3), request, |n| n)
            .expect_err("past the end");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
