//! Paginated list requests
//!
//! List endpoints return an envelope with one page of `resources`, any
//! side-loaded `included` resources, and a `pagination.next.href` link. The
//! link already carries the full query state and is followed verbatim.

use log::debug;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::ccv3::client::Client;
use crate::ccv3::included::IncludedResources;
use crate::ccv3::request::RequestParams;
use crate::config::api;
use crate::error::{ApiResult, CcError, Result, WarnedError, Warnings};

#[derive(Deserialize, Debug, Default)]
struct Link {
    #[serde(default)]
    href: String,
}

#[derive(Deserialize, Debug, Default)]
struct Pagination {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    total_pages: u64,
    #[serde(default)]
    next: Option<Link>,
}

/// One page of a list response
#[derive(Deserialize, Debug, Default)]
struct Page {
    #[serde(default)]
    pagination: Pagination,
    #[serde(default)]
    resources: Vec<Value>,
    #[serde(default)]
    included: IncludedResources,
}

/// Lazy sequence over every item of a list request
///
/// Pages are fetched one at a time, only when the buffered items of the
/// previous page are used up. Warnings and included resources accumulate
/// across pages and stay available after an error.
pub struct ListPager<'c, T> {
    client: &'c Client,
    method: Method,
    next_url: Option<String>,
    buffer: VecDeque<Value>,
    warnings: Warnings,
    included: IncludedResources,
    pages: usize,
    _item: PhantomData<fn() -> T>,
}

impl<'c, T> ListPager<'c, T>
where
    T: DeserializeOwned,
{
    fn new(client: &'c Client, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            next_url: Some(url),
            buffer: VecDeque::new(),
            warnings: Warnings::new(),
            included: IncludedResources::default(),
            pages: 0,
            _item: PhantomData,
        }
    }

    /// Next decoded item, fetching the following page when needed
    ///
    /// Returns `None` once the last page is exhausted. After an error the
    /// pager is finished and yields `None`.
    pub async fn next(&mut self) -> Option<Result<T>> {
        while self.buffer.is_empty() {
            let url = self.next_url.take()?;
            if let Err(e) = self.fetch_page(&url).await {
                self.buffer.clear();
                return Some(Err(e));
            }
        }

        let raw = self.buffer.pop_front()?;
        match serde_json::from_value(raw) {
            Ok(item) => Some(Ok(item)),
            Err(e) => {
                self.buffer.clear();
                self.next_url = None;
                Some(Err(CcError::MalformedResponse(format!(
                    "list item on page {}: {}",
                    self.pages, e
                ))))
            }
        }
    }

    async fn fetch_page(&mut self, url: &str) -> Result<()> {
        self.pages += 1;
        debug!("Fetching page {}: {}", self.pages, url);

        let response = match self
            .client
            .execute_url(self.method.clone(), url, None, api::JSON_CONTENT_TYPE)
            .await
        {
            Ok((response, warnings)) => {
                self.warnings.extend(warnings);
                response
            }
            Err(WarnedError { error, warnings }) => {
                self.warnings.extend(warnings);
                return Err(error);
            }
        };

        let page: Page = serde_json::from_slice(&response.body).map_err(|e| {
            CcError::MalformedResponse(format!("page {}: {}", self.pages, e))
        })?;

        debug!(
            "Page {}/{} holds {} resources ({} total)",
            self.pages,
            page.pagination.total_pages,
            page.resources.len(),
            page.pagination.total_results
        );

        self.included.merge(page.included);
        self.buffer.extend(page.resources);
        self.next_url = page
            .pagination
            .next
            .map(|link| link.href)
            .filter(|href| !href.is_empty());
        Ok(())
    }

    /// Warnings gathered from every page fetched so far
    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    /// Included resources merged from every page fetched so far
    pub fn included(&self) -> &IncludedResources {
        &self.included
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    pub fn into_parts(self) -> (IncludedResources, Warnings) {
        (self.included, self.warnings)
    }
}

impl Client {
    /// Start a lazy list request
    ///
    /// The route is resolved immediately; no request is sent until the
    /// first call to [`ListPager::next`].
    pub fn paginate<T>(&self, params: &RequestParams) -> Result<ListPager<'_, T>>
    where
        T: DeserializeOwned,
    {
        let (method, url) = self.resolve_url(params)?;
        Ok(ListPager::new(self, method, url))
    }

    /// Run a list request, handing every item to `accumulate` in order
    ///
    /// Stops at the first error from a page or from `accumulate`; the
    /// error comes back with the warnings of every page fetched.
    pub async fn make_list_request<T, F>(
        &self,
        params: &RequestParams,
        mut accumulate: F,
    ) -> ApiResult<IncludedResources>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> Result<()>,
    {
        let mut pager = self.paginate::<T>(params)?;

        while let Some(item) = pager.next().await {
            if let Err(error) = item.and_then(&mut accumulate) {
                let (_, warnings) = pager.into_parts();
                return Err(WarnedError::new(error, warnings));
            }
        }

        let (included, warnings) = pager.into_parts();
        Ok((included, warnings))
    }

    /// Collect every item of a list request
    pub async fn list_all<T>(
        &self,
        params: &RequestParams,
    ) -> ApiResult<(Vec<T>, IncludedResources)>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let (included, warnings) = self
            .make_list_request(params, |item: T| {
                items.push(item);
                Ok(())
            })
            .await?;
        Ok(((items, included), warnings))
    }
}
