//! Lazy listing of the articles that transclude a template.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use super::ItemStream;
use crate::client::CorpusProvider;
use crate::core::Item;
use crate::errors::GapError;
use crate::observability::RunObserver;

const TEMPLATE_PREFIX: &str = "Template:";

/// Prefixes `Template:` unless the name already carries it.
#[must_use]
pub fn normalize_template_name(name: &str) -> String {
    if name.contains(TEMPLATE_PREFIX) {
        name.to_string()
    } else {
        format!("{TEMPLATE_PREFIX}{name}")
    }
}

enum PageState {
    Next { cursor: Option<String>, fetched: usize },
    Done,
}

/// Articles transcluding a template, fetched one listing page at a time.
#[derive(Clone)]
pub struct TemplateListing {
    provider: Arc<dyn CorpusProvider>,
    observer: Arc<dyn RunObserver>,
    template: String,
}

impl TemplateListing {
    /// Creates a listing for `template_name`.
    pub fn new(
        provider: Arc<dyn CorpusProvider>,
        observer: Arc<dyn RunObserver>,
        template_name: &str,
    ) -> Self {
        Self {
            provider,
            observer,
            template: normalize_template_name(template_name),
        }
    }

    /// The normalized template title.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Streams the listing from its first page.
    ///
    /// Page *n+1* is requested only once every item of page *n* has been
    /// pulled. A failed page ends the stream with that error; items yielded
    /// before it remain valid.
    #[must_use]
    pub fn items(self) -> ItemStream<'static> {
        self.stream_from(None)
    }

    /// Streams the listing starting at a cursor persisted by the caller.
    #[must_use]
    pub fn resume_from(self, cursor: impl Into<String>) -> ItemStream<'static> {
        self.stream_from(Some(cursor.into()))
    }

    fn stream_from(self, cursor: Option<String>) -> ItemStream<'static> {
        let Self {
            provider,
            observer,
            template,
        } = self;

        let pages = stream::try_unfold(
            PageState::Next { cursor, fetched: 0 },
            move |state| {
                let provider = Arc::clone(&provider);
                let observer = Arc::clone(&observer);
                let template = template.clone();
                async move {
                    let PageState::Next { cursor, fetched } = state else {
                        return Ok::<_, GapError>(None);
                    };
                    let page = provider.list_by_template(&template, cursor).await?;
                    let fetched = fetched + 1;
                    observer.on_page_fetched(&template, fetched, page.titles.len(), page.has_more());
                    let next = match page.next_cursor {
                        Some(cursor) => PageState::Next {
                            cursor: Some(cursor),
                            fetched,
                        },
                        None => PageState::Done,
                    };
                    Ok(Some((page.titles, next)))
                }
            },
        );

        pages
            .map_ok(|titles| {
                stream::iter(
                    titles
                        .into_iter()
                        .map(|t| Ok::<Item, GapError>(Item::article(t))),
                )
            })
            .try_flatten()
            .boxed()
    }
}

impl std::fmt::Debug for TemplateListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateListing")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
