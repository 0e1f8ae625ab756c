//! MediaWiki Action API adapter.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use super::config::{ClientConfig, Credentials};
use super::{Authenticator, CorpusProvider, FeedProvider, ListingPage, PageWriter};
use crate::core::{Item, Namespace, ARTICLE_NAMESPACE_ID};
use crate::errors::{GapError, GapResult};
use crate::utils::{format_wiki_timestamp, parse_wiki_timestamp, Timestamp};

const CATEGORY_PREFIX: &str = "Category:";
/// Localized names of the category namespace, lowercase.
const CATEGORY_NAMESPACES: [&str; 12] = [
    "category",
    "catégorie",
    "kategorie",
    "categoría",
    "categoria",
    "categorie",
    "kategoria",
    "kategori",
    "kategória",
    "категория",
    "категорія",
    "kategorija",
];
const RANDOM_BATCH_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<Q> {
    query: Option<Q>,
    #[serde(default, rename = "continue")]
    continuation: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    error: Option<ApiError>,
}

impl<Q> Envelope<Q> {
    fn cursor(&self, key: &str) -> Option<String> {
        self.continuation
            .as_ref()
            .and_then(|c| c.get(key))
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string)
    }

    fn into_query(self, field: &str) -> GapResult<Q> {
        self.query.ok_or_else(|| GapError::missing_data(field))
    }
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(default)]
    ns: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct CategoryMembers {
    #[serde(default)]
    categorymembers: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedIn {
    #[serde(default)]
    embeddedin: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct RandomPages {
    #[serde(default)]
    random: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Change {
    title: String,
    #[serde(default)]
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct RecentChanges {
    #[serde(default)]
    recentchanges: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Slot {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: Slot,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: Slots,
}

#[derive(Debug, Deserialize)]
struct RevisionPage {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revisions {
    #[serde(default)]
    pages: Vec<RevisionPage>,
}

#[derive(Debug, Deserialize)]
struct Tokens {
    tokens: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ActionResult {
    result: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    login: Option<ActionResult>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct EditResponse {
    #[serde(default)]
    edit: Option<ActionResult>,
    #[serde(default)]
    error: Option<ApiError>,
}

/// Decodes an API response, turning an `error` member into an upstream error.
fn parse_envelope<Q: DeserializeOwned>(
    operation: &str,
    value: serde_json::Value,
) -> GapResult<Envelope<Q>> {
    let envelope: Envelope<Q> = serde_json::from_value(value)?;
    if let Some(err) = &envelope.error {
        return Err(api_error(operation, err));
    }
    Ok(envelope)
}

fn api_error(operation: &str, err: &ApiError) -> GapError {
    GapError::upstream(operation, format!("{}: {}", err.code, err.info))
}

/// Whether `name` starts with the canonical or a localized category
/// namespace.
fn has_category_namespace(name: &str) -> bool {
    name.split_once(':').is_some_and(|(ns, _)| {
        let ns = ns.trim().to_lowercase();
        CATEGORY_NAMESPACES.contains(&ns.as_str())
    })
}

fn category_title(name: &str) -> String {
    if name.contains(CATEGORY_PREFIX) || has_category_namespace(name) {
        name.to_string()
    } else {
        format!("{CATEGORY_PREFIX}{name}")
    }
}

fn page_content(revisions: Revisions) -> GapResult<String> {
    let page = revisions
        .pages
        .into_iter()
        .next()
        .ok_or_else(|| GapError::missing_data("pages"))?;
    if page.missing {
        return Ok(String::new());
    }
    page.revisions
        .into_iter()
        .next()
        .map(|rev| rev.slots.main.content)
        .ok_or_else(|| GapError::missing_data("revisions"))
}

fn check_action(operation: &str, result: Option<ActionResult>, field: &str) -> GapResult<()> {
    let result = result.ok_or_else(|| GapError::missing_data(field))?;
    if result.result == "Success" {
        Ok(())
    } else {
        Err(GapError::upstream(
            operation,
            result.reason.unwrap_or(result.result),
        ))
    }
}

/// Client for the MediaWiki Action API (`formatversion=2`).
///
/// The session cookie obtained by [`Authenticator::login`] is kept in the
/// client's cookie store and reused by later edits.
#[derive(Debug, Clone)]
pub struct MediaWikiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl MediaWikiClient {
    /// Creates a client from configuration.
    pub fn new(config: ClientConfig) -> GapResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| GapError::invalid_configuration(e.to_string()))?;
        tracing::info!(user_agent = %config.user_agent, endpoint = %config.api_endpoint(), "MediaWiki client ready");
        Ok(Self { http, config })
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn base_params(action: &str) -> Vec<(&'static str, String)> {
        vec![
            ("action", action.to_string()),
            ("format", "json".to_string()),
            ("formatversion", "2".to_string()),
        ]
    }

    async fn get_json(
        &self,
        operation: &str,
        params: &[(&'static str, String)],
    ) -> GapResult<serde_json::Value> {
        tracing::debug!(operation, "Action API GET");
        let response = self
            .http
            .get(self.config.api_endpoint())
            .query(params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GapError::upstream(operation, e))?;
        response
            .json()
            .await
            .map_err(|e| GapError::upstream(operation, e))
    }

    async fn post_json(
        &self,
        operation: &str,
        params: &[(&'static str, String)],
    ) -> GapResult<serde_json::Value> {
        tracing::debug!(operation, "Action API POST");
        let response = self
            .http
            .post(self.config.api_endpoint())
            .form(params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GapError::upstream(operation, e))?;
        response
            .json()
            .await
            .map_err(|e| GapError::upstream(operation, e))
    }

    async fn query<Q: DeserializeOwned>(
        &self,
        operation: &str,
        extra: Vec<(&'static str, String)>,
    ) -> GapResult<Envelope<Q>> {
        let mut params = Self::base_params("query");
        params.extend(extra);
        let value = self.get_json(operation, &params).await?;
        parse_envelope(operation, value)
    }

    async fn token(&self, kind: &str) -> GapResult<String> {
        let envelope: Envelope<Tokens> = self
            .query(
                "tokens",
                vec![("meta", "tokens".to_string()), ("type", kind.to_string())],
            )
            .await?;
        let key = format!("{kind}token");
        envelope
            .into_query("tokens")?
            .tokens
            .remove(&key)
            .ok_or_else(|| GapError::missing_data(key))
    }
}

#[async_trait]
impl CorpusProvider for MediaWikiClient {
    async fn fetch_children(&self, category: &str) -> GapResult<Vec<Item>> {
        let title = category_title(category);
        let mut children = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut params = vec![
                ("list", "categorymembers".to_string()),
                ("cmtitle", title.clone()),
                ("cmlimit", "max".to_string()),
            ];
            match cursor.take() {
                Some(c) => {
                    params.push(("cmcontinue", c));
                    params.push(("continue", "-||".to_string()));
                }
                None => params.push(("continue", String::new())),
            }
            let envelope: Envelope<CategoryMembers> =
                self.query("fetch_children", params).await?;
            cursor = envelope.cursor("cmcontinue");
            if let Some(query) = envelope.query {
                children.extend(
                    query
                        .categorymembers
                        .into_iter()
                        .map(|m| Item::new(m.title, Namespace::from_id(m.ns))),
                );
            }
            if cursor.is_none() {
                return Ok(children);
            }
        }
    }

    async fn fetch_content(&self, title: &str) -> GapResult<String> {
        let envelope: Envelope<Revisions> = self
            .query(
                "fetch_content",
                vec![
                    ("prop", "revisions".to_string()),
                    ("rvprop", "content".to_string()),
                    ("rvslots", "main".to_string()),
                    ("titles", title.to_string()),
                ],
            )
            .await?;
        page_content(envelope.into_query("query")?)
    }

    async fn list_by_template(
        &self,
        template: &str,
        cursor: Option<String>,
    ) -> GapResult<ListingPage> {
        let mut params = vec![
            ("list", "embeddedin".to_string()),
            ("eititle", template.to_string()),
            ("einamespace", ARTICLE_NAMESPACE_ID.to_string()),
            ("eilimit", "max".to_string()),
        ];
        match cursor {
            Some(c) => {
                params.push(("eicontinue", c));
                params.push(("continue", "-||".to_string()));
            }
            None => params.push(("continue", String::new())),
        }
        let envelope: Envelope<EmbeddedIn> = self.query("list_by_template", params).await?;
        let next_cursor = envelope.cursor("eicontinue");
        let titles = envelope
            .query
            .map(|q| q.embeddedin.into_iter().map(|m| m.title).collect())
            .unwrap_or_default();
        Ok(ListingPage::new(titles, next_cursor))
    }
}

#[async_trait]
impl FeedProvider for MediaWikiClient {
    async fn random_titles(&self, limit: usize) -> GapResult<Vec<String>> {
        let envelope: Envelope<RandomPages> = self
            .query(
                "random_titles",
                vec![
                    ("list", "random".to_string()),
                    ("rnnamespace", ARTICLE_NAMESPACE_ID.to_string()),
                    ("rnlimit", limit.clamp(1, RANDOM_BATCH_LIMIT).to_string()),
                ],
            )
            .await?;
        Ok(envelope
            .into_query("query")?
            .random
            .into_iter()
            .map(|m| m.title)
            .collect())
    }

    async fn latest_change(&self) -> GapResult<Option<Timestamp>> {
        let envelope: Envelope<RecentChanges> = self
            .query(
                "latest_change",
                vec![
                    ("list", "recentchanges".to_string()),
                    ("rcnamespace", ARTICLE_NAMESPACE_ID.to_string()),
                    ("rcprop", "title|timestamp".to_string()),
                    ("rclimit", "1".to_string()),
                ],
            )
            .await?;
        match envelope.into_query("query")?.recentchanges.into_iter().next() {
            Some(change) => parse_wiki_timestamp(&change.timestamp)
                .map(Some)
                .map_err(|e| GapError::upstream("latest_change", e)),
            None => Ok(None),
        }
    }

    async fn changed_titles_since(&self, since: Timestamp) -> GapResult<Vec<String>> {
        let mut titles = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut params = vec![
                ("list", "recentchanges".to_string()),
                ("rcnamespace", ARTICLE_NAMESPACE_ID.to_string()),
                ("rcprop", "title|timestamp".to_string()),
                ("rclimit", "max".to_string()),
                ("rcend", format_wiki_timestamp(&since)),
            ];
            match cursor.take() {
                Some(c) => {
                    params.push(("rccontinue", c));
                    params.push(("continue", "-||".to_string()));
                }
                None => params.push(("continue", String::new())),
            }
            let envelope: Envelope<RecentChanges> =
                self.query("changed_titles_since", params).await?;
            cursor = envelope.cursor("rccontinue");
            if let Some(query) = envelope.query {
                titles.extend(query.recentchanges.into_iter().map(|c| c.title));
            }
            if cursor.is_none() {
                return Ok(titles);
            }
        }
    }
}

#[async_trait]
impl PageWriter for MediaWikiClient {
    async fn write(&self, location: &str, text: &str, summary: &str) -> GapResult<()> {
        let token = self.token("csrf").await?;
        let mut params = Self::base_params("edit");
        params.extend([
            ("title", location.to_string()),
            ("text", text.to_string()),
            ("summary", summary.to_string()),
            ("token", token),
        ]);
        let value = self.post_json("save", &params).await?;
        let response: EditResponse = serde_json::from_value(value)?;
        if let Some(err) = &response.error {
            return Err(api_error("save", err));
        }
        check_action("save", response.edit, "edit")?;
        tracing::info!(page = location, "Page saved");
        Ok(())
    }
}

#[async_trait]
impl Authenticator for MediaWikiClient {
    async fn login(&self, credentials: &Credentials) -> GapResult<()> {
        let token = self.token("login").await?;
        let mut params = Self::base_params("login");
        params.extend([
            ("lgname", credentials.user.clone()),
            ("lgpassword", credentials.password.clone()),
            ("lgtoken", token),
        ]);
        let value = self.post_json("login", &params).await?;
        let response: LoginResponse = serde_json::from_value(value)?;
        if let Some(err) = &response.error {
            return Err(api_error("login", err));
        }
        check_action("login", response.login, "login")?;
        tracing::info!(user = %credentials.user, "Logged in");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_title_prefix() {
        assert_eq!(category_title("Cities"), "Category:Cities");
        assert_eq!(category_title("Category:Cities"), "Category:Cities");
    }

    #[test]
    fn test_category_title_keeps_localized_namespace() {
        assert_eq!(category_title("Catégorie:Peintre"), "Catégorie:Peintre");
        assert_eq!(category_title("Kategorie:Maler"), "Kategorie:Maler");
        assert_eq!(category_title("catégorie:Peintre"), "catégorie:Peintre");
        assert_eq!(
            category_title("Star Wars: Épisode IV"),
            "Category:Star Wars: Épisode IV"
        );
    }

    #[test]
    fn test_envelope_without_query_is_missing_data() {
        let envelope: Envelope<CategoryMembers> =
            parse_envelope("fetch_children", json!({"batchcomplete": true})).unwrap();
        assert!(envelope.cursor("cmcontinue").is_none());
        let err = envelope.into_query("categorymembers").unwrap_err();
        assert!(matches!(err, GapError::MissingData { ref field } if field == "categorymembers"));
    }

    #[test]
    fn test_parse_category_members() {
        let value = json!({
            "batchcomplete": true,
            "continue": {"cmcontinue": "page|4142|123", "continue": "-||"},
            "query": {"categorymembers": [
                {"pageid": 1, "ns": 0, "title": "Paris"},
                {"pageid": 2, "ns": 14, "title": "Category:Suburbs"}
            ]}
        });
        let envelope: Envelope<CategoryMembers> =
            parse_envelope("fetch_children", value).unwrap();
        assert_eq!(envelope.cursor("cmcontinue").as_deref(), Some("page|4142|123"));
        let members = envelope.into_query("query").unwrap().categorymembers;
        assert_eq!(Namespace::from_id(members[1].ns), Namespace::Category);
    }

    #[test]
    fn test_parse_api_error() {
        let value = json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}});
        let err = parse_envelope::<EmbeddedIn>("list_by_template", value).unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("badtoken"));
    }

    #[test]
    fn test_last_embeddedin_page_has_no_cursor() {
        let value = json!({"batchcomplete": true, "query": {"embeddedin": [{"ns": 0, "title": "Lyon"}]}});
        let envelope: Envelope<EmbeddedIn> = parse_envelope("list_by_template", value).unwrap();
        assert!(envelope.cursor("eicontinue").is_none());
    }

    #[test]
    fn test_page_content() {
        let value = json!({"query": {"pages": [{"title": "Paris", "revisions": [
            {"slots": {"main": {"contentmodel": "wikitext", "content": "[[File:Paris.jpg]]"}}}
        ]}]}});
        let envelope: Envelope<Revisions> = parse_envelope("fetch_content", value).unwrap();
        let content = page_content(envelope.into_query("query").unwrap()).unwrap();
        assert_eq!(content, "[[File:Paris.jpg]]");
    }

    #[test]
    fn test_missing_page_has_empty_content() {
        let value = json!({"query": {"pages": [{"title": "Nowhere", "missing": true}]}});
        let envelope: Envelope<Revisions> = parse_envelope("fetch_content", value).unwrap();
        assert_eq!(page_content(envelope.into_query("query").unwrap()).unwrap(), "");
    }

    #[test]
    fn test_check_action_failure_reason() {
        let result = ActionResult {
            result: "Failed".to_string(),
            reason: Some("Incorrect username or password entered.".to_string()),
        };
        let err = check_action("login", Some(result), "login").unwrap_err();
        assert!(err.to_string().contains("Incorrect username"));
        assert!(matches!(
            check_action("save", None, "edit"),
            Err(GapError::MissingData { .. })
        ));
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig::new("");
        assert!(matches!(
            MediaWikiClient::new(config),
            Err(GapError::InvalidConfiguration(_))
        ));
    }
}
