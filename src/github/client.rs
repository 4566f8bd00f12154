use anyhow::Context;
use reqwest::{header::USER_AGENT, StatusCode, Url};
use tracing::debug;

use crate::config::GithubConfig;

/// Repositories returned per lookup, newest first.
const REPO_PAGE_SIZE: &str = "5";

/// Outcome of a repository lookup.
#[derive(Debug)]
pub enum RepoLookup {
    Found(serde_json::Value),
    /// GitHub answered with something other than 200.
    Missing(StatusCode),
}

/// Thin client for the GitHub REST API. No caching, no retry; relies on the
/// HTTP client's default timeouts.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub(crate) fn repos_url(&self, username: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.config.api_url).context("invalid GITHUB_API_URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("GITHUB_API_URL cannot be a base"))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("per_page", REPO_PAGE_SIZE)
                .append_pair("sort", "created:asc");
            if !self.config.client_id.is_empty() {
                query.append_pair("client_id", &self.config.client_id);
            }
            if !self.config.client_secret.is_empty() {
                query.append_pair("client_secret", &self.config.client_secret);
            }
        }
        Ok(url)
    }

    pub async fn user_repos(&self, username: &str) -> anyhow::Result<RepoLookup> {
        let url = self.repos_url(username)?;
        let res = self
            .http
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .context("github request")?;

        let status = res.status();
        debug!(%status, username, "github responded");
        if status != StatusCode::OK {
            return Ok(RepoLookup::Missing(status));
        }
        let body = res
            .json::<serde_json::Value>()
            .await
            .context("decode github response")?;
        Ok(RepoLookup::Found(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str, id: &str, secret: &str) -> GithubClient {
        GithubClient::new(GithubConfig {
            api_url: api_url.into(),
            client_id: id.into(),
            client_secret: secret.into(),
            user_agent: "test".into(),
        })
    }

    #[test]
    fn builds_repo_query_with_credentials() {
        let url = client("https://api.github.com", "cid", "csecret")
            .repos_url("octocat")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/users/octocat/repos?per_page=5&sort=created%3Aasc&client_id=cid&client_secret=csecret"
        );
    }

    #[test]
    fn omits_empty_credentials_and_keeps_base_path() {
        let url = client("http://127.0.0.1:9000/gh/", "", "").repos_url("ada").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/gh/users/ada/repos?per_page=5&sort=created%3Aasc"
        );
    }

    #[test]
    fn username_is_a_single_path_segment() {
        let url = client("https://api.github.com", "", "").repos_url("a/b?c").unwrap();
        assert!(url.path().starts_with("/users/a%2Fb%3Fc/repos"));
    }
}
