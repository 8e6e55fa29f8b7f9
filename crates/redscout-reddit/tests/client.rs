//! Integration tests for `RedditClient` and `RedditAuth` using wiremock HTTP mocks.

use redscout_reddit::{RedditAuth, RedditClient, RedditError};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RedditClient {
    RedditClient::with_base_url("test-token", "redscout-test/0.1", 30, base_url)
        .expect("client construction should not fail")
}

fn test_auth(base_url: &str) -> RedditAuth {
    RedditAuth::with_base_url(
        "test-id",
        "test-secret",
        "http://localhost:3000/callback",
        "redscout-test/0.1",
        30,
        base_url,
    )
    .expect("auth construction should not fail")
}

fn subreddit_listing(entries: &[(&str, u64, bool)], after: Option<&str>) -> serde_json::Value {
    let children: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, subscribers, over18)| {
            serde_json::json!({
                "kind": "t5",
                "data": {
                    "display_name": name,
                    "subscribers": subscribers,
                    "over18": over18
                }
            })
        })
        .collect();
    serde_json::json!({
        "kind": "Listing",
        "data": { "children": children, "after": after }
    })
}

#[tokio::test]
async fn search_subreddits_returns_normalized_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subreddits/search"))
        .and(query_param("q", "SaaS for startups"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subreddit_listing(
            &[("startups", 500_000, false), ("SaaS", 120_000, false)],
            None,
        )))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let subs = client
        .search_subreddits("SaaS for startups", 10)
        .await
        .expect("should parse subreddit listing");

    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].name, "startups");
    assert_eq!(subs[0].subscribers, 500_000);
    assert!(!subs[0].over_18);
}

#[tokio::test]
async fn search_subreddits_follows_the_after_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subreddits/search"))
        .and(query_param("after", "t5_page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subreddit_listing(
            &[("second", 10, false)],
            None,
        )))
        .mount(&server)
        .await;

    // No `after` param on the first request.
    Mock::given(method("GET"))
        .and(path("/subreddits/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subreddit_listing(
            &[("first", 20, false)],
            Some("t5_page2"),
        )))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let subs = client
        .search_subreddits("anything", 5)
        .await
        .expect("pagination should succeed");

    let names: Vec<&str> = subs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn search_posts_sends_sort_and_window() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "kind": "Listing",
        "data": {
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "id": "abc",
                        "title": "Looking for market research tools",
                        "selftext": "Any recommendations?",
                        "author": "founder42",
                        "permalink": "/r/startups/comments/abc/looking/",
                        "subreddit": "startups",
                        "subreddit_subscribers": 500_000,
                        "over_18": false
                    }
                }
            ],
            "after": null
        }
    });

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "market research"))
        .and(query_param("sort", "relevance"))
        .and(query_param("t", "month"))
        .and(query_param("restrict_sr", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let posts = client
        .search_posts("market research", "relevance", "month", 25)
        .await
        .expect("should parse post listing");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].subreddit, "startups");
    assert_eq!(posts[0].author.as_deref(), Some("founder42"));
    assert_eq!(
        posts[0].permalink,
        "https://reddit.com/r/startups/comments/abc/looking/"
    );
}

#[tokio::test]
async fn top_posts_not_found_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/doesnotexist/top"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .top_posts("doesnotexist", "month", 10)
        .await
        .expect_err("404 should be an error");
    assert!(matches!(err, RedditError::NotFound));
}

#[tokio::test]
async fn top_posts_forbidden_and_rate_limited_are_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/private/top"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/busy/top"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(matches!(
        client.top_posts("private", "week", 5).await,
        Err(RedditError::Forbidden)
    ));
    assert!(matches!(
        client.top_posts("busy", "week", 5).await,
        Err(RedditError::RateLimited)
    ));
}

#[tokio::test]
async fn comments_flattens_the_tree_and_skips_more_stubs() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "kind": "Listing",
            "data": { "children": [ { "kind": "t3", "data": { "id": "abc" } } ] }
        },
        {
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t1",
                        "data": {
                            "body": "I need market research help",
                            "author": "replier",
                            "permalink": "/r/solopreneur/comments/abc/_/c1",
                            "replies": {
                                "kind": "Listing",
                                "data": {
                                    "children": [
                                        {
                                            "kind": "t1",
                                            "data": {
                                                "body": "same here",
                                                "author": "[deleted]",
                                                "permalink": "/r/solopreneur/comments/abc/_/c2",
                                                "replies": ""
                                            }
                                        }
                                    ]
                                }
                            }
                        }
                    },
                    { "kind": "more", "data": { "count": 40, "children": ["d1", "d2"] } }
                ]
            }
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/r/solopreneur/comments/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let comments = client
        .comments("solopreneur", "abc", 50)
        .await
        .expect("should flatten comment tree");

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].body, "I need market research help");
    assert_eq!(comments[0].author.as_deref(), Some("replier"));
    // Deleted accounts normalize to a missing author.
    assert_eq!(comments[1].author, None);
}

#[tokio::test]
async fn me_returns_the_account_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "boyd" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.me().await.expect("identity"), "boyd");
}

#[tokio::test]
async fn me_with_expired_token_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(matches!(client.me().await, Err(RedditError::Unauthorized)));
}

#[tokio::test]
async fn exchange_code_returns_the_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=one-time-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "short-lived",
            "refresh_token": "long-lived",
            "token_type": "bearer",
            "expires_in": 86_400
        })))
        .mount(&server)
        .await;

    let auth = test_auth(&server.uri());
    let refresh = auth
        .exchange_code("one-time-code")
        .await
        .expect("code exchange");
    assert_eq!(refresh, "long-lived");
}

#[tokio::test]
async fn exchange_code_without_refresh_token_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "short-lived"
        })))
        .mount(&server)
        .await;

    let auth = test_auth(&server.uri());
    let err = auth
        .exchange_code("one-time-code")
        .await
        .expect_err("missing refresh token should fail");
    assert!(matches!(err, RedditError::Auth(_)));
}

#[tokio::test]
async fn rejected_token_exchange_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let auth = test_auth(&server.uri());
    let err = auth
        .exchange_refresh_token("revoked")
        .await
        .expect_err("revoked refresh token should fail");
    assert!(matches!(err, RedditError::Auth(_)));
}

#[tokio::test]
async fn app_credentials_grant_returns_an_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "app-only-token"
        })))
        .mount(&server)
        .await;

    let auth = test_auth(&server.uri());
    let token = auth
        .exchange_app_credentials()
        .await
        .expect("client-credentials exchange");
    assert_eq!(token, "app-only-token");
}
