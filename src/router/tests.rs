use std::sync::Arc;

use http::Method;

use super::Trie;
use crate::error::SetupError;
use crate::handler::{BoxHandler, Request, Response};
use crate::params::ParamsPool;

fn tagged(tag: &'static str) -> BoxHandler {
    Arc::new(move |res: &mut Response, _req: &mut Request| {
        *res.body_mut() = tag.as_bytes().to_vec();
    })
}

fn build(routes: &[(Method, &str)]) -> Trie {
    let mut trie = Trie::default();
    for (method, pattern) in routes {
        trie.insert(method.clone(), pattern, tagged("route"), Vec::new())
            .unwrap();
    }
    trie
}

/// Matched pattern and bindings for `path`, releasing any context back to `pool`.
fn resolve(trie: &Trie, pool: &ParamsPool, method: Method, path: &str) -> (Option<String>, Vec<(String, String)>) {
    let (endpoint, params) = trie.lookup(&method, path, pool);
    let pattern = endpoint.map(|e| e.pattern().to_string());
    let bindings = params
        .as_ref()
        .map(|p| {
            p.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();
    if let Some(params) = params {
        pool.release(params);
    }
    (pattern, bindings)
}

fn pool() -> ParamsPool {
    ParamsPool::new(4, 32, 64)
}

fn body_of(handler: &BoxHandler) -> Vec<u8> {
    let mut res = Response::new(Vec::new());
    let mut req = Request::new(Vec::new());
    handler.serve(&mut res, &mut req);
    res.into_body()
}

#[test]
fn test_static_routes_match_without_params() {
    let trie = build(&[
        (Method::GET, "/"),
        (Method::GET, "/health"),
        (Method::GET, "/zoo/animals"),
    ]);
    let pool = pool();

    for path in ["/", "/health", "/zoo/animals"] {
        let (endpoint, params) = trie.lookup(&Method::GET, path, &pool);
        assert_eq!(endpoint.unwrap().pattern(), path);
        assert!(params.is_none(), "static hit must not acquire a context");
    }
    assert_eq!(pool.idle_count(), 0);
}

#[test]
fn test_param_route_binds_only_its_key() {
    let trie = build(&[(Method::GET, "/users/:id")]);
    let pool = pool();

    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/users/42");
    assert_eq!(pattern.as_deref(), Some("/users/:id"));
    assert_eq!(bindings, vec![("id".to_string(), "42".to_string())]);
}

#[test]
fn test_multiple_params_in_order() {
    let trie = build(&[(Method::GET, "/users/:user_id/posts/:post_id")]);
    let pool = pool();

    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/users/123/posts/456");
    assert_eq!(pattern.as_deref(), Some("/users/:user_id/posts/:post_id"));
    assert_eq!(
        bindings,
        vec![
            ("user_id".to_string(), "123".to_string()),
            ("post_id".to_string(), "456".to_string()),
        ]
    );
}

#[test]
fn test_duplicate_static_keeps_first_handler() {
    let mut trie = Trie::default();
    trie.insert(Method::GET, "/health", tagged("first"), Vec::new())
        .unwrap();
    trie.insert(Method::GET, "/health", tagged("second"), Vec::new())
        .unwrap();
    let pool = pool();

    let (endpoint, _) = trie.lookup(&Method::GET, "/health", &pool);
    assert_eq!(body_of(endpoint.unwrap().handler()), b"first");
    assert_eq!(trie.routes().len(), 1);
}

#[test]
fn test_dynamic_reregistration_replaces_handler() {
    let mut trie = Trie::default();
    trie.insert(Method::GET, "/users/:id", tagged("first"), Vec::new())
        .unwrap();
    trie.insert(Method::GET, "/users/:id", tagged("second"), Vec::new())
        .unwrap();
    let pool = pool();

    let (endpoint, params) = trie.lookup(&Method::GET, "/users/1", &pool);
    assert_eq!(body_of(endpoint.unwrap().handler()), b"second");
    pool.release(params.unwrap());
    assert_eq!(trie.routes(), &[(Method::GET, "/users/:id".to_string())]);
}

#[test]
fn test_reregistration_under_new_param_name_lists_route_once() {
    let mut trie = Trie::default();
    trie.insert(Method::GET, "/users/:id", tagged("first"), Vec::new())
        .unwrap();
    trie.insert(Method::POST, "/users/:id", tagged("post"), Vec::new())
        .unwrap();
    trie.insert(Method::GET, "/users/:uid", tagged("second"), Vec::new())
        .unwrap();

    assert_eq!(
        trie.routes(),
        &[
            (Method::GET, "/users/:uid".to_string()),
            (Method::POST, "/users/:id".to_string()),
        ]
    );
}

#[test]
fn test_shared_prefix_reuses_nodes() {
    let trie = build(&[
        (Method::GET, "/users/:id"),
        (Method::GET, "/users/:id/posts"),
        (Method::GET, "/users/:id/posts/:post_id"),
    ]);
    let pool = pool();

    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/users/1").0.as_deref(),
        Some("/users/:id")
    );
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/users/1/posts").0.as_deref(),
        Some("/users/:id/posts")
    );
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/users/1/posts/2").0.as_deref(),
        Some("/users/:id/posts/:post_id")
    );
    assert_eq!(trie.max_params(), 2);
}

#[test]
fn test_later_param_name_renames_shared_segment() {
    let trie = build(&[
        (Method::GET, "/users/:id"),
        (Method::GET, "/users/:uid/posts"),
    ]);
    let pool = pool();

    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/users/7");
    assert_eq!(pattern.as_deref(), Some("/users/:id"));
    assert_eq!(bindings, vec![("uid".to_string(), "7".to_string())]);
}

#[test]
fn test_static_edge_preferred_over_param() {
    let trie = build(&[
        (Method::GET, "/users/me/:tab"),
        (Method::GET, "/users/:id/:tab"),
    ]);
    let pool = pool();

    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/users/me/posts");
    assert_eq!(pattern.as_deref(), Some("/users/me/:tab"));
    assert_eq!(bindings, vec![("tab".to_string(), "posts".to_string())]);

    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/users/42/posts");
    assert_eq!(pattern.as_deref(), Some("/users/:id/:tab"));
    assert_eq!(
        bindings,
        vec![
            ("id".to_string(), "42".to_string()),
            ("tab".to_string(), "posts".to_string()),
        ]
    );
}

#[test]
fn test_static_edge_is_not_retried_as_param() {
    let trie = build(&[
        (Method::GET, "/users/me/:tab/edit"),
        (Method::GET, "/users/:id/posts"),
    ]);
    let pool = pool();

    // "me" commits the descent to the static edge; "/users/:id/posts" is not tried.
    assert_eq!(resolve(&trie, &pool, Method::GET, "/users/me/posts").0, None);
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/users/you/posts").0.as_deref(),
        Some("/users/:id/posts")
    );
}

#[test]
fn test_catch_all_boundary_depths() {
    let trie = build(&[(Method::GET, "/files/*")]);
    let pool = pool();

    // depth 0: nothing after the prefix
    assert_eq!(resolve(&trie, &pool, Method::GET, "/files").0, None);
    // depth 1: last segment lands on the catch-all
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/files/a").0.as_deref(),
        Some("/files/*")
    );
    // depth 2+: the childless catch-all absorbs the remainder
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/files/a/b").0.as_deref(),
        Some("/files/*")
    );
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/files/a/b/c.txt").0.as_deref(),
        Some("/files/*")
    );
}

#[test]
fn test_catch_all_binds_nothing() {
    let trie = build(&[(Method::GET, "/files/*filepath")]);
    let pool = pool();

    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/files/a/b");
    assert_eq!(pattern.as_deref(), Some("/files/*filepath"));
    assert!(bindings.is_empty());
}

#[test]
fn test_closest_enclosing_catch_all_wins() {
    let trie = build(&[
        (Method::GET, "/a/:id"),
        (Method::GET, "/a/*"),
        (Method::GET, "/a/:id/x/*"),
        (Method::GET, "/a/:id/x/*/deep"),
    ]);
    let pool = pool();

    // Param child shadows the sibling catch-all on a direct hit.
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/a/1").0.as_deref(),
        Some("/a/:id")
    );
    // Dead end right below "/a/:id": only "/a/*" was recorded.
    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/a/1/q/r");
    assert_eq!(pattern.as_deref(), Some("/a/*"));
    assert_eq!(bindings, vec![("id".to_string(), "1".to_string())]);
    // Dead end below the nested catch-all: it is closer than "/a/*".
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/a/1/x/z/other").0.as_deref(),
        Some("/a/:id/x/*")
    );
    // The continuation below the nested catch-all still matches exactly.
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/a/1/x/z/deep").0.as_deref(),
        Some("/a/:id/x/*/deep")
    );
}

#[test]
fn test_root_catch_all() {
    let trie = build(&[(Method::GET, "/*")]);
    let pool = pool();

    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/anything").0.as_deref(),
        Some("/*")
    );
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/any/deep/path").0.as_deref(),
        Some("/*")
    );
    assert_eq!(resolve(&trie, &pool, Method::GET, "/").0, None);
}

#[test]
fn test_trailing_slash_on_last_segment() {
    let trie = build(&[(Method::GET, "/users/:id")]);
    let pool = pool();

    let (pattern, bindings) = resolve(&trie, &pool, Method::GET, "/users/42/");
    assert_eq!(pattern.as_deref(), Some("/users/:id"));
    assert_eq!(bindings, vec![("id".to_string(), "42".to_string())]);
}

#[test]
fn test_methods_are_independent() {
    let trie = build(&[
        (Method::GET, "/items/:id"),
        (Method::POST, "/items"),
    ]);
    let pool = pool();

    assert!(resolve(&trie, &pool, Method::GET, "/items/1").0.is_some());
    assert!(resolve(&trie, &pool, Method::POST, "/items/1").0.is_none());
    assert!(resolve(&trie, &pool, Method::GET, "/items").0.is_none());
    assert!(resolve(&trie, &pool, Method::PUT, "/items").0.is_none());
}

#[test]
fn test_miss_still_returns_bound_context() {
    let trie = build(&[(Method::GET, "/users/:id/posts")]);
    let pool = pool();

    let (endpoint, params) = trie.lookup(&Method::GET, "/users/9/comments", &pool);
    assert!(endpoint.is_none());
    let params = params.expect("segment was bound before the dead end");
    assert_eq!(params.get("id"), Some("9"));
    pool.release(params);
}

#[test]
fn test_path_without_leading_separator_misses() {
    let trie = build(&[(Method::GET, "/users/:id")]);
    let pool = pool();
    assert_eq!(resolve(&trie, &pool, Method::GET, "users/1").0, None);
}

#[test]
fn test_malformed_pattern_leaves_trie_untouched() {
    let mut trie = build(&[(Method::GET, "/users/:id")]);
    let err = trie
        .insert(Method::GET, "/users/a:id/posts", tagged("bad"), Vec::new())
        .unwrap_err();
    assert!(matches!(err, SetupError::MarkerNotLeading { .. }));
    assert_eq!(trie.routes().len(), 1);

    let pool = pool();
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/users/a").0.as_deref(),
        Some("/users/:id")
    );
    assert_eq!(resolve(&trie, &pool, Method::GET, "/users/a/posts").0, None);
}

#[test]
fn test_pattern_is_normalized() {
    let trie = build(&[(Method::GET, "health"), (Method::GET, "users/:id")]);
    let pool = pool();

    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/health").0.as_deref(),
        Some("/health")
    );
    assert_eq!(
        resolve(&trie, &pool, Method::GET, "/users/3").0.as_deref(),
        Some("/users/:id")
    );
}
