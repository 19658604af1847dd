use http::{Method, StatusCode};
use regex::Regex;
use regexmux::{
    DefaultParser, NodeId, ParsedPattern, PatternParser, Router, RouterConfig, RouterError,
    TrailingSlashPolicy,
};

mod common;
use common::handlers::echo;
use common::http_helpers::{body_str, get};

#[test]
fn test_pattern_compiles_to_fragment() {
    let parsed = DefaultParser::new().parse("/users/<id:\\d+>").unwrap();
    assert_eq!(
        parsed,
        ParsedPattern {
            regex: "/users/(\\d+)/?".to_string(),
            params: vec!["id".to_string()],
            has_trailing_slash: false,
        }
    );
}

#[test]
fn test_invalid_patterns_are_rejected() {
    let mut router = Router::new();
    for pattern in ["", "users", "*"] {
        assert!(
            matches!(
                router.get(pattern, echo("x")),
                Err(RouterError::InvalidPattern { .. })
            ),
            "{pattern:?} should be rejected"
        );
    }
}

#[test]
fn test_combined_matcher_resolution() {
    let mut router = Router::new();
    router.get("/users", echo("list")).unwrap();
    router.get("/users/<id:\\d+>", echo("show")).unwrap();
    router
        .get("/users/<id:\\d+>/posts/<title>", echo("post"))
        .unwrap();
    router.prepare().unwrap();

    assert_eq!(
        body_str(&router.dispatch(get("/users/22/posts/hello"))),
        "post id=22 title=hello"
    );
    assert_eq!(body_str(&router.dispatch(get("/users/11"))), "show id=11");
    assert_eq!(body_str(&router.dispatch(get("/users"))), "list");
    assert_eq!(
        router.dispatch(get("/users/abc")).status(),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_many_routes_with_mixed_params() {
    let mut router = Router::new();
    for i in 0..50 {
        router.get(&format!("/r{i}"), echo("static")).unwrap();
        router
            .get(&format!("/r{i}/<a>/<b>"), echo("pair"))
            .unwrap();
    }
    router.prepare().unwrap();

    assert_eq!(body_str(&router.dispatch(get("/r0"))), "static");
    assert_eq!(body_str(&router.dispatch(get("/r49/x/y"))), "pair a=x b=y");
    assert_eq!(body_str(&router.dispatch(get("/r17/p/q"))), "pair a=p b=q");
}

#[test]
fn test_prepare_reports_bad_sub_expressions() {
    let mut router = Router::new();
    router.get("/ok", echo("ok")).unwrap();
    router
        .group("v1")
        .unwrap()
        .post("/colors/<name:(red|blue)>", echo("color"))
        .unwrap();

    match router.prepare() {
        Err(RouterError::CaptureGroupMismatch {
            method, pattern, ..
        }) => {
            assert_eq!(method, Method::POST);
            assert_eq!(pattern, "/colors/<name:(red|blue)>");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => panic!("prepare should fail"),
    }
}

#[test]
fn test_reopen_node_by_id() {
    let mut router = Router::new();
    let admin = router.group("admin").unwrap().id();
    router.get("/", echo("root")).unwrap();
    router.node(admin).unwrap().get("/users", echo("admins")).unwrap();
    router.node(NodeId::ROOT).unwrap().get("/about", echo("about")).unwrap();
    router.prepare().unwrap();

    assert_eq!(body_str(&router.dispatch(get("/admin/users"))), "admins");
    assert_eq!(body_str(&router.dispatch(get("/about"))), "about");
}

#[test]
fn test_custom_parser_per_group() {
    let braces = Regex::new(r"\{([^/:}]+)(?::([^}]+))?\}").unwrap();

    let mut router = Router::new();
    router.get("/a/<x>", echo("angle")).unwrap();
    {
        let mut legacy = router.group("legacy").unwrap();
        legacy.set_parser(DefaultParser::with_regex(braces));
        legacy.get("/items/{id:\\d+}", echo("brace")).unwrap();
        legacy.group("deep").unwrap().get("/{slug}", echo("deep")).unwrap();
    }
    router.prepare().unwrap();

    assert_eq!(body_str(&router.dispatch(get("/a/1"))), "angle x=1");
    assert_eq!(body_str(&router.dispatch(get("/legacy/items/9"))), "brace id=9");
    assert_eq!(body_str(&router.dispatch(get("/legacy/deep/z"))), "deep slug=z");
}

#[test]
fn test_config_from_yaml() {
    let config = RouterConfig::from_yaml_str("trailing_slashes: append").unwrap();
    let mut router = Router::new().with_config(config);
    router.get("/users", echo("users")).unwrap();
    router.prepare().unwrap();

    assert_eq!(router.config().trailing_slashes, TrailingSlashPolicy::Append);
    assert_eq!(
        router.dispatch(get("/users")).status(),
        StatusCode::MOVED_PERMANENTLY
    );
}

#[test]
fn test_routes_listing() {
    let mut router = Router::new();
    router.get("/", echo("root")).unwrap();
    router.group("v2").unwrap().put("/users/<id>", echo("put")).unwrap();
    router.dump_routes();

    assert_eq!(
        router.routes(),
        vec![
            (Method::GET, "/".to_string()),
            (Method::PUT, "/v2/users/<id>".to_string()),
        ]
    );
}
