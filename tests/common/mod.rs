#![allow(dead_code)]

pub mod http_helpers {
    use http::Method;
    use regexmux::{Request, Response};

    /// Build a request with an empty body.
    pub fn request(method: Method, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Vec::new())
            .unwrap()
    }

    pub fn get(uri: &str) -> Request {
        request(Method::GET, uri)
    }

    /// Response body as UTF-8 text.
    pub fn body_str(res: &Response) -> &str {
        std::str::from_utf8(res.body()).unwrap()
    }

    /// Value of a response header, if present and textual.
    pub fn header<'a>(res: &'a Response, name: &str) -> Option<&'a str> {
        res.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

pub mod handlers {
    use http::StatusCode;
    use regexmux::{params, response, Request, Response};

    /// Answers `<label>` followed by the bound parameters in pattern order,
    /// e.g. `user id=7`.
    pub fn echo(label: &'static str) -> impl Fn(&Request) -> Response + Send + Sync + 'static {
        move |req: &Request| {
            let mut body = label.to_string();
            if let Some(p) = params(req) {
                for (name, value) in p.iter() {
                    body.push_str(&format!(" {name}={value}"));
                }
            }
            response::text(StatusCode::OK, body)
        }
    }
}

pub mod test_tracing {
    use std::sync::Once;

    static TRACING_INIT: Once = Once::new();

    /// Install a test writer subscriber once per test binary so router logs
    /// show up with `--nocapture`.
    pub fn init() {
        TRACING_INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("regexmux=debug")
                .with_test_writer()
                .try_init();
        });
    }
}
