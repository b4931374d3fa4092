#![allow(dead_code)]

pub mod fixtures {
    use brrtmux::prelude::*;
    use http::Method;

    /// Build a request with an empty body.
    pub fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Vec::new())
            .unwrap()
    }

    /// Dispatch `method path` through `mux` and return the written response.
    pub fn send<H: Handler>(mux: &H, method: Method, path: &str) -> Response {
        let mut req = request(method, path);
        let mut res = Response::new(Vec::new());
        mux.serve(&mut res, &mut req);
        res
    }

    /// Response body as UTF-8.
    pub fn body(res: &Response) -> String {
        String::from_utf8(res.body().clone()).unwrap()
    }

    /// Handler writing `tag` as the body.
    pub fn tagged(tag: &'static str) -> impl Handler {
        move |res: &mut Response, _req: &mut Request| {
            *res.body_mut() = tag.as_bytes().to_vec();
        }
    }

    /// Handler echoing the bound parameters as `name=value` pairs joined by `&`.
    pub fn echo_params(res: &mut Response, req: &mut Request) {
        let pairs: Vec<String> = req
            .params()
            .map(|p| p.iter().map(|(k, v)| format!("{k}={v}")).collect())
            .unwrap_or_default();
        *res.body_mut() = pairs.join("&").into_bytes();
    }
}

pub mod test_tracing {
    use tracing::subscriber::DefaultGuard;

    /// Thread-local subscriber writing through the test harness capture.
    pub struct TestTracing {
        _guard: DefaultGuard,
    }

    impl TestTracing {
        pub fn init() -> Self {
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_test_writer()
                .finish();
            Self {
                _guard: tracing::subscriber::set_default(subscriber),
            }
        }
    }
}

pub mod test_runtime {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000).set_workers(4);
        });
    }
}
