//! Routing and protocol-level integration tests.

#[cfg(test)]
mod tests {
    use crate::{FakeCompute, TestServer, client, send_signed};

    #[tokio::test]
    async fn test_should_answer_ping() {
        let server = TestServer::start(FakeCompute::default()).await;

        let resp = client().get(server.url("/ping")).send().await.unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["server"], "TritonShim");
        assert_eq!(resp.text().await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn test_should_reject_missing_action() {
        let server = TestServer::start(FakeCompute::default()).await;

        let resp = client().get(server.url("/")).send().await.unwrap();

        assert_eq!(resp.status(), 406);
        assert!(resp.headers().contains_key("x-amzn-requestid"));
        let body = resp.text().await.unwrap();
        assert!(body.contains("<Code>MissingAction</Code>"));
        assert!(body.contains("Action parameter must be provided"));
        assert!(server.audit_events().is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_action() {
        let server = TestServer::start(FakeCompute::default()).await;

        let resp = client()
            .get(server.url("/?Action=DescribeRegions"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 405);
        let body = resp.text().await.unwrap();
        assert!(body.contains("<Code>InvalidAction</Code>"));
        assert!(body.contains("DescribeRegions"));
    }

    #[tokio::test]
    async fn test_should_echo_request_id_in_error_body() {
        let server = TestServer::start(FakeCompute::default()).await;

        let resp = client().get(server.url("/")).send().await.unwrap();
        let request_id = resp.headers()["x-amzn-requestid"]
            .to_str()
            .unwrap()
            .to_owned();
        let body = resp.text().await.unwrap();

        assert!(body.contains(&format!("<RequestId>{request_id}</RequestId>")));
    }

    #[tokio::test]
    async fn test_should_reject_methods_other_than_get_and_post() {
        let server = TestServer::start(FakeCompute::default()).await;
        let url = server.url("/?Action=DescribeInstances");

        for method in [reqwest::Method::PUT, reqwest::Method::DELETE, reqwest::Method::PATCH] {
            let resp = client().request(method.clone(), &url).send().await.unwrap();
            assert_eq!(resp.status(), 405, "{method}");
            assert!(
                resp.text()
                    .await
                    .unwrap()
                    .contains("<Code>UnsupportedHttpVerb</Code>")
            );
        }
        assert!(server.audit_events().is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_requests_off_the_service_root() {
        let server = TestServer::start(FakeCompute::default()).await;

        let resp = send_signed(
            "GET",
            &server.url("/some/other/path?Action=DescribeInstances"),
            "",
        )
        .await;

        assert_eq!(resp.status(), 404);
        assert!(resp.text().await.unwrap().contains("<Code>UnknownPath</Code>"));
        assert!(server.audit_events().is_empty());
    }
}
