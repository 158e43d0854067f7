//! Authentication integration tests.

#[cfg(test)]
mod tests {
    use tritonshim_auth::AccessKey;

    use crate::{FakeCompute, TestServer, client, signed_headers, test_key};

    fn one_vm() -> FakeCompute {
        FakeCompute {
            vms: vec![tritonshim_triton::model::Vm {
                uuid: "vm-secret".to_owned(),
                state: "running".to_owned(),
                ..Default::default()
            }],
            ..FakeCompute::default()
        }
    }

    #[tokio::test]
    async fn test_should_reject_tampered_signature_without_leaking_data() {
        let server = TestServer::start(one_vm()).await;
        let url = server.url("/");
        let body = "Action=DescribeInstances";

        let mut headers = signed_headers("POST", &url, body, &test_key(), &[]);
        let auth = headers["authorization"].to_str().unwrap().to_owned();
        let last = if auth.ends_with('0') { '1' } else { '0' };
        let tampered = format!("{}{last}", &auth[..auth.len() - 1]);
        headers.insert("authorization", tampered.parse().unwrap());

        let resp = client()
            .post(&url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 401);
        let text = resp.text().await.unwrap();
        assert!(text.contains("<Code>SignatureDoesNotMatch</Code>"));
        assert!(!text.contains("vm-secret"));

        let events = server.audit_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, "SignatureMismatch");
        assert_eq!(
            events[0].source.map(|addr| addr.ip().to_string()).as_deref(),
            Some("127.0.0.1")
        );
    }

    #[tokio::test]
    async fn test_should_reject_unsigned_request() {
        let server = TestServer::start(one_vm()).await;

        let resp = client()
            .get(server.url("/?Action=DescribeInstances"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 401);
        let text = resp.text().await.unwrap();
        assert!(text.contains("<Code>MissingAuthenticationToken</Code>"));
        assert!(!text.contains("vm-secret"));
        assert_eq!(server.audit_events()[0].reason, "MissingAuthentication");
    }

    #[tokio::test]
    async fn test_should_reject_unknown_access_key() {
        let server = TestServer::start(one_vm()).await;
        let url = server.url("/?Action=DescribeInstances");
        let stranger = AccessKey::new("AKIDSTRANGER", "not-the-secret");

        let resp = client()
            .get(&url)
            .headers(signed_headers("GET", &url, "", &stranger, &[]))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 401);
        assert!(
            resp.text()
                .await
                .unwrap()
                .contains("<Code>InvalidClientTokenId</Code>")
        );
        let events = server.audit_events();
        assert_eq!(events[0].access_key_id.as_deref(), Some("AKIDSTRANGER"));
    }

    #[tokio::test]
    async fn test_should_reject_signed_header_mutated_after_signing() {
        let server = TestServer::start(one_vm()).await;
        let url = server.url("/?Action=DescribeInstances");

        let mut headers =
            signed_headers("GET", &url, "", &test_key(), &[("x-amz-security-token", "a")]);
        headers.insert("x-amz-security-token", "b".parse().unwrap());

        let resp = client().get(&url).headers(headers).send().await.unwrap();

        assert_eq!(resp.status(), 401);
        assert!(
            resp.text()
                .await
                .unwrap()
                .contains("<Code>SignatureDoesNotMatch</Code>")
        );
    }

    #[tokio::test]
    async fn test_should_ignore_unsigned_extra_headers() {
        let server = TestServer::start(one_vm()).await;
        let url = server.url("/?Action=DescribeInstances");

        let resp = client()
            .get(&url)
            .headers(signed_headers("GET", &url, "", &test_key(), &[]))
            .header("x-forwarded-for", "203.0.113.9")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert!(resp.text().await.unwrap().contains("vm-secret"));
    }
}
