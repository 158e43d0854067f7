//! Requests signed by the AWS SDK signer, checked by the shim's verifier.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::SystemTime;

    use aws_credential_types::Credentials;
    use aws_sigv4::http_request::{
        SignableBody, SignableRequest, SigningParams, SigningSettings, sign,
    };
    use aws_sigv4::sign::v4;
    use aws_smithy_runtime_api::client::identity::Identity;
    use tritonshim_auth::{AuthError, MemoryAuditSink, RequestOrigin, SigV4Verifier};
    use tritonshim_triton::model::{Package, Vm};

    use crate::{ACCESS_KEY_ID, FakeCompute, SECRET_ACCESS_KEY, TestServer, client, test_key};

    /// Build a request and sign it with `aws-sigv4`.
    fn aws_signed(method: &str, url: &str, body: &str) -> http::Request<String> {
        let mut builder = http::Request::builder().method(method).uri(url);
        if !body.is_empty() {
            builder = builder.header(
                "content-type",
                "application/x-www-form-urlencoded; charset=utf-8",
            );
        }
        let mut req = builder.body(body.to_owned()).unwrap();

        let identity: Identity =
            Credentials::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY, None, None, "interop").into();
        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region("us-east-1")
            .name("ec2")
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .unwrap()
            .into();

        let uri = req.uri().to_string();
        let headers: Vec<(String, String)> = req
            .headers()
            .iter()
            .map(|(n, v)| (n.as_str().to_owned(), v.to_str().unwrap().to_owned()))
            .collect();
        let signable = SignableRequest::new(
            req.method().as_str(),
            &uri,
            headers.iter().map(|(n, v)| (n.as_str(), v.as_str())),
            SignableBody::Bytes(req.body().as_bytes()),
        )
        .unwrap();
        let (instructions, _signature) = sign(signable, &params).unwrap().into_parts();
        instructions.apply_to_request_http1x(&mut req);
        req
    }

    fn verify(req: http::Request<String>) -> Result<(), AuthError> {
        let verifier = SigV4Verifier::new(Arc::new(MemoryAuditSink::new()));
        let (parts, body) = req.into_parts();
        let origin = RequestOrigin {
            request_id: "interop",
            source: None,
        };
        verifier
            .verify(&parts, body.as_bytes(), &[test_key()], &origin)
            .map(|_| ())
    }

    #[test]
    fn test_should_accept_aws_signed_get() {
        let req = aws_signed(
            "GET",
            "http://ec2.test/?Action=DescribeInstances&Version=2016-11-15",
            "",
        );
        assert!(verify(req).is_ok());
    }

    #[test]
    fn test_should_accept_aws_signed_get_with_encoded_filter_values() {
        let req = aws_signed(
            "GET",
            "http://ec2.test/?Action=DescribeInstances&Version=2016-11-15\
             &Filter.1.Name=tag%3AName&Filter.1.Value.1=a%20b%2Bc%3A%2A",
            "",
        );
        assert!(verify(req).is_ok());
    }

    #[test]
    fn test_should_accept_aws_signed_form_post() {
        let req = aws_signed(
            "POST",
            "http://ec2.test/",
            "Action=DescribeImages&Version=2016-11-15&Owner.1=self&ImageId.1=img%2F1",
        );
        assert!(verify(req).is_ok());
    }

    #[test]
    fn test_should_reject_aws_signed_post_with_altered_body() {
        let req = aws_signed("POST", "http://ec2.test/", "Action=DescribeImages");
        let (parts, _) = req.into_parts();
        let altered = http::Request::from_parts(parts, "Action=DescribeInstances".to_owned());
        assert!(matches!(verify(altered), Err(AuthError::SignatureMismatch)));
    }

    async fn send(req: http::Request<String>) -> reqwest::Response {
        let (parts, body) = req.into_parts();
        client()
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_should_serve_aws_signed_requests_end_to_end() {
        let server = TestServer::start(FakeCompute {
            vms: vec![Vm {
                uuid: "vm-1".to_owned(),
                state: "running".to_owned(),
                ..Vm::default()
            }],
            packages: vec![Package {
                name: "g4-highcpu-1G".to_owned(),
                memory: 1024,
                ..Package::default()
            }],
            ..FakeCompute::default()
        })
        .await;

        let get = aws_signed(
            "GET",
            &server.url("/?Action=DescribeInstances&InstanceId.1=vm-1"),
            "",
        );
        let resp = send(get).await;
        assert_eq!(resp.status(), 200);
        assert!(resp.text().await.unwrap().contains("<instanceId>vm-1</instanceId>"));

        let post = aws_signed(
            "POST",
            &server.url("/"),
            "Action=DescribeInstanceTypes&InstanceType.1=g4-highcpu-1G",
        );
        let resp = send(post).await;
        assert_eq!(resp.status(), 200);
        assert!(
            resp.text()
                .await
                .unwrap()
                .contains("<instanceType>g4-highcpu-1G</instanceType>")
        );

        assert!(server.audit_events().is_empty());
    }
}
