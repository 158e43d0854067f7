//! Describe action integration tests.

#[cfg(test)]
mod tests {
    use tritonshim_triton::model::{Image, Nic, Package, Vm};

    use crate::{FakeCompute, TENANT, TestServer, send_signed};

    fn vm(uuid: &str, state: &str) -> Vm {
        Vm {
            uuid: uuid.to_owned(),
            state: state.to_owned(),
            image: "img-base".to_owned(),
            package: "g4-highcpu-1G".to_owned(),
            owner: TENANT.to_owned(),
            nics: vec![Nic {
                ip: "10.88.0.12".to_owned(),
                primary: true,
                ..Nic::default()
            }],
            tags: [("role".to_owned(), serde_json::json!("web"))]
                .into_iter()
                .collect(),
            ..Vm::default()
        }
    }

    #[tokio::test]
    async fn test_should_describe_zero_instances() {
        let server = TestServer::start(FakeCompute::default()).await;

        let resp = send_signed("GET", &server.url("/?Action=DescribeInstances"), "").await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["content-type"],
            "text/xml;charset=UTF-8"
        );
        let body = resp.text().await.unwrap();
        assert!(body.contains("<DescribeInstancesResponse"));
        assert!(body.contains("<requestId>"));
        assert!(!body.contains("reservationSet"));
        assert!(server.audit_events().is_empty());
    }

    #[tokio::test]
    async fn test_should_describe_instances_in_one_reservation() {
        let server = TestServer::start(FakeCompute {
            vms: vec![vm("vm-1", "running"), vm("vm-2", "provisioning")],
            ..FakeCompute::default()
        })
        .await;

        let resp = send_signed(
            "GET",
            &server.url("/?Action=DescribeInstances&InstanceId.1=vm-1"),
            "",
        )
        .await;

        assert_eq!(resp.status(), 200);
        let body = resp.text().await.unwrap();
        assert_eq!(body.matches("<reservationId>").count(), 1);
        assert!(body.contains(&format!("<ownerId>{TENANT}</ownerId>")));
        assert!(body.contains("<instanceId>vm-1</instanceId>"));
        assert!(!body.contains("vm-2"));
        assert!(body.contains("<code>16</code><name>running</name>"));
        assert!(body.contains("<privateIpAddress>10.88.0.12</privateIpAddress>"));
        assert!(body.contains("<key>role</key><value>web</value>"));
    }

    #[tokio::test]
    async fn test_should_describe_own_images() {
        let server = TestServer::start(FakeCompute {
            images: vec![
                Image {
                    id: "img-mine".to_owned(),
                    name: "base-64".to_owned(),
                    owner: TENANT.to_owned(),
                    state: "active".to_owned(),
                    ..Image::default()
                },
                Image {
                    id: "img-public".to_owned(),
                    owner: "5a5ff2a8-f4e1-4a3e-a3ec-4a44ad7d8c1b".to_owned(),
                    public: true,
                    state: "disabled".to_owned(),
                    ..Image::default()
                },
            ],
            ..FakeCompute::default()
        })
        .await;

        let resp = send_signed(
            "GET",
            &server.url("/?Action=DescribeImages&Owner.1=self"),
            "",
        )
        .await;

        assert_eq!(resp.status(), 200);
        let body = resp.text().await.unwrap();
        assert!(body.contains("<DescribeImagesResponse"));
        assert!(body.contains("<imageId>img-mine</imageId>"));
        assert!(body.contains("<imageState>available</imageState>"));
        assert!(!body.contains("img-public"));
    }

    #[tokio::test]
    async fn test_should_describe_instance_types_over_post() {
        let server = TestServer::start(FakeCompute {
            packages: vec![
                Package {
                    name: "g4-highcpu-1G".to_owned(),
                    memory: 1024,
                    quota: 25_600,
                    vcpus: 1,
                    ..Package::default()
                },
                Package {
                    name: "g4-highcpu-2G".to_owned(),
                    memory: 2048,
                    ..Package::default()
                },
            ],
            ..FakeCompute::default()
        })
        .await;

        let resp = send_signed(
            "POST",
            &server.url("/"),
            "Action=DescribeInstanceTypes&InstanceType.1=g4-highcpu-1G",
        )
        .await;

        assert_eq!(resp.status(), 200);
        let body = resp.text().await.unwrap();
        assert!(body.contains("<instanceType>g4-highcpu-1G</instanceType>"));
        assert!(body.contains("<sizeInMiB>1024</sizeInMiB>"));
        assert!(!body.contains("g4-highcpu-2G"));
    }

    #[tokio::test]
    async fn test_should_reject_malformed_list_index() {
        let server = TestServer::start(FakeCompute::default()).await;

        let resp = send_signed(
            "GET",
            &server.url("/?Action=DescribeInstances&InstanceId.0=vm-1"),
            "",
        )
        .await;

        assert_eq!(resp.status(), 400);
        let body = resp.text().await.unwrap();
        assert!(body.contains("<Code>InvalidParameterValue</Code>"));
    }
}
