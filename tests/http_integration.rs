//! Integration tests for the REST providers using wiremock
//!
//! Every service is served from one mock server through
//! `GcpClient::with_base_url`, so these exercise URL building, auth
//! headers, pagination and response flattening end to end.

use gcpfind::gcp::auth::GcpCredentials;
use gcpfind::gcp::client::GcpClient;
use gcpfind::gcp::projects::list_project_ids;
use gcpfind::resource::{build_providers, RestProvider};
use gcpfind::search::{Engine, Provider, Query, ResourceKind, SearchContext};
use serde_json::json;
use std::sync::Arc;
use tokio_test::assert_ok;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn client_for(server: &MockServer) -> GcpClient {
    GcpClient::with_base_url(GcpCredentials::fixed(TOKEN), &server.uri()).unwrap()
}

fn provider(kind: ResourceKind, server: &MockServer) -> RestProvider {
    RestProvider::new(kind, client_for(server)).unwrap()
}

mod http_client_tests {
    use super::*;

    /// Non-2xx responses surface the status and the API message
    #[tokio::test]
    async fn test_error_includes_status_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/p/global/networks"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "The resource 'projects/p' was not found"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = format!("{}/compute/v1/projects/p/global/networks", server.uri());
        let err = client.get(&url).await.unwrap_err().to_string();

        assert!(err.starts_with("API request failed: 404"));
        assert!(err.contains("was not found"));
    }

    /// Empty 2xx bodies are treated as JSON null
    #[tokio::test]
    async fn test_empty_body_is_null() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value = assert_ok!(client.get(&format!("{}/empty", server.uri())).await);
        assert!(value.is_null());
    }
}

mod provider_tests {
    use super::*;

    #[tokio::test]
    async fn test_aggregated_instances_are_flattened_and_filtered() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-a/aggregated/instances"))
            .and(query_param("returnPartialSuccess", "true"))
            .and(bearer_token(TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": {
                    "zones/us-central1-a": {
                        "instances": [
                            {
                                "name": "piou",
                                "status": "RUNNING",
                                "zone": "https://www.googleapis.com/compute/v1/projects/proj-a/zones/us-central1-a",
                                "machineType": "https://www.googleapis.com/compute/v1/projects/proj-a/zones/us-central1-a/machineTypes/e2-small",
                                "networkInterfaces": [{"networkIP": "10.0.0.2"}]
                            },
                            {"name": "web-1", "zone": "zones/us-central1-a"}
                        ]
                    },
                    "zones/europe-west1-b": {
                        "warning": {"code": "NO_RESULTS_ON_PAGE"}
                    },
                    "zones/asia-east1-a": {
                        "instances": [{"name": "PIOU-batch", "zone": "zones/asia-east1-a"}]
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(ResourceKind::Instance, &server);
        let mut results = provider
            .fetch(&SearchContext::new(), "proj-a", "piou")
            .await
            .unwrap();
        results.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "PIOU-batch");
        assert_eq!(results[0].location, "asia-east1-a");
        assert_eq!(results[1].name, "piou");
        assert_eq!(results[1].project, "proj-a");
        assert_eq!(results[1].location, "us-central1-a");
        assert_eq!(results[1].details["status"], "RUNNING");
        assert_eq!(results[1].details["machineType"], "e2-small");
        assert_eq!(results[1].details["internalIP"], "10.0.0.2");
        assert!(!results[1].details.contains_key("externalIP"));
    }

    #[tokio::test]
    async fn test_pagination_follows_next_page_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-a/global/networks"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "vpc-shared"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-a/global/networks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "default"}, {"name": "vpc-main"}],
                "nextPageToken": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(ResourceKind::Network, &server);
        let results = provider
            .fetch(&SearchContext::new(), "proj-a", "vpc")
            .await
            .unwrap();

        let mut names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["vpc-main", "vpc-shared"]);
        assert!(results.iter().all(|r| r.location.is_empty()));
    }

    #[tokio::test]
    async fn test_repeated_page_token_stops_the_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-a/global/firewalls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "allow-ssh"}],
                "nextPageToken": "stuck"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(ResourceKind::Firewall, &server);
        let err = provider
            .fetch(&SearchContext::new(), "proj-a", "ssh")
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("same page token"));
    }

    #[tokio::test]
    async fn test_buckets_are_listed_by_project_parameter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .and(query_param("project", "proj-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"name": "proj-a-assets", "location": "EU", "storageClass": "STANDARD"},
                    {"name": "logs", "location": "US"}
                ]
            })))
            .mount(&server)
            .await;

        let provider = provider(ResourceKind::Bucket, &server);
        let results = provider
            .fetch(&SearchContext::new(), "proj-a", "ASSETS")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "proj-a-assets");
        assert_eq!(results[0].location, "EU");
        assert_eq!(results[0].details["storageClass"], "STANDARD");
    }

    #[tokio::test]
    async fn test_node_pools_carry_their_cluster() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/container/v1/projects/proj-a/locations/-/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clusters": [
                    {
                        "name": "prod",
                        "location": "europe-west1",
                        "nodePools": [
                            {"name": "default-pool", "config": {"machineType": "e2-medium"}, "initialNodeCount": 3},
                            {"name": "gpu-pool"}
                        ]
                    },
                    {"name": "staging", "location": "us-east1"}
                ]
            })))
            .mount(&server)
            .await;

        let provider = provider(ResourceKind::GkeNodePool, &server);
        let results = provider
            .fetch(&SearchContext::new(), "proj-a", "pool")
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        let default_pool = results.iter().find(|r| r.name == "default-pool").unwrap();
        assert_eq!(default_pool.location, "europe-west1");
        assert_eq!(default_pool.details["cluster"], "prod");
        assert_eq!(default_pool.details["machineType"], "e2-medium");
        assert_eq!(default_pool.details["nodeCount"], "3");
    }

    #[tokio::test]
    async fn test_api_error_is_reported_with_kind_context() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/secretmanager/v1/projects/proj-a/secrets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "Secret Manager API has not been used in project proj-a"}
            })))
            .mount(&server)
            .await;

        let provider = provider(ResourceKind::Secret, &server);
        let err = provider
            .fetch(&SearchContext::new(), "proj-a", "x")
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains(ResourceKind::Secret.display_name()));
        assert!(message.contains("403"));
    }
}

mod engine_tests {
    use super::*;

    /// One failing API turns into a warning while the others still answer
    #[tokio::test]
    async fn test_forbidden_provider_becomes_warning() {
        let server = MockServer::start().await;

        for project in ["proj-a", "proj-b"] {
            Mock::given(method("GET"))
                .and(path(format!("/compute/v1/projects/{}/aggregated/instances", project)))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "items": {
                        "zones/us-central1-a": {
                            "instances": [{"name": format!("piou-{}", project), "zone": "zones/us-central1-a"}]
                        }
                    }
                })))
                .mount(&server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .and(query_param("project", "proj-b"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "caller does not have storage.buckets.list access"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .and(query_param("project", "proj-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "piou-bucket", "location": "US"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let engine = Engine::new(vec![
            Arc::new(RestProvider::new(ResourceKind::Instance, client.clone()).unwrap()) as Arc<dyn Provider>,
            Arc::new(RestProvider::new(ResourceKind::Bucket, client).unwrap()),
        ])
        .unwrap();

        let projects = vec!["proj-a".to_string(), "proj-b".to_string()];
        let output = engine
            .search_with_warnings(&SearchContext::new(), &projects, &Query::all("piou"))
            .await
            .unwrap();

        let found: Vec<(&str, &str, &str)> = output
            .results
            .iter()
            .map(|r| (r.kind_tag(), r.project.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("compute.instance", "proj-a", "piou-proj-a"),
                ("compute.instance", "proj-b", "piou-proj-b"),
                ("storage.bucket", "proj-a", "piou-bucket"),
            ]
        );
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].provider, ResourceKind::Bucket);
        assert_eq!(output.warnings[0].project, "proj-b");
    }

    /// Every registry kind gets a provider and an unmocked server yields only warnings
    #[tokio::test]
    async fn test_full_registry_against_empty_server() {
        let server = MockServer::start().await;
        let engine = Engine::new(build_providers(&client_for(&server)).unwrap()).unwrap();
        assert_eq!(engine.kinds().count(), ResourceKind::all().len());

        let output = engine
            .search_with_warnings(&SearchContext::new(), &["proj-a".to_string()], &Query::all("x"))
            .await
            .unwrap();

        assert!(output.results.is_empty());
        assert_eq!(output.units, ResourceKind::all().len());
        assert!(output.all_failed());
        assert!(output
            .warnings
            .iter()
            .all(|w| format!("{:#}", w.err).contains("404")));
    }
}

mod projects_tests {
    use super::*;

    #[tokio::test]
    async fn test_project_listing_skips_inactive_and_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resourcemanager/v1/projects"))
            .and(query_param("pageToken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [{"projectId": "alpha", "lifecycleState": "ACTIVE"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/resourcemanager/v1/projects"))
            .and(bearer_token(TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [
                    {"projectId": "zulu", "lifecycleState": "ACTIVE"},
                    {"projectId": "going-away", "lifecycleState": "DELETE_REQUESTED"},
                    {"projectId": "alpha", "lifecycleState": "ACTIVE"}
                ],
                "nextPageToken": "next"
            })))
            .mount(&server)
            .await;

        let ids = list_project_ids(&client_for(&server)).await.unwrap();
        assert_eq!(ids, vec!["alpha", "zulu"]);
    }

    #[tokio::test]
    async fn test_project_listing_rejects_repeated_page_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resourcemanager/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [{"projectId": "alpha-one", "lifecycleState": "ACTIVE"}],
                "nextPageToken": "again"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let err = list_project_ids(&client_for(&server)).await.unwrap_err();
        assert!(format!("{:#}", err).contains("same page token"));
    }
}
