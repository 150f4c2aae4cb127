use std::io::Write;

use gitlab_common::{
    Error, GitConfig, GitlabClient, LocalRepo, Overrides, QueryParams, Settings, init_upstream,
};
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn git_available() -> bool {
    tokio::process::Command::new("git")
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

async fn origin_of(dir: &std::path::Path) -> Option<String> {
    let output = tokio::process::Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(dir)
        .output()
        .await
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

async fn projects_endpoint(body: &str) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/projects"))
        .and(query_param("apiKey", "KEY"))
        .and(query_param("name", "demo"))
        .respond_with(ResponseTemplate::new(201).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn configured_url_drives_the_request_and_local_repo() {
    if !git_available().await {
        return;
    }
    let mock_server = projects_endpoint(
        r#"{"id": 1, "ssh_url_to_repo": "git@gitlab.example.com:me/demo.git"}"#,
    )
    .await;

    let mut config = NamedTempFile::new().unwrap();
    write!(
        config,
        "[gitlab]\n\turl = {}/api/v3\n\tkey = KEY\n",
        mock_server.uri()
    )
    .unwrap();
    let git = GitConfig::new().with_file(config.path());

    let settings = Settings::resolve(Overrides::default(), &git).await.unwrap();
    let client = GitlabClient::new(settings).unwrap();
    let project = init_upstream(&client, "demo", &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(
        project.remote_url(),
        Some("git@gitlab.example.com:me/demo.git")
    );

    let tmp = TempDir::new().unwrap();
    let repo = LocalRepo::new(tmp.path().join("demo"));
    repo.init().await.unwrap();
    repo.add_origin(project.remote_url().unwrap()).await.unwrap();
    assert_eq!(
        origin_of(repo.directory()).await.as_deref(),
        Some("git@gitlab.example.com:me/demo.git")
    );
}

#[tokio::test]
async fn overrides_beat_git_config_and_non_json_bodies_are_tolerated() {
    let mock_server = projects_endpoint("created").await;

    let git = GitConfig::new().with_program("definitely-not-a-real-git-binary");
    let overrides = Overrides {
        base_url: Some(format!("{}/api/v3/", mock_server.uri())),
        api_key: Some("KEY".to_string()),
        timeout: None,
    };

    let settings = Settings::resolve(overrides, &git).await.unwrap();
    let client = GitlabClient::new(settings).unwrap();
    let project = init_upstream(&client, "demo", &QueryParams::new().with("name", "ignored"))
        .await
        .unwrap();
    assert_eq!(project.remote_url(), None);
}

#[tokio::test]
async fn server_errors_propagate() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let git = GitConfig::new().with_program("definitely-not-a-real-git-binary");
    let overrides = Overrides {
        base_url: Some(mock_server.uri()),
        api_key: Some("KEY".to_string()),
        timeout: None,
    };
    let settings = Settings::resolve(overrides, &git).await.unwrap();
    let client = GitlabClient::new(settings).unwrap();

    let err = init_upstream(&client, "demo", &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { .. }));
}
