//! The resilient client against a real listener serving the bundled seed data.

use career_compass::chat::{ChatResponder, GREETING_REPLY};
use career_compass::clients::{ApiClient, ClientError, ServerStatus};
use career_compass::config::{ClientConfig, Config};
use career_compass::http::{AppState, build_router};
use career_compass::query::ListParams;
use career_compass::quiz::{Answer, AssessmentRequest};
use career_compass::seed::SeedData;
use career_compass::store::MemoryStore;
use std::path::Path;
use std::sync::Arc;

struct NoSearch;

#[async_trait::async_trait]
impl ChatResponder for NoSearch {
    async fn query(&self, _message: &str) -> anyhow::Result<String> {
        anyhow::bail!("search disabled in tests")
    }
}

async fn serve_seed() -> String {
    let seed = SeedData::load_dir(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data")).unwrap();
    let app = build_router(AppState {
        store: Arc::new(MemoryStore::new(seed)),
        chat: Arc::new(NoSearch),
        config: Arc::new(Config::default()),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client_for(base_url: String) -> ApiClient {
    ApiClient::new(&ClientConfig {
        base_url,
        ..ClientConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn typed_calls_against_live_server() {
    let api = client_for(serve_seed().await);
    let mut status = api.signals().subscribe();

    let page = api
        .careers(&ListParams::default().with_page(1).with_limit(5))
        .await
        .unwrap();
    assert_eq!(page.careers.len(), 5);
    assert_eq!(page.total_pages, page.total.div_ceil(5));
    assert_eq!(status.recv().await.unwrap(), ServerStatus::Ready);

    let first = page.careers[0].id;
    let career = api.career(first).await.unwrap().unwrap();
    assert!(career.sub_careers.is_some());
    assert!(api.career(987_654).await.unwrap().is_none());

    let exams = api
        .colleges(&ListParams::default().with_kind("Exam"))
        .await
        .unwrap();
    assert_eq!(exams.items.len(), exams.exams.len());
    assert!(exams.colleges.is_empty());

    let questions = api.questions().await.unwrap();
    assert!(!questions.is_empty());
    assert!(!api.roadmaps().await.unwrap().is_empty());

    let answers = questions
        .iter()
        .map(|q| Answer {
            question_id: q.id,
            yes: true,
        })
        .collect();
    let result = api.assess(&AssessmentRequest { answers }).await.unwrap();
    assert_eq!(result.top_types.len(), 3);

    assert_eq!(api.chat("hi").await.unwrap(), GREETING_REPLY);
}

#[tokio::test]
async fn bad_request_surfaces_without_retry() {
    let api = client_for(serve_seed().await);
    let err = api.chat("").await.unwrap_err();
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Please provide a message.");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
