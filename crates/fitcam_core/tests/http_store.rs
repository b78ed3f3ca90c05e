use chrono::{DateTime, NaiveDate, Utc};
use fitcam_core::http_store::HttpSessionStore;
use fitcam_core::{
    ExerciseKind, FitcamError, HistoryFilter, SessionStore, WorkoutSessionRecord,
};
use secrecy::SecretString;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(exercise: ExerciseKind, completed_at: &str) -> WorkoutSessionRecord {
    WorkoutSessionRecord {
        session_id: Uuid::new_v4(),
        exercise,
        total_reps: 20,
        total_duration_secs: 75,
        sets_completed: 2,
        stability_score: 100,
        completed_at: DateTime::parse_from_rfc3339(completed_at)
            .unwrap()
            .with_timezone(&Utc),
    }
}

#[tokio::test]
async fn save_posts_record_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workouts"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpSessionStore::new(&server.uri(), Some(SecretString::new("tok".into()))).unwrap();
    let r = record(ExerciseKind::Squat, "2026-05-04T07:00:00Z");
    store.save_session(&r).await.expect("save");

    let received = server.received_requests().await.unwrap();
    let body: WorkoutSessionRecord = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body, r);
    let raw: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(raw["exercise"], "SQUAT");
}

#[tokio::test]
async fn save_retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workouts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workouts"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let store = HttpSessionStore::new(&server.uri(), None).unwrap();
    store
        .save_session(&record(ExerciseKind::Plank, "2026-05-04T07:00:00Z"))
        .await
        .expect("save after retry");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workouts"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad record"))
        .mount(&server)
        .await;

    let store = HttpSessionStore::new(&server.uri(), None).unwrap();
    let err = store
        .save_session(&record(ExerciseKind::PushUp, "2026-05-04T07:00:00Z"))
        .await
        .unwrap_err();
    match err {
        FitcamError::Status { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "bad record");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_passes_filter_and_orders_newest_first() {
    let server = MockServer::start().await;
    let older = record(ExerciseKind::PushUp, "2026-05-04T07:00:00Z");
    let newer = record(ExerciseKind::PushUp, "2026-05-04T18:00:00Z");
    let stray = record(ExerciseKind::Squat, "2026-05-04T09:00:00Z");
    Mock::given(method("GET"))
        .and(path("/api/v1/workouts"))
        .and(query_param("exercise", "PUSH_UP"))
        .and(query_param("date", "2026-05-04"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![&older, &stray, &newer]))
        .mount(&server)
        .await;

    let store = HttpSessionStore::new(&format!("{}/", server.uri()), None).unwrap();
    let filter = HistoryFilter {
        exercise: Some(ExerciseKind::PushUp),
        date: NaiveDate::from_ymd_opt(2026, 5, 4),
    };
    let listed = store.list_sessions(&filter).await.expect("list");
    assert_eq!(listed, vec![newer, older]);
}
