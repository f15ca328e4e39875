//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use printhub_api::{AppState, build_router};
use printhub_core::config::AppConfig;
use printhub_core::types::JobId;
use printhub_database::{JobStore, MemoryJobStore};
use printhub_entity::job::{CreateJob, Job, JobStatus, PrinterType};
use printhub_service::{PrintQueueService, SubmitRequest};
use printhub_storage::LocalStorageProvider;
use printhub_worker::{Dispatcher, LaunchError, LaunchReport, LaunchRequest, Launcher};

const BOUNDARY: &str = "printhub-test-boundary";

/// Launcher double.
///
/// Pops one scripted outcome per call and falls back to `default_ok` once
/// the script is exhausted. Every call checks how many jobs of the printer
/// are active at launch time.
#[derive(Debug)]
pub struct ScriptedLauncher {
    store: Arc<MemoryJobStore>,
    script: Mutex<VecDeque<bool>>,
    default_ok: AtomicBool,
    delay: Duration,
    calls: Mutex<Vec<LaunchRequest>>,
    max_active_seen: AtomicUsize,
}

impl ScriptedLauncher {
    fn new(store: Arc<MemoryJobStore>, delay: Duration) -> Self {
        Self {
            store,
            script: Mutex::new(VecDeque::new()),
            default_ok: AtomicBool::new(true),
            delay,
            calls: Mutex::new(Vec::new()),
            max_active_seen: AtomicUsize::new(0),
        }
    }

    /// Queue outcomes for the next launches.
    pub fn script(&self, outcomes: &[bool]) {
        self.script.lock().unwrap().extend(outcomes.iter().copied());
    }

    /// Outcome once the script runs out.
    pub fn set_default(&self, ok: bool) {
        self.default_ok.store(ok, Ordering::SeqCst);
    }

    /// Job ids in launch order.
    pub fn launched(&self) -> Vec<JobId> {
        self.calls.lock().unwrap().iter().map(|c| c.job_id).collect()
    }

    /// Full launch requests in launch order.
    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of simultaneously active jobs of one printer seen
    /// during any launch.
    pub fn max_active_seen(&self) -> usize {
        self.max_active_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Launcher for ScriptedLauncher {
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchReport, LaunchError> {
        let active = self
            .store
            .all()
            .await
            .into_iter()
            .filter(|j| j.printer == request.printer && j.status == JobStatus::Active)
            .count();
        self.max_active_seen.fetch_max(active, Ordering::SeqCst);
        self.calls.lock().unwrap().push(request.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        if scripted.unwrap_or_else(|| self.default_ok.load(Ordering::SeqCst)) {
            Ok(LaunchReport {
                program: "scripted".to_string(),
                exit_code: Some(0),
                duration_ms: 0,
            })
        } else {
            Err(LaunchError::NonZeroExit {
                code: 1,
                output: format!("printer rejected job {}", request.job_id),
            })
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Queue service behind the router
    pub service: Arc<PrintQueueService>,
    /// Job store for direct inspection
    pub store: Arc<MemoryJobStore>,
    /// Payload storage rooted in a temp dir
    pub storage: Arc<LocalStorageProvider>,
    /// Launcher double
    pub launcher: Arc<ScriptedLauncher>,
    /// Application config
    pub config: Arc<AppConfig>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_launch_delay(Duration::ZERO).await
    }

    /// Create a test application whose launches take `delay`.
    pub async fn with_launch_delay(delay: Duration) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.storage.root_path = dir.path().join("uploads").to_string_lossy().to_string();
        let config = Arc::new(config);

        let storage = Arc::new(
            LocalStorageProvider::new(&config.storage.root_path)
                .await
                .expect("Failed to init storage"),
        );
        let store = Arc::new(MemoryJobStore::new());
        let launcher = Arc::new(ScriptedLauncher::new(Arc::clone(&store), delay));
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            storage.clone(),
            launcher.clone(),
        ));
        let service = Arc::new(PrintQueueService::new(
            store.clone(),
            storage.clone(),
            dispatcher,
            Arc::new(config.queue.clone()),
        ));

        let state = AppState::new(Arc::clone(&config), Arc::clone(&service), storage.clone());
        let router = build_router(state);

        Self {
            router,
            service,
            store,
            storage,
            launcher,
            config,
            _dir: dir,
        }
    }

    /// Submit through the service with a small payload.
    pub async fn submit(&self, printer: &str, file_name: &str) -> Job {
        self.service
            .submit(SubmitRequest {
                printer: printer.to_string(),
                owner_ref: "member-1".to_string(),
                file_name: file_name.to_string(),
                data: Bytes::from_static(b"; test payload"),
                notes: None,
            })
            .await
            .expect("Submit failed")
            .job
            .expect("Submit returned no job")
    }

    /// Insert a queued job without triggering dispatch.
    pub async fn enqueue_silently(&self, printer: PrinterType, file_name: &str) -> Job {
        self.store
            .create(&CreateJob {
                printer,
                file_name: file_name.to_string(),
                payload_ref: format!("print_jobs/{file_name}"),
                owner_ref: "member-1".to_string(),
                notes: None,
            })
            .await
            .expect("Create failed")
    }

    /// Current record of a job.
    pub async fn job(&self, id: JobId) -> Job {
        self.store
            .find_by_id(id)
            .await
            .expect("Lookup failed")
            .expect("Job missing")
    }

    /// Queued job ids of a printer in dispatch order.
    pub async fn queued_ids(&self, printer: PrinterType) -> Vec<JobId> {
        self.store
            .list_queued(printer)
            .await
            .expect("List failed")
            .into_iter()
            .map(|j| j.id)
            .collect()
    }

    /// Make a JSON HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// POST a multipart job submission.
    pub async fn upload(
        &self,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/jobs")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success body.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}
