//! Integration tests for per-printer dispatch through the queue service.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use printhub_core::config::LauncherConfig;
use printhub_core::error::ErrorKind;
use printhub_core::traits::storage::StorageProvider;
use printhub_database::JobStore;
use printhub_entity::job::{CreateJob, JobStatus, PrinterType};
use printhub_worker::{CommandLauncher, Dispatcher};

use helpers::TestApp;

#[tokio::test]
async fn test_idle_printer_starts_submission_immediately() {
    let app = TestApp::new().await;

    let job = app.submit("H2S", "bracket.3mf").await;

    assert_eq!(job.status, JobStatus::Active);
    assert!(job.started_at.is_some());
    assert_eq!(app.launcher.launched(), vec![job.id]);
}

#[tokio::test]
async fn test_completion_advances_queue() {
    let app = TestApp::new().await;
    let j1 = app.submit("H2S", "1.3mf").await;
    let j2 = app.submit("H2S", "2.3mf").await;
    assert_eq!(j2.status, JobStatus::Queued);

    let outcome = app.service.complete(j1.id).await.unwrap();

    assert_eq!(app.job(j1.id).await.status, JobStatus::Done);
    assert_eq!(outcome.dispatched.map(|j| j.id), Some(j2.id));
    assert_eq!(app.job(j2.id).await.status, JobStatus::Active);
    assert_eq!(app.launcher.launched(), vec![j1.id, j2.id]);
}

#[tokio::test]
async fn test_failed_launches_are_skipped_in_order() {
    let app = TestApp::new().await;
    let j1 = app.enqueue_silently(PrinterType::P1s, "1.3mf").await;
    let j2 = app.enqueue_silently(PrinterType::P1s, "2.3mf").await;
    let j3 = app.enqueue_silently(PrinterType::P1s, "3.3mf").await;
    app.launcher.script(&[false, false, true]);

    let outcome = app.service.dispatch(PrinterType::P1s).await.unwrap();

    assert_eq!(outcome.dispatched.map(|j| j.id), Some(j3.id));
    assert_eq!(app.launcher.launched(), vec![j1.id, j2.id, j3.id]);
    for id in [j1.id, j2.id] {
        let job = app.job(id).await;
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.completed_at.is_some());
        assert!(
            job.notes
                .as_deref()
                .is_some_and(|n| n.contains(&format!("printer rejected job {id}")))
        );
    }
    assert_eq!(app.job(j3.id).await.status, JobStatus::Active);
}

#[tokio::test]
async fn test_every_launch_failing_leaves_printer_idle() {
    let app = TestApp::new().await;
    app.launcher.set_default(false);
    let ids: Vec<_> = {
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(app.enqueue_silently(PrinterType::H2s, &format!("{i}.3mf")).await.id);
        }
        ids
    };

    let outcome = app.service.dispatch(PrinterType::H2s).await.unwrap();

    assert!(outcome.dispatched.is_none());
    assert_eq!(app.launcher.launched(), ids);
    for id in ids {
        assert_eq!(app.job(id).await.status, JobStatus::Failed);
    }
    let h2s = outcome.snapshot.printer(PrinterType::H2s).unwrap().clone();
    assert!(h2s.is_idle());
    assert_eq!(h2s.recent.len(), 5);
}

#[tokio::test]
async fn test_redispatch_is_idempotent() {
    let app = TestApp::new().await;

    for _ in 0..3 {
        let outcome = app.service.dispatch(PrinterType::P1s).await.unwrap();
        assert!(outcome.dispatched.is_none());
    }
    assert!(app.launcher.launched().is_empty());

    let job = app.submit("P1S", "a.3mf").await;
    app.service.dispatch(PrinterType::P1s).await.unwrap();
    app.service.dispatch(PrinterType::P1s).await.unwrap();
    assert_eq!(app.launcher.launched(), vec![job.id]);
}

#[tokio::test]
async fn test_deleting_active_job_changes_nothing() {
    let app = TestApp::new().await;
    let active = app.submit("H2S", "a.3mf").await;
    let queued = app.submit("H2S", "b.3mf").await;

    let err = app.service.delete(active.id).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.job(active.id).await, active);
    assert_eq!(app.queued_ids(PrinterType::H2s).await, vec![queued.id]);
    assert!(app.storage.exists(&active.payload_ref).await.unwrap());
}

#[tokio::test]
async fn test_deleting_mid_queue_keeps_order() {
    let app = TestApp::new().await;
    let j1 = app.submit("H2S", "1.3mf").await;
    let j2 = app.submit("H2S", "2.3mf").await;
    let j3 = app.submit("H2S", "3.3mf").await;
    let j4 = app.submit("H2S", "4.3mf").await;

    let outcome = app.service.delete(j3.id).await.unwrap();

    assert!(outcome.dispatched.is_none());
    assert_eq!(app.queued_ids(PrinterType::H2s).await, vec![j2.id, j4.id]);
    assert_eq!(app.job(j1.id).await.status, JobStatus::Active);
    assert_eq!(app.launcher.launched(), vec![j1.id]);
    assert!(!app.storage.exists(&j3.payload_ref).await.unwrap());
}

#[tokio::test]
async fn test_fifo_breaks_timestamp_ties_by_id() {
    let app = TestApp::new().await;
    let at = Utc::now();
    let data = |name: &str| CreateJob {
        printer: PrinterType::H2s,
        file_name: name.to_string(),
        payload_ref: format!("print_jobs/{name}"),
        owner_ref: "member-1".to_string(),
        notes: None,
    };
    let a = app.store.create_at(&data("a.3mf"), at).await;
    let b = app.store.create_at(&data("b.3mf"), at).await;
    let earlier = app
        .store
        .create_at(&data("c.3mf"), at - chrono::Duration::seconds(1))
        .await;

    for _ in 0..3 {
        let active = app.store.find_active(PrinterType::H2s).await.unwrap();
        if let Some(active) = active {
            app.service.complete(active.id).await.unwrap();
        } else {
            app.service.dispatch(PrinterType::H2s).await.unwrap();
        }
    }

    assert_eq!(app.launcher.launched(), vec![earlier.id, a.id, b.id]);
}

#[tokio::test]
async fn test_printers_do_not_block_each_other() {
    let app = TestApp::new().await;
    let h2s = app.submit("H2S", "h.3mf").await;
    let p1s = app.submit("p1s", "p.3mf").await;

    assert_eq!(h2s.status, JobStatus::Active);
    assert_eq!(p1s.status, JobStatus::Active);
}

#[tokio::test]
async fn test_startup_pass_starts_jobs_queued_while_down() {
    let app = TestApp::new().await;
    let h2s = app.enqueue_silently(PrinterType::H2s, "h.3mf").await;
    let p1s = app.enqueue_silently(PrinterType::P1s, "p.3mf").await;

    let started = app.service.dispatch_all().await.unwrap();

    let ids: Vec<_> = started.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![h2s.id, p1s.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_keep_one_active_job() {
    let app = Arc::new(TestApp::with_launch_delay(Duration::from_millis(5)).await);

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.submit("H2S", &format!("{i}.3mf")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(app.launcher.launched().len(), 1);
    assert!(app.launcher.max_active_seen() <= 1);

    // Drain the queue and check the whole run kept FIFO order.
    while let Some(active) = app.store.find_active(PrinterType::H2s).await.unwrap() {
        app.service.complete(active.id).await.unwrap();
    }
    let launched = app.launcher.launched();
    assert_eq!(launched.len(), 16);
    let mut sorted = launched.clone();
    sorted.sort();
    assert_eq!(launched, sorted);
    assert!(app.launcher.max_active_seen() <= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatch_triggers_launch_once() {
    let app = Arc::new(TestApp::with_launch_delay(Duration::from_millis(10)).await);
    let job = app.enqueue_silently(PrinterType::P1s, "a.3mf").await;
    app.enqueue_silently(PrinterType::P1s, "b.3mf").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.service.dispatch(PrinterType::P1s).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(app.launcher.launched(), vec![job.id]);
    assert!(app.launcher.max_active_seen() <= 1);
}

#[tokio::test]
async fn test_command_launcher_receives_stored_payload() {
    let app = TestApp::new().await;
    let out = tempfile::tempdir().unwrap();
    let copy = out.path().join("copy.3mf");

    let mut launcher_config = LauncherConfig::default();
    launcher_config.commands.insert(
        "H2S".to_string(),
        format!("cp {{file_path}} {}", copy.display()),
    );
    let dispatcher = Dispatcher::new(
        app.store.clone(),
        app.storage.clone(),
        Arc::new(CommandLauncher::new(Arc::new(launcher_config))),
    );

    let job = app
        .store
        .create(&CreateJob {
            printer: PrinterType::H2s,
            file_name: "part.3mf".to_string(),
            payload_ref: "print_jobs/part.3mf".to_string(),
            owner_ref: "member-1".to_string(),
            notes: None,
        })
        .await
        .unwrap();
    app.storage
        .write(&job.payload_ref, bytes::Bytes::from_static(b"3mf-bytes"))
        .await
        .unwrap();

    let started = dispatcher.try_dispatch(PrinterType::H2s).await.unwrap();

    assert_eq!(started.map(|j| j.id), Some(job.id));
    assert_eq!(std::fs::read(&copy).unwrap(), b"3mf-bytes");
}

#[tokio::test]
async fn test_unconfigured_printer_fails_job_with_diagnostic() {
    let app = TestApp::new().await;
    let dispatcher = Dispatcher::new(
        app.store.clone(),
        app.storage.clone(),
        Arc::new(CommandLauncher::new(Arc::new(LauncherConfig::default()))),
    );
    let job = app.enqueue_silently(PrinterType::P1s, "a.3mf").await;

    let started = dispatcher.try_dispatch(PrinterType::P1s).await.unwrap();

    assert!(started.is_none());
    let job = app.job(job.id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(
        job.notes.as_deref(),
        Some("launch failed: no launch command configured for printer P1S")
    );
}
