//! Contract tests: per-field updates and deletes
//!
//! Verifies the merge-on-success / error-flag-on-failure policy:
//! - a confirmed value is merged into the collection and clears the error
//! - a rejected value leaves the collection at the last confirmed state
//! - exactly one of {merged, error-set} happens per resolved call
//! - fields are independent; pending always ends
//! - rapid repeated edits resolve last-response-wins

mod common;

use common::*;
use console_core::domains::DomainCollection;
use console_core::editor::{FieldEditor, FieldError, UpdateOutcome};
use console_core::error::Error;
use console_core::selection::{Selection, resolve};
use console_core::session::{SessionStatus, SessionStore};
use console_core::store::MemoryTokenStore;
use console_core::traits::api::RecordField;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    api: Arc<MockConsoleApi>,
    session: SessionStore,
    domains: DomainCollection,
    editor: FieldEditor,
}

/// A session with one loaded domain: foo 1.1.1.1 / (no ipv6)
async fn fixture() -> Fixture {
    let api = Arc::new(MockConsoleApi::new());
    api.domains_ok(vec![domain("foo", Some("1.1.1.1"), None)]);

    let session = SessionStore::new(Arc::new(MemoryTokenStore::with_token("abc")));
    session.initialize().await.unwrap();

    let domains = DomainCollection::new();
    domains.load(api.as_ref(), &session).await.unwrap();

    Fixture {
        api,
        session,
        domains,
        editor: FieldEditor::new(),
    }
}

#[tokio::test]
async fn confirmed_update_merges_the_value() {
    let f = fixture().await;
    f.api.update_ok();

    let outcome = f
        .editor
        .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv4, "1.2.3.4")
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Applied);

    let d = f.domains.find_by_name(Some("foo")).await.unwrap();
    assert_eq!(d.ipv4.as_deref(), Some("1.2.3.4"));
    assert_eq!(d.ipv6, None);
    assert_eq!(f.editor.field_error("foo", RecordField::Ipv4).await, None);
    assert!(!f.editor.is_pending("foo", RecordField::Ipv4).await);

    let seen = f.api.updates_seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![("foo".to_string(), RecordField::Ipv4, "1.2.3.4".to_string())]
    );
}

#[tokio::test]
async fn rejected_value_reverts_to_last_confirmed() {
    let f = fixture().await;
    f.api.update_err(Error::InvalidFormat);

    let err = f
        .editor
        .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv4, "not-an-ip")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFormat));

    // The displayed value reverts to the last confirmed one, not the input
    let d = f.domains.find_by_name(Some("foo")).await.unwrap();
    assert_eq!(d.ipv4.as_deref(), Some("1.1.1.1"));
    assert_eq!(
        f.editor.field_error("foo", RecordField::Ipv4).await,
        Some(FieldError::Format)
    );
    assert!(!f.editor.is_pending("foo", RecordField::Ipv4).await);
}

#[tokio::test]
async fn retry_after_rejection_clears_the_error() {
    let f = fixture().await;
    f.api.update_err(Error::InvalidFormat).update_ok();

    let _ = f
        .editor
        .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv4, "bad")
        .await;
    f.editor
        .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv4, "2.2.2.2")
        .await
        .unwrap();

    assert_eq!(f.editor.field_error("foo", RecordField::Ipv4).await, None);
    let d = f.domains.find_by_name(Some("foo")).await.unwrap();
    assert_eq!(d.ipv4.as_deref(), Some("2.2.2.2"));
}

#[tokio::test]
async fn unknown_failures_set_the_unknown_error() {
    for e in [Error::transport("connection reset"), Error::api(500)] {
        let f = fixture().await;
        f.api.update_err(e);

        assert!(
            f.editor
                .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv4, "9.9.9.9")
                .await
                .is_err()
        );
        let d = f.domains.find_by_name(Some("foo")).await.unwrap();
        assert_eq!(d.ipv4.as_deref(), Some("1.1.1.1"));
        assert_eq!(
            f.editor.field_error("foo", RecordField::Ipv4).await,
            Some(FieldError::Unknown)
        );
    }
}

#[tokio::test]
async fn each_resolved_update_has_exactly_one_outcome() {
    // For every scripted outcome: either the field holds the new value with
    // no error, or it is unchanged with an error set — never both, never
    // neither.
    let scripts: Vec<Box<dyn Fn(&MockConsoleApi)>> = vec![
        Box::new(|api| {
            api.update_ok();
        }),
        Box::new(|api| {
            api.update_err(Error::InvalidFormat);
        }),
        Box::new(|api| {
            api.update_err(Error::api(503));
        }),
    ];

    for script in scripts {
        let f = fixture().await;
        script(&f.api);

        let _ = f
            .editor
            .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv4, "7.7.7.7")
            .await;

        let merged = f.domains.find_by_name(Some("foo")).await.unwrap().ipv4
            == Some("7.7.7.7".to_string());
        let error_set = f
            .editor
            .field_error("foo", RecordField::Ipv4)
            .await
            .is_some();
        assert!(merged != error_set, "expected exactly one of merged/error");
        assert!(!f.editor.is_pending("foo", RecordField::Ipv4).await);
    }
}

#[tokio::test]
async fn fields_are_independent() {
    let f = fixture().await;
    // First resolution (the ungated ipv6 update) succeeds, the gated ipv4
    // update then fails.
    f.api.update_ok().update_err(Error::api(500));

    let gate = f.api.hold("update_record");
    let ipv4_task = {
        let (api, session, domains, editor) = (
            f.api.clone(),
            f.session.clone(),
            f.domains.clone(),
            f.editor.clone(),
        );
        tokio::spawn(async move {
            editor
                .update(api.as_ref(), &session, &domains, "foo", RecordField::Ipv4, "3.3.3.3")
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // ipv4 is pending; ipv6 is not blocked by it
    assert!(f.editor.is_pending("foo", RecordField::Ipv4).await);
    assert!(!f.editor.is_pending("foo", RecordField::Ipv6).await);

    f.editor
        .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv6, "::1")
        .await
        .unwrap();

    drop(gate);
    assert!(ipv4_task.await.unwrap().is_err());

    let d = f.domains.find_by_name(Some("foo")).await.unwrap();
    assert_eq!(d.ipv6.as_deref(), Some("::1"));
    assert_eq!(d.ipv4.as_deref(), Some("1.1.1.1"));
    assert_eq!(f.editor.field_error("foo", RecordField::Ipv6).await, None);
    assert_eq!(
        f.editor.field_error("foo", RecordField::Ipv4).await,
        Some(FieldError::Unknown)
    );
}

#[tokio::test]
async fn last_response_wins_for_rapid_repeated_edits() {
    let f = fixture().await;
    f.api.update_ok().update_ok();

    let gate1 = f.api.hold("update_record");
    let gate2 = f.api.hold("update_record");

    let spawn_update = |value: &'static str| {
        let (api, session, domains, editor) = (
            f.api.clone(),
            f.session.clone(),
            f.domains.clone(),
            f.editor.clone(),
        );
        tokio::spawn(async move {
            editor
                .update(api.as_ref(), &session, &domains, "foo", RecordField::Ipv4, value)
                .await
        })
    };

    let first = spawn_update("1.2.3.4");
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = spawn_update("5.6.7.8");
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The newer request resolves first; the older response is then stale
    gate2.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate1.send(()).unwrap();

    assert_eq!(second.await.unwrap().unwrap(), UpdateOutcome::Applied);
    assert_eq!(first.await.unwrap().unwrap(), UpdateOutcome::Discarded);

    let d = f.domains.find_by_name(Some("foo")).await.unwrap();
    assert_eq!(d.ipv4.as_deref(), Some("5.6.7.8"));
    assert_eq!(f.editor.field_error("foo", RecordField::Ipv4).await, None);
    assert!(!f.editor.is_pending("foo", RecordField::Ipv4).await);
}

#[tokio::test]
async fn unauthorized_update_invalidates_the_session() {
    let f = fixture().await;
    f.api.update_err(Error::Unauthorized);

    let err = f
        .editor
        .update(f.api.as_ref(), &f.session, &f.domains, "foo", RecordField::Ipv4, "1.2.3.4")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
    assert_eq!(f.session.status().await, SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn confirmed_delete_removes_the_domain() {
    let f = fixture().await;
    f.api.delete_ok();

    f.editor
        .delete(f.api.as_ref(), &f.session, &f.domains, "foo")
        .await
        .unwrap();

    assert!(f.domains.find_by_name(Some("foo")).await.is_none());
    // A route still naming the deleted domain falls back to the overview
    assert_eq!(resolve(Some("foo"), &f.domains).await, Selection::Overview);
}

#[tokio::test]
async fn failed_delete_keeps_the_domain_and_allows_retry() {
    let f = fixture().await;
    f.api.delete_err(Error::api(500)).delete_ok();

    assert!(
        f.editor
            .delete(f.api.as_ref(), &f.session, &f.domains, "foo")
            .await
            .is_err()
    );
    assert!(f.domains.find_by_name(Some("foo")).await.is_some());

    f.editor
        .delete(f.api.as_ref(), &f.session, &f.domains, "foo")
        .await
        .unwrap();
    assert!(f.domains.find_by_name(Some("foo")).await.is_none());
}
