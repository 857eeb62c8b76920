#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::TestServer;
use safiri::{
    api::ApiError,
    auth::{self, FileStore, SessionEvent, SessionState, SessionStore},
    config::AppConfig,
    features::{admin::AdminClient, bookings::BookingsClient, experiences::ExperiencesClient},
    routes::{Navigation, Navigator, HOME},
};
use std::{sync::atomic::Ordering, time::Duration};
use tokio::sync::broadcast::error::TryRecvError;

async fn signed_in(
    server: &TestServer,
    dir: &std::path::Path,
    email: &str,
) -> (auth::SessionManager, safiri::api::ApiClient) {
    let config = AppConfig::new(&server.api_url())
        .unwrap()
        .with_state_dir(dir.to_path_buf())
        .with_timeout(Duration::from_secs(2));
    let (manager, api) = auth::connect(config).unwrap();
    manager.restore_session().await;
    manager.login(email, "password123").await.unwrap();
    (manager, api)
}

#[tokio::test]
async fn test_concurrent_rejections_expire_once() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    let dir = tempfile::tempdir()?;
    let (manager, api) = signed_in(&server, dir.path(), "traveler@test.com").await;

    let mut navigator = Navigator::new(manager.handle().clone());
    assert!(matches!(
        navigator.navigate("/my-bookings"),
        Navigation::Render(_)
    ));

    let mut events = manager.handle().events();
    server.backend.revoke_all();

    let experiences = ExperiencesClient::new(api.clone());
    let bookings = BookingsClient::new(api.clone());
    let (a, b, c) = tokio::join!(experiences.list(), bookings.mine(), bookings.mine());

    for result in [a.map(|_| ()), b.map(|_| ()), c.map(|_| ())] {
        assert!(result.unwrap_err().is_unauthorized());
    }
    assert_eq!(server.backend.unauthorized.load(Ordering::SeqCst), 3);

    let mut expired = 0;
    loop {
        match events.try_recv() {
            Ok(event @ SessionEvent::Expired { .. }) => {
                expired += 1;
                navigator.handle_event(&event);
            }
            Ok(_) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => {}
        }
    }

    assert_eq!(expired, 1);
    assert_eq!(navigator.redirects(), 1);
    assert_eq!(navigator.location(), HOME);
    assert_eq!(manager.state(), SessionState::Unauthenticated);
    assert!(FileStore::new(dir.path()).load_token()?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_public_listing_works_signed_out() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    let dir = tempfile::tempdir()?;
    let config = AppConfig::new(&server.api_url())?.with_state_dir(dir.path().to_path_buf());
    let (manager, api) = auth::connect(config)?;
    manager.restore_session().await;

    let listing = ExperiencesClient::new(api).list().await?;
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].title, "Maasai Mara Game Drive");
    Ok(())
}

#[tokio::test]
async fn test_forbidden_is_not_a_logout() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    let dir = tempfile::tempdir()?;
    let (manager, api) = signed_in(&server, dir.path(), "guide@kenya.com").await;

    let err = AdminClient::new(api.clone()).users().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            status: 403,
            message: "Admin access required".to_string()
        }
    );
    assert!(manager.is_authenticated());

    BookingsClient::new(api).delete(5).await?;
    Ok(())
}

#[tokio::test]
async fn test_admin_lists_users() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    let dir = tempfile::tempdir()?;
    let (_manager, api) = signed_in(&server, dir.path(), "admin@digitalguides.com").await;

    let users = AdminClient::new(api).users().await?;
    assert_eq!(users.len(), 3);
    assert_eq!(users[1].email, "guide@kenya.com");
    Ok(())
}
