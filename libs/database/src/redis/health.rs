use redis::aio::ConnectionManager;

/// Check that Redis answers PING. Used by the readiness endpoint.
pub async fn check_health(manager: &ConnectionManager) -> bool {
    let mut conn = manager.clone();
    matches!(
        redis::cmd("PING").query_async::<String>(&mut conn).await,
        Ok(ref pong) if pong == "PONG"
    )
}
