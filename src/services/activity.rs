use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    error::Result,
    models::activity::{ActivityDetails, ActivityLogEntry, ActivityWithUser},
    queries,
    services::access,
};

/// Appends an entry to a card's activity log.
pub async fn log_activity(
    conn: &mut DbConn,
    card_id: Uuid,
    user_id: Uuid,
    details: ActivityDetails,
) -> Result<ActivityLogEntry> {
    let entry = queries::activity::insert_activity(conn, card_id, user_id, &details).await?;

    tracing::debug!(
        card_id = %card_id,
        user_id = %user_id,
        action = %entry.action_type,
        "Activity recorded"
    );

    Ok(entry)
}

/// A card's activity, newest first, with the acting user's safe profile.
pub async fn get_card_activities(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    card_id: Uuid,
) -> Result<Vec<ActivityWithUser>> {
    access::card_access(&mut *conn, actor, card_id).await?;
    queries::activity::list_activities_by_card(conn, card_id).await
}
