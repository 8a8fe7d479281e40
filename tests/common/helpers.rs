//! Shared fixtures built through the public services, so every fixture obeys
//! the same rules as production callers.

use taskboard::{
    DbConn,
    auth::AuthenticatedUser,
    models::{
        cards::Card,
        invitations::InviteMemberRequest,
        requests::{CreateBoardRequest, CreateCardRequest, CreateColumnRequest, CreateWorkspaceRequest},
        users::NewUser,
        workspace_members::WorkspaceRole,
    },
    realtime::BoardEvents,
    services::{boards, cards, columns, invitations, users, workspaces},
};
use uuid::Uuid;

/// A unique email such as `test_invite_flow_V1StGXR8@example.com`.
pub fn generate_test_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, nanoid::nanoid!(8, &nanoid::alphabet::SAFE))
}

pub async fn create_test_user(conn: &mut DbConn, prefix: &str, full_name: &str) -> AuthenticatedUser {
    let user = users::create_user(
        conn,
        NewUser {
            email: generate_test_email(prefix),
            full_name: Some(full_name.to_string()),
            avatar_url: None,
        },
    )
    .await
    .expect("Failed to create test user");
    user.into()
}

pub struct BoardFixture {
    pub workspace_id: Uuid,
    pub board_id: Uuid,
    pub column_id: Uuid,
}

/// Workspace owned by `owner` with one board holding one column.
pub async fn setup_board(conn: &mut DbConn, events: &BoardEvents, owner: &AuthenticatedUser) -> BoardFixture {
    let workspace = workspaces::create_workspace(
        &mut *conn,
        owner,
        CreateWorkspaceRequest {
            name: format!("Workspace {}", nanoid::nanoid!(6)),
            description: None,
        },
    )
    .await
    .expect("Failed to create workspace");

    let board = boards::create_board(
        &mut *conn,
        owner,
        CreateBoardRequest {
            workspace_id: workspace.workspace.id,
            name: "Roadmap".to_string(),
            description: None,
        },
    )
    .await
    .expect("Failed to create board");

    let column = columns::create_column(
        &mut *conn,
        events,
        owner,
        CreateColumnRequest {
            board_id: board.id,
            title: "To do".to_string(),
            position: None,
        },
    )
    .await
    .expect("Failed to create column");

    BoardFixture {
        workspace_id: workspace.workspace.id,
        board_id: board.id,
        column_id: column.id,
    }
}

/// Invites `user` into the workspace and accepts on their behalf.
pub async fn add_member(
    conn: &mut DbConn,
    workspace_id: Uuid,
    inviter: &AuthenticatedUser,
    user: &AuthenticatedUser,
    role: WorkspaceRole,
) {
    let invitation = invitations::invite_member(
        &mut *conn,
        inviter,
        workspace_id,
        InviteMemberRequest {
            email: user.email.clone(),
            role,
        },
    )
    .await
    .expect("Failed to invite member");

    invitations::accept_invitation(conn, user, invitation.id)
        .await
        .expect("Failed to accept invitation");
}

pub async fn create_card(
    conn: &mut DbConn,
    events: &BoardEvents,
    actor: &AuthenticatedUser,
    column_id: Uuid,
    title: &str,
) -> Card {
    cards::create_card(
        conn,
        events,
        actor,
        CreateCardRequest {
            column_id,
            title: title.to_string(),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create card")
}

/// Counts rows of a table, for cascade assertions.
pub async fn count_rows(conn: &mut DbConn, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(conn)
        .await
        .expect("Failed to count rows")
}
