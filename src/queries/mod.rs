pub mod activity;
pub mod attachments;
pub mod boards;
pub mod cards;
pub mod checklists;
pub mod columns;
pub mod comments;
pub mod invitations;
pub mod labels;
pub mod notifications;
pub mod users;
pub mod workspace_members;
pub mod workspaces;
