pub mod access;
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
pub mod ordering;
pub mod storage;
pub mod users;
pub mod workspaces;
