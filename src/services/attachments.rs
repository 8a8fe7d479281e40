use uuid::Uuid;

use crate::DbConn;
use crate::{
    auth::AuthenticatedUser,
    config::StorageConfig,
    error::{Error, Result},
    models::{
        activity::ActivityDetails,
        attachments::{Attachment, AttachmentWithUploader, NewAttachment},
        requests::UploadAttachmentRequest,
        workspace_members::MANAGER_ROLES,
    },
    queries::attachments,
    services::{access, activity, storage::FileStore},
    validation::{MAX_TITLE_LENGTH, validate_required_text},
};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Keeps only the final path component of an uploaded name.
fn clean_filename(filename: &str) -> Result<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    validate_required_text(base, "filename", MAX_TITLE_LENGTH)
}

pub fn attachment_url(public_url_prefix: &str, stored_name: &str) -> String {
    format!("{}/{}", public_url_prefix.trim_end_matches('/'), stored_name)
}

/// Stores the bytes and records the attachment on the card.
pub async fn upload_attachment(
    conn: &mut DbConn,
    store: &dyn FileStore,
    storage: &StorageConfig,
    actor: &AuthenticatedUser,
    request: UploadAttachmentRequest,
) -> Result<Attachment> {
    let scope = access::card_access(&mut *conn, actor, request.card_id).await?.entity;

    let filename = clean_filename(&request.filename)?;
    if request.content.is_empty() {
        return Err(Error::validation("file", "File is empty"));
    }
    if request.content.len() as u64 > storage.max_upload_bytes {
        return Err(Error::validation(
            "file",
            format!("File exceeds the {} byte upload limit", storage.max_upload_bytes),
        ));
    }
    let mime_type = match request.mime_type.trim() {
        "" => DEFAULT_MIME_TYPE.to_string(),
        mime_type => mime_type.to_string(),
    };

    let stored = store.save(&filename, &request.content).await?;
    let new_attachment = NewAttachment {
        filename,
        url: attachment_url(&storage.public_url_prefix, &stored.stored_name),
        stored_name: stored.stored_name.clone(),
        mime_type,
        size: stored.size as i64,
        card_id: scope.card.id,
        uploaded_by_id: actor.id,
    };

    let attachment = match attachments::create_attachment(&mut *conn, new_attachment).await {
        Ok(attachment) => attachment,
        Err(e) => {
            if let Err(cleanup) = store.delete(&stored.stored_name).await {
                tracing::warn!(stored_name = %stored.stored_name, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e);
        }
    };

    activity::log_activity(
        conn,
        scope.card.id,
        actor.id,
        ActivityDetails::AddAttachment {
            attachment_id: attachment.id,
            filename: attachment.filename.clone(),
        },
    )
    .await?;

    tracing::info!(
        operation = "upload_attachment",
        attachment_id = %attachment.id,
        card_id = %scope.card.id,
        size = attachment.size,
        actor_id = %actor.id,
        "Attachment uploaded"
    );

    Ok(attachment)
}

/// A card's attachments, newest first.
pub async fn list_attachments(
    conn: &mut DbConn,
    actor: &AuthenticatedUser,
    card_id: Uuid,
) -> Result<Vec<AttachmentWithUploader>> {
    access::card_access(&mut *conn, actor, card_id).await?;
    attachments::list_attachments_by_card(conn, card_id).await
}

pub async fn get_attachment(conn: &mut DbConn, actor: &AuthenticatedUser, attachment_id: Uuid) -> Result<Attachment> {
    Ok(access::attachment_access(conn, actor, attachment_id).await?.entity.attachment)
}

/// Removes the record, then the stored file. A failing file delete is logged and ignored.
pub async fn delete_attachment(
    conn: &mut DbConn,
    store: &dyn FileStore,
    actor: &AuthenticatedUser,
    attachment_id: Uuid,
) -> Result<()> {
    let scoped = access::attachment_access(&mut *conn, actor, attachment_id).await?;
    let attachment = &scoped.entity.attachment;
    if attachment.uploaded_by_id != actor.id && !scoped.has_role(MANAGER_ROLES) {
        return Err(Error::Forbidden(access::INSUFFICIENT_PERMISSIONS.to_string()));
    }

    attachments::delete_attachment(&mut *conn, attachment_id).await?;

    if let Err(e) = store.delete(&attachment.stored_name).await {
        tracing::warn!(
            attachment_id = %attachment_id,
            stored_name = %attachment.stored_name,
            error = %e,
            "Failed to delete attachment file; record removed anyway"
        );
    }

    activity::log_activity(
        conn,
        attachment.card_id,
        actor.id,
        ActivityDetails::RemoveAttachment {
            attachment_id,
            filename: attachment.filename.clone(),
        },
    )
    .await?;

    tracing::info!(operation = "delete_attachment", attachment_id = %attachment_id, actor_id = %actor.id, "Attachment deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_filename_strips_directories() {
        assert_eq!(clean_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(clean_filename("C:\\Users\\me\\plan.docx").unwrap(), "plan.docx");
        assert!(clean_filename("uploads/").is_err());
    }

    #[test]
    fn test_attachment_url() {
        assert_eq!(attachment_url("/uploads/", "abc.png"), "/uploads/abc.png");
        assert_eq!(attachment_url("https://cdn.example.com/files", "abc.png"), "https://cdn.example.com/files/abc.png");
    }
}
