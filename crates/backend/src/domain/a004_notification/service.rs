use std::sync::Arc;

use contracts::domain::a004_notification::{
    EmailHistoryEntry, SendNotificationDto, SendNotificationResponse,
};
use sea_orm::DatabaseConnection;

use super::mailer::{Mailer, OutgoingMail, MAX_RECIPIENTS_PER_MESSAGE};
use super::repository;
use crate::domain::a003_subscriber::SubscriberService;
use crate::shared::config::{MailConfig, PortalConfig};
use crate::shared::error::{PortalError, PortalResult};

const HISTORY_LIMIT: u64 = 50;
const SUBJECT: &str = "The school portal has been updated";

fn update_notice_html(site_url: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <p>Dear parents and guardians,</p>
  <p>The school portal has been updated.</p>
  <p><a href="{url}" style="color: #0066cc; font-weight: bold;">{url}</a></p>
  <hr style="margin: 20px 0; border: none; border-top: 1px solid #ddd;">
  <p style="font-size: 12px; color: #666;">This address is send-only. If you did not expect this message, please contact the school.</p>
</div>"#,
        url = site_url
    )
}

/// "Portal updated" mails to subscribers of the selected grades
pub struct NotificationService {
    db: DatabaseConnection,
    subscribers: SubscriberService,
    mailer: Arc<dyn Mailer>,
    from: String,
    test_recipient: Option<String>,
    site_url: String,
}

impl NotificationService {
    pub fn new(
        db: DatabaseConnection,
        subscribers: SubscriberService,
        mailer: Arc<dyn Mailer>,
        mail: &MailConfig,
        portal: &PortalConfig,
    ) -> Self {
        Self {
            db,
            subscribers,
            mailer,
            from: mail.from.clone(),
            test_recipient: mail
                .test_recipient
                .clone()
                .filter(|r| !r.trim().is_empty()),
            site_url: portal.site_url.clone(),
        }
    }

    pub async fn send(
        &self,
        sent_by: &str,
        dto: SendNotificationDto,
    ) -> PortalResult<SendNotificationResponse> {
        if dto.target_grades.is_empty() {
            return Err(PortalError::Validation("select at least one target".into()));
        }

        let subscribers = self
            .subscribers
            .recipients(&dto.target_grades, dto.targets_everyone())
            .await?;
        if subscribers.is_empty() {
            return Err(PortalError::NotFound("recipients".into()));
        }

        let recipients: Vec<String> = match &self.test_recipient {
            Some(test) => vec![test.clone()],
            None => subscribers.into_iter().map(|s| s.email).collect(),
        };

        let html = update_notice_html(&self.site_url);
        let mut message_ids = Vec::new();
        let mut delivered = 0;
        for batch in recipients.chunks(MAX_RECIPIENTS_PER_MESSAGE) {
            let mail = OutgoingMail {
                from: self.from.clone(),
                to: vec![self.from.clone()],
                bcc: batch.to_vec(),
                subject: SUBJECT.to_string(),
                html: html.clone(),
            };

            let message_id = self.mailer.send(&mail).await.map_err(|e| {
                PortalError::Internal(anyhow::anyhow!(
                    "mail delivery via {} failed after {} of {} recipient(s): {}",
                    self.mailer.provider_name(),
                    delivered,
                    recipients.len(),
                    e
                ))
            })?;
            delivered += batch.len();
            message_ids.extend(message_id);
        }

        let recipient_count = recipients.len();
        tracing::info!(
            "Update notice sent by {} to {} recipient(s) (grades: {:?}, ids: {:?})",
            sent_by,
            recipient_count,
            dto.target_grades,
            message_ids
        );

        // History is best-effort once the mail is out
        if let Err(e) =
            repository::insert(&self.db, &dto.target_grades, recipient_count, sent_by).await
        {
            tracing::error!("Failed to record email history: {}", e);
        }

        Ok(SendNotificationResponse {
            success: true,
            recipient_count,
            message: format!("sent to {} recipient(s)", recipient_count),
        })
    }

    pub async fn history(&self) -> PortalResult<Vec<EmailHistoryEntry>> {
        Ok(repository::list_recent(&self.db, HISTORY_LIMIT).await?)
    }
}
