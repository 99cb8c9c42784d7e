use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::sinks::{AuditRecord, AuditTrail, NotificationMessage, Notifier};

use crate::supabase::SupabaseClient;

/// Notification dispatch through the notifications table; an external
/// worker owns delivery.
pub struct SupabaseNotifier {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseNotifier {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl Notifier for SupabaseNotifier {
    async fn notify(&self, message: NotificationMessage) -> Result<()> {
        debug!("Queueing notification for {}", message.recipient_id);

        let payload = json!({
            "recipient_id": message.recipient_id,
            "type": message.kind,
            "title": message.title,
            "message": message.message,
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/notifications",
                Some(payload),
                Some(headers),
            )
            .await?;

        Ok(())
    }
}

pub struct SupabaseAuditTrail {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAuditTrail {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AuditTrail for SupabaseAuditTrail {
    async fn record(&self, entry: AuditRecord) -> Result<()> {
        debug!("Recording audit action {}", entry.action);

        let payload = json!({
            "action": entry.action,
            "actor_id": entry.actor_id,
            "actor_role": entry.actor_role,
            "details": entry.details,
            "ip_address": entry.ip_address,
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/audit_logs",
                Some(payload),
                Some(headers),
            )
            .await?;

        Ok(())
    }
}
