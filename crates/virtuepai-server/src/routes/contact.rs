//! Contact form route: `POST /api/contact`.
//!
//! Turns a submission into an HTML notification mail. The mail transport is
//! resolved from configuration on every request; if it cannot be resolved
//! the client gets a generic failure and the reason goes to the log only.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use virtuepai_core::mail::{MailTransportConfig, resolve_mail_config};

use crate::error::AppError;
use crate::mailer::OutgoingMail;
use crate::state::AppState;

/// Shown to the client for every server-side failure.
pub const SUBMIT_FAILED: &str = "提交失败，请稍后再试";

const SUBMIT_OK: &str = "提交成功";
const SENDER_NAME: &str = "维普特智能客服";
const SUBJECT: &str = "新的客户咨询信息";
const NOT_PROVIDED: &str = "未提供";

/// Longest accepted value for any single field.
const MAX_FIELD_CHARS: usize = 200;

/// Build the `/api/contact` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(submit_contact))
}

/// Request body for `POST /api/contact`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Response body for `POST /api/contact`.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
}

async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let Json(request) = payload?;

    let contact = request
        .contact
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("请填写联系方式".to_owned()))?;

    for value in [request.name.as_deref(), Some(contact), request.company.as_deref()]
        .into_iter()
        .flatten()
    {
        if value.chars().count() > MAX_FIELD_CHARS {
            return Err(AppError::BadRequest(format!(
                "字段长度不能超过{MAX_FIELD_CHARS}个字符"
            )));
        }
    }

    let Some(transport) = resolve_mail_config(&state.mail_settings, &state.codec)
        .filter(MailTransportConfig::has_credentials)
    else {
        error!("mail transport is not configured, contact submission dropped");
        return Err(AppError::Internal(SUBMIT_FAILED.to_owned()));
    };

    let html_body = render_notification(
        request.name.as_deref(),
        contact,
        request.company.as_deref(),
        Utc::now().with_timezone(&Shanghai),
    );

    let mail = OutgoingMail {
        from: format!("{SENDER_NAME} <{}>", transport.user),
        to: state.contact_recipient.clone(),
        subject: SUBJECT.to_owned(),
        html_body,
    };

    state.mailer.send(&transport, mail).await.map_err(|e| {
        error!(error = %e, "failed to deliver contact notification");
        AppError::Internal(SUBMIT_FAILED.to_owned())
    })?;

    info!("contact submission delivered");

    Ok(Json(ContactResponse {
        success: true,
        message: SUBMIT_OK,
    }))
}

/// Render the notification body. All submitted text is HTML-escaped.
#[must_use]
pub fn render_notification(
    name: Option<&str>,
    contact: &str,
    company: Option<&str>,
    submitted_at: DateTime<Tz>,
) -> String {
    let or_missing = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| NOT_PROVIDED.to_owned(), escape_html)
    };

    format!(
        "<h2>收到新的客户咨询信息</h2>\n\
         <p><strong>提交时间:</strong> {}</p>\n\
         <p><strong>称呼:</strong> {}</p>\n\
         <p><strong>联系方式:</strong> {}</p>\n\
         <p><strong>公司名称:</strong> {}</p>\n",
        submitted_at.format("%Y/%-m/%-d %H:%M:%S"),
        or_missing(name),
        escape_html(contact),
        or_missing(company),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
