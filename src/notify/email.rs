//! 邮件渠道 - SMTP 投递 HTML 报告
//!
//! 正文是 HTML 报告，同一份 HTML 再作为带日期的 .html 附件挂在邮件上，
//! 方便存档。收件人可以多个。

use super::channel::{Channel, SendResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

/// SMTP 连接与收发件配置
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
    /// true 走 465 隐式 TLS，false 走 STARTTLS
    pub use_ssl: bool,
}

/// 邮件渠道
pub struct EmailChannel {
    name: String,
    enabled: bool,
    settings: SmtpSettings,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailChannel {
    pub fn new(settings: SmtpSettings, enabled: bool) -> Result<Self> {
        let transport = if enabled {
            let credentials =
                Credentials::new(settings.username.clone(), settings.password.clone());
            let builder = if settings.use_ssl {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.server)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            }
            .context("failed to create SMTP relay")?;
            Some(
                builder
                    .port(settings.port)
                    .credentials(credentials)
                    .build(),
            )
        } else {
            None
        };
        Ok(Self {
            name: "email".to_string(),
            enabled,
            settings,
            transport,
        })
    }

    fn build_message(&self, html: &str) -> Result<Message> {
        let current_date = Local::now().format("%Y-%m-%d");
        let file_date = Local::now().format("%Y%m%d");
        let subject = format!("华为云资源和账单汇总报告 ({current_date})");

        let from: Mailbox = self
            .settings
            .from
            .parse()
            .context("invalid from address")?;
        let mut builder = Message::builder().from(from).subject(subject);
        for recipient in &self.settings.to {
            let to: Mailbox = recipient
                .trim()
                .parse()
                .with_context(|| format!("invalid recipient address: {recipient}"))?;
            builder = builder.to(to);
        }

        let body = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(html.to_string());
        let attachment = Attachment::new(format!("华为云资源报告-{file_date}.html"))
            .body(html.to_string(), ContentType::TEXT_HTML);

        builder
            .multipart(MultiPart::mixed().singlepart(body).singlepart(attachment))
            .context("failed to build email message")
    }
}

#[async_trait]
impl Channel for EmailChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn deliver(&self, content: &str) -> Result<SendResult> {
        if !self.enabled {
            return Ok(SendResult::Skipped("email disabled".to_string()));
        }
        let transport = match &self.transport {
            Some(t) => t,
            None => return Ok(SendResult::Failed("smtp transport not built".to_string())),
        };

        let message = self.build_message(content)?;
        info!(
            server = %self.settings.server,
            recipients = self.settings.to.len(),
            "Sending email report"
        );
        match transport.send(message).await {
            Ok(_) => {
                info!("Email sent");
                Ok(SendResult::Sent)
            }
            Err(e) => {
                error!(error = %e, "Email send failed");
                Ok(SendResult::Failed(e.to_string()))
            }
        }
    }
}
