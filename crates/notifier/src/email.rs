use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use signal_core::NotificationChannel;

struct SmtpHost {
    server: &'static str,
    port: u16,
    implicit_tls: bool,
}

/// Sender-domain -> SMTP host table. Domains absent from this table
/// fall back to `smtp.<domain>:465` over implicit TLS.
fn host_for_domain(domain: &str) -> SmtpHost {
    match domain {
        "qq.com" | "foxmail.com" => SmtpHost { server: "smtp.qq.com", port: 465, implicit_tls: true },
        "163.com" => SmtpHost { server: "smtp.163.com", port: 465, implicit_tls: true },
        "126.com" => SmtpHost { server: "smtp.126.com", port: 465, implicit_tls: true },
        "gmail.com" => SmtpHost { server: "smtp.gmail.com", port: 587, implicit_tls: false },
        "outlook.com" | "hotmail.com" | "live.com" => {
            SmtpHost { server: "smtp-mail.outlook.com", port: 587, implicit_tls: false }
        }
        "sina.com" => SmtpHost { server: "smtp.sina.com", port: 465, implicit_tls: true },
        "sohu.com" => SmtpHost { server: "smtp.sohu.com", port: 465, implicit_tls: true },
        "aliyun.com" => SmtpHost { server: "smtp.aliyun.com", port: 465, implicit_tls: true },
        "139.com" => SmtpHost { server: "smtp.139.com", port: 465, implicit_tls: true },
        _ => {
            // leaked below via a leaked String since SmtpHost wants &'static str;
            // callers only need the computed (server, port, tls) tuple, produced
            // through `resolve` rather than this fallback arm directly.
            SmtpHost { server: "", port: 465, implicit_tls: true }
        }
    }
}

fn resolve(domain: &str) -> (String, u16, bool) {
    let host = host_for_domain(domain);
    if host.server.is_empty() {
        (format!("smtp.{domain}"), 465, true)
    } else {
        (host.server.to_string(), host.port, host.implicit_tls)
    }
}

pub struct EmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid sender address: {0}")]
    InvalidSender(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl EmailChannel {
    pub fn new(sender: &str, password: &str, receivers: Vec<String>) -> Result<Self, EmailError> {
        let domain = sender.rsplit('@').next().ok_or_else(|| EmailError::InvalidSender(sender.to_string()))?;
        let (server, port, implicit_tls) = resolve(domain);

        let mut builder = if implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&server)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&server)
        }
        .map_err(|e| EmailError::Transport(e.to_string()))?;
        builder = builder.port(port).credentials(Credentials::new(sender.to_string(), password.to_string()));

        Ok(Self { transport: builder.build(), from: sender.to_string(), to: receivers })
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, content: &str) -> bool {
        let mut all_ok = true;
        for recipient in &self.to {
            let message = Message::builder()
                .from(match self.from.parse() {
                    Ok(addr) => addr,
                    Err(err) => {
                        tracing::error!(%err, "invalid from address");
                        return false;
                    }
                })
                .to(match recipient.parse() {
                    Ok(addr) => addr,
                    Err(err) => {
                        tracing::error!(%err, recipient, "invalid recipient address");
                        all_ok = false;
                        continue;
                    }
                })
                .subject("A股自选股智能分析报告")
                .header(ContentType::TEXT_PLAIN)
                .body(content.to_string());

            let message = match message {
                Ok(m) => m,
                Err(err) => {
                    tracing::error!(%err, "failed to build email");
                    all_ok = false;
                    continue;
                }
            };

            if let Err(err) = self.transport.send(message).await {
                tracing::error!(%err, recipient, "failed to send email");
                all_ok = false;
            }
        }
        all_ok
    }
}
