use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{CancellationNotice, ConfirmationNotice, RescheduleNotice};

/// Best-effort patient notifications over an HTTP mail relay. Delivery
/// failures are logged and reported as `false`; they must never fail the
/// data mutation that triggered them.
pub struct NotificationService {
    client: Client,
    relay_url: String,
    relay_token: String,
    from: String,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            relay_url: config.mail_relay_url.clone(),
            relay_token: config.mail_relay_token.clone(),
            from: config.mail_from.clone(),
        }
    }

    pub async fn send_confirmation(&self, notice: &ConfirmationNotice) -> bool {
        let chair = notice.chair.as_deref().unwrap_or("No asignado");
        let body = format!(
            "Hola {},\n\nTu cita ha sido registrada correctamente.\n\n\
             Fecha: {}\nHora: {}\nSillón: {}\n\n\
             Si no puedes asistir, responde a este correo para avisarnos.\n\n\
             Higiene Bucodental - Clínica Dental",
            notice.name,
            spanish_date(notice.date),
            notice.time,
            chair,
        );

        self.deliver(
            &notice.email,
            "✅ Confirmación de Cita - Higiene Bucodental",
            &body,
        )
        .await
    }

    pub async fn send_cancellation(&self, notice: &CancellationNotice) -> bool {
        let body = format!(
            "Hola {},\n\nTu cita del {} a las {} ha sido cancelada.\n\n\
             Motivo: {}\n\n\
             Puedes reservar una nueva cita cuando quieras.\n\n\
             Higiene Bucodental - Clínica Dental",
            notice.name,
            spanish_date(notice.date),
            notice.time,
            notice.reason,
        );

        self.deliver(
            &notice.email,
            "❌ Cancelación de Cita - Higiene Bucodental",
            &body,
        )
        .await
    }

    pub async fn send_reschedule(&self, notice: &RescheduleNotice) -> bool {
        let body = format!(
            "Hola {},\n\nTu cita ha sido modificada.\n\n\
             Cita anterior: {} a las {} (sillón {})\n\
             Cita nueva: {} a las {} (sillón {})\n\n\
             Si la nueva cita no te viene bien, responde a este correo.\n\n\
             Higiene Bucodental - Clínica Dental",
            notice.name,
            spanish_date(notice.old_date),
            notice.old_time,
            notice.old_chair.as_deref().unwrap_or("-"),
            spanish_date(notice.new_date),
            notice.new_time,
            notice.new_chair.as_deref().unwrap_or("-"),
        );

        self.deliver(
            &notice.email,
            "📅 Modificación de Cita - Higiene Bucodental",
            &body,
        )
        .await
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> bool {
        match self.post_message(to, subject, body).await {
            Ok(()) => {
                debug!("Notification delivered to {}: {}", to, subject);
                true
            }
            Err(e) => {
                warn!("Notification to {} failed: {}", to, e);
                false
            }
        }
    }

    async fn post_message(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.relay_url.is_empty() {
            return Err(anyhow!("mail relay not configured"));
        }

        let mut req = self.client.post(format!("{}/send", self.relay_url)).json(&json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": body,
        }));

        if !self.relay_token.is_empty() {
            req = req.bearer_auth(&self.relay_token);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("mail relay error ({}): {}", status, detail));
        }

        Ok(())
    }
}

fn spanish_date(date: NaiveDate) -> String {
    let weekday = match date.weekday() {
        chrono::Weekday::Mon => "lunes",
        chrono::Weekday::Tue => "martes",
        chrono::Weekday::Wed => "miércoles",
        chrono::Weekday::Thu => "jueves",
        chrono::Weekday::Fri => "viernes",
        chrono::Weekday::Sat => "sábado",
        chrono::Weekday::Sun => "domingo",
    };
    format!("{} {}", weekday, date.format("%d/%m/%Y"))
}
