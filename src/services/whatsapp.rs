// src/services/whatsapp.rs

// Integração com o canal de mensagens (API Baileys). Todas as funções de
// envio reportam sucesso/falha por destinatário e nunca propagam erro de
// rede: quem decide o que fazer com falhas é o dispatcher.

use base64::Engine;
use reqwest::StatusCode;
use serde_json::json;

use crate::models::settings::WhatsappSettings;

/// Dados mínimos para falar com a API: endpoint, chave e instância (número).
#[derive(Debug, Clone)]
pub struct WhatsappConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub phone_number: String,
}

/// Visão mesclada da configuração de uma empresa + o registro global.
#[derive(Debug, Clone)]
pub struct ResolvedWhatsapp {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Número remetente já normalizado com prefixo '+' (nome da instância).
    pub phone_number: Option<String>,
    pub is_connected: bool,

    pub alerts_enabled: bool,
    pub alert_recipients: Vec<String>,
    pub schedules_reminder_enabled: bool,
    pub schedules_reminder_recipients: Vec<String>,
    pub quote_pdf_to_seller: bool,
    pub quote_pdf_to_customer: bool,
}

impl ResolvedWhatsapp {
    /// Conexão pronta para envio: conectada e com número de instância.
    pub fn connection(&self) -> Option<WhatsappConfig> {
        if !self.is_connected {
            return None;
        }
        let phone_number = self.phone_number.clone()?;
        Some(WhatsappConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            phone_number,
        })
    }
}

const DEFAULT_API_URL: &str = "http://localhost:3025";

/// Resolve a configuração efetiva de uma empresa: usa a conexão própria
/// quando ela existe, senão cai no registro global. Função pura sobre as
/// duas linhas de configuração — não há estado compartilhado entre tenants.
pub fn resolve_config(
    company: Option<&WhatsappSettings>,
    global: Option<&WhatsappSettings>,
) -> Option<ResolvedWhatsapp> {
    if company.is_none() && global.is_none() {
        return None;
    }

    // A empresa tem conexão própria se tem número e ele não é apenas uma
    // cópia do número da instância global.
    let global_phone = global.and_then(|g| g.phone_number.as_deref());
    let has_own_connection = company
        .and_then(|c| c.phone_number.as_deref())
        .is_some_and(|p| Some(p) != global_phone);

    let connection_source = if has_own_connection { company } else { global };

    let raw_phone: Option<String> = connection_source
        .and_then(|s| s.phone_number.as_deref())
        .map(|p| p.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
        .filter(|digits| !digits.is_empty());

    // O nome da instância na API precisa do prefixo '+'
    let phone_number = raw_phone.map(|digits| format!("+{}", digits));

    Some(ResolvedWhatsapp {
        api_url: connection_source
            .map(|s| s.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        api_key: connection_source.and_then(|s| s.api_key.clone()),
        phone_number,
        is_connected: connection_source.is_some_and(|s| s.is_connected),

        // Toggles e destinatários são sempre da empresa; sem registro próprio,
        // tudo fica desligado.
        alerts_enabled: company.is_some_and(|c| c.alerts_enabled),
        alert_recipients: company.map(|c| c.alert_recipients.0.clone()).unwrap_or_default(),
        schedules_reminder_enabled: company.is_some_and(|c| c.schedules_reminder_enabled),
        schedules_reminder_recipients: company
            .map(|c| c.schedules_reminder_recipients.0.clone())
            .unwrap_or_default(),
        quote_pdf_to_seller: company.is_some_and(|c| c.quote_pdf_to_seller),
        quote_pdf_to_customer: company.is_some_and(|c| c.quote_pdf_to_customer),
    })
}

/// Converte um telefone em JID do WhatsApp: só dígitos + `@s.whatsapp.net`.
/// Números com 10/11 dígitos sem o DDI 55 ganham o prefixo do Brasil.
pub fn format_jid(number: &str) -> String {
    let mut digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();

    if !digits.starts_with("55") && (digits.len() == 10 || digits.len() == 11) {
        digits = format!("55{}", digits);
    }

    format!("{}@s.whatsapp.net", digits)
}

/// Relatório de um envio em lote: sucesso parcial é esperado e nunca vira erro.
#[derive(Debug, Default, Clone)]
pub struct SendReport {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Clone)]
pub struct WhatsappClient {
    http: reqwest::Client,
}

impl WhatsappClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Chamada de baixo nível à API. Falha de rede ou status não-2xx viram
    /// `false`; o detalhe vai para o log.
    async fn baileys_call(&self, config: &WhatsappConfig, body: serde_json::Value) -> bool {
        let url = format!(
            "{}/connections/{}/send-message",
            config.api_url.trim_end_matches('/'),
            urlencode(&config.phone_number),
        );

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &config.api_key {
            request = request.header("x-api-key", key);
        }

        match request.send().await {
            Ok(response) => {
                let status: StatusCode = response.status();
                if status.is_success() {
                    tracing::debug!("[baileys] envio ok ({})", status);
                    true
                } else {
                    let detail = response.text().await.unwrap_or_default();
                    tracing::error!("[baileys] erro {}: {}", status, detail);
                    false
                }
            }
            Err(err) => {
                tracing::error!("[baileys] falha de rede: {}", err);
                false
            }
        }
    }

    /// Envia texto para cada destinatário de forma independente.
    pub async fn send_message(
        &self,
        config: &WhatsappConfig,
        to_numbers: &[String],
        text: &str,
    ) -> SendReport {
        let mut report = SendReport::default();

        for number in to_numbers {
            let jid = format_jid(number);
            let ok = self
                .baileys_call(
                    config,
                    json!({
                        "jid": jid,
                        "messageContent": { "text": text }
                    }),
                )
                .await;

            if ok {
                report.sent.push(number.clone());
            } else {
                report.failed.push(number.clone());
            }
        }

        report
    }

    /// Envia um documento PDF (em base64) para cada destinatário.
    pub async fn send_pdf(
        &self,
        config: &WhatsappConfig,
        to_numbers: &[String],
        pdf: &[u8],
        file_name: &str,
        caption: &str,
    ) -> SendReport {
        let mut report = SendReport::default();
        let encoded = base64::engine::general_purpose::STANDARD.encode(pdf);

        for number in to_numbers {
            let jid = format_jid(number);
            let ok = self
                .baileys_call(
                    config,
                    json!({
                        "jid": jid,
                        "messageContent": {
                            "document": encoded,
                            "fileName": file_name,
                            "mimetype": "application/pdf",
                            "caption": caption
                        }
                    }),
                )
                .await;

            if ok {
                report.sent.push(number.clone());
            } else {
                report.failed.push(number.clone());
            }
        }

        report
    }
}

impl Default for WhatsappClient {
    fn default() -> Self {
        Self::new()
    }
}

// O nome da instância carrega um '+', que precisa ser escapado na URL.
// Percorre os bytes UTF-8 para que caracteres multibyte saiam corretos.
fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                char::from(b).to_string()
            }
            other => format!("%{:02X}", other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::WhatsappSettings;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn settings(phone: Option<&str>, is_global: bool, connected: bool) -> WhatsappSettings {
        WhatsappSettings {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            api_url: "http://localhost:3025".to_string(),
            api_key: Some("chave".to_string()),
            phone_number: phone.map(str::to_string),
            is_connected: connected,
            alerts_enabled: true,
            alert_recipients: Json(vec!["11988887777".to_string()]),
            schedules_reminder_enabled: false,
            schedules_reminder_recipients: Json(vec![]),
            quote_pdf_to_seller: true,
            quote_pdf_to_customer: false,
            is_global,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn urlencode_escapes_plus_and_multibyte() {
        assert_eq!(urlencode("+5511999999999"), "%2B5511999999999");
        // Cada byte UTF-8 vira um %XX próprio
        assert_eq!(urlencode("são"), "s%C3%A3o");
        assert_eq!(urlencode("abc-123_~."), "abc-123_~.");
    }

    #[test]
    fn jid_keeps_numbers_with_country_code() {
        assert_eq!(format_jid("+55 (11) 98888-7777"), "5511988887777@s.whatsapp.net");
    }

    #[test]
    fn jid_prepends_brazil_code_for_local_numbers() {
        assert_eq!(format_jid("11988887777"), "5511988887777@s.whatsapp.net");
        assert_eq!(format_jid("1133334444"), "551133334444@s.whatsapp.net");
    }

    #[test]
    fn jid_leaves_other_lengths_untouched() {
        assert_eq!(format_jid("123"), "123@s.whatsapp.net");
    }

    #[test]
    fn resolve_none_when_nothing_configured() {
        assert!(resolve_config(None, None).is_none());
    }

    #[test]
    fn resolve_uses_own_connection_when_distinct() {
        let company = settings(Some("+5511911112222"), false, true);
        let global = settings(Some("+5511900000000"), true, true);

        let resolved = resolve_config(Some(&company), Some(&global)).unwrap();
        assert_eq!(resolved.phone_number.as_deref(), Some("+5511911112222"));
        assert!(resolved.is_connected);
    }

    #[test]
    fn resolve_falls_back_to_global_connection() {
        // Empresa sem número próprio: conexão vem do registro global,
        // toggles continuam vindo da empresa.
        let company = settings(None, false, false);
        let global = settings(Some("+5511900000000"), true, true);

        let resolved = resolve_config(Some(&company), Some(&global)).unwrap();
        assert_eq!(resolved.phone_number.as_deref(), Some("+5511900000000"));
        assert!(resolved.is_connected);
        assert!(resolved.alerts_enabled);
        assert!(resolved.quote_pdf_to_seller);
    }

    #[test]
    fn resolve_without_company_record_disables_toggles() {
        let global = settings(Some("+5511900000000"), true, true);

        let resolved = resolve_config(None, Some(&global)).unwrap();
        assert!(resolved.is_connected);
        assert!(!resolved.alerts_enabled);
        assert!(!resolved.quote_pdf_to_seller);
        assert!(resolved.alert_recipients.is_empty());
    }

    #[test]
    fn connection_requires_connected_flag_and_phone() {
        let mut resolved = resolve_config(Some(&settings(Some("+5511911112222"), false, true)), None).unwrap();
        assert!(resolved.connection().is_some());

        resolved.is_connected = false;
        assert!(resolved.connection().is_none());

        resolved.is_connected = true;
        resolved.phone_number = None;
        assert!(resolved.connection().is_none());
    }
}
