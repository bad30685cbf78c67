use super::transport::{HttpRequest, HttpTransport, Transport};
use anyhow::Context;
use base64::prelude::*;
use dzfp_core::ids::{self, IdGenerator, SequentialIdGenerator};
use dzfp_core::parsing::compute_sha256_hex;
use dzfp_core::{
    crypto, password, CipherKey, DataDescription, DownloadRequest, Error, GlobalInfo,
    InboundEnvelope, InvoiceResult, IssueRequest, OutboundEnvelope, RequestContent, RequestData,
    Result, ReturnStateInfo, TransportError,
};
use std::path::Path;
use std::time::Duration;

/// Client for the DZFP issue/download interface.
///
/// Configuration is fixed at construction. Every call works on its own copy
/// of the session metadata, so one client can serve concurrent calls.
pub struct InvoiceClient<T> {
    endpoint: String,
    key: CipherKey,
    global: GlobalInfo,
    platform_code: String,
    registration_code: Option<String>,
    description: Option<DataDescription>,
    ids: Box<dyn IdGenerator>,
    transport: T,
}

impl<T: Transport> InvoiceClient<T> {
    /// The platform code defaults to the configured user name, which is how
    /// the platform provisions accounts.
    pub fn new(endpoint: impl Into<String>, key: CipherKey, global: GlobalInfo, transport: T) -> Self {
        Self {
            endpoint: endpoint.into(),
            key,
            platform_code: global.user_name.clone(),
            global,
            registration_code: None,
            description: None,
            ids: Box::new(SequentialIdGenerator::default()),
            transport,
        }
    }

    pub fn with_platform_code(mut self, platform_code: impl Into<String>) -> Self {
        self.platform_code = platform_code.into();
        self
    }

    /// Derive a fresh `passWord` for every call instead of sending the
    /// configured one.
    pub fn with_registration_code(mut self, registration_code: impl Into<String>) -> Self {
        self.registration_code = Some(registration_code.into());
        self
    }

    pub fn with_description(mut self, description: DataDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn global(&self) -> &GlobalInfo {
        &self.global
    }

    /// Issue an invoice.
    ///
    /// The service acknowledges with a bare status. Whatever status comes
    /// back is the answer, so a non-success code is returned, not raised.
    pub async fn make_out(&self, mut request: IssueRequest) -> Result<ReturnStateInfo> {
        if request.header.platform_code.is_empty() {
            request.header.platform_code = self.platform_code.clone();
        }
        if request.header.request_serial.is_empty() {
            request.header.request_serial = self.ids.request_serial(&request.header.platform_code);
        }
        let serial = request.header.request_serial.clone();

        let return_state = match self.exchange(request.into()).await? {
            InboundEnvelope::Acknowledgement { return_state, .. }
            | InboundEnvelope::Content { return_state, .. } => return_state,
        };

        if return_state.is_success() {
            tracing::info!(fpqqlsh = %serial, "invoice issue accepted");
        } else {
            tracing::warn!(
                fpqqlsh = %serial,
                return_code = %return_state.return_code,
                return_message = %return_state.return_message,
                "invoice issue rejected"
            );
        }
        Ok(return_state)
    }

    /// Download the issuance result of an invoice.
    ///
    /// A non-success return code becomes [`Error::Protocol`] and the content
    /// block is left untouched.
    pub async fn download(&self, mut request: DownloadRequest) -> Result<InvoiceResult> {
        if request.platform_code.is_empty() {
            request.platform_code = self.platform_code.clone();
        }
        let serial = request.request_serial.clone();

        let (return_state, content) = match self.exchange(request.into()).await? {
            InboundEnvelope::Content {
                return_state,
                content,
            } => (return_state, content),
            InboundEnvelope::Acknowledgement { return_state, .. } => (return_state, None),
        };

        if !return_state.is_success() {
            tracing::warn!(
                fpqqlsh = %serial,
                return_code = %return_state.return_code,
                return_message = %return_state.return_message,
                "invoice download rejected"
            );
            return Err(Error::Protocol {
                code: return_state.return_code,
                message: return_state.return_message,
            });
        }

        let content = content.ok_or_else(|| Error::Decode {
            what: "envelope",
            reason: "successful reply without Data/content".to_string(),
        })?;
        let result = self.open_content(&content)?;

        tracing::info!(
            fpqqlsh = %result.request_serial,
            invoice_number = result.invoice_number.as_deref().unwrap_or_default(),
            "invoice downloaded"
        );
        Ok(result)
    }

    /// Everything up to the wire: patched inner document, encrypted and
    /// wrapped with this call's session metadata.
    pub fn build_envelope(&self, content: &RequestContent) -> Result<OutboundEnvelope> {
        let action = content.action();
        let inner = content.to_patched_xml()?;
        let ciphertext = crypto::encrypt(inner.as_bytes(), &self.key)?;
        tracing::debug!(
            interface_code = action.interface_code(),
            plaintext_bytes = inner.len(),
            payload_sha256 = %compute_sha256_hex(inner.as_bytes()),
            "encrypted request content"
        );

        let mut global = self.global.clone();
        global.interface_code = action.interface_code().to_string();
        global.request_time = ids::request_time();
        if global.data_exchange_id.is_empty() {
            global.data_exchange_id = self.ids.data_exchange_id(&global.request_code);
        }
        if let Some(code) = &self.registration_code {
            global.password = password::generate_password(code);
        }

        Ok(OutboundEnvelope {
            global,
            return_state: ReturnStateInfo::default(),
            data: RequestData {
                description: self.description.clone().unwrap_or_default(),
                content: BASE64_STANDARD.encode(ciphertext),
            },
        })
    }

    async fn exchange(&self, content: RequestContent) -> Result<InboundEnvelope> {
        let action = content.action();
        let body = self.build_envelope(&content)?.encode()?;

        tracing::debug!(
            interface_code = action.interface_code(),
            endpoint = %self.endpoint,
            bytes = body.len(),
            "sending request"
        );
        let response = self
            .transport
            .send(HttpRequest::post_xml(&self.endpoint, body))
            .await?;
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            }
            .into());
        }

        InboundEnvelope::decode(&response.body, action.into())
    }

    fn open_content(&self, content: &str) -> Result<InvoiceResult> {
        // Some gateways wrap long base64 lines.
        let compact: String = content.split_whitespace().collect();
        let ciphertext = BASE64_STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::Decode {
                what: "content",
                reason: e.to_string(),
            })?;
        let plaintext = crypto::decrypt(&ciphertext, &self.key)?;
        let xml = String::from_utf8(plaintext).map_err(|e| Error::Decode {
            what: "content",
            reason: e.to_string(),
        })?;
        InvoiceResult::from_xml(&xml)
    }
}

impl InvoiceClient<HttpTransport> {
    /// Wire a client from the config in the platform config directory.
    pub fn from_stored_config() -> anyhow::Result<Self> {
        let cfg = config::load()?;
        Self::from_app_config(&cfg)
    }

    pub fn from_config_file(path: &Path) -> anyhow::Result<Self> {
        let cfg = config::load_path(path)?;
        Self::from_app_config(&cfg)
    }

    /// Wire a client from the stored configuration and keychain secrets.
    pub fn from_app_config(cfg: &config::AppConfig) -> anyhow::Result<Self> {
        let secret = config::resolve_secret(config::SHARED_KEY_ENV, config::SHARED_KEY_SECRET)
            .context("DZFP shared key not found in env or keychain")?;
        let key = CipherKey::from_secret(&secret).context("Invalid DZFP shared key")?;

        let registration_code =
            config::resolve_secret(config::REGISTRATION_CODE_ENV, config::REGISTRATION_CODE_SECRET)
                .ok();
        let password = match registration_code {
            Some(_) => String::new(),
            None => config::resolve_secret(config::PASSWORD_ENV, config::PASSWORD_SECRET)
                .context("DZFP password or registration code not found in env or keychain")?,
        };

        let identity = &cfg.identity;
        let global = GlobalInfo {
            terminal_code: identity.terminal_code.clone(),
            app_id: identity.app_id.clone(),
            user_name: identity.user_name.clone(),
            password,
            taxpayer_id: identity.taxpayer_id.clone(),
            authorization_code: identity.authorization_code.clone(),
            request_code: identity.request_code.clone(),
            response_code: identity.response_code.clone(),
            ..GlobalInfo::default()
        };

        let transport = HttpTransport::new(Duration::from_secs(cfg.timeout_secs))
            .context("Failed to create HTTP transport")?;
        let mut client = InvoiceClient::new(cfg.endpoint.clone(), key, global, transport);
        if let Some(platform_code) = &identity.platform_code {
            client = client.with_platform_code(platform_code.clone());
        }
        if let Some(code) = registration_code {
            tracing::info!("Using derived DZFP passwords");
            client = client.with_registration_code(code);
        }
        Ok(client)
    }
}
