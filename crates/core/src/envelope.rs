//! Outer `<interface>` envelope codec.

use crate::error::{Error, Result};
use crate::models::{Action, DataDescription, GlobalInfo, ReturnStateInfo};
use crate::parsing::{find_element, text_at_path};
use serde::Serialize;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
pub const ROOT_ELEMENT: &str = "interface";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str = "http://www.chinatax.gov.cn/tirip/dataspec/interfaces.xsd";
/// Value of the root `version` attribute.
pub const PROTOCOL_VERSION: &str = "DZFP1.0";

/// `Data` block of an outbound envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestData {
    #[serde(rename = "dataDescription")]
    pub description: DataDescription,
    /// Base64 of the encrypted inner document.
    pub content: String,
}

/// Envelope as it is sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEnvelope {
    pub global: GlobalInfo,
    pub return_state: ReturnStateInfo,
    pub data: RequestData,
}

#[derive(Serialize)]
#[serde(rename = "interface")]
struct WireEnvelope<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "@xmlns:xsi")]
    xmlns_xsi: &'static str,
    #[serde(rename = "@xsi:schemaLocation")]
    schema_location: &'static str,
    #[serde(rename = "@version")]
    version: &'static str,
    #[serde(rename = "globalInfo")]
    global: &'a GlobalInfo,
    #[serde(rename = "returnStateInfo")]
    return_state: &'a ReturnStateInfo,
    #[serde(rename = "Data")]
    data: &'a RequestData,
}

impl OutboundEnvelope {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let wire = WireEnvelope {
            xmlns: "",
            xmlns_xsi: XSI_NAMESPACE,
            schema_location: SCHEMA_LOCATION,
            version: PROTOCOL_VERSION,
            global: &self.global,
            return_state: &self.return_state,
            data: &self.data,
        };
        let body = quick_xml::se::to_string(&wire).map_err(|e| Error::encode("envelope", e))?;

        let mut out = String::with_capacity(XML_DECLARATION.len() + 1 + body.len());
        out.push_str(XML_DECLARATION);
        out.push('\n');
        out.push_str(&body);
        Ok(out.into_bytes())
    }
}

/// Which reply layout to expect. The service answers an issue request with
/// a bare acknowledgement and a download request with a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundShape {
    StatusOnly,
    WithContent,
}

impl From<Action> for InboundShape {
    fn from(action: Action) -> Self {
        match action {
            Action::MakeOut => InboundShape::StatusOnly,
            Action::Download => InboundShape::WithContent,
        }
    }
}

/// A decoded reply envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEnvelope {
    Acknowledgement {
        global: Option<GlobalInfo>,
        return_state: ReturnStateInfo,
    },
    Content {
        return_state: ReturnStateInfo,
        /// Still base64 ciphertext. Failure replies usually leave it out.
        content: Option<String>,
    },
}

impl InboundEnvelope {
    pub fn decode(bytes: &[u8], shape: InboundShape) -> Result<Self> {
        let xml = std::str::from_utf8(bytes).map_err(|e| Error::decode("envelope", e))?;
        let doc = roxmltree::Document::parse(xml).map_err(|e| Error::decode("envelope", e))?;
        let root = doc.root_element();
        if root.tag_name().name() != ROOT_ELEMENT {
            return Err(Error::decode(
                "envelope",
                format!("unexpected root element <{}>", root.tag_name().name()),
            ));
        }

        let return_state = decode_return_state(root)?;
        Ok(match shape {
            InboundShape::StatusOnly => InboundEnvelope::Acknowledgement {
                global: find_element(root, &["globalInfo"]).map(decode_global_info),
                return_state,
            },
            InboundShape::WithContent => InboundEnvelope::Content {
                return_state,
                content: text_at_path(root, &["Data", "content"]),
            },
        })
    }

    pub fn return_state(&self) -> &ReturnStateInfo {
        match self {
            InboundEnvelope::Acknowledgement { return_state, .. }
            | InboundEnvelope::Content { return_state, .. } => return_state,
        }
    }
}

fn decode_return_state(root: roxmltree::Node<'_, '_>) -> Result<ReturnStateInfo> {
    let state = find_element(root, &["returnStateInfo"])
        .ok_or_else(|| Error::decode("envelope", "missing returnStateInfo"))?;
    let return_code = text_at_path(state, &["returnCode"])
        .ok_or_else(|| Error::decode("envelope", "missing returnStateInfo/returnCode"))?;
    Ok(ReturnStateInfo {
        return_code,
        return_message: find_element(state, &["returnMessage"])
            .and_then(|n| n.text())
            .unwrap_or_default()
            .to_string(),
    })
}

fn decode_global_info(node: roxmltree::Node<'_, '_>) -> GlobalInfo {
    let field = |name: &str| text_at_path(node, &[name]).unwrap_or_default();
    GlobalInfo {
        terminal_code: field("terminalCode"),
        app_id: field("appId"),
        version: field("version"),
        interface_code: field("interfaceCode"),
        user_name: field("userName"),
        password: field("passWord"),
        taxpayer_id: field("taxpayerId"),
        authorization_code: field("authorizationCode"),
        request_code: field("requestCode"),
        request_time: field("requestTime"),
        response_code: field("responseCode"),
        data_exchange_id: field("dataExchangeId"),
    }
}
