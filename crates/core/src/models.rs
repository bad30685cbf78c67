use serde::{Deserialize, Serialize};

/// Return code the service uses for a successful exchange.
pub const SUCCESS_CODE: &str = "0000";

/// Protocol version carried in `globalInfo/version`.
pub const GLOBAL_INFO_VERSION: &str = "2.0";

/// The two requests the service understands. The interface code is written
/// into every outbound envelope and decides how the reply is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 开具发票: issue an invoice.
    MakeOut,
    /// 下载发票: fetch an issued invoice.
    Download,
}

impl Action {
    pub const MAKE_OUT_CODE: &'static str = "ECXML.FPKJ.BC.E_INV";
    pub const DOWNLOAD_CODE: &'static str = "ECXML.FPXZ.CX.E_INV";

    pub fn interface_code(self) -> &'static str {
        match self {
            Action::MakeOut => Self::MAKE_OUT_CODE,
            Action::Download => Self::DOWNLOAD_CODE,
        }
    }

    pub fn from_interface_code(code: &str) -> Option<Self> {
        match code {
            Self::MAKE_OUT_CODE => Some(Action::MakeOut),
            Self::DOWNLOAD_CODE => Some(Action::Download),
            _ => None,
        }
    }
}

/// Identity and session metadata (`globalInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalInfo {
    #[serde(rename = "terminalCode")]
    pub terminal_code: String,
    #[serde(rename = "appId")]
    pub app_id: String,
    pub version: String,
    #[serde(rename = "interfaceCode")]
    pub interface_code: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "passWord")]
    pub password: String,
    #[serde(rename = "taxpayerId")]
    pub taxpayer_id: String,
    #[serde(rename = "authorizationCode")]
    pub authorization_code: String,
    #[serde(rename = "requestCode")]
    pub request_code: String,
    #[serde(rename = "requestTime")]
    pub request_time: String,
    #[serde(rename = "responseCode")]
    pub response_code: String,
    #[serde(rename = "dataExchangeId")]
    pub data_exchange_id: String,
}

impl Default for GlobalInfo {
    fn default() -> Self {
        Self {
            terminal_code: String::new(),
            app_id: String::new(),
            version: GLOBAL_INFO_VERSION.to_string(),
            interface_code: String::new(),
            user_name: String::new(),
            password: String::new(),
            taxpayer_id: String::new(),
            authorization_code: String::new(),
            request_code: String::new(),
            request_time: String::new(),
            response_code: String::new(),
            data_exchange_id: String::new(),
        }
    }
}

/// Status block (`returnStateInfo`). Outbound envelopes carry an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStateInfo {
    #[serde(rename = "returnCode")]
    pub return_code: String,
    #[serde(rename = "returnMessage")]
    pub return_message: String,
}

impl ReturnStateInfo {
    pub fn is_success(&self) -> bool {
        self.return_code == SUCCESS_CODE
    }
}

/// How the `content` block is packaged (`dataDescription`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDescription {
    /// "0" means uncompressed.
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    /// "1" means encrypted.
    #[serde(rename = "encryptCode")]
    pub encrypt_code: String,
    /// Informational only; the cipher is agreed out of band.
    #[serde(rename = "codeType")]
    pub code_type: String,
}

impl Default for DataDescription {
    fn default() -> Self {
        Self {
            zip_code: "0".to_string(),
            encrypt_code: "1".to_string(),
            code_type: "3DES".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_codes_map_both_ways() {
        for action in [Action::MakeOut, Action::Download] {
            assert_eq!(
                Action::from_interface_code(action.interface_code()),
                Some(action)
            );
        }
        assert_eq!(Action::from_interface_code("ECXML.UNKNOWN"), None);
    }

    #[test]
    fn defaults_match_the_service_expectations() {
        assert_eq!(GlobalInfo::default().version, "2.0");

        let description = DataDescription::default();
        assert_eq!(description.zip_code, "0");
        assert_eq!(description.encrypt_code, "1");
        assert_eq!(description.code_type, "3DES");
    }
}
