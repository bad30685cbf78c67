//! Inner documents exchanged inside the encrypted `content` block.
//!
//! Field names follow the tax bureau's schema; the Rust names describe what
//! each element holds. Optional elements are left out of the XML when unset.

use crate::error::{Error, Result};
use crate::models::Action;
use crate::schema;
use serde::{Deserialize, Serialize};

/// `CZDM` values.
pub mod operation {
    /// 正票正常开具
    pub const NORMAL: &str = "10";
    /// 退货折让红票
    pub const REVERSAL: &str = "20";
}

/// Invoice header (`FPKJXX_FPTXX`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// 发票请求唯一流水号. Generated by the client when left empty.
    #[serde(rename = "FPQQLSH")]
    pub request_serial: String,
    /// 平台编码. Filled from the client configuration when left empty.
    #[serde(rename = "DSPTBM")]
    pub platform_code: String,
    #[serde(rename = "NSRSBH")]
    pub taxpayer_id: String,
    #[serde(rename = "NSRMC")]
    pub taxpayer_name: String,
    /// 代开标志
    #[serde(rename = "DKBZ")]
    pub agent_flag: String,
    /// Main item on the invoice, usually the first line.
    #[serde(rename = "KPXM")]
    pub main_item: String,
    /// 编码表版本号
    #[serde(rename = "BMB_BBH")]
    pub catalogue_version: String,
    #[serde(rename = "XHF_NSRSBH")]
    pub seller_taxpayer_id: String,
    #[serde(rename = "XHFMC")]
    pub seller_name: String,
    #[serde(rename = "XHF_DZ")]
    pub seller_address: String,
    #[serde(rename = "XHF_DH")]
    pub seller_phone: String,
    #[serde(rename = "XHF_YHZH", skip_serializing_if = "Option::is_none")]
    pub seller_bank_account: Option<String>,
    #[serde(rename = "GHFMC")]
    pub buyer_name: String,
    #[serde(rename = "GHFQYLX")]
    pub buyer_kind: String,
    #[serde(rename = "GHF_DZ", skip_serializing_if = "Option::is_none")]
    pub buyer_address: Option<String>,
    #[serde(rename = "GHF_GDDH", skip_serializing_if = "Option::is_none")]
    pub buyer_phone: Option<String>,
    #[serde(rename = "GHF_SJ", skip_serializing_if = "Option::is_none")]
    pub buyer_mobile: Option<String>,
    #[serde(rename = "GHF_EMAIL", skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(rename = "GHF_YHZH", skip_serializing_if = "Option::is_none")]
    pub buyer_bank_account: Option<String>,
    #[serde(rename = "HY_DM", skip_serializing_if = "Option::is_none")]
    pub industry_code: Option<String>,
    #[serde(rename = "HY_MC", skip_serializing_if = "Option::is_none")]
    pub industry_name: Option<String>,
    /// 开票员
    #[serde(rename = "KPY")]
    pub issuer: String,
    /// 收款员
    #[serde(rename = "SKY", skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    /// 复核人
    #[serde(rename = "FHR", skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    #[serde(rename = "KPRQ", skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(rename = "KPLX")]
    pub invoice_kind: String,
    /// See [`operation`].
    #[serde(rename = "CZDM")]
    pub operation_code: String,
    /// Reversals reference the original invoice code and number.
    #[serde(rename = "YFP_DM", skip_serializing_if = "Option::is_none")]
    pub original_invoice_code: Option<String>,
    #[serde(rename = "YFP_HM", skip_serializing_if = "Option::is_none")]
    pub original_invoice_number: Option<String>,
    /// 清单标志, "0" unless the invoice carries a goods list.
    #[serde(rename = "QD_BZ")]
    pub list_flag: String,
    #[serde(rename = "QDXMMC", skip_serializing_if = "Option::is_none")]
    pub list_item_name: Option<String>,
    #[serde(rename = "CHYY", skip_serializing_if = "Option::is_none")]
    pub reversal_reason: Option<String>,
    /// "0" normal reversal, "1" special reversal of a paper invoice.
    #[serde(rename = "TSCHBZ", skip_serializing_if = "Option::is_none")]
    pub special_reversal_flag: Option<String>,
    /// 价税合计金额
    #[serde(rename = "KPHJJE")]
    pub total_amount: String,
}

/// One invoice line (`FPKJXX_XMXX`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "XMMC")]
    pub name: String,
    #[serde(rename = "XMDW", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "GGXH", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "XMSL")]
    pub quantity: String,
    /// "1" when prices include tax, "0" otherwise.
    #[serde(rename = "HSBZ")]
    pub tax_included: String,
    /// 发票行性质: "0" normal, "1" discount, "2" discounted line.
    #[serde(rename = "FPHXZ")]
    pub line_kind: String,
    #[serde(rename = "SPBM")]
    pub commodity_code: String,
    #[serde(rename = "XMDJ", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,
    #[serde(rename = "XMJE")]
    pub amount: String,
    /// "0" marks a tax-exempt line.
    #[serde(rename = "SL")]
    pub tax_rate: String,
    #[serde(rename = "SE", skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<String>,
}

/// Line item collection (`FPKJXX_XMXXS`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItems {
    #[serde(rename = "FPKJXX_XMXX", default)]
    pub items: Vec<LineItem>,
}

/// Linked order (`FPKJXX_DDXX`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    #[serde(rename = "DDH")]
    pub order_number: String,
    /// 退单号
    #[serde(rename = "THDH", skip_serializing_if = "Option::is_none")]
    pub return_number: Option<String>,
    #[serde(rename = "DDDATE", skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
}

/// Issue request (`REQUEST_FPKJXX`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "REQUEST_FPKJXX")]
pub struct IssueRequest {
    #[serde(rename = "FPKJXX_FPTXX")]
    pub header: InvoiceHeader,
    #[serde(rename = "FPKJXX_XMXXS")]
    pub lines: LineItems,
    #[serde(rename = "FPKJXX_DDXX")]
    pub order: OrderInfo,
}

impl IssueRequest {
    pub fn new(header: InvoiceHeader, items: Vec<LineItem>, order: OrderInfo) -> Self {
        Self {
            header,
            lines: LineItems { items },
            order,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.items.len()
    }
}

/// Download request (`REQUEST_FPXXXZ_NEW`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "REQUEST_FPXXXZ_NEW")]
pub struct DownloadRequest {
    #[serde(rename = "FPQQLSH")]
    pub request_serial: String,
    #[serde(rename = "DSPTBM")]
    pub platform_code: String,
    #[serde(rename = "NSRSBH")]
    pub taxpayer_id: String,
    #[serde(rename = "DDH")]
    pub order_number: String,
    /// PDF delivery mode (`PDF_XZFS`).
    #[serde(rename = "PDF_XZFS")]
    pub pdf_mode: String,
}

/// Issuance result returned by a download (`REQUEST_FPKJXX_FPJGXX_NEW`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "REQUEST_FPKJXX_FPJGXX_NEW")]
pub struct InvoiceResult {
    #[serde(rename = "FPQQLSH")]
    pub request_serial: String,
    #[serde(rename = "DDH", default)]
    pub order_number: Option<String>,
    /// 开票流水号
    #[serde(rename = "KPLSH", default)]
    pub issue_serial: Option<String>,
    /// 防伪码
    #[serde(rename = "FWM", default)]
    pub verification_code: Option<String>,
    /// 二维码
    #[serde(rename = "EWM", default)]
    pub qr_code: Option<String>,
    #[serde(rename = "FPZL_DM", default)]
    pub invoice_type_code: Option<String>,
    #[serde(rename = "FP_DM", default)]
    pub invoice_code: Option<String>,
    #[serde(rename = "FP_HM", default)]
    pub invoice_number: Option<String>,
    #[serde(rename = "KPRQ", default)]
    pub issue_date: Option<String>,
    #[serde(rename = "KPLX", default)]
    pub invoice_kind: Option<String>,
    /// 合计不含税金额
    #[serde(rename = "HJBHSJE", default)]
    pub net_amount: Option<String>,
    /// 合计税额
    #[serde(rename = "KPHJSE", default)]
    pub tax_amount: Option<String>,
    /// Base64 PDF, when the delivery mode asked for the file itself.
    #[serde(rename = "PDF_FILE", default)]
    pub pdf_file: Option<String>,
    #[serde(rename = "PDF_URL", default)]
    pub pdf_url: Option<String>,
    #[serde(rename = "CZDM", default)]
    pub operation_code: Option<String>,
    #[serde(rename = "RETURNCODE", default)]
    pub return_code: Option<String>,
    #[serde(rename = "RETURNMESSAGE", default)]
    pub return_message: Option<String>,
}

impl InvoiceResult {
    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml).map_err(|e| Error::decode("invoice result", e))
    }
}

/// The single inner document carried by one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestContent {
    Issue(IssueRequest),
    Download(DownloadRequest),
}

impl RequestContent {
    pub fn action(&self) -> Action {
        match self {
            RequestContent::Issue(_) => Action::MakeOut,
            RequestContent::Download(_) => Action::Download,
        }
    }

    /// Plain serialization, without the schema's `class`/`size` attributes.
    pub fn to_xml(&self) -> Result<String> {
        let xml = match self {
            RequestContent::Issue(request) => {
                if request.lines.items.is_empty() {
                    return Err(Error::encode(
                        "issue request",
                        "at least one line item is required",
                    ));
                }
                quick_xml::se::to_string(request)
            }
            RequestContent::Download(request) => quick_xml::se::to_string(request),
        };
        xml.map_err(|e| Error::encode("request content", e))
    }

    /// Serialization as the service expects it on the wire.
    pub fn to_patched_xml(&self) -> Result<String> {
        let xml = self.to_xml()?;
        Ok(schema::apply(&xml, &schema::patches_for(self)))
    }
}

impl From<IssueRequest> for RequestContent {
    fn from(request: IssueRequest) -> Self {
        RequestContent::Issue(request)
    }
}

impl From<DownloadRequest> for RequestContent {
    fn from(request: DownloadRequest) -> Self {
        RequestContent::Download(request)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use indoc::indoc;

    pub(crate) fn sample_issue() -> IssueRequest {
        IssueRequest::new(
            InvoiceHeader {
                request_serial: "111MFWIK201805081541348952".to_string(),
                platform_code: "111MFWIK".to_string(),
                taxpayer_id: "310101000000090".to_string(),
                taxpayer_name: "上海测试企业".to_string(),
                agent_flag: "0".to_string(),
                main_item: "技术服务费".to_string(),
                catalogue_version: "13.0".to_string(),
                seller_taxpayer_id: "310101000000090".to_string(),
                seller_name: "上海测试企业".to_string(),
                seller_address: "上海市徐汇区".to_string(),
                seller_phone: "021-12345678".to_string(),
                buyer_name: "个人".to_string(),
                buyer_kind: "03".to_string(),
                buyer_email: Some("buyer@example.com".to_string()),
                issuer: "张三".to_string(),
                invoice_kind: "1".to_string(),
                operation_code: operation::NORMAL.to_string(),
                list_flag: "0".to_string(),
                total_amount: "106.00".to_string(),
                ..InvoiceHeader::default()
            },
            vec![LineItem {
                name: "技术服务费".to_string(),
                unit: Some("次".to_string()),
                quantity: "1".to_string(),
                tax_included: "1".to_string(),
                line_kind: "0".to_string(),
                commodity_code: "3040201000000000000".to_string(),
                unit_price: Some("106.00".to_string()),
                amount: "106.00".to_string(),
                tax_rate: "0.06".to_string(),
                ..LineItem::default()
            }],
            OrderInfo {
                order_number: "201805081541348952".to_string(),
                ..OrderInfo::default()
            },
        )
    }

    pub(crate) fn sample_download() -> DownloadRequest {
        DownloadRequest {
            request_serial: "111MFWIK201805081541348952".to_string(),
            platform_code: "111MFWIK".to_string(),
            taxpayer_id: "310101000000090".to_string(),
            order_number: "201805081541348952".to_string(),
            pdf_mode: "2".to_string(),
        }
    }

    #[test]
    fn issue_request_serializes_in_schema_order() {
        let xml = RequestContent::from(sample_issue()).to_xml().unwrap();

        assert!(xml.starts_with("<REQUEST_FPKJXX><FPKJXX_FPTXX><FPQQLSH>"));
        assert!(xml.contains("<FPKJXX_XMXXS><FPKJXX_XMXX><XMMC>技术服务费</XMMC>"));
        assert!(xml.ends_with("<FPKJXX_DDXX><DDH>201805081541348952</DDH></FPKJXX_DDXX></REQUEST_FPKJXX>"));
        // unset optional fields stay off the wire
        assert!(!xml.contains("GHF_SJ"));
        assert!(xml.contains("<GHF_EMAIL>buyer@example.com</GHF_EMAIL>"));
    }

    #[test]
    fn issue_request_without_lines_is_rejected() {
        let mut request = sample_issue();
        request.lines.items.clear();

        let err = RequestContent::from(request).to_xml().unwrap_err();
        assert!(matches!(err, Error::Encode { .. }));
    }

    #[test]
    fn download_request_serializes() {
        let xml = RequestContent::from(sample_download()).to_xml().unwrap();
        assert_eq!(
            xml,
            "<REQUEST_FPXXXZ_NEW><FPQQLSH>111MFWIK201805081541348952</FPQQLSH>\
             <DSPTBM>111MFWIK</DSPTBM><NSRSBH>310101000000090</NSRSBH>\
             <DDH>201805081541348952</DDH><PDF_XZFS>2</PDF_XZFS></REQUEST_FPXXXZ_NEW>"
        );
    }

    #[test]
    fn patched_issue_request_still_parses() {
        let request = sample_issue();
        let xml = RequestContent::from(request.clone())
            .to_patched_xml()
            .unwrap();

        let parsed: IssueRequest = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn invoice_result_parses_partial_document() {
        let sample = indoc!(
            r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <REQUEST_FPKJXX_FPJGXX_NEW class="REQUEST_FPKJXX_FPJGXX_NEW">
              <FPQQLSH>111MFWIK201904041554354107</FPQQLSH>
              <DDH>201904041554354107</DDH>
              <FP_DM>031001800204</FP_DM>
              <FP_HM>07512347</FP_HM>
              <PDF_URL>http://example.com/invoice.pdf</PDF_URL>
              <RETURNCODE>0000</RETURNCODE>
              <RETURNMESSAGE>成功</RETURNMESSAGE>
            </REQUEST_FPKJXX_FPJGXX_NEW>"#
        );

        let result = InvoiceResult::from_xml(sample).unwrap();
        assert_eq!(result.request_serial, "111MFWIK201904041554354107");
        assert_eq!(result.invoice_number.as_deref(), Some("07512347"));
        assert_eq!(result.return_code.as_deref(), Some("0000"));
        assert_eq!(result.pdf_file, None);
    }

    #[test]
    fn invoice_result_requires_request_serial() {
        let err = InvoiceResult::from_xml(
            "<REQUEST_FPKJXX_FPJGXX_NEW><DDH>1</DDH></REQUEST_FPKJXX_FPJGXX_NEW>",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
