use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::RecordId;
use crate::error::FormError;

/// 每页报价数
pub const DEFAULT_OFFERS_PER_PAGE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    #[default]
    Active,
    Inactive,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Active => "active",
            OfferStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfferStatusFilter {
    #[default]
    All,
    Only(OfferStatus),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_geo: Vec<String>,
    #[serde(default)]
    pub payout_type: Option<String>,
    #[serde(default)]
    pub payout_value: Option<f64>,
    #[serde(default)]
    pub landing_page_url: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub offer_status: Option<String>,
    #[serde(default)]
    pub entity_id: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffersResponse {
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// 报价列表的筛选与分页
#[derive(Debug, Clone)]
pub struct OfferFilter {
    pub status: OfferStatusFilter,
    /// 从 1 开始
    pub page: u32,
    pub per_page: u32,
    pub search: String,
}

impl Default for OfferFilter {
    fn default() -> Self {
        Self {
            status: OfferStatusFilter::All,
            page: 1,
            per_page: DEFAULT_OFFERS_PER_PAGE,
            search: String::new(),
        }
    }
}

impl OfferFilter {
    pub fn limit(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    pub(crate) fn query_pairs(&self, entity_id: &RecordId) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("entity_id", entity_id.to_string()),
            ("limit", self.limit().to_string()),
            ("offset", self.offset().to_string()),
        ];
        if let OfferStatusFilter::Only(status) = self.status {
            pairs.push(("offer_status", status.as_str().to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// 一页报价
#[derive(Debug, Clone, PartialEq)]
pub struct OffersPage {
    pub offers: Vec<Offer>,
    pub total: u64,
    /// 本页已满时认为还有下一页
    pub has_more: bool,
}

impl OffersPage {
    pub fn from_response(response: OffersResponse, filter: &OfferFilter) -> Self {
        let page = u64::from(filter.page.max(1));
        let per_page = u64::from(filter.per_page);
        let total = response.total.unwrap_or(page * per_page);
        let has_more = per_page > 0 && response.offers.len() as u64 == per_page;
        Self {
            offers: response.offers,
            total,
            has_more,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRequest {
    pub offer_request_id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entity_id: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferRequestsResponse {
    #[serde(default)]
    pub requests: Vec<OfferRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct OfferRequestFilter {
    /// 排除自己所属实体发布的请求
    pub exclude_entity_id: Option<RecordId>,
    pub search: String,
}

impl OfferRequestFilter {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(entity_id) = &self.exclude_entity_id {
            pairs.push(("exclude_entity_id", entity_id.to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// 提交给后端的报价
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferDraft {
    pub entity_id: RecordId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub target_geo: Vec<String>,
    pub payout_type: String,
    pub payout_value: f64,
    pub landing_page_url: String,
    pub requirements: String,
    pub offer_status: OfferStatus,
}

/// 报价表单，字段都是原始输入
#[derive(Debug, Clone)]
pub struct OfferForm {
    pub title: String,
    pub category: String,
    pub description: String,
    /// 逗号分隔
    pub target_geo: String,
    pub payout_type: String,
    pub payout_value: String,
    pub landing_page_url: String,
    pub requirements: String,
    pub offer_status: OfferStatus,
}

impl Default for OfferForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            description: String::new(),
            target_geo: String::new(),
            payout_type: "CPA".to_string(),
            payout_value: String::new(),
            landing_page_url: String::new(),
            requirements: String::new(),
            offer_status: OfferStatus::Active,
        }
    }
}

impl OfferForm {
    /// 编辑已有报价时回填表单
    pub fn from_offer(offer: &Offer) -> Self {
        Self {
            title: offer.title.clone(),
            category: offer.category.clone().unwrap_or_default(),
            description: offer.description.clone().unwrap_or_default(),
            target_geo: offer.target_geo.join(", "),
            payout_type: offer
                .payout_type
                .clone()
                .unwrap_or_else(|| "CPA".to_string()),
            payout_value: offer
                .payout_value
                .map(|v| v.to_string())
                .unwrap_or_default(),
            landing_page_url: offer.landing_page_url.clone().unwrap_or_default(),
            requirements: offer.requirements.clone().unwrap_or_default(),
            offer_status: match offer.offer_status.as_deref() {
                Some("inactive") => OfferStatus::Inactive,
                _ => OfferStatus::Active,
            },
        }
    }

    pub fn into_draft(self, entity_id: RecordId) -> Result<OfferDraft, FormError> {
        let payout_value = parse_amount(&self.payout_value)?;
        let category = match self.category.trim() {
            "" => "NA".to_string(),
            category => category.to_string(),
        };
        let target_geo = self
            .target_geo
            .split(',')
            .map(str::trim)
            .filter(|geo| !geo.is_empty())
            .map(str::to_string)
            .collect();

        Ok(OfferDraft {
            entity_id,
            title: self.title,
            category,
            description: self.description,
            target_geo,
            payout_type: self.payout_type,
            payout_value,
            landing_page_url: self.landing_page_url,
            requirements: self.requirements,
            offer_status: self.offer_status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidDraft {
    pub entity_id: RecordId,
    pub bid_amount: f64,
    pub bid_notes: String,
    pub offer_details: Map<String, Value>,
}

/// 竞价表单
#[derive(Debug, Clone, Default)]
pub struct BidForm {
    pub bid_amount: String,
    pub bid_notes: String,
    pub offer_details: Map<String, Value>,
}

impl BidForm {
    pub fn into_draft(self, entity_id: RecordId) -> Result<BidDraft, FormError> {
        Ok(BidDraft {
            entity_id,
            bid_amount: parse_amount(&self.bid_amount)?,
            bid_notes: self.bid_notes,
            offer_details: self.offer_details,
        })
    }
}

fn parse_amount(raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::InvalidAmount(raw.to_string()))
}
