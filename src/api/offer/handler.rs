use serde_json::Value;

use super::model::{
    BidDraft, OfferDraft, OfferFilter, OfferRequest, OfferRequestFilter, OfferRequestsResponse,
    OffersPage, OffersResponse,
};
use crate::api::{RecordId, path_segment, with_query};
use crate::error::ApiError;
use crate::http::HttpClient;

/// 报价与报价请求接口
#[derive(Clone)]
pub struct OffersApi {
    client: HttpClient,
}

impl OffersApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// 某实体名下的报价，按筛选条件分页
    pub async fn offers_by_entity(
        &self,
        entity_id: &RecordId,
        filter: &OfferFilter,
    ) -> Result<OffersPage, ApiError> {
        let endpoint = with_query("/offers", &filter.query_pairs(entity_id));
        let response: OffersResponse = self.client.get_as(&endpoint).await?;
        Ok(OffersPage::from_response(response, filter))
    }

    pub async fn offer_requests(
        &self,
        filter: &OfferRequestFilter,
    ) -> Result<Vec<OfferRequest>, ApiError> {
        let endpoint = with_query("/offer-requests", &filter.query_pairs());
        let response: OfferRequestsResponse = self.client.get_as(&endpoint).await?;
        Ok(response.requests)
    }

    pub async fn create_offer(&self, draft: &OfferDraft) -> Result<Value, ApiError> {
        Ok(self.client.post("/offers", draft).await?)
    }

    pub async fn update_offer(
        &self,
        offer_id: &RecordId,
        draft: &OfferDraft,
    ) -> Result<Value, ApiError> {
        let endpoint = format!("/offers/{}", path_segment(offer_id));
        Ok(self.client.put(&endpoint, draft).await?)
    }

    pub async fn delete_offer(&self, offer_id: &RecordId) -> Result<Value, ApiError> {
        let endpoint = format!("/offers/{}", path_segment(offer_id));
        Ok(self.client.delete(&endpoint).await?)
    }

    /// 对报价请求出价
    pub async fn create_bid(
        &self,
        offer_request_id: &RecordId,
        bid: &BidDraft,
    ) -> Result<Value, ApiError> {
        let endpoint = format!("/offer-requests/{}/bids", path_segment(offer_request_id));
        Ok(self.client.post(&endpoint, bid).await?)
    }
}
