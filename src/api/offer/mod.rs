mod handler;
mod model;

pub use handler::OffersApi;
pub use model::{
    BidDraft, BidForm, DEFAULT_OFFERS_PER_PAGE, Offer, OfferDraft, OfferFilter, OfferForm,
    OfferRequest, OfferRequestFilter, OfferRequestsResponse, OfferStatus, OfferStatusFilter,
    OffersPage, OffersResponse,
};
