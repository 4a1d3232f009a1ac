//! Storefront submissions landing in the quote table.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use fresh_shine_core::{QuoteRepository, QuoteStatus, ServiceType};
use fresh_shine_integration_tests::MemoryBackend;
use fresh_shine_storefront::booking::{BookingDraft, BookingError, BookingView, SubmitBooking};

fn draft() -> BookingDraft {
    BookingDraft {
        service_type: "endoflease".to_string(),
        address: "7 Oxford Rd".to_string(),
        email: "tenant@example.com".to_string(),
        phone: "07700 900456".to_string(),
        bedrooms: "2".to_string(),
        ..BookingDraft::default()
    }
}

#[tokio::test]
async fn test_submission_lands_as_pending_quote() {
    let backend = MemoryBackend::new();
    let usecase = SubmitBooking {
        inbox: backend.clone(),
    };
    usecase.execute(&draft()).await.unwrap();

    let quotes = backend.list_quotes().await.unwrap();
    assert_eq!(quotes.len(), 1);
    let quote = &quotes[0];
    assert_eq!(quote.status, QuoteStatus::Pending);
    assert_eq!(quote.service_type, ServiceType::EndOfLease);
    assert_eq!(quote.postcode, None);
    assert_eq!(quote.bedrooms.as_deref(), Some("2"));
    assert_eq!(quote.quote_amount, None);
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_backend() {
    let backend = MemoryBackend::new();
    let usecase = SubmitBooking {
        inbox: backend.clone(),
    };
    let bad = BookingDraft {
        phone: "   ".to_string(),
        ..draft()
    };
    let result = usecase.execute(&bad).await;
    assert!(matches!(result, Err(BookingError::MissingRequired)));
    assert_eq!(backend.quote_count(), 0);

    let view = BookingView::after_submit(bad.clone(), &result);
    assert_eq!(view.draft, bad);
}
