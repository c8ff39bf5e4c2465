use vehicle_auctions::domain::{
    ledger, lifecycle, AuctionStatus, Errors, Trigger,
};
#[path = "utils/mod.rs"]
mod utils;
use utils::*;

#[test]
fn test_transition_table_permits_the_documented_changes() {
    assert_eq!(
        lifecycle::transition(AuctionStatus::Draft, Trigger::Approve, AuctionStatus::Active),
        Ok(AuctionStatus::Active)
    );
    assert_eq!(
        lifecycle::transition(AuctionStatus::Draft, Trigger::Cancel, AuctionStatus::Cancelled),
        Ok(AuctionStatus::Cancelled)
    );
    assert_eq!(
        lifecycle::transition(AuctionStatus::Active, Trigger::Cancel, AuctionStatus::Cancelled),
        Ok(AuctionStatus::Cancelled)
    );
    assert_eq!(
        lifecycle::transition(AuctionStatus::Active, Trigger::BuyNow, AuctionStatus::SoldBuyNow),
        Ok(AuctionStatus::SoldBuyNow)
    );
    assert_eq!(
        lifecycle::transition(AuctionStatus::Active, Trigger::AcceptOffer, AuctionStatus::Sold),
        Ok(AuctionStatus::Sold)
    );
    for target in [
        AuctionStatus::Ended,
        AuctionStatus::Sold,
        AuctionStatus::ReserveNotMet,
    ] {
        assert_eq!(
            lifecycle::transition(AuctionStatus::Active, Trigger::Close, target),
            Ok(target)
        );
    }
}

#[test]
fn test_transition_table_rejects_everything_else() {
    // Draft auctions cannot close or sell
    assert!(matches!(
        lifecycle::transition(AuctionStatus::Draft, Trigger::Close, AuctionStatus::Ended),
        Err(Errors::InvalidTransition { .. })
    ));
    assert!(matches!(
        lifecycle::transition(AuctionStatus::Draft, Trigger::BuyNow, AuctionStatus::SoldBuyNow),
        Err(Errors::InvalidTransition { .. })
    ));

    // Terminal statuses accept nothing
    for terminal in [
        AuctionStatus::Ended,
        AuctionStatus::Sold,
        AuctionStatus::SoldBuyNow,
        AuctionStatus::ReserveNotMet,
        AuctionStatus::Cancelled,
    ] {
        assert!(terminal.is_terminal());
        for trigger in [
            Trigger::Approve,
            Trigger::Close,
            Trigger::BuyNow,
            Trigger::AcceptOffer,
            Trigger::Cancel,
        ] {
            assert!(lifecycle::permitted(terminal, trigger).is_none());
        }
    }

    // A close cannot land on a non-close target
    assert!(matches!(
        lifecycle::transition(AuctionStatus::Active, Trigger::Close, AuctionStatus::Cancelled),
        Err(Errors::InvalidTransition { .. })
    ));
}

#[test]
fn test_close_with_no_bids_and_no_reserve_ends() {
    let auction = sample_auction();
    let closed = ledger::close(&auction).unwrap();
    assert_eq!(closed.status, AuctionStatus::Ended);
    assert_eq!(closed.winner, None);
    assert_eq!(closed.final_price, None);
}

#[test]
fn test_close_with_unmet_reserve_is_reserve_not_met() {
    // Reserve above the start price, never reached
    let auction = auction_with_reserve(2000);
    let closed = ledger::close(&auction).unwrap();
    assert_eq!(closed.status, AuctionStatus::ReserveNotMet);
    assert_eq!(closed.winner, None);

    // Even with bids, staying under the reserve keeps the vehicle unsold
    let auction = auction_with_reserve(2000);
    let with_bid = ledger::place_bid(&auction, &buyer_1(), usd(1500), sample_bid_time()).unwrap();
    let closed = ledger::close(&with_bid).unwrap();
    assert_eq!(closed.status, AuctionStatus::ReserveNotMet);
    assert_eq!(closed.winner, None);
    assert_eq!(closed.final_price, None);
}

#[test]
fn test_close_with_reserve_met_sells_to_current_bidder() {
    let auction = auction_with_reserve(2000);
    let with_bid = ledger::place_bid(&auction, &buyer_1(), usd(2100), sample_bid_time()).unwrap();
    let closed = ledger::close(&with_bid).unwrap();
    assert_eq!(closed.status, AuctionStatus::Sold);
    assert_eq!(closed.winner, Some(buyer_1().user_id));
    assert_eq!(closed.final_price, Some(usd(2100)));
}

#[test]
fn test_close_without_reserve_sells_to_current_bidder() {
    let auction = sample_auction();
    let with_bid = ledger::place_bid(&auction, &buyer_1(), usd(1050), sample_bid_time()).unwrap();
    let closed = ledger::close(&with_bid).unwrap();
    assert_eq!(closed.status, AuctionStatus::Sold);
    assert_eq!(closed.winner, Some(buyer_1().user_id));
    assert_eq!(closed.final_price, Some(usd(1050)));
}

#[test]
fn test_close_is_not_repeatable() {
    let auction = sample_auction();
    let closed = ledger::close(&auction).unwrap();
    let again = ledger::close(&closed);
    assert!(matches!(again, Err(Errors::InvalidTransition { .. })));
}

#[test]
fn test_approve_publishes_a_draft() {
    let draft = draft_auction();
    let active = ledger::approve(&draft).unwrap();
    assert_eq!(active.status, AuctionStatus::Active);

    // Approved listings take bids
    let with_bid = ledger::place_bid(&active, &buyer_1(), usd(1050), sample_bid_time());
    assert!(with_bid.is_ok());

    // Approving twice is invalid
    let again = ledger::approve(&active);
    assert!(matches!(again, Err(Errors::InvalidTransition { .. })));
}

#[test]
fn test_cancel_from_draft_and_active() {
    let cancelled_draft = ledger::cancel(&draft_auction()).unwrap();
    assert_eq!(cancelled_draft.status, AuctionStatus::Cancelled);

    let cancelled_active = ledger::cancel(&sample_auction()).unwrap();
    assert_eq!(cancelled_active.status, AuctionStatus::Cancelled);

    // Cancelled is terminal
    let again = ledger::cancel(&cancelled_active);
    assert!(matches!(again, Err(Errors::InvalidTransition { .. })));
}
