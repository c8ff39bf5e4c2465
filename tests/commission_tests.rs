use vehicle_auctions::domain::{CommissionPolicy, CommissionSchedule};
#[path = "utils/mod.rs"]
mod utils;
use utils::*;

fn sample_schedule() -> CommissionSchedule {
    CommissionSchedule::new([
        CommissionPolicy {
            category: "aircraft".to_string(),
            rate_bps: 500,
            cap: Some(2500),
        },
        CommissionPolicy {
            category: "cars".to_string(),
            rate_bps: 500,
            cap: None,
        },
        CommissionPolicy {
            category: "motorcycles".to_string(),
            rate_bps: 250,
            cap: None,
        },
    ])
}

#[test]
fn test_capped_category_pays_the_cap_not_the_percentage() {
    let schedule = sample_schedule();

    // 5% of 100_000 would be 5_000, but the aircraft cap is 2_500
    let commission = schedule.commission_for("aircraft", usd(100_000));
    assert_eq!(commission, usd(2500));
}

#[test]
fn test_cap_only_applies_once_reached() {
    let schedule = sample_schedule();

    // 5% of 20_000 is 1_000, still under the cap
    let commission = schedule.commission_for("aircraft", usd(20_000));
    assert_eq!(commission, usd(1000));
}

#[test]
fn test_uncapped_category_pays_the_full_percentage() {
    let schedule = sample_schedule();

    let commission = schedule.commission_for("cars", usd(100_000));
    assert_eq!(commission, usd(5000));

    let commission = schedule.commission_for("motorcycles", usd(100_000));
    assert_eq!(commission, usd(2500));
}

#[test]
fn test_unknown_category_falls_back_to_the_default_rate() {
    let schedule = sample_schedule();

    // Default rate is 5%, uncapped
    let commission = schedule.commission_for("boats", usd(10_000));
    assert_eq!(commission, usd(500));

    let empty = CommissionSchedule::default();
    assert_eq!(empty.commission_for("cars", usd(10_000)), usd(500));
}

#[test]
fn test_commission_is_deterministic() {
    let schedule = sample_schedule();

    let first = schedule.commission_for("aircraft", usd(73_500));
    let second = schedule.commission_for("aircraft", usd(73_500));
    assert_eq!(first, second);
}

#[test]
fn test_commission_keeps_the_sale_currency() {
    let schedule = sample_schedule();

    let commission = schedule.commission_for("cars", usd(10_000));
    assert_eq!(commission.currency(), usd(0).currency());
    assert_eq!(commission.value(), 500);
}
