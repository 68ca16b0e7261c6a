use chrono::{Duration, Utc};
use clap::Args;
use replate::error::AppError;
use replate::marketplace::{Actor, LifecycleError, ListingDraft, Role};

use crate::infra::build_market_service;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Hours until the demo listings expire (default 2)
    #[arg(long, default_value_t = 2)]
    pub(crate) expires_in_hours: i64,
    /// Skip the two-farm claim race at the end of the walkthrough
    #[arg(long)]
    pub(crate) skip_race: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        expires_in_hours,
        skip_race,
    } = args;

    let service = build_market_service();
    let now = Utc::now();
    let expires_at = now + Duration::hours(expires_in_hours);

    let restaurant = Actor::new("rest-bistro", Role::Restaurant);
    let hillside = Actor::new("farm-hillside", Role::Farm);
    let meadow = Actor::new("farm-meadow", Role::Farm);

    println!("Surplus marketplace demo");
    println!("Clock: {now} | listings expire {expires_at}");

    let drafts = [
        ("Sourdough loaves", "10 units"),
        ("Mixed greens", "4 crates"),
    ];
    for (item_name, quantity) in drafts {
        let view = service.create_listing(
            &restaurant,
            ListingDraft {
                item_name: item_name.to_string(),
                quantity: quantity.to_string(),
                description: None,
                image_ref: None,
                expires_at,
            },
            now,
        )?;
        println!("- {} posted {} ({})", view.owner_id.0, view.item_name, view.quantity);
    }

    println!("\nAvailable listings (soonest-expiring first)");
    let available = service.available_listings(now)?;
    for view in &available {
        println!("- {} | {} | expires {}", view.id.0, view.item_name, view.expires_at);
    }

    if let Some(target) = available.first() {
        if skip_race {
            let claim = service.claim_listing(&hillside, &target.id, now)?;
            println!(
                "\n{} claimed {} at {}",
                claim.claimant_id.0, target.item_name, claim.claimed_at
            );
        } else {
            println!("\nTwo farms race for '{}'", target.item_name);
            let claim = service.claim_listing(&hillside, &target.id, now)?;
            println!("- {} wins claim {}", claim.claimant_id.0, claim.id.0);
            match service.claim_listing(&meadow, &target.id, now) {
                Err(LifecycleError::AlreadyClaimed) => {
                    println!("- {} loses: already claimed", meadow.id.0);
                }
                Ok(claim) => println!("- unexpected second win: {}", claim.id.0),
                Err(err) => return Err(err.into()),
            }
        }
    }

    println!("\nRestaurant dashboard");
    for view in service.listings_for_actor(&restaurant, now)? {
        match &view.claim {
            Some(claim) => println!(
                "- {} | {} | claimed by {}",
                view.item_name, view.status, claim.claimant_id.0
            ),
            None => println!("- {} | {}", view.item_name, view.status),
        }
    }

    println!("\nFarm claimed view");
    for view in service.claimed_by(&hillside, now)? {
        println!("- {} | from {}", view.item_name, view.owner_id.0);
    }

    Ok(())
}
