use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::db::ReturnStore;
use crate::error::AppResult;
use crate::models::{NewReturn, RefundMode, Return};

static ADJECTIVES: &[&str] = &[
    "Leather", "Cotton", "Wireless", "Ceramic", "Wooden", "Steel", "Portable",
    "Compact", "Vintage", "Classic", "Slim", "Waterproof", "Foldable", "Kids",
    "Men's", "Women's", "Sport", "Travel", "Kitchen", "Office",
];

static NOUNS: &[&str] = &[
    "Shoes", "Shirt", "Jacket", "Headphones", "Mug", "Backpack", "Watch",
    "Lamp", "Blender", "Keyboard", "Umbrella", "Wallet", "Sandals", "Kettle",
    "Speaker", "Charger", "Dress", "Helmet", "Toaster", "Belt",
];

static REASONS: &[&str] = &[
    "Wrong size",
    "Defective on arrival",
    "Wrong item received",
    "Changed mind",
    "Product not as described",
    "Damaged during shipping",
    "Missing parts",
    "Quality below expectations",
    "No longer needed",
    "Gift recipient already has it",
];

/// Share of seeded returns that are already approved.
const APPROVED_RATIO: f64 = 0.4;

const BATCH_SIZE: usize = 500;

fn random_candidate(rng: &mut impl Rng, serial: usize) -> NewReturn {
    let adj = ADJECTIVES.choose(rng).unwrap_or(&"Classic");
    let noun = NOUNS.choose(rng).unwrap_or(&"Shoes");
    let item = format!("{} {} #{:05}", adj, noun, serial);
    let reason = REASONS.choose(rng).unwrap_or(&"Other").to_string();

    if rng.gen_bool(APPROVED_RATIO) {
        let mode = if rng.gen_bool(0.5) {
            RefundMode::Item
        } else {
            RefundMode::Cash
        };
        NewReturn::approved(item, reason, mode)
    } else {
        NewReturn::pending(item, reason)
    }
}

/// Inserts `count` random returns in batches.
pub async fn seed_returns(store: &dyn ReturnStore, count: usize) -> AppResult<Vec<Return>> {
    info!("Seeding {} returns...", count);

    // StdRng is Send, so it can be held across the awaits below
    let mut rng = StdRng::from_entropy();
    let mut all: Vec<Return> = Vec::with_capacity(count);

    let chunks = count.div_ceil(BATCH_SIZE);
    for chunk in 0..chunks {
        let start = chunk * BATCH_SIZE;
        let end = (start + BATCH_SIZE).min(count);

        let batch: Vec<NewReturn> = (start..end)
            .map(|serial| random_candidate(&mut rng, serial))
            .collect();
        all.extend(store.insert_batch(&batch).await?);

        info!("  Seeded batch {}/{} ({} returns so far)", chunk + 1, chunks, all.len());
    }

    info!("Seeding complete. Total: {} returns", all.len());
    Ok(all)
}
