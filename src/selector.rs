use indexmap::IndexMap;
use rand::Rng;

use crate::error::AssetError;

/// Pick one holder with probability proportional to its balance
///
/// Draws a uniform value in `[0, total_supply)` and walks the holders in
/// their stable map order, accumulating balances until the running total
/// strictly exceeds the draw. Each holder is therefore selected with
/// probability `balance / total_supply`, and zero-balance holders are never
/// selected.
///
/// The random source is injected so tests can run seeded.
pub fn select_holder<R: Rng + ?Sized>(
    holders: &IndexMap<String, u64>,
    total_supply: u64,
    rng: &mut R,
) -> Result<String, AssetError> {
    if total_supply == 0 {
        return Err(AssetError::Distribution(
            "total supply is zero, no holder can be selected".to_string(),
        ));
    }
    if holders.is_empty() {
        return Err(AssetError::Distribution("holder set is empty".to_string()));
    }

    let draw = rng.gen_range(0..total_supply);
    Ok(holder_for_draw(holders, draw))
}

/// Walk the cumulative balance bands for a concrete draw
///
/// `total_supply` comes from contract state and is trusted as given; if the
/// balances sum to less than the declared supply, a high draw lands past
/// every band and the last enumerated holder is returned as a defensive
/// fallback for that inconsistent state.
fn holder_for_draw(holders: &IndexMap<String, u64>, draw: u64) -> String {
    let mut cumulative = 0u64;
    let mut last = None;
    for (address, balance) in holders {
        cumulative = cumulative.saturating_add(*balance);
        if cumulative > draw {
            return address.clone();
        }
        last = Some(address);
    }
    last.expect("holder set checked non-empty by caller").clone()
}
