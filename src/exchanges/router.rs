//! Conversion router

use crate::exchanges::types::{SwapQuote, VenueLabel};
use crate::exchanges::VenueAdapter;
use crate::shared::errors::ConversionError;
use crate::shared::math::min_out_for_tolerance;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Routes payments into the settlement asset through a registered venue.
/// Payments already denominated in the settlement asset pass through
/// untouched with no venue call.
pub struct ConversionRouter {
    settlement: Pubkey,
    slippage_bps: u64,
    adapters: Mutex<HashMap<VenueLabel, Arc<dyn VenueAdapter>>>,
}

impl ConversionRouter {
    pub fn new(settlement: Pubkey, slippage_bps: u64) -> Self {
        Self {
            settlement,
            slippage_bps,
            adapters: Mutex::new(HashMap::new()),
        }
    }

    pub fn settlement(&self) -> Pubkey {
        self.settlement
    }

    pub fn register(&self, adapter: Arc<dyn VenueAdapter>) {
        let label = adapter.label();
        self.adapters
            .lock()
            .expect("adapter lock")
            .insert(label, adapter);
        info!(venue = %label, "venue registered");
    }

    fn adapter(&self, venue: VenueLabel) -> Result<Arc<dyn VenueAdapter>, ConversionError> {
        self.adapters
            .lock()
            .expect("adapter lock")
            .get(&venue)
            .cloned()
            .ok_or_else(|| ConversionError::UnsupportedVenue(venue.as_str().to_string()))
    }

    /// Expected settlement output for a payment, before committing
    pub async fn quote(
        &self,
        asset: &Pubkey,
        amount_in: u64,
        venue: VenueLabel,
    ) -> Result<u64, ConversionError> {
        if asset == &self.settlement {
            return Ok(amount_in);
        }
        let quote: SwapQuote = self.adapter(venue)?.quote(asset, amount_in).await?;
        Ok(quote.expected_out)
    }

    /// Convert a payment with an explicit minimum-output guarantee
    pub async fn convert(
        &self,
        asset: &Pubkey,
        amount_in: u64,
        venue: VenueLabel,
        min_out: u64,
    ) -> Result<u64, ConversionError> {
        if asset == &self.settlement {
            return Ok(amount_in);
        }
        self.adapter(venue)?.swap(asset, amount_in, min_out).await
    }

    /// Convert with min_out sized from a fresh quote and the given
    /// tolerance (router default when `tolerance_bps` is None)
    pub async fn convert_with_tolerance(
        &self,
        asset: &Pubkey,
        amount_in: u64,
        venue: VenueLabel,
        tolerance_bps: Option<u64>,
    ) -> Result<u64, ConversionError> {
        if asset == &self.settlement {
            return Ok(amount_in);
        }
        let expected = self.quote(asset, amount_in, venue).await?;
        let min_out = min_out_for_tolerance(expected, tolerance_bps.unwrap_or(self.slippage_bps))?;
        self.convert(asset, amount_in, venue, min_out).await
    }
}
