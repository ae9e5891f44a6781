//! Program-derived address computation backed by `solana-sdk`

use crate::core::{AddressDeriver, DerivationError};
use solana_sdk::pubkey::{Pubkey, MAX_SEEDS, MAX_SEED_LEN};

#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaAddressDeriver;

impl AddressDeriver for SolanaAddressDeriver {
    fn derive(&self, program_id: &Pubkey, seeds: &[Vec<u8>]) -> Result<Pubkey, DerivationError> {
        let failed = || DerivationError::DerivationFailed {
            program_id: *program_id,
            seed_count: seeds.len(),
        };

        // the bump seed takes one slot
        if seeds.len() >= MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
            return Err(failed());
        }

        let refs: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
        Pubkey::try_find_program_address(&refs, program_id)
            .map(|(address, _bump)| address)
            .ok_or_else(failed)
    }
}
