//! Ledger primitives shared by every subsystem: addresses, chain ids and units.

pub mod address;
pub mod chain_id;
pub mod units;

pub use address::{parse_address, to_bech32, AddressError, BECH32_HRP};
pub use chain_id::{ChainId, ChainIdError, MAX_CHAIN_ID};
pub use units::{
    decimal_to_minor, format_minor, format_one, is_negative, parse_decimal, parse_quantity,
    parse_quantity_u64, UnitsError, NANO_DECIMALS, ONE_DECIMALS,
};
