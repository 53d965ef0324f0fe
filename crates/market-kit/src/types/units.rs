//! Ether amount parsing.
//!
//! Prices and payable values are plain [`U256`] wei amounts on the wire.
//! [`IntoWei`] lets call sites pass either a typed value or a unit-suffixed
//! string for runtime input. [`IntoTokenId`] does the same for `uint256`
//! token and item ids.

use alloy_primitives::U256;

use crate::error::ParseAmountError;

/// Decimal places of one gwei.
const GWEI_DECIMALS: usize = 9;
/// Decimal places of one ether.
const ETHER_DECIMALS: usize = 18;

/// Parse a human-readable ether amount into wei.
///
/// Accepted forms:
/// - `"1.5 ether"` or `"1.5 ETH"` - decimal ether
/// - `"20 gwei"` - decimal gwei
/// - `"1000 wei"` - raw wei
///
/// Raw numbers are NOT accepted to prevent unit confusion.
///
/// ```
/// use market_kit::{U256, parse_wei};
///
/// assert_eq!(parse_wei("1 gwei").unwrap(), U256::from(1_000_000_000u64));
/// assert!(parse_wei("100").is_err());
/// ```
pub fn parse_wei(s: &str) -> Result<U256, ParseAmountError> {
    let s = s.trim();

    let lower = s.to_ascii_lowercase();
    if let Some(value) = lower
        .strip_suffix(" ether")
        .or_else(|| lower.strip_suffix(" eth"))
    {
        return scale_decimal(value.trim(), ETHER_DECIMALS, s);
    }

    if let Some(value) = lower.strip_suffix(" gwei") {
        return scale_decimal(value.trim(), GWEI_DECIMALS, s);
    }

    if let Some(value) = lower.strip_suffix(" wei") {
        return scale_decimal(value.trim(), 0, s);
    }

    // Bare number = error (ambiguous)
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ParseAmountError::AmbiguousAmount(s.to_string()));
    }

    Err(ParseAmountError::InvalidFormat(s.to_string()))
}

/// Scale a decimal string by `10^decimals`, rejecting excess precision.
fn scale_decimal(value: &str, decimals: usize, original: &str) -> Result<U256, ParseAmountError> {
    let invalid = || ParseAmountError::InvalidNumber(original.to_string());

    let (integer_part, fraction_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };

    if integer_part.is_empty() && fraction_part.is_empty() {
        return Err(invalid());
    }
    if !integer_part.chars().all(|c| c.is_ascii_digit())
        || !fraction_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    // Trailing zeros beyond the unit's precision are harmless
    let fraction_part = fraction_part.trim_end_matches('0');
    if fraction_part.len() > decimals {
        return Err(invalid());
    }

    let digits = format!(
        "{}{}{}",
        integer_part,
        fraction_part,
        "0".repeat(decimals - fraction_part.len())
    );
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10).map_err(|_| ParseAmountError::Overflow)
}

/// Format a wei amount as ether with up to 6 decimal places.
///
/// Non-zero amounts that would round to zero are shown in full.
///
/// ```
/// use market_kit::{U256, format_ether};
///
/// assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u128)), "1.5 ETH");
/// ```
pub fn format_ether(wei: U256) -> String {
    let one_ether = U256::from(10u64).pow(U256::from(ETHER_DECIMALS));
    let whole = wei / one_ether;
    let remainder = wei % one_ether;

    if remainder.is_zero() {
        return format!("{} ETH", whole);
    }

    let decimal = format!("{:0>18}", remainder.to_string());
    let decimal = decimal.trim_end_matches('0');
    // Amounts below the sixth decimal keep every digit instead of reading as zero
    let shown = decimal[..decimal.len().min(6)].trim_end_matches('0');
    let shown = if shown.is_empty() { decimal } else { shown };
    format!("{}.{} ETH", whole, shown)
}

// ============================================================================
// IntoWei trait
// ============================================================================

/// Trait for types that can be converted into a wei amount.
///
/// This allows methods to accept both typed [`U256`] values (preferred)
/// and string representations for runtime input.
///
/// # Example
///
/// ```
/// use market_kit::{IntoWei, U256};
///
/// fn example(amount: impl IntoWei) {
///     let wei = amount.into_wei().unwrap();
/// }
///
/// // Preferred: typed value in wei
/// example(U256::from(10u64).pow(U256::from(17u64)));
///
/// // Also works: string parsing (for runtime input)
/// example("0.1 ether");
/// ```
pub trait IntoWei {
    /// Convert into a wei amount.
    fn into_wei(self) -> Result<U256, ParseAmountError>;
}

impl IntoWei for U256 {
    fn into_wei(self) -> Result<U256, ParseAmountError> {
        Ok(self)
    }
}

impl IntoWei for u64 {
    fn into_wei(self) -> Result<U256, ParseAmountError> {
        Ok(U256::from(self))
    }
}

impl IntoWei for u128 {
    fn into_wei(self) -> Result<U256, ParseAmountError> {
        Ok(U256::from(self))
    }
}

impl IntoWei for &str {
    fn into_wei(self) -> Result<U256, ParseAmountError> {
        parse_wei(self)
    }
}

impl IntoWei for String {
    fn into_wei(self) -> Result<U256, ParseAmountError> {
        parse_wei(&self)
    }
}

impl IntoWei for &String {
    fn into_wei(self) -> Result<U256, ParseAmountError> {
        parse_wei(self)
    }
}

// ============================================================================
// IntoTokenId trait
// ============================================================================

/// Trait for token and item ids.
///
/// Contract ids are `uint256`; this lets facade methods take small integer
/// literals as well as [`U256`].
///
/// ```
/// use market_kit::{IntoTokenId, U256};
///
/// assert_eq!(7u64.into_token_id(), U256::from(7));
/// assert_eq!(U256::MAX.into_token_id(), U256::MAX);
/// ```
pub trait IntoTokenId {
    /// Convert into a `uint256` id.
    fn into_token_id(self) -> U256;
}

impl IntoTokenId for U256 {
    fn into_token_id(self) -> U256 {
        self
    }
}

impl IntoTokenId for &U256 {
    fn into_token_id(self) -> U256 {
        *self
    }
}

macro_rules! impl_into_token_id {
    ($($t:ty),*) => {
        $(
            impl IntoTokenId for $t {
                fn into_token_id(self) -> U256 {
                    U256::from(self)
                }
            }
        )*
    };
}

impl_into_token_id!(u8, u16, u32, u64, u128, usize);
