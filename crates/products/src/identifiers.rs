//! SKU and barcode assignment.
//!
//! The identifier service guarantees uniqueness. When it is exhausted or
//! unreachable, a locally generated value is used instead so the form never
//! fails on identifier generation.

use rand::Rng;

use crate::collaborators::{GeneratedBarcode, IdentifierService};
use crate::configuration::BarcodeType;

const SKU_PREFIX_LEN: usize = 3;
const CODE128_PREFIX: &str = "SF";
const CODE128_BODY_LEN: usize = 10;
const CODE128_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LOCAL_ATTEMPTS: usize = 16;

/// GS1 check digit for a digit string without its check digit.
///
/// Weights alternate 3, 1, ... starting from the rightmost digit.
pub fn gs1_check_digit(body: &str) -> Option<u32> {
    let mut sum = 0;
    for (position, c) in body.chars().rev().enumerate() {
        let digit = c.to_digit(10)?;
        sum += if position % 2 == 0 { digit * 3 } else { digit };
    }
    Some((10 - sum % 10) % 10)
}

/// Whether `code` is a digit string ending in a correct GS1 check digit.
pub fn has_valid_check_digit(code: &str) -> bool {
    if !code.is_ascii() {
        return false;
    }
    let Some((body, check)) = code.len().checked_sub(1).map(|i| code.split_at(i)) else {
        return false;
    };
    match (gs1_check_digit(body), check.chars().next().and_then(|c| c.to_digit(10))) {
        (Some(expected), Some(actual)) => !body.is_empty() && expected == actual,
        _ => false,
    }
}

fn sku_prefix(base_name: &str) -> String {
    let mut prefix: String = base_name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .take(SKU_PREFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while prefix.len() < SKU_PREFIX_LEN {
        prefix.push('X');
    }
    prefix
}

/// `ABC-123456`: three letters from the product name plus six random digits.
pub fn local_sku(base_name: &str) -> String {
    let number: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}-{number:06}", sku_prefix(base_name))
}

fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn with_check_digit(body: String) -> String {
    match gs1_check_digit(&body) {
        Some(check) => format!("{body}{check}"),
        None => body,
    }
}

pub fn local_barcode(barcode_type: BarcodeType) -> String {
    match barcode_type {
        BarcodeType::Ean13 => with_check_digit(random_digits(12)),
        BarcodeType::UpcA => with_check_digit(random_digits(11)),
        BarcodeType::Code128 => {
            let mut rng = rand::thread_rng();
            let body: String = (0..CODE128_BODY_LEN)
                .map(|_| char::from(CODE128_ALPHABET[rng.gen_range(0..CODE128_ALPHABET.len())]))
                .collect();
            format!("{CODE128_PREFIX}{body}")
        }
    }
}

fn first_unused(existing: &[String], generate: impl Fn() -> String) -> String {
    let mut candidate = generate();
    for _ in 1..LOCAL_ATTEMPTS {
        if !existing.contains(&candidate) {
            break;
        }
        candidate = generate();
    }
    candidate
}

/// Ask the identifier service for a SKU, generating one locally if it cannot.
pub async fn sku_or_fallback(service: &dyn IdentifierService, base_name: &str, existing: &[String]) -> String {
    match service.generate_sku(base_name, existing).await {
        Ok(Some(sku)) => return sku,
        Ok(None) => tracing::warn!(base_name, "sku generator exhausted; using local sku"),
        Err(err) => tracing::warn!(error = %err, base_name, "sku generator failed; using local sku"),
    }
    first_unused(existing, || local_sku(base_name))
}

/// Ask the identifier service for a barcode, generating one locally if it cannot.
pub async fn barcode_or_fallback(
    service: &dyn IdentifierService,
    barcode_type: BarcodeType,
    existing: &[String],
) -> GeneratedBarcode {
    match service.generate_barcode(barcode_type, existing).await {
        Ok(Some(generated)) => return generated,
        Ok(None) => tracing::warn!(barcode_type = barcode_type.as_str(), "barcode generator exhausted; using local barcode"),
        Err(err) => {
            tracing::warn!(error = %err, barcode_type = barcode_type.as_str(), "barcode generator failed; using local barcode")
        }
    }
    GeneratedBarcode {
        barcode: first_unused(existing, || local_barcode(barcode_type)),
        barcode_type,
    }
}
