//! Order identifier validation and normalization.
//!
//! Customers paste identifiers from Amazon emails, invoices, and WhatsApp
//! messages, so the boundary strips whitespace and accepts exactly two
//! shapes before any storage lookup happens:
//!
//! - Amazon order id: `NNN-NNNNNNN-NNNNNNN`
//! - Secret code: 14-17 digits (issued for website/subscription purchases)

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderIdentifier {
    AmazonOrderId(String),
    SecretCode(String),
}

impl OrderIdentifier {
    /// Validate customer input. Whitespace is stripped; anything that is not
    /// an Amazon order id or a 14-17 digit code fails with `InvalidFormat`
    /// without touching the database.
    pub fn parse(raw: &str) -> Result<Self> {
        let clean: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

        if is_amazon_order_id(&clean) {
            return Ok(OrderIdentifier::AmazonOrderId(clean));
        }
        if clean.len() >= 14 && clean.len() <= 17 && clean.chars().all(|c| c.is_ascii_digit()) {
            return Ok(OrderIdentifier::SecretCode(clean));
        }

        Err(AppError::InvalidFormat(
            "Invalid format. Expected Amazon Order ID (XXX-XXXXXXX-XXXXXXX) or 14-17 digit secret code."
                .to_string(),
        ))
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderIdentifier::AmazonOrderId(s) | OrderIdentifier::SecretCode(s) => s,
        }
    }

    /// Secondary lookup form: a 17-digit bare code is often an Amazon order
    /// id typed without its dashes, so offer the dashed rendering as a
    /// fallback after the exact match misses.
    pub fn dashed_fallback(&self) -> Option<String> {
        match self {
            OrderIdentifier::SecretCode(code) if code.len() == 17 => Some(format!(
                "{}-{}-{}",
                &code[..3],
                &code[3..10],
                &code[10..17]
            )),
            _ => None,
        }
    }
}

fn is_amazon_order_id(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 19 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        3 | 11 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_amazon_order_id() {
        let id = OrderIdentifier::parse("408-1234567-1234567").unwrap();
        assert_eq!(id, OrderIdentifier::AmazonOrderId("408-1234567-1234567".into()));
    }

    #[test]
    fn accepts_secret_code_lengths_14_to_17() {
        for len in 14..=17 {
            let code = "9".repeat(len);
            assert!(OrderIdentifier::parse(&code).is_ok(), "len {len}");
        }
    }

    #[test]
    fn strips_whitespace_before_validating() {
        let id = OrderIdentifier::parse(" 408-1234567-1234567 \n").unwrap();
        assert_eq!(id.as_str(), "408-1234567-1234567");

        let code = OrderIdentifier::parse("1234 5678 9012 34").unwrap();
        assert_eq!(code.as_str(), "12345678901234");
    }

    #[test]
    fn rejects_bad_shapes() {
        for raw in [
            "",
            "hello",
            "1234567890123",        // 13 digits
            "123456789012345678",   // 18 digits
            "40-81234567-1234567",  // dashes misplaced
            "408-1234567-123456a",  // trailing letter
            "408_1234567_1234567",  // wrong separator
        ] {
            assert!(
                matches!(OrderIdentifier::parse(raw), Err(AppError::InvalidFormat(_))),
                "should reject {raw:?}"
            );
        }
    }

    #[test]
    fn seventeen_digit_code_offers_dashed_fallback() {
        let id = OrderIdentifier::parse("40812345671234567").unwrap();
        assert_eq!(id.dashed_fallback().as_deref(), Some("408-1234567-1234567"));

        let id = OrderIdentifier::parse("123456789012345").unwrap();
        assert_eq!(id.dashed_fallback(), None);
    }
}
