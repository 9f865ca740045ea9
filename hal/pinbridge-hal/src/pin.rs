//! Pin addressing
//!
//! Pins are plain numbers on the board. Mapping connector or header names to
//! numbers is board specific and lives behind [`PinResolver`].

/// Physical pin or channel number on the board
pub type PinAddress = u8;

/// Named pin lookup provided by the board mapping
pub trait PinResolver {
    /// Look up a pin by its board name (e.g. "GP16", "A0")
    fn pin_by_name(&self, name: &str) -> Option<PinAddress>;
}

/// Resolve a pin reference
///
/// Names known to the resolver win; anything else is interpreted as a raw
/// pin number.
pub fn resolve_pin<R: PinResolver + ?Sized>(resolver: &R, name: &str) -> Option<PinAddress> {
    let name = name.trim();
    resolver
        .pin_by_name(name)
        .or_else(|| name.parse::<PinAddress>().ok())
}

/// Resolver that knows no names, so only raw numbers resolve
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPins;

impl PinResolver for RawPins {
    fn pin_by_name(&self, _name: &str) -> Option<PinAddress> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Header;

    impl PinResolver for Header {
        fn pin_by_name(&self, name: &str) -> Option<PinAddress> {
            match name {
                "A0" => Some(14),
                "13" => Some(40),
                _ => None,
            }
        }
    }

    #[test]
    fn test_named_pin() {
        assert_eq!(resolve_pin(&Header, "A0"), Some(14));
    }

    #[test]
    fn test_name_shadows_number() {
        assert_eq!(resolve_pin(&Header, "13"), Some(40));
    }

    #[test]
    fn test_raw_number_fallback() {
        assert_eq!(resolve_pin(&Header, "7"), Some(7));
        assert_eq!(resolve_pin(&RawPins, " 21 "), Some(21));
    }

    #[test]
    fn test_unresolvable() {
        assert_eq!(resolve_pin(&Header, "D99x"), None);
        assert_eq!(resolve_pin(&RawPins, "-1"), None);
    }
}
