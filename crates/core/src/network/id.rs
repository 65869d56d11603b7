//! Node identifier trait

use num_traits::{NumCast, Zero};
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait for types that can identify a node in a stream network.
///
/// Identifiers are either integers or real numbers. Output tables are
/// generic over the same type, so integer identifiers stay integer and
/// real-valued identifiers stay real-valued.
///
/// A `toID` equal to zero (or NaN, for float identifiers) is the outlet
/// sentinel: the node has no downstream neighbour.
pub trait NetworkId:
    Copy + Debug + Display + PartialEq + NumCast + Zero + Serialize + Send + Sync + 'static
{
    /// Hashable form of the identifier used by the network index.
    type Key: Copy + Eq + Hash + Debug + Send + Sync;

    /// Hash key for this identifier
    fn key(self) -> Self::Key;

    /// Whether this value, used as a `toID`, means "no downstream"
    fn is_outlet_sentinel(self) -> bool;

    /// Whether this value can identify a node (finite and distinct from the sentinel)
    fn is_valid_node_id(self) -> bool;

    /// Whether this type is an integer type
    fn is_integer() -> bool;
}

macro_rules! impl_network_id_int {
    ($t:ty) => {
        impl NetworkId for $t {
            type Key = $t;

            fn key(self) -> Self::Key {
                self
            }

            fn is_outlet_sentinel(self) -> bool {
                self == 0
            }

            fn is_valid_node_id(self) -> bool {
                self != 0
            }

            fn is_integer() -> bool {
                true
            }
        }
    };
}

macro_rules! impl_network_id_float {
    ($t:ty, $bits:ty) => {
        impl NetworkId for $t {
            type Key = $bits;

            fn key(self) -> Self::Key {
                // -0.0 and 0.0 compare equal, so they must hash equal
                if self == 0.0 {
                    0
                } else {
                    self.to_bits()
                }
            }

            fn is_outlet_sentinel(self) -> bool {
                self.is_nan() || self == 0.0
            }

            fn is_valid_node_id(self) -> bool {
                self.is_finite() && self != 0.0
            }

            fn is_integer() -> bool {
                false
            }
        }
    };
}

impl_network_id_int!(i32);
impl_network_id_int!(i64);
impl_network_id_int!(u32);
impl_network_id_int!(u64);
impl_network_id_float!(f32, u32);
impl_network_id_float!(f64, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_sentinel() {
        assert!(0_i64.is_outlet_sentinel());
        assert!(!7_i64.is_outlet_sentinel());
        assert!(!0_i64.is_valid_node_id());
        assert!(i64::is_integer());
    }

    #[test]
    fn test_float_sentinel_and_validity() {
        assert!(f64::NAN.is_outlet_sentinel());
        assert!((-0.0_f64).is_outlet_sentinel());
        assert!(!f64::NAN.is_valid_node_id());
        assert!(!f64::INFINITY.is_valid_node_id());
        assert!(12.5_f64.is_valid_node_id());
        assert!(!f64::is_integer());
    }

    #[test]
    fn test_float_keys_fold_signed_zero() {
        assert_eq!(0.0_f64.key(), (-0.0_f64).key());
        assert_ne!(1.0_f64.key(), 2.0_f64.key());
    }
}
