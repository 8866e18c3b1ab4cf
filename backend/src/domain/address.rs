//! Participant identity: wallet-style addresses and unordered address pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum accepted length for a participant address.
pub const ADDRESS_MAX: usize = 128;

/// Validation errors returned when parsing addresses or building pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressValidationError {
    /// The address was empty.
    Empty,
    /// The address contained whitespace or control characters.
    InvalidCharacters,
    /// The address exceeded [`ADDRESS_MAX`] characters.
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Both sides of a pair were the same participant.
    SameParticipant,
}

impl fmt::Display for AddressValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "address must not be empty"),
            Self::InvalidCharacters => {
                write!(f, "address must not contain whitespace or control characters")
            }
            Self::TooLong { max } => write!(f, "address must be at most {max} characters"),
            Self::SameParticipant => write!(f, "a pair needs two distinct participants"),
        }
    }
}

impl std::error::Error for AddressValidationError {}

/// Participant identifier, normalised to ASCII lowercase.
///
/// Addresses are compared case-insensitively, so `0xABC` and `0xabc`
/// identify the same participant.
///
/// # Examples
/// ```
/// use matchmaking::domain::UserAddress;
///
/// let address = UserAddress::new("0xAbC").expect("valid address");
/// assert_eq!(address.as_ref(), "0xabc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserAddress(String);

impl UserAddress {
    /// Validate and construct a [`UserAddress`] from borrowed input.
    pub fn new(address: impl AsRef<str>) -> Result<Self, AddressValidationError> {
        Self::from_owned(address.as_ref().to_owned())
    }

    fn from_owned(address: String) -> Result<Self, AddressValidationError> {
        if address.is_empty() {
            return Err(AddressValidationError::Empty);
        }
        if address
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control())
        {
            return Err(AddressValidationError::InvalidCharacters);
        }
        if address.chars().count() > ADDRESS_MAX {
            return Err(AddressValidationError::TooLong { max: ADDRESS_MAX });
        }

        Ok(Self(address.to_ascii_lowercase()))
    }
}

impl AsRef<str> for UserAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserAddress> for String {
    fn from(value: UserAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserAddress {
    type Error = AddressValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Unordered pair of two distinct participants.
///
/// ## Invariants
/// - The two addresses differ.
/// - Addresses are stored in canonical (ascending) order, so `(a, b)` and
///   `(b, a)` build equal pairs with equal hashes.
///
/// # Examples
/// ```
/// use matchmaking::domain::{UserAddress, UserPair};
///
/// let alice = UserAddress::new("0xa1").expect("valid");
/// let bob = UserAddress::new("0xb2").expect("valid");
/// let forward = UserPair::new(alice.clone(), bob.clone()).expect("distinct");
/// let reverse = UserPair::new(bob, alice).expect("distinct");
/// assert_eq!(forward, reverse);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserPair {
    low: UserAddress,
    high: UserAddress,
}

impl UserPair {
    /// Build a pair, rejecting identical participants.
    pub fn new(first: UserAddress, second: UserAddress) -> Result<Self, AddressValidationError> {
        match first.cmp(&second) {
            std::cmp::Ordering::Less => Ok(Self {
                low: first,
                high: second,
            }),
            std::cmp::Ordering::Greater => Ok(Self {
                low: second,
                high: first,
            }),
            std::cmp::Ordering::Equal => Err(AddressValidationError::SameParticipant),
        }
    }

    /// Lower address in canonical order.
    pub fn low(&self) -> &UserAddress {
        &self.low
    }

    /// Higher address in canonical order.
    pub fn high(&self) -> &UserAddress {
        &self.high
    }

    /// Whether `address` is one of the two participants.
    pub fn contains(&self, address: &UserAddress) -> bool {
        &self.low == address || &self.high == address
    }

    /// The participant opposite `address`, if `address` belongs to the pair.
    pub fn counterpart_of(&self, address: &UserAddress) -> Option<&UserAddress> {
        if &self.low == address {
            Some(&self.high)
        } else if &self.high == address {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for UserPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.low, self.high)
    }
}
