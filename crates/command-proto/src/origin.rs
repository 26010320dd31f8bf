//! Origin masks: which transport kinds a command may be invoked from.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bit set of transport kinds.
///
/// ```
/// use command_proto::Origin;
///
/// let mask = Origin::HTTP | Origin::WS;
/// assert!(mask.intersects(Origin::WS));
/// assert_eq!(mask.to_string(), "http, websocket");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(u8);

impl Origin {
    /// No transport.
    pub const NONE: Self = Self(0);
    /// Request/response (HTTP).
    pub const HTTP: Self = Self(1 << 0);
    /// Reliable stream over UDP (TRU).
    pub const TRU: Self = Self(1 << 1);
    /// Real-time peer link (WebRTC data channel).
    pub const WEBRTC: Self = Self(1 << 2);
    /// Overlay network (Teonet).
    pub const TEONET: Self = Self(1 << 3);
    /// Socket stream (WebSocket).
    pub const WS: Self = Self(1 << 4);
    /// Every known transport.
    pub const ALL: Self = Self(Self::HTTP.0 | Self::TRU.0 | Self::WEBRTC.0 | Self::TEONET.0 | Self::WS.0);

    /// Flags in declaration order with their display names.
    const NAMES: [(Self, &'static str); 5] = [
        (Self::HTTP, "http"),
        (Self::TRU, "tru"),
        (Self::WEBRTC, "webrtc"),
        (Self::TEONET, "teonet"),
        (Self::WS, "websocket"),
    ];

    /// Build a mask from raw bits; unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Raw bits of the mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when `self` and `other` share at least one flag.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate over the set flags in declaration order.
    pub fn iter(self) -> impl Iterator<Item = (Self, &'static str)> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.intersects(*flag))
    }
}

impl BitOr for Origin {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Origin {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Origin {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for Origin {
    /// Lower-case flag names joined by `", "`, in declaration order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, name)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
