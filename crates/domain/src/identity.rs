use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};

/// Literal bucket shared by every client whose address cannot be derived.
const ANONYMOUS_IDENTITY: &str = "anonymous";

/// Identity a general-traffic request is throttled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientIdentity {
    /// A resolved client network address.
    Ip(IpAddr),
    /// All unidentifiable clients share one budget.
    Anonymous,
}

impl ClientIdentity {
    /// Parses the first comma-separated entry of an `X-Forwarded-For` value.
    ///
    /// Accepts bare addresses as well as `ip:port` and `[v6]:port` forms.
    #[must_use]
    pub fn from_forwarded_for(header_value: &str) -> Option<Self> {
        let first = header_value.split(',').next()?.trim();
        if first.is_empty() {
            return None;
        }

        first
            .parse::<IpAddr>()
            .or_else(|_| first.parse::<SocketAddr>().map(|address| address.ip()))
            .ok()
            .map(Self::Ip)
    }
}

impl Display for ClientIdentity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ip(address) => write!(formatter, "{address}"),
            Self::Anonymous => formatter.write_str(ANONYMOUS_IDENTITY),
        }
    }
}
