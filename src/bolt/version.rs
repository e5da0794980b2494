//! Per-protocol-version message tag tables.
//!
//! Each supported version carries two name<->tag mappings (client messages,
//! server messages); which table applies is fixed at handshake time.

/// A protocol version, `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoltVersion {
    pub major: u8,
    pub minor: u8,
}

impl BoltVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        BoltVersion { major, minor }
    }

    /// Pack this version into the big-endian four-byte wire form.
    pub fn to_wire_bytes(self) -> [u8; 4] {
        [0, 0, self.minor, self.major]
    }

    pub fn from_wire_bytes(bytes: [u8; 4]) -> Self {
        BoltVersion {
            major: bytes[3],
            minor: bytes[2],
        }
    }
}

impl std::fmt::Display for BoltVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

pub const V1_0: BoltVersion = BoltVersion::new(1, 0);
pub const V2_0: BoltVersion = BoltVersion::new(2, 0);
pub const V3_0: BoltVersion = BoltVersion::new(3, 0);
pub const V4_0: BoltVersion = BoltVersion::new(4, 0);

/// Versions this toolkit understands, in the server's preference order.
pub const SUPPORTED_VERSIONS: &[BoltVersion] = &[V4_0, V3_0, V2_0, V1_0];

/// One protocol version's client and server tag tables.
pub struct VersionTable {
    pub version: BoltVersion,
    pub client: &'static [(&'static str, u8)],
    pub server: &'static [(&'static str, u8)],
}

const SERVER_TAGS: &[(&str, u8)] = &[
    ("SUCCESS", 0x70),
    ("RECORD", 0x71),
    ("IGNORED", 0x7E),
    ("FAILURE", 0x7F),
];

const CLIENT_V1: &[(&str, u8)] = &[
    ("INIT", 0x01),
    ("ACK_FAILURE", 0x0E),
    ("RESET", 0x0F),
    ("RUN", 0x10),
    ("DISCARD_ALL", 0x2F),
    ("PULL_ALL", 0x3F),
];

const CLIENT_V3: &[(&str, u8)] = &[
    ("HELLO", 0x01),
    ("GOODBYE", 0x02),
    ("RESET", 0x0F),
    ("RUN", 0x10),
    ("BEGIN", 0x11),
    ("COMMIT", 0x12),
    ("ROLLBACK", 0x13),
    ("DISCARD_ALL", 0x2F),
    ("PULL_ALL", 0x3F),
];

const CLIENT_V4: &[(&str, u8)] = &[
    ("HELLO", 0x01),
    ("GOODBYE", 0x02),
    ("RESET", 0x0F),
    ("RUN", 0x10),
    ("BEGIN", 0x11),
    ("COMMIT", 0x12),
    ("ROLLBACK", 0x13),
    ("DISCARD", 0x2F),
    ("PULL", 0x3F),
];

const TABLES: &[VersionTable] = &[
    VersionTable {
        version: V1_0,
        client: CLIENT_V1,
        server: SERVER_TAGS,
    },
    VersionTable {
        version: V2_0,
        client: CLIENT_V1,
        server: SERVER_TAGS,
    },
    VersionTable {
        version: V3_0,
        client: CLIENT_V3,
        server: SERVER_TAGS,
    },
    VersionTable {
        version: V4_0,
        client: CLIENT_V4,
        server: SERVER_TAGS,
    },
];

/// Look up the table for a supported version.
pub fn table_for(version: BoltVersion) -> Option<&'static VersionTable> {
    TABLES.iter().find(|t| t.version == version)
}

/// Resolve a client message name to its tag byte within `version`'s table.
pub fn client_tag(version: BoltVersion, name: &str) -> Option<u8> {
    table_for(version)?
        .client
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, tag)| *tag)
}

/// Resolve a server message name to its tag byte within `version`'s table.
pub fn server_tag(version: BoltVersion, name: &str) -> Option<u8> {
    table_for(version)?
        .server
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, tag)| *tag)
}

/// Resolve a client message tag back to its symbolic name.
pub fn client_name(version: BoltVersion, tag: u8) -> Option<&'static str> {
    table_for(version)?
        .client
        .iter()
        .find(|(_, t)| *t == tag)
        .map(|(n, _)| *n)
}

/// Resolve a server message tag back to its symbolic name.
pub fn server_name(version: BoltVersion, tag: u8) -> Option<&'static str> {
    table_for(version)?
        .server
        .iter()
        .find(|(_, t)| *t == tag)
        .map(|(n, _)| *n)
}

/// True if `name` appears in some supported version's client table but not in `version`'s.
pub fn is_known_elsewhere(name: &str, version: BoltVersion) -> bool {
    client_tag(version, name).is_none()
        && TABLES
            .iter()
            .any(|t| t.version != version && t.client.iter().any(|(n, _)| *n == name))
}
