//! The parts of the SFOS-FIREWALL-MIB that the checks read
//!
//! Everything lives under `1.3.6.1.4.1.2604.5.1`. Item names (services,
//! license modules) and the states the device reports are closed
//! enumerations, each variant carrying its wire code and the name operators
//! use for it on the command line.

use std::fmt;
use std::str::FromStr;

use crate::classify::Reported;
use crate::select::UnknownName;
use crate::snmp::Oid;

const SFOS: &str = "1.3.6.1.4.1.2604.5.1";

/// A scalar object, with its `.0` instance suffix
fn scalar(path: &str) -> Oid {
    Oid::new(format!("{}.{}.0", SFOS, path))
}

/// Names compare without case, dashes or underscores: `not-subscribed`,
/// `NotSubscribed` and `not_subscribed` are all the same thing.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! mib_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:expr) {
            $($variant:ident = $code:expr => $label:expr,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The number the device uses for this value
            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_code(code: i64) -> Reported<$name> {
                match $name::ALL.iter().find(|v| v.code() == code) {
                    Some(v) => Reported::Known(*v),
                    None => Reported::Unrecognized(code),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(raw: &str) -> Result<$name, UnknownName> {
                let wanted = normalize(raw);
                $name::ALL
                    .iter()
                    .find(|v| normalize(v.label()) == wanted)
                    .cloned()
                    .ok_or_else(|| UnknownName {
                        kind: $kind,
                        name: raw.to_owned(),
                        known: $name::ALL.iter().map(|v| v.label()).collect(),
                    })
            }
        }
    };
}

/// A capacity metric: total size in MB and percent of it in use
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityMetric {
    pub label: &'static str,
    capacity: &'static str,
    percent: &'static str,
}

impl CapacityMetric {
    pub fn capacity_oid(&self) -> Oid {
        scalar(self.capacity)
    }

    pub fn percent_oid(&self) -> Oid {
        scalar(self.percent)
    }
}

pub const DISK: CapacityMetric = CapacityMetric {
    label: "disk",
    capacity: "2.4.1",
    percent: "2.4.2",
};

pub const MEMORY: CapacityMetric = CapacityMetric {
    label: "memory",
    capacity: "2.5.1",
    percent: "2.5.2",
};

pub const SWAP: CapacityMetric = CapacityMetric {
    label: "swap",
    capacity: "2.5.3",
    percent: "2.5.4",
};

mib_enum! {
    /// Text fields describing the appliance
    pub enum DeviceField ("device field") {
        Name = 1 => "name",
        Model = 2 => "model",
        Firmware = 3 => "firmware",
        AppKey = 4 => "appkey",
        WebcatVersion = 5 => "webcat",
        IpsVersion = 6 => "ips",
    }
}

impl DeviceField {
    pub fn oid(self) -> Oid {
        scalar(&format!("1.1.{}", self.code()))
    }
}

/// Uptime in hundredths of a second
pub fn uptime() -> Oid {
    scalar("2.2")
}

mib_enum! {
    pub enum ServiceName ("service") {
        Pop3 = 1 => "pop3",
        Imap4 = 2 => "imap4",
        Smtp = 3 => "smtp",
        Ftp = 4 => "ftp",
        Http = 5 => "http",
        Antivirus = 6 => "antivirus",
        Antispam = 7 => "antispam",
        Dns = 8 => "dns",
        Ha = 9 => "ha",
        Ips = 10 => "ips",
        Apache = 11 => "apache",
        Ntp = 12 => "ntp",
        Tomcat = 13 => "tomcat",
        SslVpn = 14 => "sslvpn",
        Ipsec = 15 => "ipsec",
        Database = 16 => "database",
        Network = 17 => "network",
        Garner = 18 => "garner",
        Droute = 19 => "droute",
        Sshd = 20 => "sshd",
        Dgd = 21 => "dgd",
    }
}

impl ServiceName {
    pub fn oid(self) -> Oid {
        scalar(&format!("3.{}", self.code()))
    }
}

mib_enum! {
    pub enum ServiceState ("service state") {
        Untouched = 0 => "untouched",
        Stopped = 1 => "stopped",
        Initializing = 2 => "initializing",
        Running = 3 => "running",
        Exiting = 4 => "exiting",
        Dead = 5 => "dead",
        Frozen = 6 => "frozen",
        Unregistered = 7 => "unregistered",
    }
}

pub fn ha_status() -> Oid {
    scalar("4.1")
}

pub fn ha_current_state() -> Oid {
    scalar("4.4")
}

pub fn ha_peer_state() -> Oid {
    scalar("4.5")
}

pub fn ha_config_mode() -> Oid {
    scalar("4.6")
}

mib_enum! {
    pub enum HaStatus ("ha status") {
        Disabled = 0 => "disabled",
        Enabled = 1 => "enabled",
    }
}

mib_enum! {
    pub enum HaState ("ha state") {
        NotApplicable = 0 => "not-applicable",
        Auxiliary = 1 => "auxiliary",
        Standalone = 2 => "standalone",
        Primary = 3 => "primary",
        Faulty = 4 => "faulty",
        Ready = 5 => "ready",
    }
}

mib_enum! {
    /// Subscription modules
    pub enum LicenseName ("license") {
        BaseFirewall = 1 => "base-firewall",
        NetworkProtection = 2 => "network-protection",
        WebProtection = 3 => "web-protection",
        MailProtection = 4 => "mail-protection",
        WebserverProtection = 5 => "webserver-protection",
        Sandstorm = 6 => "sandstorm",
        EnhancedSupport = 7 => "enhanced-support",
        EnhancedPlusSupport = 8 => "enhanced-plus-support",
    }
}

impl LicenseName {
    pub fn status_oid(self) -> Oid {
        scalar(&format!("5.{}.1", self.code()))
    }

    pub fn expiry_oid(self) -> Oid {
        scalar(&format!("5.{}.2", self.code()))
    }
}

mib_enum! {
    pub enum LicenseState ("license state") {
        NoLicense = 0 => "none",
        Evaluating = 1 => "evaluating",
        NotSubscribed = 2 => "not-subscribed",
        Subscribed = 3 => "subscribed",
        Expired = 4 => "expired",
        Deactivated = 5 => "deactivated",
    }
}

/// Root of the IPsec tunnel table; rows are `<root>.<column>.<index>`
pub fn tunnel_table() -> Oid {
    Oid::new(format!("{}.6.1.1.1.1", SFOS))
}

pub const TUNNEL_NAME: u32 = 2;
pub const TUNNEL_STATUS: u32 = 9;
pub const TUNNEL_ACTIVATED: u32 = 10;

mib_enum! {
    pub enum TunnelStatus ("tunnel status") {
        Inactive = 0 => "inactive",
        Active = 1 => "active",
        PartiallyActive = 2 => "partially-active",
    }
}
