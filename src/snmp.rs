//! Getting values off the device
//!
//! The checks only need two things from SNMP: read a fixed set of objects,
//! or read every object under a table. Either the whole answer comes back or
//! the request fails; there are no partial results and no retries.
//!
//! [`NetSnmp`] does the actual talking by running the net-snmp command line
//! tools (`snmpget`, `snmpwalk`), which handle v2c communities as well as v3
//! authentication and privacy.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::process::Command;
use std::str::FromStr;

use log::{debug, trace};
use structopt::StructOpt;

/// A numeric object identifier, without a leading dot
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(String);

impl Oid {
    pub fn new<S: Into<String>>(dotted: S) -> Oid {
        let dotted = dotted.into();
        Oid(dotted.trim_start_matches('.').to_owned())
    }

    /// The sub-identifiers below `root`, if this is inside it
    ///
    /// ```rust
    /// # use sfos_plugins::snmp::Oid;
    /// let row = Oid::new("1.3.6.1.9.2.7");
    /// assert_eq!(row.index_under(&Oid::new("1.3.6.1")), Some(vec![9, 2, 7]));
    /// ```
    pub fn index_under(&self, root: &Oid) -> Option<Vec<u32>> {
        let rest = self.0.strip_prefix(root.0.as_str())?;
        let rest = rest.strip_prefix('.')?;
        rest.split('.').map(|part| part.parse().ok()).collect()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl Value {
    fn kind(&self) -> &'static str {
        match *self {
            Value::Integer(_) => "integer",
            Value::Text(_) => "string",
        }
    }
}

/// Something went wrong getting data off the device
#[derive(Debug)]
pub enum FetchError {
    /// The net-snmp tool couldn't be started
    Spawn(io::Error),
    /// The device didn't answer in time
    Timeout,
    /// The tool ran and failed
    Agent { code: Option<i32>, stderr: String },
    /// The device answered but left out an object we asked for
    Missing(Oid),
    /// The device sent something other than what the MIB says
    WrongType {
        oid: Oid,
        expected: &'static str,
        found: &'static str,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::FetchError::*;
        match *self {
            Spawn(ref e) => write!(f, "unable to run net-snmp: {}", e),
            Timeout => write!(f, "SNMP request timed out"),
            Agent { code, ref stderr } => match code {
                Some(code) => write!(f, "SNMP request failed ({}): {}", code, stderr.trim()),
                None => write!(f, "SNMP request failed: {}", stderr.trim()),
            },
            Missing(ref oid) => write!(f, "device did not return {}", oid),
            WrongType {
                ref oid,
                expected,
                found,
            } => write!(f, "expected {} at {}, got {}", expected, oid, found),
        }
    }
}

/// Everything one request returned
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Values(BTreeMap<Oid, Value>);

impl Values {
    pub fn new() -> Values {
        Values::default()
    }

    pub fn insert(&mut self, oid: Oid, value: Value) {
        self.0.insert(oid, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &Value)> {
        self.0.iter()
    }

    fn lookup(&self, oid: &Oid) -> Result<&Value, FetchError> {
        self.0
            .get(oid)
            .ok_or_else(|| FetchError::Missing(oid.clone()))
    }

    pub fn integer(&self, oid: &Oid) -> Result<i64, FetchError> {
        match *self.lookup(oid)? {
            Value::Integer(i) => Ok(i),
            ref other => Err(FetchError::WrongType {
                oid: oid.clone(),
                expected: "integer",
                found: other.kind(),
            }),
        }
    }

    /// Numbers are accepted as text too, agents are not consistent about it
    pub fn text(&self, oid: &Oid) -> Result<String, FetchError> {
        match *self.lookup(oid)? {
            Value::Text(ref s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
        }
    }
}

/// The SNMP collaborator
///
/// Implementations must either return a value for every requested object or
/// fail.
pub trait Agent {
    fn get(&mut self, oids: &[Oid]) -> Result<Values, FetchError>;

    /// Every object below `root`
    fn walk(&mut self, root: &Oid) -> Result<Values, FetchError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnmpVersion {
    V2c,
    V3,
}

impl FromStr for SnmpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<SnmpVersion, String> {
        match s {
            "2c" | "2" => Ok(SnmpVersion::V2c),
            "3" => Ok(SnmpVersion::V3),
            _ => Err(format!("unsupported SNMP version '{}'", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthProtocol {
    Md5,
    Sha,
}

impl FromStr for AuthProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<AuthProtocol, String> {
        match s.to_uppercase().as_str() {
            "MD5" => Ok(AuthProtocol::Md5),
            "SHA" => Ok(AuthProtocol::Sha),
            _ => Err(format!("unsupported auth protocol '{}'", s)),
        }
    }
}

impl fmt::Display for AuthProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AuthProtocol::Md5 => write!(f, "MD5"),
            AuthProtocol::Sha => write!(f, "SHA"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrivProtocol {
    Des,
    Aes,
}

impl FromStr for PrivProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<PrivProtocol, String> {
        match s.to_uppercase().as_str() {
            "DES" => Ok(PrivProtocol::Des),
            "AES" => Ok(PrivProtocol::Aes),
            _ => Err(format!("unsupported privacy protocol '{}'", s)),
        }
    }
}

impl fmt::Display for PrivProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PrivProtocol::Des => write!(f, "DES"),
            PrivProtocol::Aes => write!(f, "AES"),
        }
    }
}

/// How to reach the device
#[derive(StructOpt, Debug, Clone)]
pub struct SnmpOptions {
    #[structopt(short = "H", long = "host", help = "Hostname or address of the firewall")]
    pub host: String,
    #[structopt(long = "port", help = "SNMP port", default_value = "161")]
    pub port: u16,
    #[structopt(
        long = "snmp-version",
        help = "SNMP protocol version",
        default_value = "2c",
        raw(possible_values = r#"&["2c", "3"]"#)
    )]
    pub version: SnmpVersion,
    #[structopt(
        short = "C",
        long = "community",
        help = "Community string (v2c)",
        default_value = "public"
    )]
    pub community: String,
    #[structopt(short = "u", long = "username", help = "Security name (v3)")]
    pub username: Option<String>,
    #[structopt(
        long = "auth-protocol",
        help = "Authentication protocol (v3)",
        default_value = "SHA",
        raw(possible_values = r#"&["MD5", "SHA"]"#, case_insensitive = "true")
    )]
    pub auth_protocol: AuthProtocol,
    #[structopt(short = "A", long = "auth-password", help = "Authentication passphrase (v3)")]
    pub auth_password: Option<String>,
    #[structopt(
        long = "priv-protocol",
        help = "Privacy protocol (v3)",
        default_value = "AES",
        raw(possible_values = r#"&["DES", "AES"]"#, case_insensitive = "true")
    )]
    pub priv_protocol: PrivProtocol,
    #[structopt(short = "X", long = "priv-password", help = "Privacy passphrase (v3)")]
    pub priv_password: Option<String>,
    #[structopt(
        short = "t",
        long = "timeout",
        help = "Seconds to wait for the device",
        default_value = "5"
    )]
    pub timeout: u32,
}

impl SnmpOptions {
    /// The net-snmp arguments that select version, credentials and target
    ///
    /// Fails when v3 is requested without a username, before anything is
    /// sent.
    pub fn session_args(&self) -> Result<Vec<String>, String> {
        let mut args = vec![
            "-On".to_owned(),
            "-Oe".to_owned(),
            "-Ot".to_owned(),
            "-r".to_owned(),
            "0".to_owned(),
            "-t".to_owned(),
            self.timeout.to_string(),
        ];
        match self.version {
            SnmpVersion::V2c => {
                args.extend(vec!["-v".to_owned(), "2c".to_owned()]);
                args.extend(vec!["-c".to_owned(), self.community.clone()]);
            }
            SnmpVersion::V3 => {
                let username = self
                    .username
                    .as_ref()
                    .ok_or_else(|| "SNMP v3 needs a --username".to_owned())?;
                args.extend(vec!["-v".to_owned(), "3".to_owned()]);
                args.extend(vec!["-u".to_owned(), username.clone()]);
                let level = match (&self.auth_password, &self.priv_password) {
                    (None, _) => "noAuthNoPriv",
                    (Some(_), None) => "authNoPriv",
                    (Some(_), Some(_)) => "authPriv",
                };
                args.extend(vec!["-l".to_owned(), level.to_owned()]);
                if let Some(ref pass) = self.auth_password {
                    args.extend(vec!["-a".to_owned(), self.auth_protocol.to_string()]);
                    args.extend(vec!["-A".to_owned(), pass.clone()]);
                    if let Some(ref pass) = self.priv_password {
                        args.extend(vec!["-x".to_owned(), self.priv_protocol.to_string()]);
                        args.extend(vec!["-X".to_owned(), pass.clone()]);
                    }
                }
            }
        }
        args.push(format!("{}:{}", self.host, self.port));
        Ok(args)
    }
}

/// Talks to the device by running `snmpget` and `snmpwalk`
pub struct NetSnmp {
    host: String,
    session: Vec<String>,
}

impl NetSnmp {
    pub fn new(opts: &SnmpOptions) -> Result<NetSnmp, String> {
        Ok(NetSnmp {
            host: opts.host.clone(),
            session: opts.session_args()?,
        })
    }

    fn run(&self, tool: &str, oids: &[String]) -> Result<Values, FetchError> {
        debug!("{} {} {}", tool, self.host, oids.join(" "));
        let output = Command::new(tool)
            .args(&self.session)
            .args(oids)
            .output()
            .map_err(FetchError::Spawn)?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            if stderr.contains("Timeout") {
                return Err(FetchError::Timeout);
            }
            return Err(FetchError::Agent {
                code: output.status.code(),
                stderr,
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("{} returned:\n{}", tool, stdout);
        Ok(parse_output(&stdout))
    }
}

impl Agent for NetSnmp {
    fn get(&mut self, oids: &[Oid]) -> Result<Values, FetchError> {
        let wanted: Vec<String> = oids.iter().map(|oid| oid.to_string()).collect();
        let values = self.run("snmpget", &wanted)?;
        for oid in oids {
            values.lookup(oid)?;
        }
        Ok(values)
    }

    fn walk(&mut self, root: &Oid) -> Result<Values, FetchError> {
        self.run("snmpwalk", &[root.to_string()])
    }
}

/// Parse `-On -Oe -Ot` output: one `.<oid> = <TYPE>: <value>` per object
///
/// Long values can wrap onto following lines, which belong to the object
/// above them. Exceptions like `No Such Object` are left out, so asking for
/// the object afterwards reports it missing.
fn parse_output(stdout: &str) -> Values {
    let mut entries: Vec<String> = Vec::new();
    for line in stdout.lines() {
        if line.starts_with('.') && line.contains(" = ") {
            entries.push(line.to_owned());
        } else if let Some(last) = entries.last_mut() {
            last.push('\n');
            last.push_str(line);
        }
    }

    let mut values = Values::new();
    for entry in &entries {
        let mut parts = entry.splitn(2, " = ");
        let oid = Oid::new(parts.next().unwrap_or(""));
        let raw = parts.next().unwrap_or("");
        if raw.starts_with("No Such") || raw.starts_with("No more variables") {
            continue;
        }
        values.insert(oid, parse_value(raw));
    }
    values
}

fn parse_value(raw: &str) -> Value {
    let mut parts = raw.splitn(2, ": ");
    let (kind, value) = match (parts.next(), parts.next()) {
        (Some(kind), Some(value)) => (kind, value),
        _ => ("", raw),
    };
    match kind {
        "Hex-STRING" => Value::Text(decode_hex(value)),
        "INTEGER" | "Gauge32" | "Counter32" | "Counter64" | "Timeticks" | "Unsigned32" => {
            match value.trim().parse::<i64>() {
                Ok(i) => Value::Integer(i),
                Err(_) => Value::Text(value.trim().to_owned()),
            }
        }
        _ => Value::Text(unquote(value)),
    }
}

/// Strip the quotes net-snmp puts around strings and undo its `\"` and `\\`
fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() < 2 || !value.starts_with('"') || !value.ends_with('"') {
        return value.to_owned();
    }
    let mut text = String::with_capacity(value.len());
    let mut chars = value[1..value.len() - 1].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => text.extend(chars.next()),
            c => text.push(c),
        }
    }
    text
}

/// Octet strings that aren't printable ASCII come back as hex bytes
fn decode_hex(value: &str) -> String {
    let bytes: Vec<u8> = value
        .split_whitespace()
        .filter_map(|byte| u8::from_str_radix(byte, 16).ok())
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}


#[cfg(test)]
mod test {
    use super::*;

    fn opts(argv: &[&str]) -> SnmpOptions {
        let mut full = vec!["check"];
        full.extend_from_slice(argv);
        SnmpOptions::from_iter(full.into_iter())
    }

    #[test]
    fn parses_net_snmp_output() {
        let out = ".1.3.6.1.4.1.2604.5.1.2.4.1.0 = Gauge32: 1000\n\
                   .1.3.6.1.4.1.2604.5.1.1.1.3.0 = STRING: \"SFOS 19.5.3 MR-3\"\n\
                   .1.3.6.1.4.1.2604.5.1.5.1.2.0 = \"\"\n\
                   .1.3.6.1.4.1.2604.5.1.5.1.1.0 = INTEGER: 1\n\
                   .1.3.6.1.2.1.1.3.0 = Timeticks: 1234500\n\
                   .1.3.6.1.4.1.2604.5.1.3.99.0 = No Such Object available on this agent at this OID\n\
                   some stray line\n";
        let values = parse_output(out);
        assert_eq!(values.len(), 5);
        assert_eq!(values.integer(&Oid::new("1.3.6.1.4.1.2604.5.1.2.4.1.0")).unwrap(), 1000);
        assert_eq!(
            values.text(&Oid::new(".1.3.6.1.4.1.2604.5.1.1.1.3.0")).unwrap(),
            "SFOS 19.5.3 MR-3"
        );
        assert_eq!(values.text(&Oid::new("1.3.6.1.4.1.2604.5.1.5.1.2.0")).unwrap(), "");
        assert_eq!(values.integer(&Oid::new("1.3.6.1.4.1.2604.5.1.5.1.1.0")).unwrap(), 1);
        assert_eq!(values.integer(&Oid::new("1.3.6.1.2.1.1.3.0")).unwrap(), 1_234_500);
        match values.integer(&Oid::new("1.3.6.1.4.1.2604.5.1.3.99.0")) {
            Err(FetchError::Missing(_)) => {}
            other => panic!("expected a missing object, got {:?}", other),
        }
    }

    #[test]
    fn quoted_strings_are_unescaped() {
        let out = r#".1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.1 = STRING: "HQ \"main\""
.1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.2 = STRING: "C:\\x"
"#;
        let values = parse_output(out);
        assert_eq!(
            values.text(&Oid::new("1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.1")).unwrap(),
            r#"HQ "main""#
        );
        assert_eq!(
            values.text(&Oid::new("1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.2")).unwrap(),
            r"C:\x"
        );
    }

    #[test]
    fn hex_strings_are_decoded() {
        let out = ".1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.3 = Hex-STRING: 5A C3 BC 72 69 63 68 \n\
                   .1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.4 = Hex-STRING: 42 72 61 6E 63 68 20 4D \
                   C3 BC 6E 63 68 65 6E 20 \n\
                   6F 66 66 69 63 65 \n";
        let values = parse_output(out);
        assert_eq!(values.len(), 2);
        assert_eq!(
            values.text(&Oid::new("1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.3")).unwrap(),
            "Zürich"
        );
        assert_eq!(
            values.text(&Oid::new("1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.4")).unwrap(),
            "Branch München office"
        );
    }

    #[test]
    fn type_mismatches_are_fetch_errors() {
        let mut values = Values::new();
        values.insert(Oid::new("1.2.3"), Value::Text("up".to_owned()));
        let err = values.integer(&Oid::new("1.2.3")).unwrap_err();
        assert_eq!(err.to_string(), "expected integer at 1.2.3, got string");
    }

    #[test]
    fn index_under_root() {
        let root = Oid::new("1.3.6.1.4.1.2604.5.1.6.1.1.1.1");
        let row = Oid::new("1.3.6.1.4.1.2604.5.1.6.1.1.1.1.2.7");
        assert_eq!(row.index_under(&root), Some(vec![2, 7]));
        assert_eq!(root.index_under(&root), None);
        assert_eq!(Oid::new("1.3.6.1.4.1.2604.5.1.6.1.1.1.10").index_under(&root), None);
    }

    #[test]
    fn v2c_session() {
        let args = opts(&["-H", "fw01", "-C", "s3cret"]).session_args().unwrap();
        assert_eq!(
            args,
            vec![
                "-On", "-Oe", "-Ot", "-r", "0", "-t", "5", "-v", "2c", "-c", "s3cret", "fw01:161",
            ]
        );
    }

    #[test]
    fn v3_security_levels() {
        let args = opts(&["-H", "fw01", "--snmp-version", "3", "-u", "mon"])
            .session_args()
            .unwrap();
        assert!(args.windows(2).any(|w| w == ["-l", "noAuthNoPriv"]));

        let args = opts(&[
            "-H", "fw01", "--snmp-version", "3", "-u", "mon", "-A", "authpass", "-X", "privpass",
            "--priv-protocol", "des",
        ])
        .session_args()
        .unwrap();
        assert!(args.windows(2).any(|w| w == ["-l", "authPriv"]));
        assert!(args.windows(2).any(|w| w == ["-a", "SHA"]));
        assert!(args.windows(2).any(|w| w == ["-x", "DES"]));
        assert!(args.windows(2).any(|w| w == ["-X", "privpass"]));
    }

    #[test]
    fn v3_needs_a_username() {
        let err = opts(&["-H", "fw01", "--snmp-version", "3"])
            .session_args()
            .unwrap_err();
        assert_eq!(err, "SNMP v3 needs a --username");
    }
}
