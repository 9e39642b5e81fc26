//! The canonical in-flight resource record (§3, §4.E): `EnrichedResourceDescription`.

use {
    scratchstack_arn::Arn,
    serde_json::{Map, Value},
    std::str::FromStr,
    thiserror::Error,
};

/// Errors raised while building or enriching an [EnrichedResourceDescription].
#[derive(Debug, Error)]
pub enum ErdError {
    #[error("cannot synthesize an ARN for unrecognized resource type {0}")]
    UnknownResourceType(String),

    #[error("malformed identifier/ARN {0:?}: {1}")]
    InvalidArn(String, String),
}

/// A resource's `Properties` bag: either an opaque JSON string (as most list APIs return it) or
/// an already-parsed object. Downstream code always wants [Properties::Parsed]; [Properties::ensure_parsed]
/// performs the one eager parse and records failures instead of silently dropping data, per §9.
#[derive(Clone, Debug, PartialEq)]
pub enum Properties {
    RawJson(String),
    Parsed(Map<String, Value>),
}

impl Properties {
    /// Returns the parsed form, parsing lazily if this is still raw JSON. A parse failure leaves
    /// the properties as an empty object and is reported via the returned `bool` (`true` = parse
    /// failed; callers fold this into the ERD's `needs_manual_triage` flag).
    pub fn ensure_parsed(&mut self) -> bool {
        if let Self::RawJson(raw) = self {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => {
                    *self = Self::Parsed(map);
                    false
                }
                Ok(_) | Err(_) => {
                    *self = Self::Parsed(Map::new());
                    true
                }
            }
        } else {
            false
        }
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Parsed(map) => Some(map),
            Self::RawJson(_) => None,
        }
    }
}

/// Maps a CloudFormation-style `TypeName` to the ARN shape AWS assigns its resources.
struct ArnShape {
    service: &'static str,
    /// Prepended to the identifier to form the ARN's resource segment, e.g. `"function:"`.
    resource_prefix: &'static str,
    /// Whether this service's resources omit region/account from the ARN (true for S3).
    global_no_account: bool,
}

fn arn_shape(type_name: &str) -> Option<ArnShape> {
    Some(match type_name {
        "AWS::S3::Bucket" => ArnShape { service: "s3", resource_prefix: "", global_no_account: true },
        "AWS::SNS::Topic" => ArnShape { service: "sns", resource_prefix: "", global_no_account: false },
        "AWS::SQS::Queue" => ArnShape { service: "sqs", resource_prefix: "", global_no_account: false },
        "AWS::Lambda::Function" => {
            ArnShape { service: "lambda", resource_prefix: "function:", global_no_account: false }
        }
        "AWS::EFS::FileSystem" => {
            ArnShape { service: "elasticfilesystem", resource_prefix: "file-system/", global_no_account: false }
        }
        "AWS::Elasticsearch::Domain" => ArnShape { service: "es", resource_prefix: "domain/", global_no_account: false },
        "AWS::OpenSearchService::Domain" => {
            ArnShape { service: "es", resource_prefix: "domain/", global_no_account: false }
        }
        "AWS::OpenSearchServerless::Collection" => {
            ArnShape { service: "aoss", resource_prefix: "collection/", global_no_account: false }
        }
        "AWS::Logs::LogGroup" => ArnShape { service: "logs", resource_prefix: "log-group:", global_no_account: false },
        _ => return None,
    })
}

/// Synthesizes an ARN from (partition, region, account, type, identifier) when the identifier
/// is not already a valid ARN, per the invariant in §3.
pub fn synthesize_arn(
    partition: &str,
    region: &str,
    account_id: &str,
    type_name: &str,
    identifier: &str,
) -> Result<Arn, ErdError> {
    let shape = arn_shape(type_name).ok_or_else(|| ErdError::UnknownResourceType(type_name.to_string()))?;
    let (region, account_id) = if shape.global_no_account { ("", "") } else { (region, account_id) };
    let s = format!("arn:{partition}:{}:{region}:{account_id}:{}{identifier}", shape.service, shape.resource_prefix);
    Arn::from_str(&s).map_err(|e| ErdError::InvalidArn(s, e.to_string()))
}

/// The canonical unit flowing through the pipeline (§3).
#[derive(Clone, Debug)]
pub struct EnrichedResourceDescription {
    identifier: String,
    type_name: String,
    region: String,
    account_id: String,
    arn: Arn,
    properties: Properties,
    needs_manual_triage: bool,
}

impl EnrichedResourceDescription {
    /// Builds an ERD, synthesizing the ARN from `identifier` if it is not already a valid ARN.
    pub fn new(
        partition: &str,
        type_name: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Result<Self, ErdError> {
        let type_name = type_name.into();
        let region = region.into();
        let account_id = account_id.into();
        let identifier = identifier.into();

        let arn = match Arn::from_str(&identifier) {
            Ok(arn) => arn,
            Err(_) => synthesize_arn(partition, &region, &account_id, &type_name, &identifier)?,
        };

        Ok(Self {
            identifier,
            type_name,
            region,
            account_id,
            arn,
            properties: Properties::Parsed(Map::new()),
            needs_manual_triage: false,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn arn(&self) -> &Arn {
        &self.arn
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn needs_manual_triage(&self) -> bool {
        self.needs_manual_triage
    }

    /// Sets the raw `Properties` payload this resource was listed with.
    pub fn set_raw_properties(&mut self, raw: String) -> &mut Self {
        self.properties = Properties::RawJson(raw);
        self
    }

    /// Claims a disjoint key in the properties bag. Enrichers must not collide on keys; this is
    /// enforced by callers at the chain level (each enricher link owns its own key namespace).
    pub fn set_property(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        if self.properties.as_map().is_none() {
            self.properties.ensure_parsed();
        }
        if let Properties::Parsed(map) = &mut self.properties {
            map.insert(key.into(), value);
        }
        self
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.as_map().and_then(|m| m.get(key))
    }

    /// Parses `Properties` if it is still a raw JSON string, recording failure in
    /// `needs_manual_triage` rather than dropping the resource (§9).
    pub fn ensure_properties_parsed(&mut self) {
        if self.properties.ensure_parsed() {
            self.needs_manual_triage = true;
        }
    }
}
