use {
    super::AwsPrincipal,
    crate::{
        display_json,
        serutil::{ElementList, StringList},
    },
    derive_builder::Builder,
    scratchstack_aws_principal::{Principal as PrincipalActor, PrincipalIdentity, PrincipalSource},
    serde::{Deserialize, Serialize},
};

#[derive(Builder, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SpecifiedPrincipal {
    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "AWS", skip_serializing_if = "Option::is_none")]
    aws: Option<ElementList<AwsPrincipal>>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "CanonicalUser", skip_serializing_if = "Option::is_none")]
    canonical_user: Option<StringList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Federated", skip_serializing_if = "Option::is_none")]
    federated: Option<StringList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Service", skip_serializing_if = "Option::is_none")]
    service: Option<StringList>,
}

display_json!(SpecifiedPrincipal);

impl SpecifiedPrincipal {
    #[inline]
    pub fn builder() -> SpecifiedPrincipalBuilder {
        SpecifiedPrincipalBuilder::default()
    }

    #[inline]
    pub fn aws(&self) -> Option<&ElementList<AwsPrincipal>> {
        self.aws.as_ref()
    }

    #[inline]
    pub fn canonical_user(&self) -> Option<&StringList> {
        self.canonical_user.as_ref()
    }

    #[inline]
    pub fn federated(&self) -> Option<&StringList> {
        self.federated.as_ref()
    }

    #[inline]
    pub fn service(&self) -> Option<&StringList> {
        self.service.as_ref()
    }

    /// Indicates whether any identity held by the [PrincipalActor] is matched by this [SpecifiedPrincipal].
    pub fn matches(&self, actor: &PrincipalActor) -> bool {
        for identity in actor {
            if self.matches_identity(identity) {
                return true;
            }
        }

        false
    }

    fn matches_identity(&self, identity: &PrincipalIdentity) -> bool {
        if let Some(aws) = &self.aws {
            if aws.to_vec().iter().any(|p| p.matches(identity)) {
                return true;
            }
        }

        match identity.source() {
            PrincipalSource::CanonicalUser => self
                .canonical_user
                .as_ref()
                .map(|allowed| allowed.to_vec().iter().any(|s| *s == identity.to_string()))
                .unwrap_or(false),
            PrincipalSource::Federated => self
                .federated
                .as_ref()
                .map(|allowed| allowed.to_vec().iter().any(|s| *s == identity.to_string()))
                .unwrap_or(false),
            PrincipalSource::Service => self
                .service
                .as_ref()
                .map(|allowed| allowed.to_vec().iter().any(|s| *s == identity.to_string()))
                .unwrap_or(false),
            _ => false,
        }
    }
}
