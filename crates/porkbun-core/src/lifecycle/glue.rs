// # Glue Record Lifecycle
//
// `porkbun_glue_record` binds a nameserver host under a domain to a set of
// addresses. The composite key is (domain, subdomain) and the identifier is
// `domain:subdomain`.
//
// - Create: createGlue, then persist the planned addresses
// - Read: getGlue for the whole domain, match `subdomain.domain` exactly
//   against the returned full hostnames, take the registrar's addresses
//   verbatim; no match means the resource is gone
// - Update: updateGlue (upsert), full replacement of the address set
// - Delete: deleteGlue; a host that does not exist deletes fine
// - Import: `domain:subdomain`, no network call

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{guarded, parse_import_id, require_key_field};
use crate::error::Result;
use crate::traits::{
    AttributeKind, AttributeSchema, PlanAction, ReadOutcome, RegistrarApi, Resource, ResourceSchema,
};
use crate::translate::full_hostname;

/// Desired glue record attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlueRecordPlan {
    /// Domain the nameserver belongs to
    pub domain: String,
    /// Nameserver label (e.g., "ns1")
    pub subdomain: String,
    /// Addresses of the nameserver
    pub ips: BTreeSet<String>,
}

impl GlueRecordPlan {
    /// Create a plan
    pub fn new<I, S>(domain: impl Into<String>, subdomain: impl Into<String>, ips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
            ips: ips.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        require_key_field("domain", &self.domain)?;
        require_key_field("subdomain", &self.subdomain)
    }
}

/// Persisted glue record attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueRecordState {
    /// `domain:subdomain`
    pub id: String,
    /// Domain the nameserver belongs to
    pub domain: String,
    /// Nameserver label
    pub subdomain: String,
    /// Addresses as last seen at the registrar
    pub ips: BTreeSet<String>,
}

impl GlueRecordState {
    fn new(domain: &str, subdomain: &str, ips: BTreeSet<String>) -> Self {
        Self {
            id: glue_id(domain, subdomain),
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            ips,
        }
    }

    /// Full hostname the registrar reports for this record
    pub fn host(&self) -> String {
        full_hostname(&self.subdomain, &self.domain)
    }
}

/// Identifier of a glue record
pub fn glue_id(domain: &str, subdomain: &str) -> String {
    format!("{}:{}", domain, subdomain)
}

/// Lifecycle controller for `porkbun_glue_record`
pub struct GlueRecordResource {
    registrar: Arc<dyn RegistrarApi>,
}

impl GlueRecordResource {
    /// Type name surfaced to the orchestrator
    pub const TYPE_NAME: &'static str = "porkbun_glue_record";

    /// Create a controller over `registrar`
    pub fn new(registrar: Arc<dyn RegistrarApi>) -> Self {
        Self { registrar }
    }
}

#[async_trait]
impl Resource for GlueRecordResource {
    type Plan = GlueRecordPlan;
    type State = GlueRecordState;

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema {
            description: "Manage glue records (nameserver IP addresses) for your domain.",
            attributes: vec![
                AttributeSchema::computed(
                    "id",
                    "The ID of the glue record (format: domain:subdomain).",
                ),
                AttributeSchema::required("domain", AttributeKind::String, "The FQDN of the domain.")
                    .replaces(),
                AttributeSchema::required(
                    "subdomain",
                    AttributeKind::String,
                    "The subdomain of the glue record (e.g., 'ns1').",
                )
                .replaces(),
                AttributeSchema::required(
                    "ips",
                    AttributeKind::StringSet,
                    "The IP addresses for the glue record.",
                ),
            ],
        }
    }

    fn plan(&self, prior: Option<&GlueRecordState>, desired: &GlueRecordPlan) -> PlanAction {
        match prior {
            None => PlanAction::Create,
            Some(prior) if prior.domain != desired.domain || prior.subdomain != desired.subdomain => {
                PlanAction::Replace
            }
            Some(prior) if prior.ips != desired.ips => PlanAction::Update,
            Some(_) => PlanAction::NoOp,
        }
    }

    async fn create(
        &self,
        plan: &GlueRecordPlan,
        cancel: &CancellationToken,
    ) -> Result<GlueRecordState> {
        plan.validate()?;
        let ips: Vec<String> = plan.ips.iter().cloned().collect();

        info!(
            "Creating glue record {} -> {:?} via {}",
            full_hostname(&plan.subdomain, &plan.domain),
            ips,
            self.registrar.registrar_name()
        );

        guarded(
            cancel,
            "create glue record",
            self.registrar
                .create_glue_record(&plan.domain, &plan.subdomain, &ips),
        )
        .await?;

        Ok(GlueRecordState::new(&plan.domain, &plan.subdomain, plan.ips.clone()))
    }

    async fn read(
        &self,
        state: &GlueRecordState,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome<GlueRecordState>> {
        let records = guarded(
            cancel,
            "read glue records",
            self.registrar.get_glue_records(&state.domain),
        )
        .await?;

        let expected_host = state.host();
        debug!(
            "Looking for {} among {} glue host(s) of {}",
            expected_host,
            records.len(),
            state.domain
        );

        match records.into_iter().find(|record| record.host == expected_host) {
            Some(record) => Ok(ReadOutcome::Present(GlueRecordState::new(
                &state.domain,
                &state.subdomain,
                record.ips.into_iter().collect(),
            ))),
            None => {
                warn!("Glue record {} no longer exists upstream", expected_host);
                Ok(ReadOutcome::Gone)
            }
        }
    }

    async fn update(
        &self,
        plan: &GlueRecordPlan,
        _prior: &GlueRecordState,
        cancel: &CancellationToken,
    ) -> Result<GlueRecordState> {
        plan.validate()?;
        let ips: Vec<String> = plan.ips.iter().cloned().collect();

        info!(
            "Updating glue record {} -> {:?}",
            full_hostname(&plan.subdomain, &plan.domain),
            ips
        );

        guarded(
            cancel,
            "update glue record",
            self.registrar
                .update_glue_record(&plan.domain, &plan.subdomain, &ips),
        )
        .await?;

        Ok(GlueRecordState::new(&plan.domain, &plan.subdomain, plan.ips.clone()))
    }

    async fn delete(&self, state: &GlueRecordState, cancel: &CancellationToken) -> Result<()> {
        info!("Deleting glue record {}", state.host());

        guarded(
            cancel,
            "delete glue record",
            self.registrar
                .delete_glue_record(&state.domain, &state.subdomain),
        )
        .await
    }

    fn import(&self, id: &str) -> Result<GlueRecordState> {
        let (domain, subdomain) = parse_import_id(id, "domain:subdomain")?;
        debug!("Importing glue record {}", id);

        Ok(GlueRecordState {
            id: id.to_string(),
            domain,
            subdomain,
            ips: BTreeSet::new(),
        })
    }
}
