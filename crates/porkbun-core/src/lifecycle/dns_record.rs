// # DNS Record Lifecycle
//
// `porkbun_dns_record` manages one record in a domain's zone. The registrar
// assigns the id on create; every later call is keyed by (domain, id).
// Responses carry the full hostname in `name`, which is mapped back to the
// bare label on Read.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{guarded, parse_import_id, require_key_field};
use crate::error::{Error, Result};
use crate::traits::{
    AttributeKind, AttributeSchema, DnsRecord, PlanAction, ReadOutcome, RegistrarApi, Resource,
    ResourceSchema,
};
use crate::translate::{full_hostname, strip_domain};

/// Desired DNS record attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsRecordPlan {
    /// Domain (zone) of the record
    pub domain: String,
    /// Bare record label; empty for the apex
    pub name: String,
    /// Record type (A, AAAA, CNAME, TXT, ...)
    pub record_type: String,
    /// Record content
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: Option<u32>,
    /// Priority (MX, SRV)
    pub prio: Option<u32>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl DnsRecordPlan {
    /// Create a plan for a record without ttl, priority or notes
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            record_type: record_type.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the time-to-live
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the priority
    pub fn with_prio(mut self, prio: u32) -> Self {
        self.prio = Some(prio);
        self
    }

    fn validate(&self) -> Result<()> {
        require_key_field("domain", &self.domain)?;

        if self.record_type.is_empty() {
            return Err(Error::invalid_input("record type cannot be empty"));
        }

        if self.content.is_empty() {
            return Err(Error::invalid_input("record content cannot be empty"));
        }

        Ok(())
    }

    fn to_wire(&self) -> DnsRecord {
        DnsRecord {
            id: None,
            name: self.name.clone(),
            record_type: self.record_type.clone(),
            content: self.content.clone(),
            ttl: self.ttl.map(|ttl| ttl.to_string()),
            prio: self.prio.map(|prio| prio.to_string()),
            notes: self.notes.clone(),
        }
    }
}

/// Persisted DNS record attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordState {
    /// Registrar-assigned id
    pub id: String,
    /// Domain (zone) of the record
    pub domain: String,
    /// Bare record label; empty for the apex
    pub name: String,
    /// Record type
    pub record_type: String,
    /// Record content
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: Option<u32>,
    /// Priority
    pub prio: Option<u32>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl DnsRecordState {
    /// State a successful create/update leaves behind
    ///
    /// A priority of 0 and empty notes fold into `None`, the same as on Read.
    fn from_plan(id: String, plan: &DnsRecordPlan) -> Self {
        Self {
            id,
            domain: plan.domain.clone(),
            name: plan.name.clone(),
            record_type: plan.record_type.clone(),
            content: plan.content.clone(),
            ttl: plan.ttl,
            prio: plan.prio.filter(|prio| *prio != 0),
            notes: plan.notes.clone().filter(|notes| !notes.is_empty()),
        }
    }

    /// `domain:id`, the identifier accepted by import
    pub fn import_id(&self) -> String {
        format!("{}:{}", self.domain, self.id)
    }
}

/// Lifecycle controller for `porkbun_dns_record`
pub struct DnsRecordResource {
    registrar: Arc<dyn RegistrarApi>,
}

impl DnsRecordResource {
    /// Type name surfaced to the orchestrator
    pub const TYPE_NAME: &'static str = "porkbun_dns_record";

    /// Create a controller over `registrar`
    pub fn new(registrar: Arc<dyn RegistrarApi>) -> Self {
        Self { registrar }
    }

    /// Map a registrar record back onto persisted state
    ///
    /// A priority of 0 and empty notes are what the registrar reports for
    /// "unset" and are folded into `None`.
    fn state_from_wire(domain: &str, id: &str, record: DnsRecord) -> DnsRecordState {
        let name = strip_domain(&record.name, domain).unwrap_or(record.name);

        DnsRecordState {
            id: id.to_string(),
            domain: domain.to_string(),
            name,
            record_type: record.record_type,
            content: record.content,
            ttl: record.ttl.and_then(|ttl| ttl.parse().ok()),
            prio: record
                .prio
                .and_then(|prio| prio.parse().ok())
                .filter(|prio| *prio != 0),
            notes: record.notes.filter(|notes| !notes.is_empty()),
        }
    }
}

#[async_trait]
impl Resource for DnsRecordResource {
    type Plan = DnsRecordPlan;
    type State = DnsRecordState;

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema {
            description: "Manage a DNS record of your domain.",
            attributes: vec![
                AttributeSchema::computed("id", "The registrar-assigned ID of the record."),
                AttributeSchema::required("domain", AttributeKind::String, "The FQDN of the domain.")
                    .replaces(),
                AttributeSchema::optional(
                    "name",
                    AttributeKind::String,
                    "The subdomain of the record; empty for the apex.",
                ),
                AttributeSchema::required("type", AttributeKind::String, "The record type."),
                AttributeSchema::required("content", AttributeKind::String, "The record content."),
                AttributeSchema::optional("ttl", AttributeKind::Number, "Time-to-live in seconds."),
                AttributeSchema::optional("prio", AttributeKind::Number, "Priority (MX, SRV)."),
                AttributeSchema::optional("notes", AttributeKind::String, "Free-form notes."),
            ],
        }
    }

    fn plan(&self, prior: Option<&DnsRecordState>, desired: &DnsRecordPlan) -> PlanAction {
        match prior {
            None => PlanAction::Create,
            Some(prior) if prior.domain != desired.domain => PlanAction::Replace,
            Some(prior) => {
                // An unset ttl leaves whatever the registrar defaulted to
                let mut wanted = DnsRecordState::from_plan(prior.id.clone(), desired);
                if wanted.ttl.is_none() {
                    wanted.ttl = prior.ttl;
                }

                if wanted == *prior {
                    PlanAction::NoOp
                } else {
                    PlanAction::Update
                }
            }
        }
    }

    async fn create(&self, plan: &DnsRecordPlan, cancel: &CancellationToken) -> Result<DnsRecordState> {
        plan.validate()?;

        info!(
            "Creating {} record {} -> {}",
            plan.record_type,
            full_hostname(&plan.name, &plan.domain),
            plan.content
        );

        let id = guarded(
            cancel,
            "create DNS record",
            self.registrar.create_dns_record(&plan.domain, &plan.to_wire()),
        )
        .await?;

        debug!("Registrar assigned id {} to {} record", id, plan.record_type);
        Ok(DnsRecordState::from_plan(id, plan))
    }

    async fn read(
        &self,
        state: &DnsRecordState,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome<DnsRecordState>> {
        let record = guarded(
            cancel,
            "read DNS record",
            self.registrar.get_dns_record(&state.domain, &state.id),
        )
        .await?;

        match record {
            Some(record) => Ok(ReadOutcome::Present(Self::state_from_wire(
                &state.domain,
                &state.id,
                record,
            ))),
            None => {
                warn!("DNS record {} no longer exists upstream", state.import_id());
                Ok(ReadOutcome::Gone)
            }
        }
    }

    async fn update(
        &self,
        plan: &DnsRecordPlan,
        prior: &DnsRecordState,
        cancel: &CancellationToken,
    ) -> Result<DnsRecordState> {
        plan.validate()?;

        info!(
            "Updating {} record {} ({}) -> {}",
            plan.record_type,
            full_hostname(&plan.name, &plan.domain),
            prior.id,
            plan.content
        );

        guarded(
            cancel,
            "update DNS record",
            self.registrar
                .update_dns_record(&plan.domain, &prior.id, &plan.to_wire()),
        )
        .await?;

        Ok(DnsRecordState::from_plan(prior.id.clone(), plan))
    }

    async fn delete(&self, state: &DnsRecordState, cancel: &CancellationToken) -> Result<()> {
        info!("Deleting DNS record {}", state.import_id());

        guarded(
            cancel,
            "delete DNS record",
            self.registrar.delete_dns_record(&state.domain, &state.id),
        )
        .await
    }

    fn import(&self, id: &str) -> Result<DnsRecordState> {
        let (domain, record_id) = parse_import_id(id, "domain:id")?;

        Ok(DnsRecordState {
            id: record_id,
            domain,
            ..Default::default()
        })
    }
}
