// # Resource Trait
//
// Defines the lifecycle interface a host drives for each managed resource
// type: create, read, update, delete and import, plus the schema and plan
// classification the host needs to decide which of them to call.
//
// ## Implementations
//
// - `porkbun_glue_record`: `lifecycle::GlueRecordResource`
// - `porkbun_dns_record`: `lifecycle::DnsRecordResource`

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Value type of a schema attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// A single string
    String,
    /// An unordered set of strings
    StringSet,
    /// A non-negative number
    Number,
}

/// Description of one resource attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    /// Attribute name
    pub name: &'static str,
    /// Value type
    pub kind: AttributeKind,
    /// Must be set by the user
    pub required: bool,
    /// Filled in by the provider
    pub computed: bool,
    /// Changing it replaces the resource instead of updating it
    pub forces_replacement: bool,
    /// Human-readable description
    pub description: &'static str,
}

impl AttributeSchema {
    /// A user-supplied attribute
    pub const fn required(name: &'static str, kind: AttributeKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            computed: false,
            forces_replacement: false,
            description,
        }
    }

    /// An optional user-supplied attribute
    pub const fn optional(name: &'static str, kind: AttributeKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            computed: false,
            forces_replacement: false,
            description,
        }
    }

    /// A provider-computed string attribute
    pub const fn computed(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: AttributeKind::String,
            required: false,
            computed: true,
            forces_replacement: false,
            description,
        }
    }

    /// Mark the attribute as forcing replacement
    pub const fn replaces(mut self) -> Self {
        self.forces_replacement = true;
        self
    }
}

/// Schema of a resource type as surfaced to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Markdown description of the resource
    pub description: &'static str,
    /// Attributes, in declaration order
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Names of the attributes that force replacement
    pub fn replacement_attributes(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|attr| attr.forces_replacement)
            .map(|attr| attr.name)
            .collect()
    }
}

/// What a host must do to move from tracked state to desired state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Nothing tracked yet
    Create,
    /// Update in place
    Update,
    /// Delete the tracked resource, then create the desired one
    Replace,
    /// Tracked state already matches
    NoOp,
}

/// Result of refreshing tracked state against the registrar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<S> {
    /// The resource exists; this is its refreshed state
    Present(S),
    /// The resource no longer exists upstream and must be forgotten
    Gone,
}

impl<S> ReadOutcome<S> {
    /// The refreshed state, if the resource still exists
    pub fn into_present(self) -> Option<S> {
        match self {
            Self::Present(state) => Some(state),
            Self::Gone => None,
        }
    }
}

/// Lifecycle of one resource type
///
/// Each call is independent: nothing is cached between calls and no call is
/// retried. A failed call persists nothing; the host keeps its prior
/// state. Wire calls race `cancel` and return `Error::Cancelled` if it
/// fires first.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Desired attributes, as configured by the user
    type Plan: Send + Sync;

    /// Persisted attributes, including computed ones
    type State: Send + Sync;

    /// Orchestrator-facing type name (e.g., "porkbun_glue_record")
    fn type_name(&self) -> &'static str;

    /// Attribute schema
    fn schema(&self) -> ResourceSchema;

    /// Classify the change from `prior` to `desired`
    fn plan(&self, prior: Option<&Self::State>, desired: &Self::Plan) -> PlanAction;

    /// Create the resource and return the state to persist
    async fn create(
        &self,
        plan: &Self::Plan,
        cancel: &CancellationToken,
    ) -> Result<Self::State, crate::Error>;

    /// Refresh persisted state from the registrar
    async fn read(
        &self,
        state: &Self::State,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome<Self::State>, crate::Error>;

    /// Update the resource in place and return the state to persist
    async fn update(
        &self,
        plan: &Self::Plan,
        prior: &Self::State,
        cancel: &CancellationToken,
    ) -> Result<Self::State, crate::Error>;

    /// Delete the resource
    async fn delete(&self, state: &Self::State, cancel: &CancellationToken)
    -> Result<(), crate::Error>;

    /// Seed state from an import identifier without contacting the registrar
    ///
    /// A subsequent [`Resource::read`] hydrates the remaining attributes.
    fn import(&self, id: &str) -> Result<Self::State, crate::Error>;
}
