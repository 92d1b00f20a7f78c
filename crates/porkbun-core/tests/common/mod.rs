//! Test doubles and common utilities for lifecycle contract tests
//!
//! [`InMemoryRegistrar`] speaks the same data shapes as the registrar: glue
//! hosts are stored as raw wire tuples and decoded on every read, DNS
//! record names come back as full hostnames.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use porkbun_core::error::{Error, Result};
use porkbun_core::traits::{DnsRecord, GlueRecord, RegistrarApi};
use porkbun_core::translate::{decode_hosts, encode_host, full_hostname};
use serde_json::Value;

#[derive(Default)]
struct Zone {
    /// Raw `[hostname, {v4, v6}]` tuples in insertion order
    glue_hosts: Vec<Value>,
    dns_records: BTreeMap<String, DnsRecord>,
    nameservers: Vec<String>,
}

/// A registrar double that keeps everything in memory and counts calls
#[derive(Clone, Default)]
pub struct InMemoryRegistrar {
    zones: Arc<Mutex<HashMap<String, Zone>>>,
    domains: Arc<Mutex<HashSet<String>>>,
    calls: Arc<AtomicUsize>,
    next_id: Arc<AtomicUsize>,
    fail_next: Arc<Mutex<Option<String>>>,
    stall: Arc<AtomicBool>,
}

impl InMemoryRegistrar {
    /// A registrar that owns `domains`; calls for other domains fail
    pub fn with_domains(domains: &[&str]) -> Self {
        let registrar = Self::default();
        registrar.next_id.store(106926650, Ordering::SeqCst);
        {
            let mut owned = registrar.domains.lock().unwrap();
            let mut zones = registrar.zones.lock().unwrap();
            for domain in domains {
                owned.insert(domain.to_string());
                zones.insert(domain.to_string(), Zone::default());
            }
        }
        registrar
    }

    /// Number of registrar calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next call fail with an API error carrying `message`
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    /// Make every following call hang until dropped
    pub fn stall(&self) {
        self.stall.store(true, Ordering::SeqCst);
    }

    /// Insert a raw host-list element, bypassing the API
    pub fn push_raw_host(&self, domain: &str, raw: Value) {
        self.zones
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .glue_hosts
            .push(raw);
    }

    /// Overwrite a glue host behind the provider's back
    pub fn set_glue_out_of_band(&self, domain: &str, subdomain: &str, ips: &[&str]) {
        let ips: Vec<String> = ips.iter().map(|ip| ip.to_string()).collect();
        self.upsert_glue(domain, subdomain, &ips);
    }

    /// Drop a DNS record behind the provider's back
    pub fn remove_dns_record_out_of_band(&self, domain: &str, id: &str) {
        if let Some(zone) = self.zones.lock().unwrap().get_mut(domain) {
            zone.dns_records.remove(id);
        }
    }

    /// Current raw addresses of a glue host, v4 first then v6
    pub fn glue_ips(&self, domain: &str, subdomain: &str) -> Option<Vec<String>> {
        let host = full_hostname(subdomain, domain);
        let zones = self.zones.lock().unwrap();
        let zone = zones.get(domain)?;
        decode_hosts(domain, &zone.glue_hosts)
            .into_iter()
            .find(|record| record.host == host)
            .map(|record| record.ips)
    }

    async fn enter(&self, domain: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.stall.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(Error::api(message));
        }

        if !self.domains.lock().unwrap().contains(domain) {
            return Err(Error::api("Invalid domain."));
        }

        Ok(())
    }

    fn upsert_glue(&self, domain: &str, subdomain: &str, ips: &[String]) {
        let host = full_hostname(subdomain, domain);
        let entry = encode_host(&host, ips);

        let mut zones = self.zones.lock().unwrap();
        let zone = zones.entry(domain.to_string()).or_default();
        match zone
            .glue_hosts
            .iter_mut()
            .find(|raw| raw.get(0).and_then(Value::as_str) == Some(host.as_str()))
        {
            Some(existing) => *existing = entry,
            None => zone.glue_hosts.push(entry),
        }
    }
}

#[async_trait::async_trait]
impl RegistrarApi for InMemoryRegistrar {
    async fn create_glue_record(&self, domain: &str, subdomain: &str, ips: &[String]) -> Result<()> {
        self.enter(domain).await?;
        self.upsert_glue(domain, subdomain, ips);
        Ok(())
    }

    async fn update_glue_record(&self, domain: &str, subdomain: &str, ips: &[String]) -> Result<()> {
        self.enter(domain).await?;
        self.upsert_glue(domain, subdomain, ips);
        Ok(())
    }

    async fn delete_glue_record(&self, domain: &str, subdomain: &str) -> Result<()> {
        self.enter(domain).await?;
        let host = full_hostname(subdomain, domain);
        if let Some(zone) = self.zones.lock().unwrap().get_mut(domain) {
            zone.glue_hosts
                .retain(|raw| raw.get(0).and_then(Value::as_str) != Some(host.as_str()));
        }
        Ok(())
    }

    async fn get_glue_records(&self, domain: &str) -> Result<Vec<GlueRecord>> {
        self.enter(domain).await?;
        let zones = self.zones.lock().unwrap();
        Ok(zones
            .get(domain)
            .map(|zone| decode_hosts(domain, &zone.glue_hosts))
            .unwrap_or_default())
    }

    async fn create_dns_record(&self, domain: &str, record: &DnsRecord) -> Result<String> {
        self.enter(domain).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();

        let stored = DnsRecord {
            id: Some(id.clone()),
            name: full_hostname(&record.name, domain),
            ttl: record.ttl.clone().or_else(|| Some("600".to_string())),
            prio: record.prio.clone().or_else(|| Some("0".to_string())),
            notes: record.notes.clone().or_else(|| Some(String::new())),
            ..record.clone()
        };

        self.zones
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .dns_records
            .insert(id.clone(), stored);

        Ok(id)
    }

    async fn get_dns_record(&self, domain: &str, id: &str) -> Result<Option<DnsRecord>> {
        self.enter(domain).await?;
        let zones = self.zones.lock().unwrap();
        Ok(zones
            .get(domain)
            .and_then(|zone| zone.dns_records.get(id))
            .cloned())
    }

    async fn update_dns_record(&self, domain: &str, id: &str, record: &DnsRecord) -> Result<()> {
        self.enter(domain).await?;
        let mut zones = self.zones.lock().unwrap();
        let Some(existing) = zones
            .get_mut(domain)
            .and_then(|zone| zone.dns_records.get_mut(id))
        else {
            return Err(Error::api("Invalid record ID."));
        };

        *existing = DnsRecord {
            id: Some(id.to_string()),
            name: full_hostname(&record.name, domain),
            ttl: record.ttl.clone().or_else(|| Some("600".to_string())),
            prio: record.prio.clone().or_else(|| Some("0".to_string())),
            notes: record.notes.clone().or_else(|| Some(String::new())),
            ..record.clone()
        };
        Ok(())
    }

    async fn delete_dns_record(&self, domain: &str, id: &str) -> Result<()> {
        self.enter(domain).await?;
        let mut zones = self.zones.lock().unwrap();
        match zones
            .get_mut(domain)
            .and_then(|zone| zone.dns_records.remove(id))
        {
            Some(_) => Ok(()),
            None => Err(Error::api("Invalid record ID.")),
        }
    }

    async fn get_nameservers(&self, domain: &str) -> Result<Vec<String>> {
        self.enter(domain).await?;
        let zones = self.zones.lock().unwrap();
        Ok(zones
            .get(domain)
            .map(|zone| zone.nameservers.clone())
            .unwrap_or_default())
    }

    async fn update_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<()> {
        self.enter(domain).await?;
        self.zones
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .nameservers = nameservers.to_vec();
        Ok(())
    }

    fn registrar_name(&self) -> &'static str {
        "in-memory"
    }
}

/// Sorted copy of a list of addresses
pub fn sorted(ips: &[&str]) -> Vec<String> {
    let mut ips: Vec<String> = ips.iter().map(|ip| ip.to_string()).collect();
    ips.sort();
    ips
}
