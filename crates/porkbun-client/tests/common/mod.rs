//! Stateful Porkbun double for wire tests
//!
//! [`RegistrarDouble`] answers every POST under the mock server with the
//! registrar's envelope shapes and keeps glue hosts, DNS records and
//! nameservers in memory:
//!
//! - createGlue/updateGlue upsert, deleteGlue never fails
//! - getGlue regroups addresses into v4/v6 and reports full hostnames
//! - dns/create assigns numeric ids and stores `name.domain`
//! - unknown domains answer HTTP 200 with a `FAILURE` envelope

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use porkbun_client::PorkbunClient;
use porkbun_core::ProviderConfig;
use porkbun_core::translate::{encode_host, full_hostname};
use serde_json::{Value, json};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "pk1_test_key";
pub const SECRET_API_KEY: &str = "sk1_test_secret";

#[derive(Default)]
struct DoubleState {
    domains: HashSet<String>,
    glue: HashMap<String, BTreeMap<String, Vec<String>>>,
    raw_hosts: HashMap<String, Vec<Value>>,
    records: HashMap<String, BTreeMap<u64, Value>>,
    nameservers: HashMap<String, Vec<String>>,
    next_id: u64,
    requests: Vec<(String, Value)>,
    delay: Option<Duration>,
}

/// In-memory registrar behind a wiremock server
#[derive(Clone, Default)]
pub struct RegistrarDouble {
    state: Arc<Mutex<DoubleState>>,
}

impl RegistrarDouble {
    /// A double owning `domains`
    pub fn with_domains(domains: &[&str]) -> Self {
        let double = Self::default();
        {
            let mut state = double.state.lock().unwrap();
            state.next_id = 106926650;
            state.domains = domains.iter().map(|d| d.to_string()).collect();
        }
        double
    }

    /// Start a mock server answering every POST from this double
    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(self.clone())
            .mount(&server)
            .await;
        server
    }

    /// Delay every response by `delay`
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    /// Append a raw element to the getGlue host list of `domain`
    pub fn push_raw_host(&self, domain: &str, raw: Value) {
        self.state
            .lock()
            .unwrap()
            .raw_hosts
            .entry(domain.to_string())
            .or_default()
            .push(raw);
    }

    /// Addresses stored for a glue host, in request order
    pub fn glue_ips(&self, domain: &str, subdomain: &str) -> Option<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .glue
            .get(domain)?
            .get(&full_hostname(subdomain, domain))
            .cloned()
    }

    /// Stored DNS record as the registrar would report it
    pub fn dns_record(&self, domain: &str, id: &str) -> Option<Value> {
        let id: u64 = id.parse().ok()?;
        let state = self.state.lock().unwrap();
        state.records.get(domain)?.get(&id).cloned()
    }

    /// Every request seen so far as (path, JSON body)
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Paths of every request seen so far
    pub fn request_paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|(path, _)| path).collect()
    }
}

fn success(body: Value) -> ResponseTemplate {
    let mut envelope = json!({"status": "SUCCESS"});
    if let (Some(target), Value::Object(fields)) = (envelope.as_object_mut(), body) {
        target.extend(fields);
    }
    ResponseTemplate::new(200).set_body_json(envelope)
}

fn failure(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": "FAILURE", "message": message}))
}

fn string_list(body: &Value, field: &str) -> Vec<String> {
    body.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn text(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl DoubleState {
    fn route(&mut self, segments: &[&str], body: &Value) -> ResponseTemplate {
        if body.get("apikey").and_then(Value::as_str) != Some(API_KEY)
            || body.get("secretapikey").and_then(Value::as_str) != Some(SECRET_API_KEY)
        {
            return ResponseTemplate::new(400)
                .set_body_json(json!({"status": "ERROR", "message": "Invalid API key. (002)"}));
        }

        let domain = match segments.get(2) {
            Some(domain) => domain.to_string(),
            None => return ResponseTemplate::new(404).set_body_string("Not Found"),
        };

        if !self.domains.contains(&domain) {
            return failure("Invalid domain.");
        }

        match segments {
            ["domain", "createGlue" | "updateGlue", _, subdomain] => {
                let host = full_hostname(subdomain, &domain);
                self.glue
                    .entry(domain)
                    .or_default()
                    .insert(host, string_list(body, "ips"));
                success(json!({}))
            }
            ["domain", "deleteGlue", _, subdomain] => {
                let host = full_hostname(subdomain, &domain);
                if let Some(hosts) = self.glue.get_mut(&domain) {
                    hosts.remove(&host);
                }
                success(json!({}))
            }
            ["domain", "getGlue", _] => {
                let mut hosts: Vec<Value> = self
                    .glue
                    .get(&domain)
                    .map(|hosts| hosts.iter().map(|(host, ips)| encode_host(host, ips)).collect())
                    .unwrap_or_default();
                hosts.extend(self.raw_hosts.get(&domain).cloned().unwrap_or_default());

                if hosts.is_empty() {
                    success(json!({"hosts": null}))
                } else {
                    success(json!({"hosts": hosts}))
                }
            }
            ["dns", "create", _] => {
                let id = self.next_id;
                self.next_id += 1;
                let record = Self::stored_record(id, &domain, body);
                self.records.entry(domain).or_default().insert(id, record);
                success(json!({"id": id}))
            }
            ["dns", "retrieve", _, id] => {
                let record = id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| self.records.get(&domain)?.get(&id).cloned());
                success(json!({"records": record.into_iter().collect::<Vec<_>>()}))
            }
            ["dns", "edit", _, id] => match id.parse::<u64>() {
                Ok(id) if self.records.get(&domain).is_some_and(|r| r.contains_key(&id)) => {
                    let record = Self::stored_record(id, &domain, body);
                    self.records.entry(domain).or_default().insert(id, record);
                    success(json!({}))
                }
                _ => failure("Edit error: We were unable to edit the DNS record."),
            },
            ["dns", "delete", _, id] => {
                let removed = id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| self.records.get_mut(&domain)?.remove(&id));
                match removed {
                    Some(_) => success(json!({})),
                    None => failure("Delete error: Invalid record id."),
                }
            }
            ["domain", "getNs", _] => {
                let ns = self.nameservers.get(&domain).cloned().unwrap_or_default();
                success(json!({"ns": ns}))
            }
            ["domain", "updateNs", _] => {
                self.nameservers.insert(domain, string_list(body, "ns"));
                success(json!({}))
            }
            _ => ResponseTemplate::new(404).set_body_string("Not Found"),
        }
    }

    fn stored_record(id: u64, domain: &str, body: &Value) -> Value {
        let name = text(body, "name").unwrap_or_default();
        json!({
            "id": id.to_string(),
            "name": full_hostname(&name, domain),
            "type": text(body, "type").unwrap_or_default(),
            "content": text(body, "content").unwrap_or_default(),
            "ttl": text(body, "ttl").unwrap_or_else(|| "600".to_string()),
            "prio": text(body, "prio").unwrap_or_else(|| "0".to_string()),
            "notes": text(body, "notes").unwrap_or_default(),
        })
    }
}

impl Respond for RegistrarDouble {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let path = request.url.path().to_string();

        // Skip any base path in front of the operation group
        let segments: Vec<&str> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .skip_while(|segment| *segment != "domain" && *segment != "dns")
            .collect();

        let mut state = self.state.lock().unwrap();
        state.requests.push((path.clone(), body.clone()));

        let response = state.route(&segments, &body);
        match state.delay {
            Some(delay) => response.set_delay(delay),
            None => response,
        }
    }
}

/// Client pointed at `server` with the double's credentials
pub fn client_for(server: &MockServer) -> PorkbunClient {
    client_with_base(&server.uri())
}

/// Client pointed at `base_url` with the double's credentials
pub fn client_with_base(base_url: &str) -> PorkbunClient {
    PorkbunClient::new(ProviderConfig::new(API_KEY, SECRET_API_KEY).with_base_url(base_url)).unwrap()
}
